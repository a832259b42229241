use log::trace;

use crate::basic_types::Assignment;
use crate::subgraph_assert;

/// A forbidden conjunction of assignments, learned from failed search or from
/// an already-reported solution.
#[derive(Clone, Debug, Default)]
pub(crate) struct Nogood {
    pub(crate) literals: Vec<Assignment>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NogoodId(u32);

/// Watch-indexed storage for nogoods, using the standard two-watched-literal
/// scheme.
///
/// Every stored nogood keeps its two watched literals in positions 0 and 1.
/// For each (pattern, target) pair there is a bucket listing the nogoods
/// currently watching that literal, so that making an assignment only touches
/// the nogoods whose watch was just satisfied. Nogoods with a single literal
/// cannot be two-watched; they are collected separately and applied to the
/// root domains when the search re-enters.
///
/// The table lives for the whole solve and only ever grows.
#[derive(Debug, Default)]
pub(crate) struct WatchTable {
    target_size: usize,
    /// Indexed by `pattern_vertex * target_size + target_vertex`.
    buckets: Vec<Vec<NogoodId>>,
    nogoods: Vec<Nogood>,
    singletons: Vec<Assignment>,
}

impl WatchTable {
    pub(crate) fn new(pattern_size: usize, target_size: usize) -> WatchTable {
        WatchTable {
            target_size,
            buckets: vec![Vec::new(); pattern_size * target_size],
            nogoods: Vec::new(),
            singletons: Vec::new(),
        }
    }

    /// Whether the table was set up for this solve. A disabled table accepts
    /// no nogoods and propagates nothing.
    pub(crate) fn is_enabled(&self) -> bool {
        !self.buckets.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.nogoods.len() + self.singletons.len()
    }

    fn bucket_index(&self, literal: Assignment) -> usize {
        subgraph_assert!(moderate, literal.target_vertex < self.target_size);
        literal.pattern_vertex * self.target_size + literal.target_vertex
    }

    /// Stores a nogood, watching its first two literals. An empty nogood
    /// carries no usable information and is dropped; a single literal goes to
    /// the singleton list instead of being watched.
    pub(crate) fn post(&mut self, nogood: Nogood) {
        subgraph_assert!(simple, self.is_enabled());

        match nogood.literals.len() {
            0 => trace!("dropping empty nogood"),
            1 => self.singletons.push(nogood.literals[0]),
            _ => {
                let id = NogoodId(self.nogoods.len() as u32);
                let first_bucket = self.bucket_index(nogood.literals[0]);
                let second_bucket = self.bucket_index(nogood.literals[1]);
                self.buckets[first_bucket].push(id);
                self.buckets[second_bucket].push(id);
                self.nogoods.push(nogood);
            }
        }
    }

    /// Takes the accumulated single-literal nogoods, leaving the list empty.
    pub(crate) fn drain_singletons(&mut self) -> Vec<Assignment> {
        std::mem::take(&mut self.singletons)
    }

    /// Processes every nogood watching `trigger`, which has just been
    /// assigned. Each such nogood is re-watched on some other literal for
    /// which `is_unassigned` holds; if no such literal exists beyond the other
    /// watch, all literals but the other watch are satisfied and `forbid` is
    /// invoked on it.
    pub(crate) fn propagate(
        &mut self,
        trigger: Assignment,
        mut is_unassigned: impl FnMut(Assignment) -> bool,
        mut forbid: impl FnMut(Assignment),
    ) {
        if !self.is_enabled() {
            return;
        }

        let bucket = self.bucket_index(trigger);
        let mut position = 0;
        while position < self.buckets[bucket].len() {
            let id = self.buckets[bucket][position];

            let new_watch = {
                let literals = &mut self.nogoods[id.0 as usize].literals;
                if literals[0] != trigger {
                    literals.swap(0, 1);
                }
                subgraph_assert!(moderate, literals[0] == trigger);

                let replacement = (2..literals.len()).find(|&index| is_unassigned(literals[index]));
                match replacement {
                    Some(index) => {
                        literals.swap(0, index);
                        Some(literals[0])
                    }
                    None => {
                        forbid(literals[1]);
                        None
                    }
                }
            };

            match new_watch {
                Some(watch) => {
                    // Distinct literals always name distinct pattern
                    // vertices, so the new bucket is never the current one.
                    let new_bucket = self.bucket_index(watch);
                    subgraph_assert!(moderate, new_bucket != bucket);
                    let _ = self.buckets[bucket].swap_remove(position);
                    self.buckets[new_bucket].push(id);
                }
                None => position += 1,
            }
        }
    }
}
