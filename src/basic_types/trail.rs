use fnv::FnvHashMap;
use itertools::Itertools;

use super::Assignment;
use super::VertexMapping;

/// The discrepancy/choice-count value recorded for unit propagations.
pub(crate) const PROPAGATED: i32 = -1;
/// The discrepancy/choice-count value recorded for synthetic entries which
/// exist only so that a nogood can be collected from the trail.
pub(crate) const SYNTHETIC: i32 = -2;

/// One entry on the assignments trail.
#[derive(Clone, Copy, Debug)]
pub(crate) struct AssignmentRecord {
    pub(crate) assignment: Assignment,
    pub(crate) is_decision: bool,
    /// For decisions, the index of the tried value within the branch list.
    pub(crate) discrepancy: i32,
    /// For decisions, the size of the branch list the value was taken from.
    pub(crate) choice_count: i32,
}

/// An append-only log of the assignments made on the current search path.
///
/// The trail grows as decisions are made and unit propagations fire, and is
/// restored by truncating back to a previously recorded length. Decisions and
/// propagations are distinguished so that nogoods (which are built from the
/// decisions only) and proof events can be reconstructed from the trail alone.
#[derive(Clone, Debug, Default)]
pub(crate) struct AssignmentsTrail {
    records: Vec<AssignmentRecord>,
}

impl AssignmentsTrail {
    pub(crate) fn push_decision(
        &mut self,
        assignment: Assignment,
        discrepancy: i32,
        choice_count: i32,
    ) {
        self.records.push(AssignmentRecord {
            assignment,
            is_decision: true,
            discrepancy,
            choice_count,
        });
    }

    pub(crate) fn push_propagation(&mut self, assignment: Assignment) {
        self.records.push(AssignmentRecord {
            assignment,
            is_decision: false,
            discrepancy: PROPAGATED,
            choice_count: PROPAGATED,
        });
    }

    pub(crate) fn push_synthetic_decision(&mut self, assignment: Assignment) {
        self.records.push(AssignmentRecord {
            assignment,
            is_decision: true,
            discrepancy: SYNTHETIC,
            choice_count: SYNTHETIC,
        });
    }

    pub(crate) fn pop(&mut self) {
        let _ = self.records.pop();
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &AssignmentRecord> {
        self.records.iter()
    }

    /// Whether the exact assignment is on the trail. Note that a different
    /// assignment to the same pattern vertex does not count.
    pub(crate) fn contains(&self, assignment: Assignment) -> bool {
        self.records
            .iter()
            .any(|record| record.assignment == assignment)
    }

    /// The decisions on the trail, in chronological order, as plain vertex
    /// pairs.
    pub(crate) fn decisions(&self) -> Vec<(usize, usize)> {
        self.records
            .iter()
            .filter(|record| record.is_decision)
            .map(|record| {
                (
                    record.assignment.pattern_vertex,
                    record.assignment.target_vertex,
                )
            })
            .collect()
    }

    /// Projects the trail onto a pattern-to-target mapping. Each pattern
    /// vertex appears on the trail at most once, so the first occurrence wins.
    pub(crate) fn as_mapping(&self) -> VertexMapping {
        let mut mapping = FnvHashMap::default();
        for record in self
            .records
            .iter()
            .unique_by(|record| record.assignment.pattern_vertex)
        {
            let _ = mapping.insert(
                record.assignment.pattern_vertex,
                record.assignment.target_vertex,
            );
        }
        mapping
    }
}
