//! Restart scheduling. The searcher reports every backtrack to the schedule
//! and asks, after exhausting a node's candidates, whether it should unwind to
//! the root instead of failing upwards; the solve loop reports each restart
//! that was actually carried out.

use std::fmt::Debug;

pub trait RestartsSchedule: Debug {
    /// Called every time the search backtracks after observing a failure.
    fn did_a_backtrack(&mut self);

    /// Called by the solve loop when a restart has been carried out.
    fn did_a_restart(&mut self);

    /// Whether the search should restart now.
    fn should_restart(&mut self) -> bool;

    /// Whether this schedule can ever trigger a restart. Decides up front
    /// whether nogood bookkeeping is needed at all.
    fn might_restart(&self) -> bool;
}

/// A schedule which never restarts; the search degenerates to a plain
/// backtracking DFS.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRestartsSchedule;

impl RestartsSchedule for NoRestartsSchedule {
    fn did_a_backtrack(&mut self) {}

    fn did_a_restart(&mut self) {}

    fn should_restart(&mut self) -> bool {
        false
    }

    fn might_restart(&self) -> bool {
        false
    }
}

/// The shape of the backtrack budgets a [`SequenceRestartsSchedule`] hands
/// out, one budget per run.
#[derive(Clone, Debug)]
pub enum RestartSequence {
    /// The same budget for every run.
    Constant(u64),
    /// Budgets `first * factor^i`, rounded down.
    Geometric { next: f64, factor: f64 },
    /// The Luby, Sinclair, and Zuckerman universal sequence
    /// 1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8, ... scaled by a base
    /// budget; the optimal schedule when nothing is known about the runtime
    /// distribution.
    Luby { base: u64, runs_started: u64 },
}

impl RestartSequence {
    pub fn constant(budget: u64) -> RestartSequence {
        RestartSequence::Constant(budget)
    }

    pub fn geometric(first: u64, factor: f64) -> RestartSequence {
        RestartSequence::Geometric {
            next: first as f64,
            factor,
        }
    }

    pub fn luby(base: u64) -> RestartSequence {
        RestartSequence::Luby {
            base,
            runs_started: 0,
        }
    }

    /// The budget for the next run.
    pub fn next_budget(&mut self) -> u64 {
        match self {
            RestartSequence::Constant(budget) => *budget,
            RestartSequence::Geometric { next, factor } => {
                let budget = *next as u64;
                *next *= *factor;
                budget
            }
            RestartSequence::Luby { base, runs_started } => {
                *runs_started += 1;
                *base * luby_term(*runs_started)
            }
        }
    }
}

/// The `position`-th term (1-based) of the unscaled Luby sequence.
///
/// The sequence is self-similar: the prefix of length 2^k - 1 is two copies
/// of the prefix of length 2^(k-1) - 1 followed by the single term 2^(k-1).
/// The term at a position is found by locating the shortest such prefix
/// containing it, then peeling off half-prefixes until the position lands on
/// a closing term.
fn luby_term(mut position: u64) -> u64 {
    let mut prefix_length = 1u64;
    while prefix_length < position {
        prefix_length = 2 * prefix_length + 1;
    }

    loop {
        if position == prefix_length {
            return (prefix_length + 1) / 2;
        }
        prefix_length /= 2;
        if position > prefix_length {
            position -= prefix_length;
        }
    }
}

/// Restarts after a number of backtracks given by a [`RestartSequence`]: each
/// element of the sequence is the backtrack budget for one run.
#[derive(Clone, Debug)]
pub struct SequenceRestartsSchedule {
    sequence: RestartSequence,
    backtracks_until_restart: u64,
    backtracks_since_restart: u64,
}

impl SequenceRestartsSchedule {
    pub fn new(mut sequence: RestartSequence) -> SequenceRestartsSchedule {
        let backtracks_until_restart = sequence.next_budget();
        SequenceRestartsSchedule {
            sequence,
            backtracks_until_restart,
            backtracks_since_restart: 0,
        }
    }

    /// The usual default: Luby-distributed budgets over a base multiplier.
    pub fn luby(base: u64) -> SequenceRestartsSchedule {
        SequenceRestartsSchedule::new(RestartSequence::luby(base))
    }
}

impl RestartsSchedule for SequenceRestartsSchedule {
    fn did_a_backtrack(&mut self) {
        self.backtracks_since_restart += 1;
    }

    fn did_a_restart(&mut self) {
        self.backtracks_until_restart = self.sequence.next_budget();
        self.backtracks_since_restart = 0;
    }

    fn should_restart(&mut self) -> bool {
        self.backtracks_since_restart >= self.backtracks_until_restart
    }

    fn might_restart(&self) -> bool {
        true
    }
}
