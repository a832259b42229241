//! Contains containers which are used by the solver.
mod bit_set;

pub use bit_set::*;
