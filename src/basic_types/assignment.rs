/// A single pattern-to-target vertex assignment.
///
/// Assignments are the literals of the search: decisions, unit propagations,
/// and nogood entries are all expressed in terms of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Assignment {
    pub pattern_vertex: usize,
    pub target_vertex: usize,
}

impl Assignment {
    pub fn new(pattern_vertex: usize, target_vertex: usize) -> Assignment {
        Assignment {
            pattern_vertex,
            target_vertex,
        }
    }
}
