use fnv::FnvHashMap;

/// A (partial or complete) mapping from pattern vertices to target vertices.
pub type VertexMapping = FnvHashMap<usize, usize>;

/// The outcome of a solve call.
#[derive(Clone, Debug, Default)]
pub struct HomomorphismResult {
    /// The first mapping found, or empty when no mapping exists (or when only
    /// counting was requested).
    pub mapping: VertexMapping,
    /// Whether at least one mapping satisfying the constraints exists.
    pub satisfiable: bool,
    /// The number of mappings found, when solution counting was requested.
    pub solution_count: u64,
    /// The number of search tree nodes visited.
    pub nodes: u64,
    /// The number of propagation passes carried out.
    pub propagations: u64,
    /// Whether the search was cut short by the termination condition.
    pub aborted: bool,
    /// Human-readable diagnostics, such as the per-level discrepancy trace of
    /// a recorded solution.
    pub extra_stats: Vec<String>,
}
