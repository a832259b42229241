/// Counters accumulated over a single solve call.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SearchStatistics {
    /// The number of search tree nodes visited.
    pub(crate) nodes: u64,
    /// The number of propagation passes carried out.
    pub(crate) propagations: u64,
    /// The number of complete mappings found while enumerating.
    pub(crate) solution_count: u64,
}
