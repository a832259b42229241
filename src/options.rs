//! Configuration of a solve: which structural constraints the mapping must
//! satisfy and how the search explores candidates.

/// Whether distinct pattern vertices must map to distinct target vertices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Injectivity {
    /// Distinct pattern vertices always map to distinct target vertices.
    #[default]
    Injective,
    /// Distinct pattern vertices must map to distinct target vertices only
    /// when they share a neighbour in the pattern.
    LocallyInjective,
    /// Any pattern vertex may share a target with any other.
    NonInjective,
}

/// The order in which the candidate values of a branch domain are tried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ValueOrdering {
    /// Highest target degree first.
    #[default]
    Degree,
    /// Lowest target degree first.
    AntiDegree,
    /// Random order, biased towards higher target degrees.
    Biased,
    /// Uniformly random order.
    Random,
}

/// When the external lackey oracle participates in propagation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PropagateUsingLackey {
    /// The lackey is only consulted on complete mappings.
    #[default]
    Never,
    /// Every propagation pass ends by handing the partial mapping to the
    /// lackey, with deletions enabled.
    Always,
    /// The lackey propagates at the root, and is switched on for the
    /// remaining siblings of any node whose leaf it vetoed.
    RootAndBackjump,
    /// Partial mappings are shown to the lackey for a verdict, but its
    /// deletion suggestions are not requested.
    Partials,
}

/// Options controlling a solve.
#[derive(Clone, Copy, Debug)]
pub struct SolverOptions {
    pub injectivity: Injectivity,
    /// Require non-edges of the pattern to map to non-edges of the target.
    pub induced: bool,
    /// Enable the extra leaf-time bigraph constraint check and its
    /// solution-nogood recording.
    pub bigraph: bool,
    /// Enumerate and count every mapping instead of stopping at the first.
    pub count_solutions: bool,
    pub value_ordering: ValueOrdering,
    pub propagate_using_lackey: PropagateUsingLackey,
    /// Show partial mappings to the lackey even when it is not propagating.
    pub send_partials_to_lackey: bool,
}

impl Default for SolverOptions {
    fn default() -> SolverOptions {
        SolverOptions {
            injectivity: Injectivity::default(),
            induced: false,
            bigraph: false,
            count_solutions: false,
            value_ordering: ValueOrdering::default(),
            propagate_using_lackey: PropagateUsingLackey::default(),
            send_partials_to_lackey: false,
        }
    }
}

impl SolverOptions {
    /// Whether propagation passes should show the partial mapping to the
    /// lackey even without deletions.
    pub(crate) fn sends_partials(&self) -> bool {
        self.send_partials_to_lackey
            || self.propagate_using_lackey == PropagateUsingLackey::Partials
    }

    /// Whether root propagation runs with the lackey's deletions enabled.
    pub(crate) fn uses_lackey_at_root(&self) -> bool {
        matches!(
            self.propagate_using_lackey,
            PropagateUsingLackey::Always | PropagateUsingLackey::RootAndBackjump
        )
    }
}
