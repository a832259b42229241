/// The outcome of one recursive search call.
///
/// Every abnormal condition in the search is encoded here rather than as an
/// error: wipeouts surface as `Unsatisfiable` at the frame that exhausted its
/// candidates, restarts unwind as `Restart` without being a failure, and a
/// cooperative abort propagates as `Aborted` unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SearchResult {
    /// A full mapping was found and remains on the trail.
    Satisfiable,
    /// A full mapping was found while enumerating; keep looking for more.
    SatisfiableButKeepGoing,
    /// Every candidate below this frame was exhausted.
    Unsatisfiable,
    /// As `Unsatisfiable`, but the failure was detected by the lackey at a
    /// leaf; ancestors switch on lackey propagation for their remaining
    /// siblings.
    UnsatisfiableAndBackjumpUsingLackey,
    /// Unwind to the root and start over, keeping the learned nogoods.
    Restart,
    /// The termination condition fired.
    Aborted,
}
