use crate::model::NamedVertex;

/// A sink for the chronological record of search events, from which an
/// external writer can produce a machine-checkable proof log.
///
/// Events are emitted in exactly the order decisions, propagations, and
/// backtracks occur. Decision lists are given as `(pattern, target)` pairs in
/// trail order; levels follow the convention that the children of a node at
/// depth `d` live at level `d + 2`.
pub trait Proof {
    /// A decision assigns the pattern vertex to the target vertex.
    fn guessing(&mut self, depth: usize, pattern: NamedVertex, target: NamedVertex);

    /// Propagation of a decision wiped out a domain.
    fn propagation_failure(
        &mut self,
        decisions: &[(usize, usize)],
        pattern: NamedVertex,
        target: NamedVertex,
    );

    fn start_level(&mut self, level: usize);

    fn back_up_to_level(&mut self, level: usize);

    /// The decisions on the trail did not lead to a (new) solution;
    /// `was_failure` distinguishes a refutation from backing off an accepted
    /// solution during enumeration.
    fn incorrect_guess(&mut self, decisions: &[(usize, usize)], was_failure: bool);

    fn forget_level(&mut self, level: usize);

    /// Every candidate of the current node has been tried.
    fn out_of_guesses(&mut self, decisions: &[(usize, usize)]);

    /// A unit domain forced the assignment of the pattern vertex.
    fn unit_propagating(&mut self, pattern: NamedVertex, target: NamedVertex);

    /// A restart recorded the current decision prefix as a nogood.
    fn post_restart_nogood(&mut self, decisions: &[(usize, usize)]);

    /// A complete mapping was accepted.
    fn post_solution(&mut self, solution: &[(NamedVertex, NamedVertex)]);

    fn back_up_to_top(&mut self);
}
