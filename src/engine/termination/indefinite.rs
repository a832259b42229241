use super::TerminationCondition;

/// A [`TerminationCondition`] which never triggers; the search runs until it
/// reaches a conclusion.
#[derive(Debug, Copy, Clone)]
pub struct Indefinite;

impl TerminationCondition for Indefinite {
    fn should_stop(&mut self) -> bool {
        false
    }
}
