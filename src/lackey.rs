use crate::basic_types::VertexMapping;

/// The deletion callback handed to the lackey: it is invoked with a
/// `(pattern, target)` pair the lackey believes cannot be part of any
/// acceptable mapping, and returns whether the value was actually removed
/// from the corresponding domain.
pub type DeletionCallback<'a> = &'a mut dyn FnMut(usize, usize) -> bool;

/// An external oracle consulted about mappings the search cannot judge by
/// itself.
///
/// The searcher shows the lackey complete mappings before reporting them, and
/// (depending on the configured mode) partial mappings during propagation. A
/// `false` verdict rejects the mapping; when propagating, the lackey may
/// additionally suggest domain deletions through the callback before
/// returning.
pub trait Lackey {
    fn check_solution(
        &mut self,
        mapping: &VertexMapping,
        is_partial: bool,
        counting: bool,
        deletions: Option<DeletionCallback<'_>>,
    ) -> bool;
}
