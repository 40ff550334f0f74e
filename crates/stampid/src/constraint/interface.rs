use crate::Id;

/// A predicate deciding whether a candidate identifier may be handed out.
///
/// Constraints are pure functions of the candidate: they keep no per-id state
/// and may be shared across threads. Any `Fn(&Id) -> bool + Send + Sync`
/// closure is a constraint.
///
/// # Example
///
/// ```
/// use stampid::{Constraint, Id};
///
/// let even = |id: &Id| id.sequence() % 2 == 0;
/// let id: Id = "ABC2011250959030643972246".parse().unwrap();
/// assert!(even.accepts(&id));
/// ```
pub trait Constraint: Send + Sync {
    /// Returns `true` if `id` is acceptable.
    fn accepts(&self, id: &Id) -> bool;
}

impl<F> Constraint for F
where
    F: Fn(&Id) -> bool + Send + Sync,
{
    fn accepts(&self, id: &Id) -> bool {
        self(id)
    }
}

/// Rejects every candidate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reject;

impl Constraint for Reject {
    fn accepts(&self, _id: &Id) -> bool {
        false
    }
}
