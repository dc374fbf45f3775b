/// The result of invoking the propagator.
///
/// On success, the number of domain tightenings which were found is returned. Otherwise, the
/// reason for failing is given as an [`Inconsistency`].
pub type PropagationStatus = Result<usize, Inconsistency>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inconsistency {
    /// Tightening a domain left it without values.
    EmptyDomain,
    /// The constraint cannot be satisfied by any completion of the current domains.
    ///
    /// When conflict analysis was applicable, the reason has been handed to the host before this
    /// is returned.
    Conflict,
}

impl From<EmptyDomain> for Inconsistency {
    fn from(_: EmptyDomain) -> Self {
        Inconsistency::EmptyDomain
    }
}

/// Signals that posting a bound would empty the domain of a variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyDomain;

/// Indicator of what to do when the propagator is notified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnqueueDecision {
    /// The propagator should be enqueued.
    Enqueue,
    /// The propagator should not be enqueued.
    Skip,
}
