//! The propagation engine: the permutation model, the implication trees, the algorithms that grow
//! them, and the interface to the solver which owns the variables.
mod binary_assignments;
pub(crate) mod complete_fixings;
mod domain_id;
pub(crate) mod drivers;
pub(crate) mod explanation;
pub(crate) mod fixing_context;
mod fixing_queue;
mod host;
mod impactful_entries;
mod implication_graph;
mod permutation;
mod virtual_fixings;

pub use binary_assignments::BinaryAssignments;
pub use binary_assignments::BoundChange;
pub use domain_id::DomainId;
pub use host::ConflictStore;
pub(crate) use host::HistoricDomains;
pub use host::Host;
pub use host::PostDomains;
pub use host::ReadDomains;
pub use permutation::Permutation;
pub use permutation::PermutationError;
pub use virtual_fixings::VirtualFixings;
