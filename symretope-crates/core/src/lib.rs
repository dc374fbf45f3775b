//! Propagation of symretopes: the lexicographic leader constraints for the cyclic group which is
//! generated by a single permutation of binary variables.
//!
//! The [`SymretopePropagator`] derives every fixing which is implied by such a constraint on the
//! current bounds of the variables, and explains its fixings and conflicts in terms of these
//! bounds. The solver which owns the variables is accessed through the [`ReadDomains`],
//! [`PostDomains`] and [`ConflictStore`] traits; [`BinaryAssignments`] is a small implementation
//! of them.
pub(crate) mod basic_types;
pub mod containers;
pub(crate) mod engine;
pub(crate) mod propagators;
pub mod statistics;
pub(crate) mod symretope_asserts;

pub use convert_case;

pub mod predicates {
    pub use crate::basic_types::BoundSide;
    pub use crate::basic_types::Predicate;
    pub use crate::basic_types::PropositionalConjunction;
}

pub use crate::basic_types::BinaryValue;
pub use crate::basic_types::EmptyDomain;
pub use crate::basic_types::EnqueueDecision;
pub use crate::basic_types::Fixing;
pub use crate::basic_types::Inconsistency;
pub use crate::basic_types::InferenceCode;
pub use crate::basic_types::PropagationStatus;
pub use crate::engine::BinaryAssignments;
pub use crate::engine::BoundChange;
pub use crate::engine::ConflictStore;
pub use crate::engine::DomainId;
pub use crate::engine::Host;
pub use crate::engine::Permutation;
pub use crate::engine::PermutationError;
pub use crate::engine::PostDomains;
pub use crate::engine::ReadDomains;
pub use crate::engine::VirtualFixings;
pub use crate::propagators::LexLeaderViolation;
pub use crate::propagators::PresolveResult;
pub use crate::propagators::PropagationAlgorithm;
pub use crate::propagators::PropagationMode;
pub use crate::propagators::SymretopeError;
pub use crate::propagators::SymretopeOptions;
pub use crate::propagators::SymretopePropagator;
