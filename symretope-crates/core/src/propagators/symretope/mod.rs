//! The symretope constraint: a binary vector is the lexicographic leader of its orbit under the
//! cyclic group which is generated by a single permutation.
mod options;
mod symretope_propagator;

pub use options::PropagationAlgorithm;
pub use options::SymretopeOptions;
pub use symretope_propagator::LexLeaderViolation;
pub use symretope_propagator::PresolveResult;
pub use symretope_propagator::PropagationMode;
pub use symretope_propagator::SymretopeError;
pub use symretope_propagator::SymretopePropagator;
