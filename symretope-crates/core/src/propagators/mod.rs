//! Contains the propagators which are provided by this crate.
mod symretope;

pub use symretope::LexLeaderViolation;
pub use symretope::PresolveResult;
pub use symretope::PropagationAlgorithm;
pub use symretope::PropagationMode;
pub use symretope::SymretopeError;
pub use symretope::SymretopeOptions;
pub use symretope::SymretopePropagator;
