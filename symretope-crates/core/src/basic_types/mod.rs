mod binary_value;
mod inference_code;
mod predicate;
mod propagation_status;
mod propositional_conjunction;

pub use binary_value::BinaryValue;
pub use binary_value::Fixing;
pub use inference_code::InferenceCode;
pub use predicate::BoundSide;
pub use predicate::Predicate;
pub use propagation_status::EmptyDomain;
pub use propagation_status::EnqueueDecision;
pub use propagation_status::Inconsistency;
pub use propagation_status::PropagationStatus;
pub use propositional_conjunction::PropositionalConjunction;
