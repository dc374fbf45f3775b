//! The algorithms which decide in which order the powers of the permutation are considered, and
//! which entries are peeked at.
mod monotone_ordered;
mod standard;

use super::complete_fixings::EngineBuffers;
use super::fixing_context::FixingContext;
use super::host::Host;
use super::Permutation;
use crate::basic_types::PropagationStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Driver {
    /// Considers the powers `1..=num_powers` of the permutation at once.
    Generic { num_powers: usize },
    /// Considers the cycles one after the other; only valid for monotone and ordered permutations
    /// of which the order is known exactly.
    MonotoneOrdered,
}

impl Driver {
    /// Runs the driver; if `peek` is set and `context` is not virtual, the entries which were
    /// compared are afterwards peeked at.
    ///
    /// The number of fixings which were found by peeking is added to `num_peek_fixings`; they are
    /// also part of the returned number of fixings.
    pub(crate) fn run<H: Host>(
        self,
        permutation: &Permutation,
        buffers: &mut EngineBuffers,
        context: &mut FixingContext<'_, H>,
        peek: bool,
        num_peek_fixings: &mut usize,
    ) -> PropagationStatus {
        match self {
            Driver::Generic { num_powers } => standard::propagate(
                permutation,
                buffers,
                num_powers,
                context,
                peek,
                num_peek_fixings,
            ),
            Driver::MonotoneOrdered => monotone_ordered::propagate(
                permutation,
                buffers,
                context,
                peek,
                num_peek_fixings,
            ),
        }
    }
}
