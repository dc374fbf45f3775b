use num::Integer;

use crate::basic_types::BinaryValue;
use crate::basic_types::Fixing;
use crate::basic_types::InferenceCode;
use crate::basic_types::PropagationStatus;
use crate::engine::complete_fixings::complete_fixings;
use crate::engine::complete_fixings::EngineBuffers;
use crate::engine::complete_fixings::Scope;
use crate::engine::fixing_context::FixingContext;
use crate::engine::host::Host;
use crate::engine::impactful_entries::ImpactfulEntries;
use crate::engine::Permutation;
use crate::engine::VirtualFixings;

/// Propagates a monotone and ordered permutation one cycle at a time.
///
/// The equality power is the smallest power under which all cycles processed so far are known to
/// be mapped onto themselves value by value. For such a permutation, the constraints of all powers
/// hold as soon as every cycle satisfies the constraints of the multiples of the equality power of
/// the cycles before it; hence, only the entries of one cycle are compared at a time.
pub(super) fn propagate<H: Host>(
    permutation: &Permutation,
    buffers: &mut EngineBuffers,
    context: &mut FixingContext<'_, H>,
    peek: bool,
    num_peek_fixings: &mut usize,
) -> PropagationStatus {
    propagate_from_cycle(permutation, buffers, context, peek, 1, 0, num_peek_fixings)
}

fn propagate_from_cycle<H: Host>(
    permutation: &Permutation,
    buffers: &mut EngineBuffers,
    context: &mut FixingContext<'_, H>,
    peek: bool,
    mut equality_power: u64,
    first_cycle: usize,
    num_peek_fixings: &mut usize,
) -> PropagationStatus {
    let mut impactful_entries =
        (peek && !context.is_virtual()).then(|| ImpactfulEntries::new(permutation.len()));
    let mut num_fixings = 0;

    for cycle_index in first_cycle..permutation.num_cycles() {
        if equality_power == permutation.order() {
            break;
        }

        let cycle = permutation.cycle(cycle_index);
        if equality_power % cycle.len() as u64 == 0 {
            continue;
        }

        let scope = Scope::Cycle {
            support: cycle,
            base_power: equality_power,
        };
        num_fixings += complete_fixings(
            permutation,
            buffers,
            scope,
            context,
            impactful_entries.as_mut(),
        )?;

        if let Some(impactful_entries) = impactful_entries.as_mut() {
            // Only the smallest unfixed entry in the first half of the cycle is tried at zero.
            let smallest_unfixed = cycle[..cycle.len() / 2]
                .iter()
                .copied()
                .find(|&entry| context.lookup(entry).is_none());

            let mut probe = VirtualFixings::new(permutation.len());
            let mut has_tightened = false;
            while let Some(entry) = impactful_entries.pop() {
                if has_tightened {
                    num_fixings += complete_fixings(
                        permutation,
                        buffers,
                        scope,
                        context,
                        Some(&mut *impactful_entries),
                    )?;
                }
                has_tightened = false;

                if context.value(entry).is_some() {
                    continue;
                }

                let hypothesis = if Some(entry) == smallest_unfixed {
                    BinaryValue::Zero
                } else {
                    BinaryValue::One
                };
                probe.clear();
                probe.set(entry, hypothesis);

                let is_refuted = propagate_from_cycle(
                    permutation,
                    buffers,
                    &mut context.probe(&mut probe),
                    false,
                    equality_power,
                    cycle_index,
                    num_peek_fixings,
                )
                .is_err();

                if is_refuted {
                    let fixing = Fixing::new(entry, hypothesis.opposite());
                    has_tightened = context.fix(fixing, InferenceCode::peek())?;
                    if has_tightened {
                        num_fixings += 1;
                        *num_peek_fixings += 1;
                    }
                }
            }
        }

        equality_power = next_equality_power(context, cycle, equality_power);
    }

    Ok(num_fixings)
}

/// The equality power after processing `cycle`.
///
/// If an entry of the cycle is unfixed, only the powers which map every entry of the cycle to
/// itself are known to preserve it. Otherwise, the smallest rotation under which the values of the
/// cycle are invariant suffices.
fn next_equality_power<H: Host>(
    context: &mut FixingContext<'_, H>,
    cycle: &[usize],
    equality_power: u64,
) -> u64 {
    let length = cycle.len();

    let mut values = Vec::with_capacity(length);
    for &entry in cycle {
        match context.value(entry) {
            Some(value) => values.push(value),
            None => return equality_power.lcm(&(length as u64)),
        }
    }

    let rotation = (1..length)
        .find(|&shift| (0..length).all(|index| values[index] == values[(index + shift) % length]))
        .unwrap_or(length);

    equality_power.lcm(&(rotation as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::BinaryAssignments;
    use crate::engine::DomainId;

    fn setup(num_variables: usize) -> (BinaryAssignments, Vec<DomainId>) {
        let mut assignments = BinaryAssignments::default();
        let variables = (0..num_variables)
            .map(|_| assignments.new_binary())
            .collect();
        (assignments, variables)
    }

    #[test]
    fn unfixed_cycles_advance_the_equality_power_by_their_length() {
        let (mut assignments, x) = setup(4);
        let mut context = FixingContext::real(&mut assignments, &x);

        assert_eq!(6, next_equality_power(&mut context, &[0, 1, 2], 2));
    }

    #[test]
    fn fixed_cycles_advance_the_equality_power_by_their_rotation() {
        let (mut assignments, x) = setup(4);
        for (entry, value) in [
            BinaryValue::One,
            BinaryValue::Zero,
            BinaryValue::One,
            BinaryValue::Zero,
        ]
        .into_iter()
        .enumerate()
        {
            let _ = assignments.fix(x[entry], value).unwrap();
        }
        let mut context = FixingContext::real(&mut assignments, &x);

        assert_eq!(2, next_equality_power(&mut context, &[0, 1, 2, 3], 1));
        assert_eq!(6, next_equality_power(&mut context, &[0, 1, 2, 3], 3));
    }

    #[test]
    fn peeking_fixes_the_entry_before_the_wrap() {
        let permutation = Permutation::classify(&[1, 2, 3, 4, 0]).unwrap();
        let (mut assignments, x) = setup(5);
        let _ = assignments.fix(x[1], BinaryValue::Zero).unwrap();
        let mut buffers = EngineBuffers::default();
        let mut num_peek_fixings = 0;

        let mut context = FixingContext::real(&mut assignments, &x);
        let result = propagate(
            &permutation,
            &mut buffers,
            &mut context,
            true,
            &mut num_peek_fixings,
        );

        assert_eq!(Ok(2), result);
        assert_eq!(1, num_peek_fixings);
        assert_eq!(Some(BinaryValue::Zero), assignments.value(x[3]));
        assert_eq!(Some(BinaryValue::Zero), assignments.value(x[4]));
        assert!(buffers.is_clean());
    }
}
