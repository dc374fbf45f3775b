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

/// Propagates all powers `1..=num_powers` together.
///
/// When peeking, every entry which was compared while growing the trees and is still unfixed is
/// tentatively fixed to zero, and then to one; if one of these leads to infeasibility, the entry
/// is fixed to the other value. After such a fixing the trees are grown once more, so that the
/// next entry is peeked at with the new information.
pub(super) fn propagate<H: Host>(
    permutation: &Permutation,
    buffers: &mut EngineBuffers,
    num_powers: usize,
    context: &mut FixingContext<'_, H>,
    peek: bool,
    num_peek_fixings: &mut usize,
) -> PropagationStatus {
    let scope = Scope::AllEntries { num_powers };

    let mut impactful_entries =
        (peek && !context.is_virtual()).then(|| ImpactfulEntries::new(permutation.len()));
    let mut num_fixings = complete_fixings(
        permutation,
        buffers,
        scope,
        context,
        impactful_entries.as_mut(),
    )?;

    let Some(mut impactful_entries) = impactful_entries else {
        return Ok(num_fixings);
    };

    let mut probe = VirtualFixings::new(permutation.len());
    let mut has_tightened = false;
    while let Some(entry) = impactful_entries.pop() {
        if has_tightened {
            num_fixings += complete_fixings(
                permutation,
                buffers,
                scope,
                context,
                Some(&mut impactful_entries),
            )?;
        }
        has_tightened = false;

        if context.lookup(entry).is_some() {
            continue;
        }

        for hypothesis in [BinaryValue::Zero, BinaryValue::One] {
            probe.clear();
            probe.set(entry, hypothesis);

            let is_refuted =
                complete_fixings(permutation, buffers, scope, &mut context.probe(&mut probe), None)
                    .is_err();

            if is_refuted {
                let fixing = Fixing::new(entry, hypothesis.opposite());
                has_tightened = context.fix(fixing, InferenceCode::peek())?;
                if has_tightened {
                    num_fixings += 1;
                    *num_peek_fixings += 1;
                }
                break;
            }
        }
    }

    Ok(num_fixings)
}
