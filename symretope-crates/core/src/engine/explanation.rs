//! Reconstructs the bounds which are responsible for a fixing or a conflict derived by the
//! propagator.
use super::host::ReadDomains;
use super::Permutation;
use super::VirtualFixings;
use crate::basic_types::BinaryValue;
use crate::basic_types::Fixing;
use crate::basic_types::Predicate;

/// Collects the bounds which force `inferred` for the given power of the permutation, or, if no
/// fixing is given, the bounds under which the vector cannot be lexicographically at least as
/// large as its image under that power.
///
/// The pairs `(i, γ^{-power}(i))` are walked in order while assuming the converse of `inferred`;
/// every bound which is needed to keep the walk going, or to finally violate the order, becomes
/// part of the reason. Bounds are read just before `trail_position`, or from the current domains
/// if it is `None`.
///
/// Returns `false` if the walk ended without reaching a violation, in which case `reason` does not
/// explain anything.
pub(crate) fn explain_power<Domains: ReadDomains>(
    domains: &Domains,
    variables: &[Domains::Variable],
    permutation: &Permutation,
    inferred: Option<Fixing>,
    power: u64,
    trail_position: Option<usize>,
    reason: &mut Vec<Predicate<Domains::Variable>>,
) -> bool {
    let is_fixed_to = |entry: usize, value: BinaryValue| {
        domains.fixed_value(variables[entry], trail_position) == Some(value)
    };
    let inferred_entry = inferred.map(|fixing| fixing.entry);

    let mut assumed: Vec<Option<BinaryValue>> = vec![None; variables.len()];
    if let Some(fixing) = inferred {
        assumed[fixing.entry] = Some(fixing.value.opposite());
    }

    for i in 0..variables.len() {
        let j = permutation.image_backward(i, power);
        if i == j {
            continue;
        }

        match (assumed[i], assumed[j]) {
            (Some(BinaryValue::Zero), Some(BinaryValue::One)) => return true,
            (Some(BinaryValue::Zero), _) => {
                if is_fixed_to(j, BinaryValue::One) {
                    reason.push(Predicate::lower_bound(variables[j]));
                    return true;
                }
                assumed[j] = Some(BinaryValue::Zero);
                continue;
            }
            (_, Some(BinaryValue::One)) => {
                if is_fixed_to(i, BinaryValue::Zero) {
                    reason.push(Predicate::upper_bound(variables[i]));
                    return true;
                }
                assumed[i] = Some(BinaryValue::One);
                continue;
            }
            _ => {}
        }

        if is_fixed_to(i, BinaryValue::Zero) {
            reason.push(Predicate::upper_bound(variables[i]));
            assumed[i] = Some(BinaryValue::Zero);

            if is_fixed_to(j, BinaryValue::One) {
                if inferred_entry != Some(j) {
                    reason.push(Predicate::lower_bound(variables[j]));
                }
                return true;
            }
            assumed[j] = Some(BinaryValue::Zero);
        }

        if is_fixed_to(j, BinaryValue::One) {
            reason.push(Predicate::lower_bound(variables[j]));
            assumed[j] = Some(BinaryValue::One);

            if is_fixed_to(i, BinaryValue::Zero) {
                if inferred_entry != Some(i) {
                    reason.push(Predicate::upper_bound(variables[i]));
                }
                return true;
            }
            assumed[i] = Some(BinaryValue::One);
        }
    }

    false
}

/// Determines the entries of `initial` which are needed to refute the converse of `inferred`.
///
/// `initial` holds the fixings under which the explained fixing was found, together with its
/// converse. `is_infeasible` runs the propagator on the given fixings, marking every entry it looks
/// at if a slice of flags is given. First all looked-at entries are candidates; then every
/// candidate is dropped for which the remaining candidates still lead to infeasibility.
///
/// The returned entries never contain the entry of `inferred`.
pub(crate) fn minimise_peek_reason(
    initial: &VirtualFixings,
    inferred: Fixing,
    mut is_infeasible: impl FnMut(&mut VirtualFixings, Option<&mut [bool]>) -> bool,
) -> Vec<usize> {
    let num_entries = initial.len();

    let mut fixings = VirtualFixings::new(num_entries);
    fixings.copy_from(initial);

    let mut is_candidate = vec![false; num_entries];
    if !is_infeasible(&mut fixings, Some(&mut is_candidate)) {
        // Every fixed entry certainly suffices.
        return initial
            .touched()
            .iter()
            .copied()
            .filter(|&entry| entry != inferred.entry)
            .collect();
    }

    for entry in 0..num_entries {
        if entry == inferred.entry || initial.get(entry).is_empty() {
            is_candidate[entry] = false;
            continue;
        }
        if !is_candidate[entry] {
            continue;
        }

        fixings.clear();
        for &other in initial.touched() {
            if other == inferred.entry || (other != entry && is_candidate[other]) {
                for value in initial.get(other) {
                    fixings.set(other, value);
                }
            }
        }

        if is_infeasible(&mut fixings, None) {
            is_candidate[entry] = false;
        }
    }

    (0..num_entries)
        .filter(|&entry| is_candidate[entry])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::BinaryAssignments;
    use crate::engine::DomainId;
    use crate::predicate;

    fn setup(num_variables: usize) -> (BinaryAssignments, Vec<DomainId>) {
        let mut assignments = BinaryAssignments::default();
        let variables = (0..num_variables)
            .map(|_| assignments.new_binary())
            .collect();
        (assignments, variables)
    }

    #[test]
    fn fixing_is_explained_by_the_leading_zero() {
        let (mut assignments, x) = setup(4);
        let permutation = Permutation::classify(&[1, 0, 3, 2]).unwrap();
        let _ = assignments.fix(x[0], BinaryValue::Zero).unwrap();

        let mut reason = vec![];
        let explained = explain_power(
            &assignments,
            &x,
            &permutation,
            Some(Fixing::new(1, BinaryValue::Zero)),
            1,
            None,
            &mut reason,
        );

        assert!(explained);
        assert_eq!(vec![predicate![x[0] <= 0]], reason);
    }

    #[test]
    fn violated_power_is_explained_by_both_bounds() {
        let (mut assignments, x) = setup(3);
        let permutation = Permutation::classify(&[1, 2, 0]).unwrap();
        let _ = assignments.fix(x[0], BinaryValue::Zero).unwrap();
        let _ = assignments.fix(x[1], BinaryValue::One).unwrap();

        let mut reason = vec![];
        let explained = explain_power(&assignments, &x, &permutation, None, 2, None, &mut reason);

        assert!(explained);
        assert_eq!(vec![predicate![x[0] <= 0], predicate![x[1] >= 1]], reason);
    }

    #[test]
    fn bounds_after_the_trail_position_are_ignored() {
        let (mut assignments, x) = setup(4);
        let permutation = Permutation::classify(&[1, 0, 3, 2]).unwrap();
        let _ = assignments.fix(x[0], BinaryValue::Zero).unwrap();

        let mut reason = vec![];
        let explained = explain_power(
            &assignments,
            &x,
            &permutation,
            Some(Fixing::new(1, BinaryValue::Zero)),
            1,
            Some(0),
            &mut reason,
        );

        assert!(!explained);
    }

    #[test]
    fn unnecessary_entries_are_removed_from_peek_reasons() {
        let mut initial = VirtualFixings::new(4);
        initial.set(0, BinaryValue::One);
        initial.set(1, BinaryValue::Zero);
        initial.set(3, BinaryValue::One);

        // Infeasible exactly when entries 1 and 3 are both fixed.
        let reason = minimise_peek_reason(
            &initial,
            Fixing::new(3, BinaryValue::Zero),
            |fixings, checked| {
                if let Some(checked) = checked {
                    checked.iter_mut().for_each(|flag| *flag = true);
                }
                !fixings.get(1).is_empty() && !fixings.get(3).is_empty()
            },
        );

        assert_eq!(vec![1], reason);
    }

    #[test]
    fn feasible_replay_falls_back_to_every_fixed_entry() {
        let mut initial = VirtualFixings::new(3);
        initial.set(2, BinaryValue::Zero);
        initial.set(0, BinaryValue::One);

        let reason =
            minimise_peek_reason(&initial, Fixing::new(0, BinaryValue::Zero), |_, _| false);

        assert_eq!(vec![2], reason);
    }
}
