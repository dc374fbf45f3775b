use itertools::Itertools;
use log::debug;
use log::warn;
use thiserror::Error;

use super::PropagationAlgorithm;
use super::SymretopeOptions;
use crate::basic_types::BinaryValue;
use crate::basic_types::EnqueueDecision;
use crate::basic_types::Fixing;
use crate::basic_types::Inconsistency;
use crate::basic_types::InferenceCode;
use crate::basic_types::Predicate;
use crate::basic_types::PropagationStatus;
use crate::basic_types::PropositionalConjunction;
use crate::create_statistics_struct;
use crate::engine::complete_fixings::EngineBuffers;
use crate::engine::drivers::Driver;
use crate::engine::explanation::explain_power;
use crate::engine::explanation::minimise_peek_reason;
use crate::engine::fixing_context::FixingContext;
use crate::engine::HistoricDomains;
use crate::engine::Host;
use crate::engine::Permutation;
use crate::engine::PermutationError;
use crate::engine::ReadDomains;
use crate::engine::VirtualFixings;
use crate::statistics::StatisticLogger;
use crate::symretope_assert_moderate;
use crate::symretope_assert_simple;

create_statistics_struct!(SymretopeStatistics {
    num_propagations: usize,
    num_fast_path_propagations: usize,
    num_fixings: usize,
    num_peek_fixings: usize,
    num_conflicts: usize,
    num_explanations: usize,
    num_peek_explanations: usize,
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SymretopeError {
    #[error("{num_variables} variables were given for a permutation of length {permutation_len}")]
    LengthMismatch {
        num_variables: usize,
        permutation_len: usize,
    },
    #[error("invalid permutation: {0}")]
    InvalidPermutation(#[from] PermutationError),
    #[error("variable {index} is moved by the permutation but its domain is not binary")]
    NonBinaryVariable { index: usize },
}

/// A complete assignment which is lexicographically smaller than one of its images.
///
/// The entries are positions in the variables which were given to
/// [`SymretopePropagator::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("the assignment is smaller than its image under power {power}: entry {first} is 0 while entry {second} is 1")]
pub struct LexLeaderViolation {
    pub power: u64,
    pub first: usize,
    pub second: usize,
}

/// Where the propagator reads values from, and where its fixings go.
#[derive(Debug)]
pub enum PropagationMode<'a> {
    /// Values are read from the host and fixings are posted to it.
    RealBounds,
    /// Fixings are only recorded in `fixings`, which is indexed like
    /// [`SymretopePropagator::variables`]; nothing is posted to the host and no conflict is
    /// reported. The current bounds of the host are taken into account only if `use_host_bounds`
    /// is set.
    VirtualOnly {
        fixings: &'a mut VirtualFixings,
        use_host_bounds: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresolveResult {
    /// The permutation moves no entry, so the constraint always holds.
    Redundant,
    /// The given number of fixings was applied.
    Propagated(usize),
}

/// Propagator for the symretope constraint: the vector of binary variables is lexicographically
/// at least as large as its image under every power of a permutation \[1\].
///
/// Entries which are mapped to themselves do not take part in any comparison; they are removed
/// when the propagator is created, and all entries which are used by the propagator (such as the
/// `local_id` in [`SymretopePropagator::notify`]) refer to the remaining variables, as returned by
/// [`SymretopePropagator::variables`].
///
/// # Bibliography
/// \[1\] C. van Doornmalen and C. Hojny, ‘Efficient propagation techniques for handling cyclic
/// symmetries in binary programs’, INFORMS Journal on Computing, 2024.
#[derive(Debug)]
pub struct SymretopePropagator<Var> {
    variables: Box<[Var]>,
    /// The position of every variable in the input of [`SymretopePropagator::new`].
    original_indices: Box<[usize]>,
    permutation: Permutation,
    /// The number of powers which are considered by the generic algorithm.
    num_powers: usize,
    options: SymretopeOptions,
    statistics: SymretopeStatistics,
    buffers: EngineBuffers,
    /// The entries whose value was looked at during the last propagation; only changes to these
    /// can lead to new fixings.
    affected_entries: Vec<bool>,
}

impl<Var: Copy + Eq + std::hash::Hash + std::fmt::Debug> SymretopePropagator<Var> {
    /// Creates the propagator for the constraint that `variables` is the lexicographic leader
    /// under the permutation which maps entry `i` to `images[i]`.
    pub fn new<Domains: ReadDomains<Variable = Var>>(
        domains: &Domains,
        variables: &[Var],
        images: &[usize],
        options: SymretopeOptions,
    ) -> Result<Self, SymretopeError> {
        if variables.len() != images.len() {
            return Err(SymretopeError::LengthMismatch {
                num_variables: variables.len(),
                permutation_len: images.len(),
            });
        }
        let _ = Permutation::classify(images)?;

        let original_indices: Box<[usize]> = (0..images.len())
            .filter(|&index| images[index] != index)
            .collect();

        if let Some(&index) = original_indices.iter().find(|&&index| {
            domains.lower_bound(variables[index]) < 0 || domains.upper_bound(variables[index]) > 1
        }) {
            return Err(SymretopeError::NonBinaryVariable { index });
        }

        let mut index_correction = vec![usize::MAX; images.len()];
        for (entry, &index) in original_indices.iter().enumerate() {
            index_correction[index] = entry;
        }
        let stripped_images = original_indices
            .iter()
            .map(|&index| index_correction[images[index]])
            .collect::<Vec<_>>();
        let permutation = Permutation::classify(&stripped_images)?;

        let num_powers = compute_num_powers(&permutation, &options);

        debug!(
            "symretope over {} entries ({} fixed points removed): {} cycles, order {}, monotone {}, ordered {}, {} powers",
            permutation.len(),
            images.len() - permutation.len(),
            permutation.num_cycles(),
            permutation.order(),
            permutation.is_monotone(),
            permutation.is_ordered(),
            num_powers
        );

        Ok(SymretopePropagator {
            variables: original_indices
                .iter()
                .map(|&index| variables[index])
                .collect(),
            affected_entries: vec![true; original_indices.len()],
            original_indices,
            permutation,
            num_powers,
            options,
            statistics: SymretopeStatistics::default(),
            buffers: EngineBuffers::default(),
        })
    }

    /// The variables which are moved by the permutation.
    pub fn variables(&self) -> &[Var] {
        &self.variables
    }

    /// The permutation restricted to the entries it moves.
    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    pub fn num_powers(&self) -> usize {
        self.num_powers
    }

    /// Whether the permutation moves no entry at all.
    pub fn is_trivial(&self) -> bool {
        self.permutation.is_empty()
    }

    /// Derives the fixings which are necessary for the constraint to hold.
    ///
    /// In [`PropagationMode::RealBounds`], the entries which were looked at are remembered for
    /// [`SymretopePropagator::notify`]. If a conflict is found and conflict analysis is
    /// applicable, its reason has been given to the host when this returns.
    pub fn propagate<H: Host<Variable = Var>>(
        &mut self,
        host: &mut H,
        mode: PropagationMode<'_>,
    ) -> PropagationStatus {
        self.run(host, mode, true)
    }

    /// Whether a change to the entry `local_id` requires the propagator to run again.
    pub fn notify(&self, local_id: usize) -> EnqueueDecision {
        if self.affected_entries[local_id] {
            EnqueueDecision::Enqueue
        } else {
            EnqueueDecision::Skip
        }
    }

    /// Propagates on the bounds of the host before the search starts.
    pub fn presolve<H: Host<Variable = Var>>(
        &mut self,
        host: &mut H,
    ) -> Result<PresolveResult, Inconsistency> {
        if self.is_trivial() {
            return Ok(PresolveResult::Redundant);
        }

        let num_fixings = self.run(host, PropagationMode::RealBounds, false)?;
        Ok(PresolveResult::Propagated(num_fixings))
    }

    fn run<H: Host<Variable = Var>>(
        &mut self,
        host: &mut H,
        mode: PropagationMode<'_>,
        track_affected_entries: bool,
    ) -> PropagationStatus {
        if self.is_trivial() {
            return Ok(0);
        }

        let peek = self.options.peek && (!host.is_probing() || self.options.probing_peek);
        let driver = self.driver();
        let is_real = matches!(mode, PropagationMode::RealBounds);

        let mut num_peek_fixings = 0;
        let result = match mode {
            PropagationMode::RealBounds => {
                let mut context = FixingContext::real(host, &self.variables);
                if track_affected_entries {
                    self.affected_entries.fill(false);
                    context = context.tracking_checked_entries(&mut self.affected_entries);
                }
                driver.run(
                    &self.permutation,
                    &mut self.buffers,
                    &mut context,
                    peek,
                    &mut num_peek_fixings,
                )
            }
            PropagationMode::VirtualOnly {
                fixings,
                use_host_bounds,
            } => {
                symretope_assert_simple!(fixings.len() == self.variables.len());
                let mut context = FixingContext::with_virtual_fixings(
                    host,
                    &self.variables,
                    fixings,
                    use_host_bounds,
                );
                driver.run(
                    &self.permutation,
                    &mut self.buffers,
                    &mut context,
                    peek,
                    &mut num_peek_fixings,
                )
            }
        };
        symretope_assert_moderate!(self.buffers.is_clean());

        self.statistics.num_propagations += 1;
        if driver == Driver::MonotoneOrdered {
            self.statistics.num_fast_path_propagations += 1;
        }
        if is_real {
            self.statistics.num_peek_fixings += num_peek_fixings;
            match result {
                Ok(num_fixings) => self.statistics.num_fixings += num_fixings,
                Err(_) => {
                    self.statistics.num_conflicts += 1;
                    // The search backtracks; any entry may then be relevant again.
                    self.affected_entries.fill(true);
                }
            }
        }

        result
    }

    fn driver(&self) -> Driver {
        let permutation = &self.permutation;
        if self.options.algorithm == PropagationAlgorithm::Automatic
            && permutation.is_monotone()
            && permutation.is_ordered()
            && permutation.has_exact_order()
        {
            Driver::MonotoneOrdered
        } else {
            Driver::Generic {
                num_powers: self.num_powers,
            }
        }
    }

    /// Explains why `predicate` was posted with `inference_code`, in terms of the bounds which
    /// held just before `trail_position`.
    pub fn explain<Domains: ReadDomains<Variable = Var>>(
        &mut self,
        domains: &Domains,
        predicate: Predicate<Var>,
        inference_code: InferenceCode,
        trail_position: usize,
    ) -> PropositionalConjunction<Var> {
        let entry = self
            .variables
            .iter()
            .position(|&variable| variable == predicate.variable());
        symretope_assert_simple!(
            entry.is_some(),
            "{predicate:?} does not concern a variable of the constraint"
        );
        let Some(entry) = entry else {
            return PropositionalConjunction::default();
        };
        let fixing = Fixing::new(entry, predicate.value());

        self.statistics.num_explanations += 1;

        if inference_code.is_from_power() {
            let mut reason = Vec::new();
            let explained = explain_power(
                domains,
                &self.variables,
                &self.permutation,
                Some(fixing),
                inference_code.power(),
                Some(trail_position),
                &mut reason,
            );
            symretope_assert_moderate!(explained, "{predicate:?} could not be explained");

            return reason.into_iter().unique().collect();
        }

        self.statistics.num_peek_explanations += 1;
        self.explain_peek(domains, fixing, trail_position)
    }

    /// Finds a small set of bounds under which the converse of `fixing` cannot be extended to a
    /// solution, by repeatedly propagating on the bounds at `trail_position`.
    fn explain_peek<Domains: ReadDomains<Variable = Var>>(
        &mut self,
        domains: &Domains,
        fixing: Fixing,
        trail_position: usize,
    ) -> PropositionalConjunction<Var> {
        let mut initial = VirtualFixings::new(self.variables.len());
        for (entry, &variable) in self.variables.iter().enumerate() {
            if let Some(value) = domains.fixed_value(variable, Some(trail_position)) {
                initial.set(entry, value);
            }
        }
        initial.set(fixing.entry, fixing.value.opposite());

        let driver = self.driver();
        let permutation = &self.permutation;
        let variables = &self.variables;
        let buffers = &mut self.buffers;

        let entries = minimise_peek_reason(&initial, fixing, |fixings, checked_entries| {
            let mut historic = HistoricDomains::new(domains, trail_position);
            let mut context =
                FixingContext::with_virtual_fixings(&mut historic, variables, fixings, false);
            if let Some(checked_entries) = checked_entries {
                context = context.tracking_checked_entries(checked_entries);
            }

            let mut num_peek_fixings = 0;
            driver
                .run(
                    permutation,
                    buffers,
                    &mut context,
                    false,
                    &mut num_peek_fixings,
                )
                .is_err()
        });

        entries
            .into_iter()
            .filter_map(|entry| {
                initial
                    .value(entry)
                    .map(|value| Predicate::fixing(self.variables[entry], value))
            })
            .collect()
    }

    /// Checks whether the current (complete) assignment is at least as large as its images under
    /// the considered powers; pairs which are not fixed are not compared.
    pub fn check_solution<Domains: ReadDomains<Variable = Var>>(
        &self,
        domains: &Domains,
    ) -> Result<(), LexLeaderViolation> {
        let value = |entry: usize| domains.fixed_value(self.variables[entry], None);

        for power in 1..=self.num_powers as u64 {
            for i in 0..self.variables.len() {
                let j = self.permutation.image_backward(i, power);

                match (value(i), value(j)) {
                    (Some(BinaryValue::Zero), Some(BinaryValue::One)) => {
                        let violation = LexLeaderViolation {
                            power,
                            first: self.original_indices[i],
                            second: self.original_indices[j],
                        };
                        debug!("symretope infeasible: {violation}");
                        return Err(violation);
                    }
                    (Some(lhs), Some(rhs)) if lhs == rhs => {}
                    _ => break,
                }
            }
        }

        Ok(())
    }

    pub fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(&statistic_logger);
    }
}

/// The number of powers `1..=num_powers` which the generic algorithm considers; the limits of
/// `options` restrict it if the order is too large.
fn compute_num_powers(permutation: &Permutation, options: &SymretopeOptions) -> usize {
    let num_entries = permutation.len();
    if num_entries == 0 {
        return 0;
    }

    let order = permutation.order();
    let mut num_powers = (order - 1).min(i32::MAX as u64) as usize;

    let exceeds_max_order = options.max_order > 0 && num_powers > options.max_order;
    let exceeds_max_order_times_support = options.max_order_times_support > 0
        && num_powers.saturating_mul(num_entries) > options.max_order_times_support;
    if exceeds_max_order || exceeds_max_order_times_support {
        warn!(
            "symretope with order {order} on {num_entries} entries will not capture all symmetries"
        );
    }

    if exceeds_max_order {
        num_powers = options.max_order;
        warn!("symretope order restricted to {num_powers} (max_order)");
    }

    if options.max_order_times_support > 0
        && num_powers.saturating_mul(num_entries) > options.max_order_times_support
    {
        num_powers = (options.max_order_times_support / num_entries).max(1);
        warn!("symretope order restricted to {num_powers} (max_order_times_support)");
    }

    num_powers
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
    fn fixed_points_are_removed() {
        let (assignments, x) = setup(5);

        let propagator = SymretopePropagator::new(
            &assignments,
            &x,
            &[0, 4, 2, 3, 1],
            SymretopeOptions::default(),
        )
        .unwrap();

        assert_eq!(&[x[1], x[4]], propagator.variables());
        assert_eq!(&[1, 0], propagator.permutation().images());
        assert_eq!(1, propagator.num_powers());
    }

    #[test]
    fn non_binary_fixed_points_are_accepted() {
        let (mut assignments, mut x) = setup(2);
        x.push(assignments.new_domain(0, 5));

        let result = SymretopePropagator::new(
            &assignments,
            &x,
            &[1, 0, 2],
            SymretopeOptions::default(),
        );

        assert!(result.is_ok());
    }

    #[test]
    fn moved_non_binary_variables_are_rejected() {
        let (mut assignments, mut x) = setup(2);
        x.push(assignments.new_domain(-1, 1));

        let result = SymretopePropagator::new(
            &assignments,
            &x,
            &[0, 2, 1],
            SymretopeOptions::default(),
        );

        assert_eq!(
            Some(SymretopeError::NonBinaryVariable { index: 2 }),
            result.err()
        );
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let (assignments, x) = setup(2);

        let result =
            SymretopePropagator::new(&assignments, &x, &[1, 2, 0], SymretopeOptions::default());

        assert_eq!(
            Some(SymretopeError::LengthMismatch {
                num_variables: 2,
                permutation_len: 3
            }),
            result.err()
        );
    }

    #[test]
    fn invalid_permutations_are_rejected() {
        let (assignments, x) = setup(3);

        let result =
            SymretopePropagator::new(&assignments, &x, &[1, 1, 0], SymretopeOptions::default());

        assert!(matches!(
            result,
            Err(SymretopeError::InvalidPermutation(
                PermutationError::DuplicateImage { .. }
            ))
        ));
    }

    #[test]
    fn identity_is_redundant() {
        let (mut assignments, x) = setup(3);
        let mut propagator =
            SymretopePropagator::new(&assignments, &x, &[0, 1, 2], SymretopeOptions::default())
                .unwrap();

        assert!(propagator.is_trivial());
        assert_eq!(
            Ok(PresolveResult::Redundant),
            propagator.presolve(&mut assignments)
        );
        assert_eq!(
            Ok(0),
            propagator.propagate(&mut assignments, PropagationMode::RealBounds)
        );
    }

    #[test]
    fn budget_restricts_the_number_of_powers() {
        // Order 6 on 5 entries.
        let permutation = Permutation::classify(&[1, 2, 0, 4, 3]).unwrap();

        let unrestricted = SymretopeOptions::default();
        assert_eq!(5, compute_num_powers(&permutation, &unrestricted));

        let by_order = SymretopeOptions {
            max_order: 2,
            ..Default::default()
        };
        assert_eq!(2, compute_num_powers(&permutation, &by_order));

        let by_support = SymretopeOptions {
            max_order_times_support: 12,
            ..Default::default()
        };
        assert_eq!(2, compute_num_powers(&permutation, &by_support));

        let at_least_one = SymretopeOptions {
            max_order_times_support: 3,
            ..Default::default()
        };
        assert_eq!(1, compute_num_powers(&permutation, &at_least_one));

        let disabled = SymretopeOptions {
            max_order: 0,
            max_order_times_support: 0,
            ..Default::default()
        };
        assert_eq!(5, compute_num_powers(&permutation, &disabled));
    }

    #[test]
    fn only_looked_at_entries_are_affected() {
        let (mut assignments, x) = setup(4);
        let options = SymretopeOptions {
            peek: false,
            ..Default::default()
        };
        let mut propagator =
            SymretopePropagator::new(&assignments, &x, &[1, 0, 3, 2], options).unwrap();

        assert!((0..4).all(|entry| propagator.notify(entry) == EnqueueDecision::Enqueue));

        let result = propagator.propagate(&mut assignments, PropagationMode::RealBounds);

        assert_eq!(Ok(0), result);
        assert_eq!(EnqueueDecision::Enqueue, propagator.notify(0));
        assert_eq!(EnqueueDecision::Skip, propagator.notify(2));
        assert_eq!(EnqueueDecision::Skip, propagator.notify(3));
    }

    #[test]
    fn presolve_does_not_change_the_affected_entries() {
        let (mut assignments, x) = setup(4);
        let _ = assignments.fix(x[0], BinaryValue::Zero).unwrap();
        let mut propagator = SymretopePropagator::new(
            &assignments,
            &x,
            &[1, 0, 3, 2],
            SymretopeOptions::default(),
        )
        .unwrap();

        assert_eq!(
            Ok(PresolveResult::Propagated(1)),
            propagator.presolve(&mut assignments)
        );
        assert_eq!(Some(BinaryValue::Zero), assignments.value(x[1]));
        assert!((0..4).all(|entry| propagator.notify(entry) == EnqueueDecision::Enqueue));
    }

    #[test]
    fn buffers_are_clean_after_a_conflict() {
        let (mut assignments, x) = setup(3);
        let _ = assignments.fix(x[0], BinaryValue::Zero).unwrap();
        let _ = assignments.fix(x[1], BinaryValue::One).unwrap();
        let options = SymretopeOptions {
            algorithm: PropagationAlgorithm::Generic,
            ..Default::default()
        };
        let mut propagator =
            SymretopePropagator::new(&assignments, &x, &[1, 2, 0], options).unwrap();

        let result = propagator.propagate(&mut assignments, PropagationMode::RealBounds);

        assert_eq!(Err(Inconsistency::Conflict), result);
        assert!(propagator.buffers.is_clean());
        assert_eq!(1, propagator.statistics.num_conflicts);
    }

    #[test]
    fn violations_name_the_original_entries() {
        let (mut assignments, x) = setup(3);
        let _ = assignments.fix(x[0], BinaryValue::Zero).unwrap();
        let _ = assignments.fix(x[2], BinaryValue::One).unwrap();
        let propagator =
            SymretopePropagator::new(&assignments, &x, &[2, 1, 0], SymretopeOptions::default())
                .unwrap();

        assert_eq!(
            Err(LexLeaderViolation {
                power: 1,
                first: 0,
                second: 2
            }),
            propagator.check_solution(&assignments)
        );
    }
}
