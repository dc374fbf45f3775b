#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use helpers::fix_all;
use helpers::init_logging;
use helpers::is_identity;
use helpers::is_lex_leader;
use helpers::lex_leaders;
use helpers::options;
use helpers::random_fixings;
use helpers::random_monotone_ordered_permutation;
use helpers::random_permutation;
use helpers::setup;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;
use symretope_core::BinaryValue;
use symretope_core::Inconsistency;
use symretope_core::Permutation;
use symretope_core::PropagationAlgorithm;
use symretope_core::PropagationMode;
use symretope_core::SymretopeOptions;
use symretope_core::SymretopePropagator;
use symretope_core::VirtualFixings;

const NUM_INSTANCES: usize = 400;

#[test]
fn propagation_never_removes_a_lex_leader() {
    init_logging();
    let mut rng = SmallRng::seed_from_u64(42);

    for _ in 0..NUM_INSTANCES {
        let num_entries = rng.gen_range(2..=7);
        let images = random_permutation(&mut rng, num_entries);
        if is_identity(&images) {
            continue;
        }
        let permutation = Permutation::classify(&images).unwrap();
        let fixings = random_fixings(&mut rng, num_entries, 0.4);

        for peek in [false, true] {
            let (mut assignments, x) = setup(num_entries);
            fix_all(&mut assignments, &x, &fixings);
            let mut propagator = SymretopePropagator::new(
                &assignments,
                &x,
                &images,
                options(peek, PropagationAlgorithm::Automatic),
            )
            .unwrap();
            let num_powers = propagator.num_powers();
            let leaders = lex_leaders(&assignments, &x, &permutation, num_powers);

            let result = propagator.propagate(&mut assignments, PropagationMode::RealBounds);

            match result {
                Ok(_) => assert_eq!(
                    leaders,
                    lex_leaders(&assignments, &x, &permutation, num_powers),
                    "{images:?} {fixings:?} peek: {peek}"
                ),
                Err(Inconsistency::Conflict) => {
                    assert!(leaders.is_empty(), "{images:?} {fixings:?} peek: {peek}")
                }
                Err(Inconsistency::EmptyDomain) => panic!("the host never rejects a fixing"),
            }
        }
    }
}

#[test]
fn propagation_is_idempotent() {
    init_logging();
    let mut rng = SmallRng::seed_from_u64(7);

    for _ in 0..NUM_INSTANCES {
        let num_entries = rng.gen_range(2..=8);
        let images = random_permutation(&mut rng, num_entries);
        let fixings = random_fixings(&mut rng, num_entries, 0.3);

        let (mut assignments, x) = setup(num_entries);
        fix_all(&mut assignments, &x, &fixings);
        let mut propagator =
            SymretopePropagator::new(&assignments, &x, &images, SymretopeOptions::default())
                .unwrap();

        if propagator
            .propagate(&mut assignments, PropagationMode::RealBounds)
            .is_err()
        {
            continue;
        }
        let num_trail_entries = assignments.num_trail_entries();

        assert_eq!(
            Ok(0),
            propagator.propagate(&mut assignments, PropagationMode::RealBounds),
            "{images:?} {fixings:?}"
        );
        assert_eq!(num_trail_entries, assignments.num_trail_entries());
    }
}

#[test]
fn monotone_ordered_propagation_agrees_with_generic_propagation() {
    init_logging();
    let mut rng = SmallRng::seed_from_u64(1);

    for _ in 0..NUM_INSTANCES {
        let num_entries = rng.gen_range(2..=9);
        let images = random_monotone_ordered_permutation(&mut rng, num_entries);
        let fixings = random_fixings(&mut rng, num_entries, 0.4);

        let outcomes = [PropagationAlgorithm::Automatic, PropagationAlgorithm::Generic].map(
            |algorithm| {
                let (mut assignments, x) = setup(num_entries);
                fix_all(&mut assignments, &x, &fixings);
                let mut propagator = SymretopePropagator::new(
                    &assignments,
                    &x,
                    &images,
                    options(true, algorithm),
                )
                .unwrap();

                let is_infeasible = propagator
                    .propagate(&mut assignments, PropagationMode::RealBounds)
                    .is_err();
                let values = x
                    .iter()
                    .map(|&variable| assignments.value(variable))
                    .collect::<Vec<_>>();
                (is_infeasible, values)
            },
        );

        let [(fast_infeasible, fast_values), (generic_infeasible, generic_values)] = outcomes;
        assert_eq!(
            fast_infeasible, generic_infeasible,
            "{images:?} {fixings:?}"
        );
        if !fast_infeasible {
            assert_eq!(fast_values, generic_values, "{images:?} {fixings:?}");
        }
    }
}

#[test]
fn virtual_propagation_matches_real_propagation_without_posting() {
    init_logging();
    let mut rng = SmallRng::seed_from_u64(3);

    for _ in 0..NUM_INSTANCES {
        let num_entries = rng.gen_range(2..=8);
        let images = random_permutation(&mut rng, num_entries);
        let fixings = random_fixings(&mut rng, num_entries, 0.4);
        let options = options(false, PropagationAlgorithm::Automatic);

        let (mut real, x) = setup(num_entries);
        fix_all(&mut real, &x, &fixings);
        let mut propagator = SymretopePropagator::new(&real, &x, &images, options).unwrap();
        let real_result = propagator.propagate(&mut real, PropagationMode::RealBounds);

        let (mut host, y) = setup(num_entries);
        fix_all(&mut host, &y, &fixings);
        let mut propagator = SymretopePropagator::new(&host, &y, &images, options).unwrap();
        let mut virtual_fixings = VirtualFixings::new(propagator.variables().len());
        let virtual_result = propagator.propagate(
            &mut host,
            PropagationMode::VirtualOnly {
                fixings: &mut virtual_fixings,
                use_host_bounds: true,
            },
        );

        assert_eq!(0, host.num_posts());
        assert_eq!(fixings.len(), host.num_trail_entries());
        assert!(host.conflicts().is_empty());
        assert_eq!(real_result.is_err(), virtual_result.is_err());

        if real_result.is_ok() {
            for (entry, &variable) in propagator.variables().iter().enumerate() {
                let index = y.iter().position(|&other| other == variable).unwrap();
                if host.value(variable).is_none() {
                    assert_eq!(
                        real.value(x[index]),
                        virtual_fixings.value(entry),
                        "{images:?} {fixings:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn solution_check_agrees_with_brute_force() {
    init_logging();
    let mut rng = SmallRng::seed_from_u64(5);

    for _ in 0..NUM_INSTANCES {
        let num_entries = rng.gen_range(2..=8);
        let images = random_permutation(&mut rng, num_entries);
        let permutation = Permutation::classify(&images).unwrap();
        let values = (0..num_entries)
            .map(|_| {
                if rng.gen_bool(0.5) {
                    BinaryValue::One
                } else {
                    BinaryValue::Zero
                }
            })
            .collect::<Vec<_>>();

        let (mut assignments, x) = setup(num_entries);
        fix_all(
            &mut assignments,
            &x,
            &values.iter().copied().enumerate().collect::<Vec<_>>(),
        );
        let propagator =
            SymretopePropagator::new(&assignments, &x, &images, SymretopeOptions::default())
                .unwrap();

        let as_integers = values.iter().map(|value| value.as_i32()).collect::<Vec<_>>();
        assert_eq!(
            is_lex_leader(&as_integers, &permutation, propagator.num_powers()),
            propagator.check_solution(&assignments).is_ok(),
            "{images:?} {values:?}"
        );
    }
}

#[test]
fn solutions_pass_the_solution_check() {
    init_logging();
    let mut rng = SmallRng::seed_from_u64(9);

    for _ in 0..NUM_INSTANCES {
        let num_entries = rng.gen_range(2..=7);
        let images = random_permutation(&mut rng, num_entries);
        let (mut assignments, x) = setup(num_entries);
        let mut propagator =
            SymretopePropagator::new(&assignments, &x, &images, SymretopeOptions::default())
                .unwrap();

        // Fix the entries one by one, propagating in between.
        let mut is_infeasible = false;
        for &variable in &x {
            if assignments.value(variable).is_none() {
                let value = if rng.gen_bool(0.5) {
                    BinaryValue::One
                } else {
                    BinaryValue::Zero
                };
                let _ = assignments.fix(variable, value).unwrap();
            }
            if propagator
                .propagate(&mut assignments, PropagationMode::RealBounds)
                .is_err()
            {
                is_infeasible = true;
                break;
            }
        }

        if !is_infeasible {
            assert_eq!(Ok(()), propagator.check_solution(&assignments), "{images:?}");
        }
    }
}
