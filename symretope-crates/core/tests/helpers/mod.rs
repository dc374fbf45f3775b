//! Helpers shared by the integration tests of the symretope propagator.
#![allow(
    dead_code,
    reason = "is used in integration tests but unable to find a way to silence these warnings"
)]

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;
use symretope_core::BinaryAssignments;
use symretope_core::BinaryValue;
use symretope_core::DomainId;
use symretope_core::Permutation;
use symretope_core::PropagationAlgorithm;
use symretope_core::ReadDomains;
use symretope_core::SymretopeOptions;

/// Shows the debug output of the propagator for failing tests.
pub(crate) fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

pub(crate) fn setup(num_variables: usize) -> (BinaryAssignments, Vec<DomainId>) {
    let mut assignments = BinaryAssignments::default();
    let variables = (0..num_variables)
        .map(|_| assignments.new_binary())
        .collect();
    (assignments, variables)
}

pub(crate) fn fix_all(
    assignments: &mut BinaryAssignments,
    variables: &[DomainId],
    fixings: &[(usize, BinaryValue)],
) {
    for &(entry, value) in fixings {
        let _ = assignments
            .fix(variables[entry], value)
            .expect("fixings are consistent");
    }
}

pub(crate) fn options(peek: bool, algorithm: PropagationAlgorithm) -> SymretopeOptions {
    SymretopeOptions {
        peek,
        algorithm,
        ..Default::default()
    }
}

pub(crate) fn random_permutation(rng: &mut SmallRng, num_entries: usize) -> Vec<usize> {
    let mut images = (0..num_entries).collect::<Vec<_>>();
    images.shuffle(rng);
    images
}

/// A permutation which rotates consecutive blocks of entries; these are exactly the monotone and
/// ordered permutations.
pub(crate) fn random_monotone_ordered_permutation(
    rng: &mut SmallRng,
    num_entries: usize,
) -> Vec<usize> {
    let mut images = (0..num_entries).collect::<Vec<_>>();
    let mut start = 0;
    while start < num_entries {
        let length = rng.gen_range(1..=num_entries - start);
        for offset in 0..length {
            images[start + offset] = start + (offset + 1) % length;
        }
        start += length;
    }
    images
}

pub(crate) fn random_fixings(
    rng: &mut SmallRng,
    num_entries: usize,
    probability: f64,
) -> Vec<(usize, BinaryValue)> {
    let mut fixings = Vec::new();
    for entry in 0..num_entries {
        if !rng.gen_bool(probability) {
            continue;
        }
        let value = if rng.gen_bool(0.5) {
            BinaryValue::One
        } else {
            BinaryValue::Zero
        };
        fixings.push((entry, value));
    }
    fixings
}

pub(crate) fn is_identity(images: &[usize]) -> bool {
    images.iter().enumerate().all(|(entry, &image)| entry == image)
}

/// Whether `values` is lexicographically at least as large as its images under the powers
/// `1..=num_powers` of `permutation`.
pub(crate) fn is_lex_leader(values: &[i32], permutation: &Permutation, num_powers: usize) -> bool {
    for power in 1..=num_powers as i64 {
        for i in 0..values.len() {
            let j = permutation.image(i, -power);
            if values[i] < values[j] {
                return false;
            }
            if values[i] > values[j] {
                break;
            }
        }
    }
    true
}

/// All lexicographic leaders which are within the current bounds of `variables`.
pub(crate) fn lex_leaders(
    assignments: &BinaryAssignments,
    variables: &[DomainId],
    permutation: &Permutation,
    num_powers: usize,
) -> Vec<Vec<i32>> {
    let num_entries = variables.len();
    (0..1_u32 << num_entries)
        .map(|bits| {
            (0..num_entries)
                .map(|entry| ((bits >> entry) & 1) as i32)
                .collect::<Vec<_>>()
        })
        .filter(|values| {
            values.iter().zip(variables).all(|(&value, &variable)| {
                assignments.lower_bound(variable) <= value
                    && value <= assignments.upper_bound(variable)
            })
        })
        .filter(|values| is_lex_leader(values, permutation, num_powers))
        .collect()
}
