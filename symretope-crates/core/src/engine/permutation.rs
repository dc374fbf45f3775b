use num::Integer;
use thiserror::Error;

use crate::symretope_assert_moderate;

/// Orders above this value are not tracked exactly; every such order is represented by
/// [`u64::MAX`].
const MAX_EXACT_ORDER: u64 = i64::MAX as u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PermutationError {
    #[error("entry {entry} is mapped to {image}, which is not in 0..{len}")]
    ImageOutOfRange {
        entry: usize,
        image: usize,
        len: usize,
    },
    #[error("entry {image} is the image of both {first} and {second}")]
    DuplicateImage {
        image: usize,
        first: usize,
        second: usize,
    },
}

/// A permutation of `0..n` together with its cycle decomposition.
///
/// The cycles are found by following the permutation from every index which has not been visited
/// yet, in increasing order; hence, every cycle starts at its smallest entry and the cycles are
/// sorted by their first entry. All derived information is computed once, after which the images
/// of iterates of the permutation can be retrieved in constant time.
#[derive(Clone, Debug)]
pub struct Permutation {
    images: Vec<usize>,
    /// The entries of all cycles, stored one cycle after the other.
    cycle_entries: Vec<usize>,
    /// The cycle with index `c` is stored at `cycle_entries[cycle_starts[c]..cycle_starts[c + 1]]`.
    cycle_starts: Vec<usize>,
    entry_cycle: Vec<usize>,
    entry_position: Vec<usize>,
    order: u64,
    max_cycle_size: usize,
    is_monotone: bool,
    is_ordered: bool,
}

impl Permutation {
    /// Decomposes `images` into cycles and classifies the resulting permutation.
    ///
    /// Fails if `images` is not a bijection on `0..images.len()`.
    pub fn classify(images: &[usize]) -> Result<Permutation, PermutationError> {
        let len = images.len();

        let mut preimage: Vec<Option<usize>> = vec![None; len];
        for (entry, &image) in images.iter().enumerate() {
            if image >= len {
                return Err(PermutationError::ImageOutOfRange { entry, image, len });
            }
            if let Some(first) = preimage[image] {
                return Err(PermutationError::DuplicateImage {
                    image,
                    first,
                    second: entry,
                });
            }
            preimage[image] = Some(entry);
        }

        let mut cycle_entries = Vec::with_capacity(len);
        let mut cycle_starts = vec![0];
        let mut entry_cycle = vec![usize::MAX; len];
        let mut entry_position = vec![usize::MAX; len];

        let mut order = 1;
        let mut max_cycle_size = 0;
        let mut is_monotone = true;
        let mut is_ordered = true;
        let mut previous_cycle_max = None;

        for start in 0..len {
            if entry_cycle[start] != usize::MAX {
                continue;
            }

            let cycle_index = cycle_starts.len() - 1;
            let mut num_descents = 0;
            let mut cycle_max = start;
            let mut cycle_size = 0;

            let mut entry = start;
            loop {
                cycle_max = cycle_max.max(entry);
                if previous_cycle_max.is_some_and(|previous| entry < previous) {
                    is_ordered = false;
                }
                if images[entry] < entry {
                    num_descents += 1;
                }

                entry_cycle[entry] = cycle_index;
                entry_position[entry] = cycle_size;
                cycle_entries.push(entry);
                cycle_size += 1;

                entry = images[entry];
                if entry == start {
                    break;
                }
            }

            cycle_starts.push(cycle_entries.len());

            if num_descents > 1 {
                is_monotone = false;
            }
            previous_cycle_max = Some(cycle_max);
            order = saturating_lcm(order, cycle_size as u64);
            max_cycle_size = max_cycle_size.max(cycle_size);
        }

        symretope_assert_moderate!(cycle_entries.len() == len);

        Ok(Permutation {
            images: images.to_vec(),
            cycle_entries,
            cycle_starts,
            entry_cycle,
            entry_position,
            order,
            max_cycle_size,
            is_monotone,
            is_ordered,
        })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[usize] {
        &self.images
    }

    pub fn num_cycles(&self) -> usize {
        self.cycle_starts.len() - 1
    }

    /// The entries of the cycle with index `cycle`, starting at its smallest entry.
    pub fn cycle(&self, cycle: usize) -> &[usize] {
        &self.cycle_entries[self.cycle_starts[cycle]..self.cycle_starts[cycle + 1]]
    }

    pub fn cycles(&self) -> impl Iterator<Item = &[usize]> + '_ {
        (0..self.num_cycles()).map(|cycle| self.cycle(cycle))
    }

    /// The order of the permutation, i.e. the least common multiple of its cycle lengths.
    ///
    /// Saturates at [`u64::MAX`]; see [`Permutation::has_exact_order`].
    pub fn order(&self) -> u64 {
        self.order
    }

    pub fn has_exact_order(&self) -> bool {
        self.order <= MAX_EXACT_ORDER
    }

    pub fn max_cycle_size(&self) -> usize {
        self.max_cycle_size
    }

    /// Whether every cycle, traversed from its start, descends at most once.
    pub fn is_monotone(&self) -> bool {
        self.is_monotone
    }

    /// Whether no entry of a cycle is smaller than the largest entry of the previous cycle.
    pub fn is_ordered(&self) -> bool {
        self.is_ordered
    }

    /// The image of `entry` under the permutation raised to `power`; negative powers give the
    /// images under the inverse.
    pub fn image(&self, entry: usize, power: i64) -> usize {
        let cycle = self.cycle(self.entry_cycle[entry]);
        let length = cycle.len() as i64;
        let shift = power.rem_euclid(length) as usize;

        cycle[(self.entry_position[entry] + shift) % cycle.len()]
    }

    pub(crate) fn image_forward(&self, entry: usize, power: u64) -> usize {
        let cycle = self.cycle(self.entry_cycle[entry]);
        let shift = (power % cycle.len() as u64) as usize;

        cycle[(self.entry_position[entry] + shift) % cycle.len()]
    }

    pub(crate) fn image_backward(&self, entry: usize, power: u64) -> usize {
        let cycle = self.cycle(self.entry_cycle[entry]);
        let shift = (power % cycle.len() as u64) as usize;

        cycle[(self.entry_position[entry] + cycle.len() - shift) % cycle.len()]
    }

    /// The images of all entries under the permutation raised to `power`.
    pub fn permutation_array(&self, power: i64) -> Vec<usize> {
        let mut images = vec![0; self.len()];
        for cycle in self.cycles() {
            let shift = power.rem_euclid(cycle.len() as i64) as usize;
            for (position, &entry) in cycle.iter().enumerate() {
                images[entry] = cycle[(position + shift) % cycle.len()];
            }
        }
        images
    }
}

fn saturating_lcm(lhs: u64, rhs: u64) -> u64 {
    if lhs > MAX_EXACT_ORDER || rhs > MAX_EXACT_ORDER {
        return u64::MAX;
    }

    (lhs / lhs.gcd(&rhs))
        .checked_mul(rhs)
        .filter(|&lcm| lcm <= MAX_EXACT_ORDER)
        .unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compose(permutation: &Permutation, power: usize) -> Vec<usize> {
        (0..permutation.len())
            .map(|entry| (0..power).fold(entry, |image, _| permutation.images()[image]))
            .collect()
    }

    #[test]
    fn cycles_start_at_their_smallest_entry() {
        let permutation = Permutation::classify(&[2, 0, 1, 4, 3]).unwrap();

        assert_eq!(2, permutation.num_cycles());
        assert_eq!(&[0, 2, 1], permutation.cycle(0));
        assert_eq!(&[3, 4], permutation.cycle(1));
        assert_eq!(6, permutation.order());
        assert_eq!(3, permutation.max_cycle_size());
    }

    #[test]
    fn monotone_and_ordered_are_classified() {
        let rotation = Permutation::classify(&[1, 2, 0]).unwrap();
        assert!(rotation.is_monotone());
        assert!(rotation.is_ordered());

        let reversed = Permutation::classify(&[2, 0, 1]).unwrap();
        assert!(!reversed.is_monotone());
        assert!(reversed.is_ordered());

        let interleaved = Permutation::classify(&[2, 3, 0, 1]).unwrap();
        assert!(interleaved.is_monotone());
        assert!(!interleaved.is_ordered());
    }

    #[test]
    fn non_bijections_are_rejected() {
        assert_eq!(
            Err(PermutationError::ImageOutOfRange {
                entry: 1,
                image: 3,
                len: 3
            }),
            Permutation::classify(&[0, 3, 1]).map(|_| ())
        );
        assert_eq!(
            Err(PermutationError::DuplicateImage {
                image: 1,
                first: 0,
                second: 2
            }),
            Permutation::classify(&[1, 0, 1]).map(|_| ())
        );
    }

    #[test]
    fn empty_permutation_has_order_one() {
        let permutation = Permutation::classify(&[]).unwrap();

        assert!(permutation.is_empty());
        assert_eq!(1, permutation.order());
        assert_eq!(0, permutation.num_cycles());
    }

    #[test]
    fn permutation_array_is_repeated_composition() {
        let permutation = Permutation::classify(&[3, 0, 4, 1, 2, 6, 5]).unwrap();

        for power in 0..=12 {
            assert_eq!(
                compose(&permutation, power),
                permutation.permutation_array(power as i64)
            );
        }
    }

    #[test]
    fn images_agree_with_permutation_array_for_any_power() {
        let permutation = Permutation::classify(&[3, 0, 4, 1, 2, 6, 5]).unwrap();

        for power in [-13_i64, -6, -1, 0, 1, 5, 6, 7, 1_000_003] {
            let array = permutation.permutation_array(power);
            for entry in 0..permutation.len() {
                assert_eq!(array[entry], permutation.image(entry, power));
            }
        }
    }

    #[test]
    fn forward_and_backward_images_are_inverse() {
        let permutation = Permutation::classify(&[3, 0, 4, 1, 2, 6, 5]).unwrap();

        for power in 0..10_u64 {
            for entry in 0..permutation.len() {
                let image = permutation.image_forward(entry, power);
                assert_eq!(entry, permutation.image_backward(image, power));
                assert_eq!(
                    permutation.image(entry, -(power as i64)),
                    permutation.image_backward(entry, power)
                );
            }
        }
    }

    #[test]
    fn huge_orders_saturate() {
        assert_eq!(u64::MAX, saturating_lcm(MAX_EXACT_ORDER, 2));
        assert_eq!(12, saturating_lcm(4, 6));
    }
}
