use enumset::EnumSet;

use crate::basic_types::BinaryValue;
use crate::symretope_assert_extreme;

/// Hypothetical values for the entries of the constrained vector, kept apart from the domains of
/// the host.
///
/// Every entry holds the set of values it has been fixed to; the empty set means that the entry is
/// unfixed, and a set containing both values is a contradiction. The entries which have been
/// touched are remembered so that clearing takes time linear in their number.
#[derive(Clone, Debug, Default)]
pub struct VirtualFixings {
    entries: Vec<EnumSet<BinaryValue>>,
    touched: Vec<usize>,
}

impl VirtualFixings {
    pub fn new(num_entries: usize) -> VirtualFixings {
        VirtualFixings {
            entries: vec![EnumSet::empty(); num_entries],
            touched: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds `value` to the values which `entry` is fixed to.
    pub fn set(&mut self, entry: usize, value: BinaryValue) {
        if self.entries[entry].is_empty() {
            self.touched.push(entry);
        }
        let _ = self.entries[entry].insert(value);
    }

    pub fn get(&self, entry: usize) -> EnumSet<BinaryValue> {
        self.entries[entry]
    }

    /// The value of `entry` if it is fixed to exactly one value.
    pub fn value(&self, entry: usize) -> Option<BinaryValue> {
        let values = self.entries[entry];
        if values.len() == 1 {
            values.iter().next()
        } else {
            None
        }
    }

    pub fn is_contradictory(&self, entry: usize) -> bool {
        self.entries[entry] == EnumSet::all()
    }

    /// The entries which are not unfixed, in the order in which they were first touched.
    pub fn touched(&self) -> &[usize] {
        &self.touched
    }

    pub fn clear(&mut self) {
        for entry in self.touched.drain(..) {
            self.entries[entry] = EnumSet::empty();
        }

        symretope_assert_extreme!(self.entries.iter().all(|values| values.is_empty()));
    }

    /// Replaces the contents of `self` by those of `other`.
    pub fn copy_from(&mut self, other: &VirtualFixings) {
        self.clear();
        for &entry in other.touched() {
            for value in other.get(entry) {
                self.set(entry, value);
            }
        }
    }
}
