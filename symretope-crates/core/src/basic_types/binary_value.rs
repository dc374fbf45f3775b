use std::fmt::Display;

use enumset::EnumSetType;

/// One of the two values a binary variable can take.
#[derive(Debug, Hash, EnumSetType)]
pub enum BinaryValue {
    Zero,
    One,
}

impl BinaryValue {
    pub fn opposite(self) -> BinaryValue {
        match self {
            BinaryValue::Zero => BinaryValue::One,
            BinaryValue::One => BinaryValue::Zero,
        }
    }

    /// The integer value which is represented.
    pub fn as_i32(self) -> i32 {
        match self {
            BinaryValue::Zero => 0,
            BinaryValue::One => 1,
        }
    }
}

impl Display for BinaryValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

/// The assignment of a [`BinaryValue`] to the entry at position `entry` of the constrained vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fixing {
    pub entry: usize,
    pub value: BinaryValue,
}

impl Fixing {
    pub fn new(entry: usize, value: BinaryValue) -> Fixing {
        Fixing { entry, value }
    }

    /// The fixing of the same entry to the other value.
    pub fn converse(self) -> Fixing {
        Fixing {
            entry: self.entry,
            value: self.value.opposite(),
        }
    }
}

impl Display for Fixing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x[{}] = {}", self.entry, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converse_flips_value_but_keeps_entry() {
        let fixing = Fixing::new(3, BinaryValue::Zero);

        assert_eq!(Fixing::new(3, BinaryValue::One), fixing.converse());
        assert_eq!(fixing, fixing.converse().converse());
    }
}
