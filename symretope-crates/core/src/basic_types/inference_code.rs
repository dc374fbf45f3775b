use bitfield_struct::bitfield;

/// Attached to every bound which is posted by the propagator; it identifies the reasoning which
/// led to the bound so that it can be explained lazily.
///
/// Either the bound was derived by comparing the vector against its image under a power of the
/// permutation, in which case the power is recorded, or it was derived by peeking.
#[bitfield(u64)]
#[derive(PartialEq, Eq, Hash)]
pub struct InferenceCode {
    /// The power of the permutation which was used to derive the bound.
    #[bits(63)]
    pub power: u64,
    /// Whether the bound was found by peeking.
    pub from_peek: bool,
}

impl InferenceCode {
    pub fn from_power(power: u64) -> InferenceCode {
        InferenceCode::new().with_power(power)
    }

    pub fn peek() -> InferenceCode {
        InferenceCode::new().with_from_peek(true)
    }

    /// Whether the bound was derived from the power returned by [`InferenceCode::power`].
    pub fn is_from_power(&self) -> bool {
        !self.from_peek()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_and_peek_flag_do_not_overlap() {
        let code = InferenceCode::from_power(12);

        assert_eq!(12, code.power());
        assert!(code.is_from_power());

        let peeked = InferenceCode::peek();
        assert!(peeked.from_peek());
        assert_eq!(0, peeked.power());
    }

    #[test]
    fn codes_survive_conversion_to_bits() {
        let code = InferenceCode::from_power((1 << 40) + 3);

        assert_eq!(code, InferenceCode::from_bits(code.into_bits()));
    }
}
