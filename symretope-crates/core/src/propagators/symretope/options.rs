#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymretopeOptions {
    /// Whether entries which were compared during propagation are afterwards tentatively fixed
    /// to find fixings which the implication trees alone do not reveal.
    pub peek: bool,
    /// Whether to peek while the solver is probing; only has an effect if [`Self::peek`] is set.
    pub probing_peek: bool,
    /// The maximum number of powers of the permutation which are considered; 0 disables the
    /// limit.
    pub max_order: usize,
    /// The maximum of the number of considered powers times the number of entries which are
    /// moved by the permutation; 0 disables the limit.
    pub max_order_times_support: usize,
    pub algorithm: PropagationAlgorithm,
}

impl Default for SymretopeOptions {
    fn default() -> Self {
        Self {
            peek: true,
            probing_peek: false,
            max_order: 10_000,
            max_order_times_support: 5_000_000,
            algorithm: PropagationAlgorithm::default(),
        }
    }
}

/// Determines which algorithm propagates the constraint.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum PropagationAlgorithm {
    /// Processes monotone and ordered permutations one cycle at a time, and all other
    /// permutations by considering all powers at once.
    #[default]
    Automatic,
    /// Always considers all powers at once.
    Generic,
}
