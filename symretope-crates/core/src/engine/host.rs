//! The interface through which the propagator communicates with the solver which owns the domains
//! of the variables.
use std::fmt::Debug;
use std::hash::Hash;

use crate::basic_types::BinaryValue;
use crate::basic_types::EmptyDomain;
use crate::basic_types::InferenceCode;
use crate::basic_types::Predicate;

/// Read access to the bounds of the variables, both the current ones and the ones at an earlier
/// point of the search.
pub trait ReadDomains {
    type Variable: Copy + Eq + Hash + Debug;

    fn lower_bound(&self, variable: Self::Variable) -> i32;

    fn upper_bound(&self, variable: Self::Variable) -> i32;

    /// The lower bound of `variable` just before the trail entry at `trail_position` was made.
    fn lower_bound_at_trail_position(&self, variable: Self::Variable, trail_position: usize)
        -> i32;

    /// The upper bound of `variable` just before the trail entry at `trail_position` was made.
    fn upper_bound_at_trail_position(&self, variable: Self::Variable, trail_position: usize)
        -> i32;

    /// Whether the solver is currently probing; peeking can be configured separately for probing.
    fn is_probing(&self) -> bool {
        false
    }

    /// The value `variable` is fixed to, either currently (`None`) or just before the given trail
    /// position.
    fn fixed_value(
        &self,
        variable: Self::Variable,
        trail_position: Option<usize>,
    ) -> Option<BinaryValue> {
        let (lower_bound, upper_bound) = match trail_position {
            None => (self.lower_bound(variable), self.upper_bound(variable)),
            Some(position) => (
                self.lower_bound_at_trail_position(variable, position),
                self.upper_bound_at_trail_position(variable, position),
            ),
        };

        if lower_bound >= 1 {
            Some(BinaryValue::One)
        } else if upper_bound <= 0 {
            Some(BinaryValue::Zero)
        } else {
            None
        }
    }
}

pub trait PostDomains: ReadDomains {
    /// Makes `predicate` true. The `inference_code` is handed back to the propagator when the
    /// predicate has to be explained.
    ///
    /// Returns whether a bound was tightened, or [`EmptyDomain`] if the predicate is falsified by
    /// the current domain.
    fn post(
        &mut self,
        predicate: Predicate<Self::Variable>,
        inference_code: InferenceCode,
    ) -> Result<bool, EmptyDomain>;
}

/// Receives the reasons for the conflicts which are detected by the propagator.
pub trait ConflictStore: ReadDomains {
    fn is_conflict_analysis_applicable(&self) -> bool {
        true
    }

    fn begin_conflict(&mut self);

    /// Adds `predicate` to the conflict which is being built; it holds at `trail_position`, or in
    /// the current domains if no position is given.
    fn add_bound_to_conflict(
        &mut self,
        predicate: Predicate<Self::Variable>,
        trail_position: Option<usize>,
    );

    fn commit_conflict(&mut self);
}

/// Everything the propagator requires of the solver.
pub trait Host: PostDomains + ConflictStore {}

impl<T: PostDomains + ConflictStore> Host for T {}

/// A read-only view of the domains as they were just before a trail position.
#[derive(Debug)]
pub(crate) struct HistoricDomains<'a, Domains> {
    domains: &'a Domains,
    trail_position: usize,
}

impl<'a, Domains: ReadDomains> HistoricDomains<'a, Domains> {
    pub(crate) fn new(domains: &'a Domains, trail_position: usize) -> Self {
        HistoricDomains {
            domains,
            trail_position,
        }
    }
}

impl<Domains: ReadDomains> ReadDomains for HistoricDomains<'_, Domains> {
    type Variable = Domains::Variable;

    fn lower_bound(&self, variable: Self::Variable) -> i32 {
        self.domains
            .lower_bound_at_trail_position(variable, self.trail_position)
    }

    fn upper_bound(&self, variable: Self::Variable) -> i32 {
        self.domains
            .upper_bound_at_trail_position(variable, self.trail_position)
    }

    fn lower_bound_at_trail_position(
        &self,
        variable: Self::Variable,
        trail_position: usize,
    ) -> i32 {
        self.domains
            .lower_bound_at_trail_position(variable, trail_position.min(self.trail_position))
    }

    fn upper_bound_at_trail_position(
        &self,
        variable: Self::Variable,
        trail_position: usize,
    ) -> i32 {
        self.domains
            .upper_bound_at_trail_position(variable, trail_position.min(self.trail_position))
    }
}

impl<Domains: ReadDomains> PostDomains for HistoricDomains<'_, Domains> {
    fn post(
        &mut self,
        _predicate: Predicate<Self::Variable>,
        _inference_code: InferenceCode,
    ) -> Result<bool, EmptyDomain> {
        // The past cannot be changed.
        Err(EmptyDomain)
    }
}

impl<Domains: ReadDomains> ConflictStore for HistoricDomains<'_, Domains> {
    fn is_conflict_analysis_applicable(&self) -> bool {
        false
    }

    fn begin_conflict(&mut self) {}

    fn add_bound_to_conflict(
        &mut self,
        _predicate: Predicate<Self::Variable>,
        _trail_position: Option<usize>,
    ) {
    }

    fn commit_conflict(&mut self) {}
}
