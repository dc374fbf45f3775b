use super::host::ConflictStore;
use super::host::PostDomains;
use super::host::ReadDomains;
use super::DomainId;
use crate::basic_types::BinaryValue;
use crate::basic_types::BoundSide;
use crate::basic_types::EmptyDomain;
use crate::basic_types::InferenceCode;
use crate::basic_types::Predicate;
use crate::basic_types::PropositionalConjunction;
use crate::containers::KeyedVec;
use crate::symretope_assert_simple;

/// An entry of the trail of [`BinaryAssignments`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundChange {
    pub predicate: Predicate<DomainId>,
    pub old_lower_bound: i32,
    pub old_upper_bound: i32,
    /// The code with which the change was posted; `None` for decisions.
    pub inference_code: Option<InferenceCode>,
}

/// A minimal solver state over (mostly binary) variables which implements [`Host`].
///
/// Every bound change is recorded on a trail, so the bounds at earlier trail positions are
/// available for explanations. A checkpoint is the length of the trail when it was created.
/// Every call to [`PostDomains::post`] and every committed conflict is recorded as well.
///
/// [`Host`]: super::Host
#[derive(Clone, Debug)]
pub struct BinaryAssignments {
    bounds: KeyedVec<DomainId, (i32, i32)>,
    trail: Vec<BoundChange>,
    checkpoints: Vec<usize>,
    num_posts: usize,
    conflicts: Vec<PropositionalConjunction<DomainId>>,
    conflict_under_construction: Option<PropositionalConjunction<DomainId>>,
    is_probing: bool,
    is_conflict_analysis_applicable: bool,
}

impl Default for BinaryAssignments {
    fn default() -> Self {
        BinaryAssignments {
            bounds: KeyedVec::default(),
            trail: Vec::new(),
            checkpoints: Vec::new(),
            num_posts: 0,
            conflicts: Vec::new(),
            conflict_under_construction: None,
            is_probing: false,
            is_conflict_analysis_applicable: true,
        }
    }
}

impl BinaryAssignments {
    pub fn new_binary(&mut self) -> DomainId {
        self.new_domain(0, 1)
    }

    pub fn new_domain(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        symretope_assert_simple!(
            self.checkpoints.is_empty(),
            "can only create variables at the root"
        );
        self.bounds.push((lower_bound, upper_bound))
    }

    pub fn num_domains(&self) -> usize {
        self.bounds.len()
    }

    /// Makes `predicate` true without a reason.
    pub fn decide(&mut self, predicate: Predicate<DomainId>) -> Result<bool, EmptyDomain> {
        self.tighten(predicate, None)
    }

    /// Fixes `variable` to `value` without a reason.
    pub fn fix(&mut self, variable: DomainId, value: BinaryValue) -> Result<bool, EmptyDomain> {
        self.decide(Predicate::fixing(variable, value))
    }

    pub fn value(&self, variable: DomainId) -> Option<BinaryValue> {
        self.fixed_value(variable, None)
    }

    pub fn new_checkpoint(&mut self) {
        self.checkpoints.push(self.trail.len());
    }

    pub fn checkpoint(&self) -> usize {
        self.checkpoints.len()
    }

    /// Undoes every bound change made after `checkpoint` was created, latest first.
    pub fn synchronise(&mut self, checkpoint: usize) {
        symretope_assert_simple!(checkpoint < self.checkpoints.len());

        let trail_length = self.checkpoints[checkpoint];
        self.checkpoints.truncate(checkpoint);
        for change in self.trail.drain(trail_length..).rev() {
            self.bounds[change.predicate.variable()] =
                (change.old_lower_bound, change.old_upper_bound);
        }
    }

    pub fn num_trail_entries(&self) -> usize {
        self.trail.len()
    }

    pub fn trail_entry(&self, trail_position: usize) -> BoundChange {
        self.trail[trail_position]
    }

    /// The position of the trail entry which made `predicate` true, if it is true.
    pub fn trail_position_of(&self, predicate: Predicate<DomainId>) -> Option<usize> {
        self.trail
            .iter()
            .position(|change| change.predicate == predicate)
    }

    /// The number of calls to [`PostDomains::post`], including those which did not change a bound.
    pub fn num_posts(&self) -> usize {
        self.num_posts
    }

    /// The conflicts which have been committed so far.
    pub fn conflicts(&self) -> &[PropositionalConjunction<DomainId>] {
        &self.conflicts
    }

    pub fn set_probing(&mut self, is_probing: bool) {
        self.is_probing = is_probing;
    }

    pub fn set_conflict_analysis_applicable(&mut self, is_applicable: bool) {
        self.is_conflict_analysis_applicable = is_applicable;
    }

    fn tighten(
        &mut self,
        predicate: Predicate<DomainId>,
        inference_code: Option<InferenceCode>,
    ) -> Result<bool, EmptyDomain> {
        let variable = predicate.variable();
        let (old_lower_bound, old_upper_bound) = self.bounds[variable];

        let new_bounds = match predicate.side() {
            BoundSide::Lower if old_lower_bound >= 1 => return Ok(false),
            BoundSide::Lower if old_upper_bound < 1 => return Err(EmptyDomain),
            BoundSide::Lower => (1, old_upper_bound),
            BoundSide::Upper if old_upper_bound <= 0 => return Ok(false),
            BoundSide::Upper if old_lower_bound > 0 => return Err(EmptyDomain),
            BoundSide::Upper => (old_lower_bound, 0),
        };

        self.trail.push(BoundChange {
            predicate,
            old_lower_bound,
            old_upper_bound,
            inference_code,
        });
        self.bounds[variable] = new_bounds;

        Ok(true)
    }

    fn bounds_at_trail_position(&self, variable: DomainId, trail_position: usize) -> (i32, i32) {
        self.trail
            .get(trail_position..)
            .and_then(|changes| {
                changes
                    .iter()
                    .find(|change| change.predicate.variable() == variable)
            })
            .map(|change| (change.old_lower_bound, change.old_upper_bound))
            .unwrap_or(self.bounds[variable])
    }
}

impl ReadDomains for BinaryAssignments {
    type Variable = DomainId;

    fn lower_bound(&self, variable: DomainId) -> i32 {
        self.bounds[variable].0
    }

    fn upper_bound(&self, variable: DomainId) -> i32 {
        self.bounds[variable].1
    }

    fn lower_bound_at_trail_position(&self, variable: DomainId, trail_position: usize) -> i32 {
        self.bounds_at_trail_position(variable, trail_position).0
    }

    fn upper_bound_at_trail_position(&self, variable: DomainId, trail_position: usize) -> i32 {
        self.bounds_at_trail_position(variable, trail_position).1
    }

    fn is_probing(&self) -> bool {
        self.is_probing
    }
}

impl PostDomains for BinaryAssignments {
    fn post(
        &mut self,
        predicate: Predicate<DomainId>,
        inference_code: InferenceCode,
    ) -> Result<bool, EmptyDomain> {
        self.num_posts += 1;
        self.tighten(predicate, Some(inference_code))
    }
}

impl ConflictStore for BinaryAssignments {
    fn is_conflict_analysis_applicable(&self) -> bool {
        self.is_conflict_analysis_applicable
    }

    fn begin_conflict(&mut self) {
        symretope_assert_simple!(self.conflict_under_construction.is_none());
        self.conflict_under_construction = Some(PropositionalConjunction::default());
    }

    fn add_bound_to_conflict(
        &mut self,
        predicate: Predicate<DomainId>,
        _trail_position: Option<usize>,
    ) {
        if let Some(conflict) = self.conflict_under_construction.as_mut() {
            conflict.push(predicate);
        }
    }

    fn commit_conflict(&mut self) {
        if let Some(conflict) = self.conflict_under_construction.take() {
            self.conflicts.push(conflict);
        }
    }
}
