//! Derives every fixing which is implied by the lexicographic constraints of a set of powers of
//! the permutation, by growing one implication tree per power.
use num::Integer;

use super::fixing_context::FixingContext;
use super::fixing_queue::FixingQueue;
use super::fixing_queue::QueuedConverse;
use super::host::Host;
use super::impactful_entries::ImpactfulEntries;
use super::implication_graph::Branch;
use super::implication_graph::ImplicationGraph;
use super::implication_graph::ImplicationTree;
use super::implication_graph::NodeKind;
use super::implication_graph::RootReached;
use super::Permutation;
use crate::basic_types::BinaryValue;
use crate::basic_types::Fixing;
use crate::basic_types::Inconsistency;
use crate::basic_types::InferenceCode;
use crate::basic_types::PropagationStatus;
use crate::symretope_assert_extreme;

/// The memory which is reused by every propagation; it is clean whenever no propagation runs.
#[derive(Clone, Debug, Default)]
pub(crate) struct EngineBuffers {
    graph: ImplicationGraph,
    queue: FixingQueue,
}

impl EngineBuffers {
    pub(crate) fn is_clean(&self) -> bool {
        self.graph.is_dismantled() && self.queue.is_clean()
    }
}

/// The entries and powers which are considered.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Scope<'a> {
    /// All entries, under the powers `1..=num_powers`.
    AllEntries { num_powers: usize },
    /// The entries of one cycle (in cycle order), under those multiples of `base_power` which do
    /// not map every entry of the cycle to itself.
    Cycle { support: &'a [usize], base_power: u64 },
}

impl Scope<'_> {
    fn entry_at(&self, cursor: usize, num_entries: usize) -> Option<usize> {
        match self {
            Scope::AllEntries { .. } => (cursor < num_entries).then_some(cursor),
            Scope::Cycle { support, .. } => support.get(cursor).copied(),
        }
    }

    fn powers(&self) -> impl ExactSizeIterator<Item = u64> {
        let (num_powers, step) = match *self {
            Scope::AllEntries { num_powers } => (num_powers, 1),
            Scope::Cycle {
                support,
                base_power,
            } => {
                let length = support.len() as u64;
                let num_powers = length / length.gcd(&base_power) - 1;
                (num_powers as usize, base_power)
            }
        };

        (0..num_powers).map(move |index| (index as u64 + 1).saturating_mul(step))
    }
}

/// Applies the fixings which are necessary for the vector to be lexicographically at least as
/// large as its images under the powers of `scope`.
///
/// If `impactful_entries` is given, every compared entry is recorded in it.
///
/// Returns the number of fixings which changed a value. The buffers are clean afterwards, also
/// when an inconsistency is found.
pub(crate) fn complete_fixings<H: Host>(
    permutation: &Permutation,
    buffers: &mut EngineBuffers,
    scope: Scope<'_>,
    context: &mut FixingContext<'_, H>,
    impactful_entries: Option<&mut ImpactfulEntries>,
) -> PropagationStatus {
    let num_entries = permutation.len();
    let powers = scope.powers();
    if num_entries < 2 || powers.len() == 0 {
        return Ok(0);
    }

    buffers.queue.ensure_capacity(num_entries);
    buffers.graph.initialise(num_entries, powers);

    let result = grow_trees(permutation, buffers, scope, context, impactful_entries);

    buffers.queue.discard_pending();
    buffers.graph.dismantle();
    symretope_assert_extreme!(buffers.is_clean());

    result
}

fn grow_trees<H: Host>(
    permutation: &Permutation,
    buffers: &mut EngineBuffers,
    scope: Scope<'_>,
    context: &mut FixingContext<'_, H>,
    mut impactful_entries: Option<&mut ImpactfulEntries>,
) -> PropagationStatus {
    let mut num_fixings = 0;

    while let Some(tree_id) = buffers.graph.pop() {
        let power = buffers.graph.tree(tree_id).power();

        loop {
            let tree = buffers.graph.tree(tree_id);
            if tree.is_closed() {
                break;
            }
            let Some(i) = scope.entry_at(tree.cursor(), permutation.len()) else {
                break;
            };
            let j = permutation.image_backward(i, power);
            if i == j {
                buffers.graph.tree_mut(tree_id).advance_cursor();
                continue;
            }

            if let Some(impactful_entries) = impactful_entries.as_deref_mut() {
                impactful_entries.record(i);
                impactful_entries.record(j);
            }

            if holds_beyond(permutation, tree, context, i, j) {
                break;
            }

            let values = Branch::ALL.map(|branch| {
                tree.leaf(branch).map(|_| {
                    (
                        context.value(i).or_else(|| tree.recorded_value(i, branch)),
                        context.value(j).or_else(|| tree.recorded_value(j, branch)),
                    )
                })
            });

            let tree = buffers.graph.tree_mut(tree_id);
            for branch in Branch::ALL {
                let (Some(pair), Some(_)) = (values[branch as usize], tree.leaf(branch)) else {
                    continue;
                };

                match extend_branch(tree, branch, pair, i, j) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(RootReached) => {
                        context.report_conflict(permutation, &[(None, power)]);
                        return Err(Inconsistency::Conflict);
                    }
                }
            }

            tree.advance_cursor();
            if let Some(fixing) = tree.necessary_root_fixing() {
                enqueue(&mut buffers.queue, context, permutation, fixing, power)?;
            }
            num_fixings += apply_fixings(permutation, buffers, context)?;
        }
    }

    Ok(num_fixings)
}

/// Whether the tree does not have to grow past the pair `(i, j)`.
///
/// This is the case when neither `i` nor `j` is ahead of its image in the comparison, the pair does
/// not already decide the order, and the root has conditional children; a necessary fixing would
/// then have been derived before this pair.
fn holds_beyond<H: Host>(
    permutation: &Permutation,
    tree: &ImplicationTree,
    context: &mut FixingContext<'_, H>,
    i: usize,
    j: usize,
) -> bool {
    permutation.image_forward(i, tree.power()) > i
        && j > i
        && context.value(i) != Some(BinaryValue::Zero)
        && context.value(j) != Some(BinaryValue::One)
        && tree.has_conditional_root_child()
}

/// Extends the path of `branch` according to the values of the pair `(i, j)`.
///
/// Returns `false` if the branch was split, after which the other branch must not be extended.
fn extend_branch(
    tree: &mut ImplicationTree,
    branch: Branch,
    values: (Option<BinaryValue>, Option<BinaryValue>),
    i: usize,
    j: usize,
) -> Result<bool, RootReached> {
    use BinaryValue::*;

    match values {
        (Some(Zero), Some(Zero)) | (Some(One), Some(One)) => {}
        (Some(One), Some(Zero)) => tree.drop_leaf(branch),
        (Some(Zero), None) => tree.extend(branch, NodeKind::Necessary, Fixing::new(j, Zero)),
        (None, Some(One)) => tree.extend(branch, NodeKind::Necessary, Fixing::new(i, One)),
        (Some(One), None) => tree.extend(branch, NodeKind::Conditional, Fixing::new(j, One)),
        (None, Some(Zero)) => tree.extend(branch, NodeKind::Conditional, Fixing::new(i, Zero)),
        (Some(Zero), Some(One)) => tree.close_branch(branch)?,
        (None, None) => {
            tree.split(branch, i, j);
            return Ok(false);
        }
    }

    Ok(true)
}

/// Applies the queued fixings, and processes them in every tree.
fn apply_fixings<H: Host>(
    permutation: &Permutation,
    buffers: &mut EngineBuffers,
    context: &mut FixingContext<'_, H>,
) -> PropagationStatus {
    let mut num_fixings = 0;

    while let Some((fixing, cause)) = buffers.queue.drain_one() {
        if context.fix(fixing, InferenceCode::from_power(cause))? {
            num_fixings += 1;
        }

        for tree_id in buffers.graph.active_trees() {
            let power = buffers.graph.tree(tree_id).power();

            for branch in Branch::ALL {
                match buffers.graph.tree_mut(tree_id).apply_fixing(fixing, branch) {
                    Ok(None) => {}
                    Ok(Some(forced)) => {
                        enqueue(&mut buffers.queue, context, permutation, forced, power)?;
                    }
                    Err(RootReached) => {
                        context.report_conflict(permutation, &[(None, power)]);
                        return Err(Inconsistency::Conflict);
                    }
                }
            }

            buffers.graph.enqueue(tree_id);
        }
    }

    Ok(num_fixings)
}

fn enqueue<H: Host>(
    queue: &mut FixingQueue,
    context: &mut FixingContext<'_, H>,
    permutation: &Permutation,
    fixing: Fixing,
    power: u64,
) -> Result<(), Inconsistency> {
    queue.enqueue(fixing, power).map_err(|QueuedConverse { power: other }| {
        context.report_conflict(
            permutation,
            &[
                (Some(fixing), power),
                (Some(fixing.converse()), other),
            ],
        );
        Inconsistency::Conflict
    })
}
