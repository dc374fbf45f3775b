//! The implication trees of all powers which are considered in one propagation, and the queue of
//! trees which still have to be grown.
mod implication_tree;
mod node;

pub(crate) use implication_tree::ImplicationTree;
pub(crate) use implication_tree::RootReached;
pub(crate) use node::Branch;
pub(crate) use node::NodeKind;

use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::symretope_assert_extreme;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct TreeId(u32);

impl StorageKey for TreeId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        TreeId(index as u32)
    }
}

/// The trees are kept between propagations so that their node pools are allocated once; every
/// propagation dismantles the trees it used before returning.
#[derive(Clone, Debug, Default)]
pub(crate) struct ImplicationGraph {
    trees: KeyedVec<TreeId, ImplicationTree>,
    num_active_trees: usize,
    work_queue: Vec<TreeId>,
    in_work_queue: KeyedVec<TreeId, bool>,
}

impl ImplicationGraph {
    /// Creates a tree for every power, and queues all of them.
    pub(crate) fn initialise(
        &mut self,
        num_entries: usize,
        powers: impl ExactSizeIterator<Item = u64>,
    ) {
        symretope_assert_extreme!(self.is_dismantled());

        let num_trees = powers.len();
        if self.trees.len() < num_trees {
            self.trees.resize(num_trees, ImplicationTree::default());
            self.in_work_queue.resize(num_trees, false);
        }

        self.num_active_trees = num_trees;
        for (index, power) in powers.enumerate() {
            let tree_id = TreeId::create_from_index(index);
            self.trees[tree_id].initialise(num_entries, power);
        }

        // The queue is processed from the back, so the largest power is grown first.
        for index in 0..num_trees {
            self.enqueue(TreeId::create_from_index(index));
        }
    }

    pub(crate) fn active_trees(&self) -> impl Iterator<Item = TreeId> {
        (0..self.num_active_trees).map(TreeId::create_from_index)
    }

    pub(crate) fn tree(&self, tree_id: TreeId) -> &ImplicationTree {
        &self.trees[tree_id]
    }

    pub(crate) fn tree_mut(&mut self, tree_id: TreeId) -> &mut ImplicationTree {
        &mut self.trees[tree_id]
    }

    pub(crate) fn enqueue(&mut self, tree_id: TreeId) {
        if !self.in_work_queue[tree_id] {
            self.in_work_queue[tree_id] = true;
            self.work_queue.push(tree_id);
        }
    }

    pub(crate) fn pop(&mut self) -> Option<TreeId> {
        let tree_id = self.work_queue.pop()?;
        self.in_work_queue[tree_id] = false;
        Some(tree_id)
    }

    /// Removes every tree which is in use, and empties the work queue.
    pub(crate) fn dismantle(&mut self) {
        for tree_id in (0..self.num_active_trees).map(TreeId::create_from_index) {
            self.trees[tree_id].dismantle();
        }
        while self.pop().is_some() {}
        self.num_active_trees = 0;
    }

    pub(crate) fn is_dismantled(&self) -> bool {
        self.num_active_trees == 0
            && self.work_queue.is_empty()
            && self.in_work_queue.iter().all(|queued| !queued)
            && self.trees.iter().all(ImplicationTree::is_dismantled)
    }
}
