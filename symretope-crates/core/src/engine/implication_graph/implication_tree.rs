use enum_map::EnumMap;

use super::node::Branch;
use super::node::Node;
use super::node::NodeId;
use super::node::NodeKind;
use crate::basic_types::BinaryValue;
use crate::basic_types::Fixing;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::symretope_assert_moderate;
use crate::symretope_assert_simple;

/// Returned when every path of an implication tree has been closed without finding a way to
/// satisfy the lexicographic constraint for the power of the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RootReached;

/// The proof that the constrained vector is lexicographically at least as large as its image
/// under one power of the permutation.
///
/// Every path from the root to a leaf is a conjunction of fixings which, together with the known
/// values, is sufficient for the constraint to hold; the tree is the disjunction of these paths.
/// There are at most two leaves.
///
/// The nodes are stored in a pool with two slots per entry (one per [`Branch`]) and a final slot
/// for the root.
#[derive(Clone, Debug, Default)]
pub(crate) struct ImplicationTree {
    nodes: KeyedVec<NodeId, Node>,
    leaves: EnumMap<Branch, Option<NodeId>>,
    power: u64,
    cursor: usize,
}

impl ImplicationTree {
    fn slot(entry: usize, branch: Branch) -> NodeId {
        NodeId::create_from_index(2 * entry + branch as usize)
    }

    fn root(&self) -> NodeId {
        NodeId::create_from_index(self.nodes.len() - 1)
    }

    /// Prepares the (dismantled) tree for a new propagation with the given power.
    pub(crate) fn initialise(&mut self, num_entries: usize, power: u64) {
        symretope_assert_moderate!(self.is_dismantled());

        self.nodes.resize(2 * num_entries + 1, Node::default());
        let root = self.root();
        self.nodes[root] = Node::root();
        self.leaves[Branch::First] = Some(root);
        self.leaves[Branch::Second] = None;
        self.power = power;
        self.cursor = 0;
    }

    pub(crate) fn power(&self) -> u64 {
        self.power
    }

    /// The position in the domain of entries which is processed next.
    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn advance_cursor(&mut self) {
        self.cursor += 1;
    }

    pub(crate) fn leaf(&self, branch: Branch) -> Option<NodeId> {
        self.leaves[branch]
    }

    /// Whether every path has been closed, i.e. the constraint holds for this power.
    pub(crate) fn is_closed(&self) -> bool {
        self.leaves.values().all(Option::is_none)
    }

    pub(crate) fn has_conditional_root_child(&self) -> bool {
        self.nodes[self.root()]
            .children
            .into_iter()
            .flatten()
            .any(|child| self.nodes[child].kind == NodeKind::Conditional)
    }

    /// The fixings of the necessary nodes directly below the root; these hold on every path.
    pub(crate) fn necessary_root_fixing(&self) -> Option<Fixing> {
        self.necessary_child_fixing(self.root())
    }

    fn necessary_child_fixing(&self, node: NodeId) -> Option<Fixing> {
        self.nodes[node]
            .children
            .into_iter()
            .flatten()
            .find(|&child| self.nodes[child].kind == NodeKind::Necessary)
            .and_then(|child| self.nodes[child].fixing)
    }

    /// The value which the tree assigns to `entry`, looking at the slot of `branch` first.
    pub(crate) fn recorded_value(&self, entry: usize, branch: Branch) -> Option<BinaryValue> {
        [branch, branch.other()].into_iter().find_map(|side| {
            let node = &self.nodes[Self::slot(entry, side)];
            node.parent.and(node.fixing).map(|fixing| fixing.value)
        })
    }

    /// The path of `branch` cannot satisfy the constraint anymore, but it was also not violated;
    /// the leaf is removed.
    pub(crate) fn drop_leaf(&mut self, branch: Branch) {
        self.leaves[branch] = None;
    }

    /// Extends the path ending in the leaf of `branch` by a node with `fixing`.
    pub(crate) fn extend(&mut self, branch: Branch, kind: NodeKind, fixing: Fixing) {
        if let Some(leaf) = self.leaves[branch] {
            symretope_assert_simple!(self.nodes[leaf].children == [None, None]);
            let node = self.attach(leaf, branch, kind, fixing);
            self.leaves[branch] = Some(node);
        }
    }

    /// Replaces the single leaf on `branch` by two paths: one assuming that `first` is zero (which
    /// implies that `second` is zero), and one assuming that `second` is one (which implies that
    /// `first` is one).
    pub(crate) fn split(&mut self, branch: Branch, first: usize, second: usize) {
        let Some(leaf) = self.leaves[branch] else {
            return;
        };
        symretope_assert_simple!(self.leaves[branch.other()].is_none());

        let zero_condition = self.attach(
            leaf,
            Branch::First,
            NodeKind::Conditional,
            Fixing::new(first, BinaryValue::Zero),
        );
        let zero_implied = self.attach(
            zero_condition,
            Branch::First,
            NodeKind::Necessary,
            Fixing::new(second, BinaryValue::Zero),
        );

        let one_condition = self.attach(
            leaf,
            Branch::Second,
            NodeKind::Conditional,
            Fixing::new(second, BinaryValue::One),
        );
        let one_implied = self.attach(
            one_condition,
            Branch::Second,
            NodeKind::Necessary,
            Fixing::new(first, BinaryValue::One),
        );

        self.leaves[Branch::First] = Some(zero_implied);
        self.leaves[Branch::Second] = Some(one_implied);
    }

    /// The path ending in the leaf of `branch` violates the constraint; it is removed up to its
    /// last conditional node, which is then merged with its alternative.
    pub(crate) fn close_branch(&mut self, branch: Branch) -> Result<(), RootReached> {
        let Some(mut node) = self.leaves[branch] else {
            return Ok(());
        };
        self.leaves[branch] = None;

        while self.nodes[node].kind == NodeKind::Necessary {
            let Some(parent) = self.nodes[node].parent else {
                break;
            };
            self.nodes[parent].unlink_child(node);
            self.nodes[node] = Node::default();
            node = parent;
        }

        if self.nodes[node].kind == NodeKind::Root {
            return Err(RootReached);
        }

        symretope_assert_simple!(self.nodes[node].kind == NodeKind::Conditional);
        let Some(parent) = self.nodes[node].parent else {
            return Ok(());
        };

        match self.nodes[parent].sibling_of(node) {
            None => self.negate(node),
            Some(twin) => {
                symretope_assert_simple!(self.nodes[node].children == [None, None]);
                self.nodes[node] = Node::default();
                let _ = self.promote_implication(parent, twin);
            }
        }

        Ok(())
    }

    /// Processes the fixing which has been applied for the slot of `branch`.
    ///
    /// If the slot of the fixed entry holds the same value, the node is spliced out of the tree. If
    /// it holds the other value, the paths through the node are removed; a necessary node then
    /// invalidates every path up to its last conditional node.
    ///
    /// Returns the fixing which became necessary directly below the root, if any.
    pub(crate) fn apply_fixing(
        &mut self,
        fixing: Fixing,
        branch: Branch,
    ) -> Result<Option<Fixing>, RootReached> {
        let slot = Self::slot(fixing.entry, branch);
        let node = self.nodes[slot];
        let (Some(parent), Some(recorded)) = (node.parent, node.fixing) else {
            return Ok(None);
        };

        if recorded.value == fixing.value {
            if let Some(twin) = self.nodes[parent].sibling_of(slot) {
                self.remove_subtree(twin);
            }

            let children = self.nodes[slot].children;
            self.nodes[parent].children = children;
            for child in children.into_iter().flatten() {
                self.nodes[child].parent = Some(parent);
            }
            self.nodes[slot] = Node::default();
            for leaf in self.leaves.values_mut() {
                if *leaf == Some(slot) {
                    *leaf = Some(parent);
                }
            }

            if self.nodes[parent].kind == NodeKind::Root {
                return Ok(self.necessary_child_fixing(parent));
            }
            return Ok(None);
        }

        if node.kind != NodeKind::Necessary {
            self.remove_subtree(slot);
            return Ok(None);
        }

        self.remove_subtree(slot);
        let mut ancestor = parent;
        while self.nodes[ancestor].kind == NodeKind::Necessary {
            match self.nodes[ancestor].parent {
                Some(next) => ancestor = next,
                None => break,
            }
        }

        if self.nodes[ancestor].kind == NodeKind::Root {
            return Err(RootReached);
        }

        let Some(above) = self.nodes[ancestor].parent else {
            return Ok(None);
        };

        match self.nodes[above].sibling_of(ancestor) {
            None => {
                self.negate(ancestor);
                for child in self.nodes[ancestor].children.into_iter().flatten() {
                    self.remove_subtree(child);
                }

                if self.nodes[above].kind == NodeKind::Root {
                    return Ok(self.nodes[ancestor].fixing);
                }
            }
            Some(twin) => {
                self.remove_subtree(ancestor);
                let promoted = self.promote_implication(above, twin);

                if self.nodes[above].kind == NodeKind::Root {
                    return Ok(promoted);
                }
            }
        }

        Ok(None)
    }

    /// Removes `top` and every node below it.
    pub(crate) fn remove_subtree(&mut self, top: NodeId) {
        if let Some(parent) = self.nodes[top].parent {
            self.nodes[parent].unlink_child(top);
        }

        let mut current = Some(top);
        let mut last = top;
        while let Some(node) = current {
            current = match self.nodes[node].children {
                [Some(first), second] => {
                    if let Some(second) = second {
                        self.remove_subtree(second);
                    }
                    Some(first)
                }
                [None, second] => second,
            };
            self.nodes[node] = Node::default();
            last = node;
        }

        for leaf in self.leaves.values_mut() {
            if *leaf == Some(last) {
                *leaf = None;
            }
        }
    }

    /// Returns every slot of the pool to its free state.
    pub(crate) fn dismantle(&mut self) {
        if !self.nodes.is_empty() {
            self.remove_subtree(self.root());
        }
        self.leaves[Branch::First] = None;
        self.leaves[Branch::Second] = None;
    }

    pub(crate) fn is_dismantled(&self) -> bool {
        self.nodes.iter().all(Node::is_free)
    }

    fn attach(&mut self, parent: NodeId, branch: Branch, kind: NodeKind, fixing: Fixing) -> NodeId {
        let node = Self::slot(fixing.entry, branch);
        symretope_assert_simple!(self.nodes[node].is_free());

        self.nodes[node] = Node {
            kind,
            fixing: Some(fixing),
            parent: Some(parent),
            children: [None, None],
        };

        let children = &mut self.nodes[parent].children;
        if children[0].is_none() {
            children[0] = Some(node);
        } else {
            symretope_assert_simple!(children[1].is_none());
            children[1] = Some(node);
        }

        node
    }

    /// Turns a conditional node without alternative into a necessary node with the converse
    /// fixing.
    fn negate(&mut self, node: NodeId) {
        let node = &mut self.nodes[node];
        node.kind = NodeKind::Necessary;
        node.fixing = node.fixing.map(Fixing::converse);
    }

    /// The path through the sibling of `twin` has been removed, so the necessary child of `twin`
    /// holds whenever `parent` is reached; it is moved in between `parent` and `twin`.
    ///
    /// Returns the fixing of the moved node.
    fn promote_implication(&mut self, parent: NodeId, twin: NodeId) -> Option<Fixing> {
        let implied = self.nodes[twin].children.into_iter().flatten().next();
        symretope_assert_simple!(
            implied.is_some(),
            "a conditional node with a sibling has a necessary child"
        );
        let implied = implied?;

        let grandchildren = self.nodes[implied].children;
        for grandchild in grandchildren.into_iter().flatten() {
            self.nodes[grandchild].parent = Some(twin);
        }

        self.nodes[twin].children = grandchildren;
        self.nodes[twin].parent = Some(implied);
        self.nodes[implied].parent = Some(parent);
        self.nodes[implied].children = [Some(twin), None];
        self.nodes[parent].children = [Some(implied), None];

        for leaf in self.leaves.values_mut() {
            if *leaf == Some(implied) {
                *leaf = Some(twin);
            }
        }

        self.nodes[implied].fixing
    }
}
