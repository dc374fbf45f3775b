use enum_map::Enum;

use crate::basic_types::Fixing;
use crate::containers::StorageKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(u32);

impl StorageKey for NodeId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        NodeId(index as u32)
    }
}

/// The (at most) two branches of an implication tree.
///
/// Every entry owns one node slot per branch, so that a fixing of an entry can be present on both
/// branches at the same time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Enum)]
pub(crate) enum Branch {
    First,
    Second,
}

impl Branch {
    pub(crate) const ALL: [Branch; 2] = [Branch::First, Branch::Second];

    pub(crate) fn other(self) -> Branch {
        match self {
            Branch::First => Branch::Second,
            Branch::Second => Branch::First,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum NodeKind {
    /// The slot is not part of the tree.
    #[default]
    Free,
    Root,
    /// A fixing which is only assumed on this path; the path may still be abandoned in favour of
    /// its sibling.
    Conditional,
    /// A fixing which is implied by the fixings on the path above it.
    Necessary,
}

/// A node of an implication tree; a slot which is not in use equals [`Node::default`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) fixing: Option<Fixing>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: [Option<NodeId>; 2],
}

impl Node {
    pub(crate) fn root() -> Node {
        Node {
            kind: NodeKind::Root,
            ..Default::default()
        }
    }

    pub(crate) fn is_free(&self) -> bool {
        *self == Node::default()
    }

    /// Removes `child` from the children, keeping the remaining child in the first position.
    pub(crate) fn unlink_child(&mut self, child: NodeId) {
        if self.children[0] == Some(child) {
            self.children = [self.children[1], None];
        } else if self.children[1] == Some(child) {
            self.children[1] = None;
        }
    }

    pub(crate) fn sibling_of(&self, child: NodeId) -> Option<NodeId> {
        match self.children {
            [Some(first), second] if first == child => second,
            [first, Some(second)] if second == child => first,
            _ => None,
        }
    }
}
