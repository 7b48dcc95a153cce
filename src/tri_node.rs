//! The binary triangle tree element ("bintree node").

/// An arena index into a `NodePool`. Deliberately `Option<NodeHandle>` rather than a sentinel
/// integer for "no link": `Option` is the idiomatic Rust spelling of an optional arena link and
/// lets the compiler catch a forgotten null-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub(crate) u32);

impl NodeHandle {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// An index into the landscape's shared vertex buffer, always a multiple of three (three
/// consecutive positions make up one rendered leaf triangle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexSlot(pub(crate) u32);

impl VertexSlot {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One element of a patch's bintree. Either both children are present (internal) or both are
/// absent (leaf) — `TriNode::is_leaf` / `is_internal` enforce reading that invariant rather than
/// the two fields independently.
#[derive(Debug, Clone, Copy)]
pub struct TriNode {
    pub(crate) left_child: Option<NodeHandle>,
    pub(crate) right_child: Option<NodeHandle>,
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) base_neighbor: Option<NodeHandle>,
    pub(crate) left_neighbor: Option<NodeHandle>,
    pub(crate) right_neighbor: Option<NodeHandle>,
    pub(crate) vertex_slot: Option<VertexSlot>,
    pub(crate) is_rendered: bool,
    pub(crate) is_tessellated: bool,
}

impl Default for TriNode {
    fn default() -> Self {
        Self {
            left_child: None,
            right_child: None,
            parent: None,
            base_neighbor: None,
            left_neighbor: None,
            right_neighbor: None,
            vertex_slot: None,
            is_rendered: false,
            is_tessellated: false,
        }
    }
}

impl TriNode {
    pub fn is_leaf(&self) -> bool {
        debug_assert_eq!(self.left_child.is_none(), self.right_child.is_none());
        self.left_child.is_none()
    }

    pub fn is_internal(&self) -> bool {
        !self.is_leaf()
    }
}
