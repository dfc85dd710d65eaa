// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the editable graph.

pub use shadeflow_editor_patch::{Direction, ItemSemantic};

/// Unique identifier for a node within a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel for a node that has not been inserted into a model yet.
    ///
    /// [`GraphModel::add_node`](crate::GraphModel::add_node) replaces it with
    /// a freshly allocated id; inserted nodes always carry a nonzero id.
    pub const UNASSIGNED: NodeId = NodeId(0);

    /// Whether this id is the unassigned sentinel.
    pub fn is_unassigned(self) -> bool {
        self == Self::UNASSIGNED
    }
}

/// Domain metadata carried by a node.
///
/// The set of node kinds is closed: procedure nodes invoke a shader fragment
/// from the archive, parameter nodes surface a material parameter struct, and
/// preview nodes are archive-less sinks for inline previews.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTag {
    /// Shader fragment call
    Procedure {
        /// Archive path of the invoked fragment
        archive: String,
    },
    /// Material parameter source
    Parameter {
        /// Archive path of the parameter struct
        archive: String,
    },
    /// Preview sink
    Preview,
}

impl NodeTag {
    /// Archive path referenced by this tag, if any.
    pub fn archive(&self) -> Option<&str> {
        match self {
            Self::Procedure { archive } | Self::Parameter { archive } => Some(archive),
            Self::Preview => None,
        }
    }
}

/// A connector on a node.
///
/// Items never exist outside their owning node; externally they are referred
/// to by `(node id, item index)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Connector name
    pub name: String,
    /// Shader value type, e.g. `"float3"`
    pub type_name: String,
    /// Input or output
    pub direction: Direction,
    /// Optional semantic role
    pub semantic: Option<ItemSemantic>,
}

impl Item {
    /// Create an input connector.
    pub fn input(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            direction: Direction::Input,
            semantic: None,
        }
    }

    /// Create an output connector.
    pub fn output(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            direction: Direction::Output,
            semantic: None,
        }
    }

    /// Attach a semantic role.
    pub fn with_semantic(mut self, semantic: ItemSemantic) -> Self {
        self.semantic = Some(semantic);
        self
    }
}

/// A node instance in the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique instance id; [`NodeId::UNASSIGNED`] until inserted
    pub id: NodeId,
    /// Domain metadata
    pub tag: NodeTag,
    /// Ordered connectors
    pub items: Vec<Item>,
}

impl Node {
    /// Create a node with no connectors and an unassigned id.
    pub fn new(tag: NodeTag) -> Self {
        Self {
            id: NodeId::UNASSIGNED,
            tag,
            items: Vec::new(),
        }
    }

    /// Set an explicit id, validated on insertion.
    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = id;
        self
    }

    /// Append a connector.
    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    /// Get a connector by index.
    pub fn item(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// All input connectors, in item order.
    pub fn inputs(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|i| i.direction == Direction::Input)
    }

    /// All output connectors, in item order.
    pub fn outputs(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|i| i.direction == Direction::Output)
    }
}
