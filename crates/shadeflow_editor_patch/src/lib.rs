// SPDX-License-Identifier: MIT OR Apache-2.0
//! Patch-layer graph representation for Shadeflow Editor.
//!
//! This crate is contract-only: it defines the generator-facing graph
//! vocabulary that the editable model is converted into for persistence and
//! shader compilation, together with the codec that embeds a serialized
//! graph inside generated shader text.
//!
//! The shader generator itself is an external collaborator, consumed through
//! the [`ShaderGenerator`] trait.

pub mod codec;

use serde::{Deserialize, Serialize};

/// Direction of a connector on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Connector accepts a value
    Input,
    /// Connector produces a value
    Output,
}

/// Semantic role attached to some connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemSemantic {
    /// Connector is backed by a material parameter
    Parameter,
    /// Connector drives an inline preview
    Preview,
}

/// Kind of a node in the patch, carrying its external metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatchNodeKind {
    /// Shader fragment call, resolved through the fragment archive
    Procedure {
        /// Archive path of the fragment this node invokes
        archive: String,
    },
    /// Material parameter source, resolved through the fragment archive
    Parameter {
        /// Archive path of the parameter struct
        archive: String,
    },
    /// Preview sink with no archive backing
    Preview,
}

impl PatchNodeKind {
    /// Archive path referenced by this kind, if any.
    pub fn archive(&self) -> Option<&str> {
        match self {
            Self::Procedure { archive } | Self::Parameter { archive } => Some(archive),
            Self::Preview => None,
        }
    }
}

/// A connector as persisted in the patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchItem {
    /// Connector name
    pub name: String,
    /// Shader value type, e.g. `"float3"`
    pub type_name: String,
    /// Input or output
    pub direction: Direction,
    /// Optional semantic role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic: Option<ItemSemantic>,
}

/// A node as persisted in the patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchNode {
    /// Node id, preserved across conversions
    pub id: u32,
    /// Node kind and external metadata
    pub kind: PatchNodeKind,
    /// Ordered connectors; connections refer to these by index
    pub items: Vec<PatchItem>,
}

/// A structural edge between two connectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchConnection {
    /// Source node id
    pub from_node: u32,
    /// Source connector index on the source node
    pub from_item: usize,
    /// Target node id
    pub to_node: u32,
    /// Target connector index on the target node
    pub to_item: usize,
    /// Cosmetic label
    pub name: String,
}

/// A literal value bound directly to an input connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchConstant {
    /// Target node id
    pub node: u32,
    /// Target connector index
    pub item: usize,
    /// Literal text, e.g. `"1.0f"`
    pub value: String,
}

/// A complete patch: the generator-facing form of an editable graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchGraph {
    /// Nodes, in model insertion order
    pub nodes: Vec<PatchNode>,
    /// Structural edges
    pub connections: Vec<PatchConnection>,
    /// Literal-value edges
    pub constants: Vec<PatchConstant>,
}

impl PatchGraph {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a node by id.
    pub fn node(&self, id: u32) -> Option<&PatchNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// External shader-text generator boundary.
///
/// Implementations must be deterministic: an identical graph, target id and
/// option string always yield byte-identical output. Downstream caching of
/// the generated text relies on this.
pub trait ShaderGenerator {
    /// Generate preview shader source for `target` within `graph`.
    fn generate_preview(
        &self,
        graph: &PatchGraph,
        target: u32,
        options: &str,
    ) -> Result<String, GenerateError>;
}

/// Error raised by a [`ShaderGenerator`] implementation.
#[derive(Debug, thiserror::Error)]
#[error("shader generation failed: {0}")]
pub struct GenerateError(pub String);
