// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversion between the editable model and the patch layer.
//!
//! [`to_patch_layer`] and [`from_patch_layer`] are stateless transforms.
//! For any model whose connections reference only present connectors (which
//! the model guarantees), the pair is a structural bijection: node ids,
//! tags, connector indices, literal values and connection labels all
//! survive the round trip.

use crate::archive::FragmentArchive;
use crate::connection::{Connection, ConnectorRef};
use crate::graph::{GraphError, GraphModel};
use crate::node::{Item, Node, NodeId, NodeTag};
use shadeflow_editor_patch::{
    PatchConnection, PatchConstant, PatchGraph, PatchItem, PatchNode, PatchNodeKind,
};

/// Produce the generator-facing patch for a model.
pub fn to_patch_layer(model: &GraphModel) -> PatchGraph {
    let mut patch = PatchGraph::new();
    for node in model.nodes() {
        patch.nodes.push(PatchNode {
            id: node.id.0,
            kind: patch_kind(&node.tag),
            items: node.items.iter().map(patch_item).collect(),
        });
    }
    for connection in model.connections() {
        match connection.from {
            Some(from) => patch.connections.push(PatchConnection {
                from_node: from.node.0,
                from_item: from.item,
                to_node: connection.to.node.0,
                to_item: connection.to.item,
                name: connection.name.clone(),
            }),
            None => patch.constants.push(PatchConstant {
                node: connection.to.node.0,
                item: connection.to.item,
                value: connection.name.clone(),
            }),
        }
    }
    patch
}

/// Reconstruct an editable model from a patch.
///
/// `archive` resolves the external references carried by procedure and
/// parameter tags; an unresolvable reference fails the whole conversion and
/// no partial model is returned. Patch nodes persisted without connectors
/// fall back to the resolved fragment signature.
pub fn from_patch_layer(
    patch: &PatchGraph,
    archive: &dyn FragmentArchive,
) -> Result<GraphModel, ConvertError> {
    let mut model = GraphModel::new();
    for patch_node in &patch.nodes {
        let tag = model_tag(&patch_node.kind);
        let items = if patch_node.items.is_empty() {
            match tag.archive() {
                Some(path) => archive.resolve(path)?.items,
                None => Vec::new(),
            }
        } else {
            if let Some(path) = tag.archive() {
                archive.resolve(path)?;
            }
            patch_node.items.iter().map(model_item).collect()
        };
        let node = Node {
            id: NodeId(patch_node.id),
            tag,
            items,
        };
        model.add_node(node)?;
    }
    for connection in &patch.connections {
        model.restore_connection(
            Connection::new(
                ConnectorRef::new(NodeId(connection.from_node), connection.from_item),
                ConnectorRef::new(NodeId(connection.to_node), connection.to_item),
            )
            .with_name(connection.name.clone()),
        )?;
    }
    for constant in &patch.constants {
        model.restore_connection(Connection::literal(
            ConnectorRef::new(NodeId(constant.node), constant.item),
            constant.value.clone(),
        ))?;
    }
    Ok(model)
}

fn patch_kind(tag: &NodeTag) -> PatchNodeKind {
    match tag {
        NodeTag::Procedure { archive } => PatchNodeKind::Procedure {
            archive: archive.clone(),
        },
        NodeTag::Parameter { archive } => PatchNodeKind::Parameter {
            archive: archive.clone(),
        },
        NodeTag::Preview => PatchNodeKind::Preview,
    }
}

fn model_tag(kind: &PatchNodeKind) -> NodeTag {
    match kind {
        PatchNodeKind::Procedure { archive } => NodeTag::Procedure {
            archive: archive.clone(),
        },
        PatchNodeKind::Parameter { archive } => NodeTag::Parameter {
            archive: archive.clone(),
        },
        PatchNodeKind::Preview => NodeTag::Preview,
    }
}

fn patch_item(item: &Item) -> PatchItem {
    PatchItem {
        name: item.name.clone(),
        type_name: item.type_name.clone(),
        direction: item.direction,
        semantic: item.semantic,
    }
}

fn model_item(item: &PatchItem) -> Item {
    Item {
        name: item.name.clone(),
        type_name: item.type_name.clone(),
        direction: item.direction,
        semantic: item.semantic,
    }
}

/// Error reconstructing a model from a patch.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A node tag references an archive entry that cannot be resolved
    #[error(transparent)]
    Resolution(#[from] crate::archive::ResolutionError),

    /// The patch references connectors or node ids the model rejects
    #[error("patch rejected by the graph model: {0}")]
    Invalid(#[from] GraphError),
}
