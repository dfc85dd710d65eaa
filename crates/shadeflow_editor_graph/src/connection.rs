// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the editable graph.

use crate::node::NodeId;

/// Unique identifier for a connection within a model.
///
/// Runtime handle only; connection ids are assigned monotonically, never
/// reused, and are not part of the persisted representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u32);

impl ConnectionId {
    /// Sentinel for a connection that has not been committed yet.
    pub const UNASSIGNED: ConnectionId = ConnectionId(0);
}

/// External identity of a connector: owning node plus item index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectorRef {
    /// Owning node
    pub node: NodeId,
    /// Index into the node's item sequence
    pub item: usize,
}

impl ConnectorRef {
    /// Create a connector reference.
    pub fn new(node: NodeId, item: usize) -> Self {
        Self { node, item }
    }
}

/// A link between two connectors, or between a literal value and one
/// connector.
///
/// `from == None` makes this a literal-value edge: `name` then holds the
/// literal text (e.g. `"1.0f"`) bound directly to the `to` connector. With
/// `from` set, `name` is a cosmetic label, auto-assigned when left empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    /// Unique handle; [`ConnectionId::UNASSIGNED`] until committed
    pub id: ConnectionId,
    /// Source connector; `None` for literal-value edges
    pub from: Option<ConnectorRef>,
    /// Target connector
    pub to: ConnectorRef,
    /// Label, or the literal text for literal-value edges
    pub name: String,
}

impl Connection {
    /// Create an unnamed structural edge candidate.
    pub fn new(from: ConnectorRef, to: ConnectorRef) -> Self {
        Self {
            id: ConnectionId::UNASSIGNED,
            from: Some(from),
            to,
            name: String::new(),
        }
    }

    /// Create a literal-value edge bound to `to`.
    pub fn literal(to: ConnectorRef, value: impl Into<String>) -> Self {
        Self {
            id: ConnectionId::UNASSIGNED,
            from: None,
            to,
            name: value.into(),
        }
    }

    /// Set an explicit label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether this is a literal-value edge.
    pub fn is_literal(&self) -> bool {
        self.from.is_none()
    }

    /// Whether this connection touches a connector of `node_id`.
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.to.node == node_id || self.from.is_some_and(|f| f.node == node_id)
    }
}
