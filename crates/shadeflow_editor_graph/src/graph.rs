// SPDX-License-Identifier: MIT OR Apache-2.0
//! The editable graph model.
//!
//! The model exclusively owns all nodes and connections, enforces the
//! compatibility gate, and fans structural change notifications out to
//! registered observers. All mutation is synchronous and single-threaded:
//! every notification is delivered inline, in registration order, before the
//! mutating call returns.

use crate::compat::{CompatibilityStrategy, FragmentCompatibility};
use crate::connection::{Connection, ConnectionId, ConnectorRef};
use crate::events::{ConnectionAdding, GraphObserver};
use crate::naming::ConnectionNamer;
use crate::node::{Item, Node, NodeId};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

/// A shared, registered observer.
pub type ObserverHandle = Rc<RefCell<dyn GraphObserver>>;

/// The graph of nodes and connections behind the editor surface.
pub struct GraphModel {
    nodes: IndexMap<NodeId, Node>,
    connections: IndexMap<ConnectionId, Connection>,
    next_node: u32,
    next_connection: u32,
    namer: ConnectionNamer,
    compatibility: Box<dyn CompatibilityStrategy>,
    observers: Vec<ObserverHandle>,
}

impl GraphModel {
    /// Create an empty model with the default [`FragmentCompatibility`]
    /// strategy.
    pub fn new() -> Self {
        Self::with_compatibility(Box::new(FragmentCompatibility))
    }

    /// Create an empty model with an explicit compatibility strategy.
    pub fn with_compatibility(strategy: Box<dyn CompatibilityStrategy>) -> Self {
        Self {
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
            next_node: 1,
            next_connection: 1,
            namer: ConnectionNamer::new(),
            compatibility: strategy,
            observers: Vec::new(),
        }
    }

    /// Replace the compatibility strategy.
    pub fn set_compatibility(&mut self, strategy: Box<dyn CompatibilityStrategy>) {
        self.compatibility = strategy;
    }

    /// Register an observer; it is notified after all previously registered
    /// observers.
    pub fn subscribe(&mut self, observer: ObserverHandle) {
        self.observers.push(observer);
    }

    /// Remove a previously registered observer.
    pub fn unsubscribe(&mut self, observer: &ObserverHandle) {
        self.observers.retain(|o| !Rc::ptr_eq(o, observer));
    }

    /// Insert a node, allocating an id if the node carries
    /// [`NodeId::UNASSIGNED`]; emits *NodeAdded*.
    pub fn add_node(&mut self, mut node: Node) -> Result<NodeId, GraphError> {
        if node.id.is_unassigned() {
            node.id = NodeId(self.next_node);
        } else if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        self.next_node = self.next_node.max(node.id.0 + 1);
        let id = node.id;
        self.nodes.insert(id, node);
        tracing::debug!(node = id.0, "node added");
        if let Some(node) = self.nodes.get(&id) {
            self.for_each_observer(|o| o.node_added(node));
        }
        Ok(id)
    }

    /// Remove a node and every connection whose `to` or `from` connector
    /// belongs to it. Each cascaded connection emits *ConnectionRemoving*
    /// before its removal; *NodeRemoved* is emitted after removal completes.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        self.nodes.get(&id)?;
        let touching: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|c| c.involves_node(id))
            .map(|c| c.id)
            .collect();
        for connection_id in touching {
            self.remove_connection(connection_id);
        }
        // shift_remove keeps insertion order, which the patch layer preserves
        let node = self.nodes.shift_remove(&id)?;
        tracing::debug!(node = id.0, "node removed");
        self.for_each_observer(|o| o.node_removed(&node));
        Some(node)
    }

    /// Commit a candidate connection.
    ///
    /// Two-phase: the candidate's connector references are validated, the
    /// compatibility verdict is computed for structural candidates, and a
    /// vetoable *ConnectionAdding* carrying the verdict is emitted. An
    /// incompatible or vetoed candidate fails with no state change.
    /// Committed connections get a default name if unnamed and emit
    /// *ConnectionAdded*. A literal-value candidate overwrites any existing
    /// literal bound to the same connector instead of duplicating it.
    pub fn add_connection(&mut self, mut connection: Connection) -> Result<ConnectionId, GraphError> {
        let to_item = self.resolve_item(connection.to)?;
        let compatible = match connection.from {
            Some(from) => {
                let from_item = self.resolve_item(from)?;
                self.compatibility.can_connect(from_item, to_item)
            }
            None => true,
        };

        let mut adding = ConnectionAdding::new(&connection, compatible);
        self.for_each_observer(|o| o.connection_adding(&mut adding));
        let vetoed = adding.cancelled();
        if !compatible {
            tracing::debug!(?connection.to, "connection rejected as incompatible");
            return Err(GraphError::Incompatible);
        }
        if vetoed {
            tracing::debug!(?connection.to, "connection vetoed by an observer");
            return Err(GraphError::Vetoed);
        }

        self.namer.apply(&mut connection);

        if connection.is_literal() {
            let existing = self
                .connections
                .values()
                .find(|c| c.is_literal() && c.to == connection.to)
                .map(|c| c.id);
            if let Some(existing_id) = existing {
                if let Some(literal) = self.connections.get_mut(&existing_id) {
                    literal.name = connection.name;
                }
                tracing::debug!(connection = existing_id.0, "literal value replaced");
                if let Some(literal) = self.connections.get(&existing_id) {
                    self.for_each_observer(|o| o.connection_added(literal));
                }
                return Ok(existing_id);
            }
        }

        connection.id = ConnectionId(self.next_connection);
        self.next_connection += 1;
        let id = connection.id;
        self.connections.insert(id, connection);
        tracing::debug!(connection = id.0, "connection added");
        if let Some(connection) = self.connections.get(&id) {
            self.for_each_observer(|o| o.connection_added(connection));
        }
        Ok(id)
    }

    /// Remove a connection; emits *ConnectionRemoving* first. Removal is not
    /// vetoable.
    pub fn remove_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        if let Some(connection) = self.connections.get(&id) {
            self.for_each_observer(|o| o.connection_removing(connection));
        }
        let removed = self.connections.shift_remove(&id);
        if removed.is_some() {
            tracing::debug!(connection = id.0, "connection removed");
        }
        removed
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a mutable node by id.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get a connection by id.
    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    /// All connections, in insertion order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Number of connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Connections touching a node.
    pub fn connections_for_node(&self, id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.involves_node(id))
    }

    /// The literal-value connection bound to `connector`, if any.
    pub fn literal(&self, connector: ConnectorRef) -> Option<&Connection> {
        self.connections
            .values()
            .find(|c| c.is_literal() && c.to == connector)
    }

    /// Resolve a connector reference to its item.
    pub fn item(&self, connector: ConnectorRef) -> Option<&Item> {
        self.nodes.get(&connector.node)?.items.get(connector.item)
    }

    /// Restore a connection from a persisted graph: references are
    /// validated, the name counter is advanced past default-shaped labels,
    /// but no compatibility gate applies and no events fire.
    pub(crate) fn restore_connection(
        &mut self,
        mut connection: Connection,
    ) -> Result<ConnectionId, GraphError> {
        self.resolve_item(connection.to)?;
        if let Some(from) = connection.from {
            self.resolve_item(from)?;
        }
        self.namer.note(&connection.name);
        if connection.is_literal() {
            let existing = self
                .connections
                .values()
                .find(|c| c.is_literal() && c.to == connection.to)
                .map(|c| c.id);
            if let Some(existing_id) = existing {
                if let Some(literal) = self.connections.get_mut(&existing_id) {
                    literal.name = connection.name;
                }
                return Ok(existing_id);
            }
        }
        connection.id = ConnectionId(self.next_connection);
        self.next_connection += 1;
        let id = connection.id;
        self.connections.insert(id, connection);
        Ok(id)
    }

    fn resolve_item(&self, connector: ConnectorRef) -> Result<&Item, GraphError> {
        let node = self
            .nodes
            .get(&connector.node)
            .ok_or(GraphError::UnknownNode(connector.node))?;
        node.items
            .get(connector.item)
            .ok_or(GraphError::UnknownConnector(connector))
    }

    fn for_each_observer(&self, mut f: impl FnMut(&mut dyn GraphObserver)) {
        // snapshot so observers may subscribe/unsubscribe during dispatch
        let snapshot: Vec<ObserverHandle> = self.observers.iter().map(Rc::clone).collect();
        for observer in snapshot {
            f(&mut *observer.borrow_mut());
        }
    }
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Error applying a model mutation.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Referenced node is not present in the model
    #[error("node not found: {0:?}")]
    UnknownNode(NodeId),

    /// Referenced item index does not exist on the node
    #[error("connector not found: {0:?}")]
    UnknownConnector(ConnectorRef),

    /// A node with this id is already present
    #[error("duplicate node id: {0:?}")]
    DuplicateNode(NodeId),

    /// The compatibility strategy rejected the candidate pair
    #[error("connectors are not compatible")]
    Incompatible,

    /// An observer vetoed the candidate
    #[error("connection vetoed by an observer")]
    Vetoed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeTag;

    fn procedure(archive: &str) -> Node {
        Node::new(NodeTag::Procedure {
            archive: archive.to_string(),
        })
    }

    fn source_node() -> Node {
        procedure("lighting.sh:Diffuse").with_item(Item::output("result", "float3"))
    }

    fn sink_node() -> Node {
        procedure("surface.sh:Output").with_item(Item::input("albedo", "float3"))
    }

    #[derive(Default)]
    struct EventLog {
        events: Vec<String>,
    }

    impl GraphObserver for EventLog {
        fn node_added(&mut self, node: &Node) {
            self.events.push(format!("node_added {}", node.id.0));
        }
        fn node_removed(&mut self, node: &Node) {
            self.events.push(format!("node_removed {}", node.id.0));
        }
        fn connection_adding(&mut self, event: &mut ConnectionAdding<'_>) {
            self.events
                .push(format!("connection_adding compatible={}", event.compatible));
        }
        fn connection_added(&mut self, connection: &Connection) {
            self.events
                .push(format!("connection_added {}", connection.name));
        }
        fn connection_removing(&mut self, connection: &Connection) {
            self.events
                .push(format!("connection_removing {}", connection.name));
        }
    }

    struct VetoAll;

    impl GraphObserver for VetoAll {
        fn connection_adding(&mut self, event: &mut ConnectionAdding<'_>) {
            event.cancel();
        }
    }

    #[test]
    fn node_ids_are_assigned_and_validated() {
        let mut model = GraphModel::new();
        let a = model.add_node(source_node()).unwrap();
        let b = model.add_node(sink_node()).unwrap();
        assert_eq!((a, b), (NodeId(1), NodeId(2)));

        let explicit = model
            .add_node(source_node().with_id(NodeId(10)))
            .unwrap();
        assert_eq!(explicit, NodeId(10));
        // allocation continues past explicit ids
        assert_eq!(model.add_node(sink_node()).unwrap(), NodeId(11));

        assert!(matches!(
            model.add_node(source_node().with_id(NodeId(2))),
            Err(GraphError::DuplicateNode(NodeId(2)))
        ));
    }

    #[test]
    fn connect_then_remove_source_node() {
        let mut model = GraphModel::new();
        let log = Rc::new(RefCell::new(EventLog::default()));
        model.subscribe(log.clone());

        let a = model.add_node(source_node()).unwrap();
        let b = model.add_node(sink_node()).unwrap();
        let id = model
            .add_connection(Connection::new(
                ConnectorRef::new(a, 0),
                ConnectorRef::new(b, 0),
            ))
            .unwrap();
        assert_eq!(model.connection(id).unwrap().name, "Connection 1");

        model.remove_node(a);
        assert_eq!(model.connection_count(), 0);
        assert!(model.node(a).is_none());
        assert_eq!(
            log.borrow().events,
            vec![
                "node_added 1",
                "node_added 2",
                "connection_adding compatible=true",
                "connection_added Connection 1",
                "connection_removing Connection 1",
                "node_removed 1",
            ]
        );
    }

    #[test]
    fn incompatible_pair_leaves_model_unchanged() {
        let mut model = GraphModel::new();
        let log = Rc::new(RefCell::new(EventLog::default()));
        model.subscribe(log.clone());

        let a = model
            .add_node(procedure("a").with_item(Item::output("out", "float4")))
            .unwrap();
        let b = model
            .add_node(procedure("b").with_item(Item::input("in", "float2")))
            .unwrap();
        let result = model.add_connection(Connection::new(
            ConnectorRef::new(a, 0),
            ConnectorRef::new(b, 0),
        ));
        assert!(matches!(result, Err(GraphError::Incompatible)));
        assert_eq!(model.connection_count(), 0);
        // the adding event still fired, carrying the negative verdict
        assert!(log
            .borrow()
            .events
            .contains(&"connection_adding compatible=false".to_string()));
    }

    #[test]
    fn observers_can_veto_compatible_candidates() {
        let mut model = GraphModel::new();
        model.subscribe(Rc::new(RefCell::new(VetoAll)));

        let a = model.add_node(source_node()).unwrap();
        let b = model.add_node(sink_node()).unwrap();
        let result = model.add_connection(Connection::new(
            ConnectorRef::new(a, 0),
            ConnectorRef::new(b, 0),
        ));
        assert!(matches!(result, Err(GraphError::Vetoed)));
        assert_eq!(model.connection_count(), 0);
    }

    #[test]
    fn default_names_skip_named_connections() {
        let mut model = GraphModel::with_compatibility(Box::new(crate::compat::AlwaysCompatible));
        let a = model
            .add_node(
                source_node()
                    .with_item(Item::output("b", "float"))
                    .with_item(Item::output("c", "float")),
            )
            .unwrap();
        let b = model
            .add_node(
                sink_node()
                    .with_item(Item::input("b", "float"))
                    .with_item(Item::input("c", "float")),
            )
            .unwrap();

        let first = model
            .add_connection(Connection::new(
                ConnectorRef::new(a, 0),
                ConnectorRef::new(b, 0),
            ))
            .unwrap();
        let named = model
            .add_connection(
                Connection::new(ConnectorRef::new(a, 1), ConnectorRef::new(b, 1))
                    .with_name("specular"),
            )
            .unwrap();
        let second = model
            .add_connection(Connection::new(
                ConnectorRef::new(a, 2),
                ConnectorRef::new(b, 2),
            ))
            .unwrap();

        assert_eq!(model.connection(first).unwrap().name, "Connection 1");
        assert_eq!(model.connection(named).unwrap().name, "specular");
        assert_eq!(model.connection(second).unwrap().name, "Connection 2");
    }

    #[test]
    fn second_literal_replaces_the_first() {
        let mut model = GraphModel::new();
        let b = model.add_node(sink_node()).unwrap();
        let connector = ConnectorRef::new(b, 0);

        let first = model
            .add_connection(Connection::literal(connector, "2.5"))
            .unwrap();
        let second = model
            .add_connection(Connection::literal(connector, "3.5"))
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(model.connection_count(), 1);
        assert_eq!(model.literal(connector).unwrap().name, "3.5");
    }

    #[test]
    fn dangling_references_are_rejected_before_any_event() {
        let mut model = GraphModel::new();
        let log = Rc::new(RefCell::new(EventLog::default()));
        model.subscribe(log.clone());

        let b = model.add_node(sink_node()).unwrap();
        let missing_node = model.add_connection(Connection::new(
            ConnectorRef::new(NodeId(99), 0),
            ConnectorRef::new(b, 0),
        ));
        assert!(matches!(missing_node, Err(GraphError::UnknownNode(_))));

        let missing_item = model.add_connection(Connection::literal(ConnectorRef::new(b, 5), "1"));
        assert!(matches!(
            missing_item,
            Err(GraphError::UnknownConnector(_))
        ));

        assert!(!log
            .borrow()
            .events
            .iter()
            .any(|e| e.starts_with("connection_adding")));
    }

    #[test]
    fn remove_node_spares_unrelated_connections() {
        let mut model = GraphModel::new();
        let a = model.add_node(source_node()).unwrap();
        let b = model
            .add_node(sink_node().with_item(Item::output("forward", "float3")))
            .unwrap();
        let c = model.add_node(sink_node()).unwrap();

        model
            .add_connection(Connection::new(
                ConnectorRef::new(a, 0),
                ConnectorRef::new(b, 0),
            ))
            .unwrap();
        let unrelated = model
            .add_connection(Connection::new(
                ConnectorRef::new(b, 1),
                ConnectorRef::new(c, 0),
            ))
            .unwrap();

        model.remove_node(a);
        assert_eq!(model.connection_count(), 1);
        assert!(model.connection(unrelated).is_some());
    }

    #[test]
    fn unsubscribed_observers_stop_receiving() {
        let mut model = GraphModel::new();
        let log = Rc::new(RefCell::new(EventLog::default()));
        let handle: ObserverHandle = log.clone();
        model.subscribe(handle.clone());

        model.add_node(source_node()).unwrap();
        model.unsubscribe(&handle);
        model.add_node(sink_node()).unwrap();

        assert_eq!(log.borrow().events, vec!["node_added 1"]);
    }
}
