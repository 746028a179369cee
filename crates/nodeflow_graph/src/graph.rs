// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.
//!
//! Every mutation keeps output values consistent by propagating inline
//! before it returns (see [`crate::evaluation`]).

use crate::connection::{Connection, ConnectionId, ConnectionState, PlugRef};
use crate::evaluation::{self, PropagationReport};
use crate::events::{GraphEvent, GraphObserver};
use crate::node::{Node, NodeId};
use crate::plug::{Plug, PlugId};
use crate::registry::{NodeRegistry, RegistryError};
use crate::socket::{Socket, SocketError, SocketId, SocketRole};
use crate::value::Value;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Outcome of the toggling [`Graph::connect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// A new connection was created
    Connected(ConnectionId),
    /// The plugs were already joined; that connection was removed
    Disconnected(ConnectionId),
}

/// A node graph
pub struct Graph {
    /// Graph name
    pub name: String,
    registry: Arc<NodeRegistry>,
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Connections between plugs
    connections: IndexMap<ConnectionId, Connection>,
    selection: IndexSet<NodeId>,
    observers: Vec<Box<dyn GraphObserver>>,
    dirty: bool,
}

impl Graph {
    /// Create a new empty graph using the built-in catalogue
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_registry(name, Arc::new(NodeRegistry::with_builtins()))
    }

    /// Create a new empty graph resolving node types through `registry`
    pub fn with_registry(name: impl Into<String>, registry: Arc<NodeRegistry>) -> Self {
        Self {
            name: name.into(),
            registry,
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
            selection: IndexSet::new(),
            observers: Vec::new(),
            dirty: false,
        }
    }

    /// Registry used by [`Graph::create_node`]
    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    /// Register an observer for change events
    pub fn subscribe(&mut self, observer: impl GraphObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Whether the graph changed since the last [`Graph::mark_clean`]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forget pending changes, e.g. after saving
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub(crate) fn emit(&mut self, event: GraphEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
    }

    // ------------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------------

    /// Instantiate a registered node type and add it to the graph
    pub fn create_node(&mut self, type_id: &str) -> Result<NodeId, GraphError> {
        let node = self.registry.create_node(type_id)?;
        self.add_node(node)
    }

    /// Add a node to the graph and compute its outputs.
    ///
    /// Fails if the node, or any of its sockets or plugs, reuses an ID
    /// already present in the graph.
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        for socket in node.sockets() {
            if self.socket_owner(socket.id).is_some() {
                return Err(GraphError::DuplicateSocket(socket.id));
            }
            for plug in socket.plugs() {
                if self.locate_plug(plug.id).is_some() {
                    return Err(GraphError::DuplicatePlug(plug.id));
                }
            }
        }

        let id = node.id;
        self.nodes.insert(id, node);
        self.dirty = true;
        self.emit(GraphEvent::NodeAdded(id));
        self.run_logic(id);
        Ok(id)
    }

    /// Remove a node, severing its connections first.
    ///
    /// Nodes formerly connected to it are re-evaluated.
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        if !self.nodes.contains_key(&node_id) {
            return None;
        }
        let touching: Vec<ConnectionId> =
            self.connections_for_node(node_id).map(|c| c.id).collect();
        for connection_id in touching {
            self.disconnect(connection_id);
        }

        let node = self.nodes.shift_remove(&node_id)?;
        if self.selection.shift_remove(&node_id) {
            self.emit(GraphEvent::SelectionChanged);
        }
        self.dirty = true;
        self.emit(GraphEvent::NodeRemoved(node_id));
        Some(node)
    }

    /// Remove several nodes, returning how many existed
    pub fn remove_nodes(&mut self, node_ids: &[NodeId]) -> usize {
        node_ids
            .iter()
            .filter_map(|id| self.remove_node(*id))
            .count()
    }

    /// Remove every node and connection without propagating
    pub fn remove_all_nodes(&mut self) {
        self.connections.clear();
        self.nodes.clear();
        self.selection.clear();
        self.dirty = true;
        self.emit(GraphEvent::Cleared);
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    ///
    /// Changes made through this handle are not propagated; prefer
    /// [`Graph::set_socket_value`] for user values.
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Move a node
    pub fn set_position(&mut self, node_id: NodeId, position: [f32; 3]) -> Result<(), GraphError> {
        let node = self.nodes.get_mut(&node_id).ok_or(GraphError::NodeNotFound(node_id))?;
        node.position = position;
        self.dirty = true;
        Ok(())
    }

    /// Nodes without any connected input
    pub fn leaf_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.is_leaf())
            .map(|n| n.id)
            .collect()
    }

    // ------------------------------------------------------------------------
    // Sockets & plugs
    // ------------------------------------------------------------------------

    /// Node owning a socket
    pub fn socket_owner(&self, socket_id: SocketId) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|n| n.socket(socket_id).is_some())
            .map(|n| n.id)
    }

    /// Get a socket by ID
    pub fn socket(&self, socket_id: SocketId) -> Option<&Socket> {
        self.nodes.values().find_map(|n| n.socket(socket_id))
    }

    /// Resolve a plug to its node, socket and role
    pub fn locate_plug(&self, plug_id: PlugId) -> Option<PlugRef> {
        self.nodes.values().find_map(|node| {
            node.socket_of_plug(plug_id).map(|socket| PlugRef {
                node: node.id,
                socket: socket.id,
                plug: plug_id,
                role: socket.role,
            })
        })
    }

    /// Get a plug by ID
    pub fn plug(&self, plug_id: PlugId) -> Option<&Plug> {
        let end = self.locate_plug(plug_id)?;
        self.nodes.get(&end.node)?.socket(end.socket)?.plug(plug_id)
    }

    /// Enter a value for a whole input socket, then re-evaluate downstream
    pub fn set_socket_value(
        &mut self,
        node_id: NodeId,
        socket_id: SocketId,
        value: Value,
    ) -> Result<(), GraphError> {
        let node = self.nodes.get_mut(&node_id).ok_or(GraphError::NodeNotFound(node_id))?;
        let socket = node.socket_mut(socket_id).ok_or(GraphError::SocketNotFound(socket_id))?;
        if let Err(error) = socket.set_user_value(value) {
            tracing::warn!("Rejected value for socket '{}': {}", socket.name, error);
            return Err(error.into());
        }
        self.dirty = true;
        self.refresh(node_id);
        Ok(())
    }

    /// Enter a value for one plug, then re-evaluate downstream
    pub fn set_plug_value(&mut self, plug_id: PlugId, value: Value) -> Result<(), GraphError> {
        let end = self.locate_plug(plug_id).ok_or(GraphError::PlugNotFound(plug_id))?;
        self.socket_mut(&end)?.set_plug_user_value(plug_id, value)?;
        self.dirty = true;
        self.refresh(end.node);
        Ok(())
    }

    /// Append a plug to a variadic socket
    pub fn add_plug(
        &mut self,
        socket_id: SocketId,
        label: Option<String>,
    ) -> Result<PlugId, GraphError> {
        let node_id = self.socket_owner(socket_id).ok_or(GraphError::SocketNotFound(socket_id))?;
        let plug_id = self
            .nodes
            .get_mut(&node_id)
            .and_then(|n| n.socket_mut(socket_id))
            .ok_or(GraphError::SocketNotFound(socket_id))?
            .add_plug(label)?;
        self.dirty = true;
        self.refresh(node_id);
        Ok(plug_id)
    }

    /// Remove a plug from a variadic socket, disconnecting it first
    pub fn remove_plug(&mut self, plug_id: PlugId) -> Result<(), GraphError> {
        let end = self.locate_plug(plug_id).ok_or(GraphError::PlugNotFound(plug_id))?;
        if !self.socket_mut(&end)?.kind.is_variadic() {
            return Err(SocketError::NotVariadic(end.socket).into());
        }
        self.disconnect_plug(plug_id);
        self.socket_mut(&end)?.remove_plug(plug_id)?;
        self.dirty = true;
        self.refresh(end.node);
        Ok(())
    }

    fn socket_mut(&mut self, end: &PlugRef) -> Result<&mut Socket, GraphError> {
        self.nodes
            .get_mut(&end.node)
            .and_then(|n| n.socket_mut(end.socket))
            .ok_or(GraphError::SocketNotFound(end.socket))
    }

    // ------------------------------------------------------------------------
    // Connections
    // ------------------------------------------------------------------------

    /// Join two plugs, or split them if they are already joined.
    ///
    /// On success values propagate from the node on the OUT side.
    pub fn connect(&mut self, a: PlugId, b: PlugId) -> Result<ConnectOutcome, ConnectionError> {
        if let Some(existing) = self.find_connection(a, b) {
            self.disconnect(existing);
            return Ok(ConnectOutcome::Disconnected(existing));
        }
        self.connect_plugs(a, b).map(ConnectOutcome::Connected)
    }

    /// Join two plugs without toggle semantics
    pub fn connect_plugs(&mut self, a: PlugId, b: PlugId) -> Result<ConnectionId, ConnectionError> {
        if let Some(existing) = self.find_connection(a, b) {
            return Err(ConnectionError::AlreadyConnected(existing));
        }
        let (a, b) = self.check_connection(a, b)?;
        let id = self.insert_connection(Connection::new(a, b));
        let source = if a.role == SocketRole::Out { a.node } else { b.node };
        self.update_connected_nodes(source);
        Ok(id)
    }

    /// Join two plugs under a recorded ID, without propagating.
    ///
    /// Used when loading; callers run [`Graph::update_all_leaf_nodes`] once
    /// the whole topology is restored.
    pub fn restore_connection(
        &mut self,
        id: ConnectionId,
        a: PlugId,
        b: PlugId,
    ) -> Result<ConnectionId, ConnectionError> {
        if self.connections.contains_key(&id) {
            return Err(ConnectionError::DuplicateId(id));
        }
        if let Some(existing) = self.find_connection(a, b) {
            return Err(ConnectionError::AlreadyConnected(existing));
        }
        let (a, b) = self.check_connection(a, b)?;
        Ok(self.insert_connection(Connection::with_id(id, a, b)))
    }

    fn check_connection(
        &self,
        a: PlugId,
        b: PlugId,
    ) -> Result<(PlugRef, PlugRef), ConnectionError> {
        let a = self.locate_plug(a).ok_or(ConnectionError::PlugNotFound(a))?;
        let b = self.locate_plug(b).ok_or(ConnectionError::PlugNotFound(b))?;

        for end in [&a, &b] {
            if end.role == SocketRole::In && self.is_occupied(end) {
                return Err(ConnectionError::InputOccupied(end.plug));
            }
        }
        if a.node == b.node {
            return Err(ConnectionError::SelfLoop);
        }
        if a.role == b.role {
            return Err(ConnectionError::SameRole);
        }
        Ok((a, b))
    }

    fn is_occupied(&self, end: &PlugRef) -> bool {
        let Some(socket) = self.nodes.get(&end.node).and_then(|n| n.socket(end.socket)) else {
            return false;
        };
        !socket.allow_multi_connect && socket.plug(end.plug).is_some_and(Plug::is_connected)
    }

    fn insert_connection(&mut self, connection: Connection) -> ConnectionId {
        let id = connection.id;
        for end in [connection.a, connection.b] {
            let socket = self.nodes.get_mut(&end.node).and_then(|n| n.socket_mut(end.socket));
            if let Some(socket) = socket {
                socket.set_plug_connected(end.plug, true);
            }
        }
        self.connections.insert(id, connection);
        self.dirty = true;
        self.emit(GraphEvent::Connected(id));
        id
    }

    /// Remove a connection.
    ///
    /// The released input is reset to unset (or re-fed by the connectors still
    /// attached to it) and both former endpoints are re-evaluated.
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        let connection = self.connections.shift_remove(&connection_id)?;
        for end in [connection.a, connection.b] {
            let still_connected = self.connections_at_plug(end.plug).next().is_some();
            let socket = self.nodes.get_mut(&end.node).and_then(|n| n.socket_mut(end.socket));
            if let Some(socket) = socket {
                socket.set_plug_connected(end.plug, still_connected);
            }
        }
        self.dirty = true;
        self.emit(GraphEvent::Disconnected(connection_id));
        evaluation::update_disconnected_nodes(self, &connection);
        Some(connection)
    }

    /// Remove every connection at a plug, returning how many there were
    pub fn disconnect_plug(&mut self, plug_id: PlugId) -> usize {
        let ids: Vec<ConnectionId> = self.connections_at_plug(plug_id).map(|c| c.id).collect();
        ids.into_iter()
            .filter_map(|id| self.disconnect(id))
            .count()
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.involves_node(node_id))
    }

    /// Get connections ending at a plug
    pub fn connections_at_plug(&self, plug_id: PlugId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.involves_plug(plug_id))
    }

    /// The connection joining two plugs, in any order
    pub fn find_connection(&self, a: PlugId, b: PlugId) -> Option<ConnectionId> {
        self.connections.values().find(|c| c.connects(a, b)).map(|c| c.id)
    }

    pub(crate) fn set_connection_state(
        &mut self,
        connection_id: ConnectionId,
        state: ConnectionState,
    ) {
        if let Some(connection) = self.connections.get_mut(&connection_id) {
            connection.state = state;
        }
    }

    /// Connections leaving a node, in output socket and plug order
    pub(crate) fn outgoing_connections(&self, node_id: NodeId) -> Vec<ConnectionId> {
        let Some(node) = self.nodes.get(&node_id) else {
            return Vec::new();
        };
        node.outputs
            .iter()
            .flat_map(|socket| socket.plugs())
            .flat_map(|plug| {
                self.connections
                    .values()
                    .filter(move |c| c.source().plug == plug.id)
                    .map(|c| c.id)
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------------

    /// Run one node's logic
    pub(crate) fn run_logic(&mut self, node_id: NodeId) {
        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.logic();
            self.emit(GraphEvent::NodeEvaluated(node_id));
        }
    }

    /// Write a value into a plug on behalf of a connection
    pub(crate) fn push_value(&mut self, end: &PlugRef, value: Value) {
        if let Some(socket) = self.nodes.get_mut(&end.node).and_then(|n| n.socket_mut(end.socket)) {
            socket.push(end.plug, value);
        }
    }

    /// Reset a plug released by a connection
    pub(crate) fn clear_value(&mut self, end: &PlugRef) {
        if let Some(socket) = self.nodes.get_mut(&end.node).and_then(|n| n.socket_mut(end.socket)) {
            socket.clear_plug(end.plug);
        }
    }

    /// Propagate from `node_id` to everything downstream
    pub fn update_connected_nodes(&mut self, node_id: NodeId) -> PropagationReport {
        evaluation::propagate_from(self, node_id)
    }

    /// Evaluate every leaf node and propagate from each
    pub fn update_all_leaf_nodes(&mut self) -> PropagationReport {
        evaluation::update_all_leaf_nodes(self)
    }

    fn refresh(&mut self, node_id: NodeId) {
        self.run_logic(node_id);
        self.update_connected_nodes(node_id);
    }

    // ------------------------------------------------------------------------
    // Selection & copy
    // ------------------------------------------------------------------------

    /// Change the selection state of a node
    pub fn select_node(&mut self, node_id: NodeId, selected: bool, add_to_selection: bool) {
        if !add_to_selection {
            self.selection.clear();
        }
        if selected && self.nodes.contains_key(&node_id) {
            self.selection.insert(node_id);
        } else {
            self.selection.shift_remove(&node_id);
        }
        self.emit(GraphEvent::SelectionChanged);
    }

    /// Clear the selection
    pub fn deselect_all(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.emit(GraphEvent::SelectionChanged);
        }
    }

    /// Whether a node is selected
    pub fn is_selected(&self, node_id: NodeId) -> bool {
        self.selection.contains(&node_id)
    }

    /// Selected nodes, in selection order
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.selection.iter().copied().collect()
    }

    /// Remove the selected nodes
    pub fn remove_selected(&mut self) -> usize {
        let selected = self.selected_nodes();
        self.remove_nodes(&selected)
    }

    /// Duplicate nodes under fresh IDs, moved by `offset`.
    ///
    /// Connections between two copied nodes are recreated between the copies;
    /// connections to nodes outside the set are not. The copies become the
    /// selection.
    pub fn copy_nodes(&mut self, node_ids: &[NodeId], offset: [f32; 3]) -> Vec<NodeId> {
        let mut plug_map: HashMap<PlugId, PlugId> = HashMap::new();
        let mut copies = Vec::new();

        for node_id in node_ids {
            let Some(original) = self.nodes.get(node_id) else {
                tracing::warn!("Cannot copy missing node {:?}", node_id);
                continue;
            };
            let mut copy = original.duplicate();
            for (axis, delta) in copy.position.iter_mut().zip(offset) {
                *axis += delta;
            }
            for (old, new) in original.sockets().zip(copy.sockets()) {
                for (old_plug, new_plug) in old.plugs().iter().zip(new.plugs()) {
                    plug_map.insert(old_plug.id, new_plug.id);
                }
            }
            copies.push(copy);
        }

        let internal: Vec<(PlugId, PlugId)> = self
            .connections
            .values()
            .filter_map(|c| Some((*plug_map.get(&c.a.plug)?, *plug_map.get(&c.b.plug)?)))
            .collect();

        let mut new_ids = Vec::with_capacity(copies.len());
        for copy in copies {
            match self.add_node(copy) {
                Ok(id) => new_ids.push(id),
                Err(error) => tracing::error!("Failed to add copied node: {}", error),
            }
        }
        for (a, b) in internal {
            match self.check_connection(a, b) {
                Ok((a, b)) => {
                    self.insert_connection(Connection::new(a, b));
                }
                Err(error) => tracing::warn!("Failed to reconnect copied nodes: {}", error),
            }
        }
        self.update_all_leaf_nodes();

        self.selection.clear();
        self.selection.extend(new_ids.iter().copied());
        self.emit(GraphEvent::SelectionChanged);
        new_ids
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("name", &self.name)
            .field("nodes", &self.nodes)
            .field("connections", &self.connections)
            .field("selection", &self.selection)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

/// Error when creating a connection
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConnectionError {
    /// Plug not found
    #[error("Plug not found: {0:?}")]
    PlugNotFound(PlugId),

    /// Input already fed and not multi-connect
    #[error("Input plug already connected: {0:?}")]
    InputOccupied(PlugId),

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,

    /// Both ends are inputs or both are outputs
    #[error("Both plugs have the same role")]
    SameRole,

    /// The plugs are already joined
    #[error("Plugs already connected by {0:?}")]
    AlreadyConnected(ConnectionId),

    /// Connection ID already used
    #[error("Connection ID already in use: {0:?}")]
    DuplicateId(ConnectionId),
}

/// Error when editing the graph
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Node type did not resolve
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Value or plug edit rejected by the socket
    #[error(transparent)]
    Socket(#[from] SocketError),

    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Socket not found
    #[error("Socket not found: {0:?}")]
    SocketNotFound(SocketId),

    /// Plug not found
    #[error("Plug not found: {0:?}")]
    PlugNotFound(PlugId),

    /// Node ID already in the graph
    #[error("Node ID already in use: {0:?}")]
    DuplicateNode(NodeId),

    /// Socket ID already in the graph
    #[error("Socket ID already in use: {0:?}")]
    DuplicateSocket(SocketId),

    /// Plug ID already in the graph
    #[error("Plug ID already in use: {0:?}")]
    DuplicatePlug(PlugId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn out_plug(graph: &Graph, node: NodeId) -> PlugId {
        graph.node(node).unwrap().outputs[0].plugs()[0].id
    }

    fn in_plug(graph: &Graph, node: NodeId, index: usize) -> PlugId {
        graph.node(node).unwrap().inputs[index].plugs()[0].id
    }

    #[test]
    fn test_create_node() {
        let mut graph = Graph::default();
        let id = graph.create_node("multiply").unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node(id).unwrap().type_id(), "multiply");
        assert!(graph.is_dirty());

        assert!(matches!(
            graph.create_node("teleport"),
            Err(GraphError::Registry(RegistryError::UnknownType(_)))
        ));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_add_node_rejects_id_collisions() {
        let mut graph = Graph::default();
        let id = graph.create_node("add").unwrap();
        let clone = graph.node(id).unwrap().clone();
        assert!(matches!(graph.add_node(clone), Err(GraphError::DuplicateNode(_))));

        let mut reused_socket = graph.node(id).unwrap().duplicate();
        reused_socket.inputs[0].id = graph.node(id).unwrap().inputs[0].id;
        assert!(matches!(
            graph.add_node(reused_socket),
            Err(GraphError::DuplicateSocket(_))
        ));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_connection_rules() {
        let mut graph = Graph::default();
        let n1 = graph.create_node("numeric_input").unwrap();
        let n2 = graph.create_node("numeric_input").unwrap();
        let m = graph.create_node("multiply").unwrap();

        // OUT to OUT
        assert!(matches!(
            graph.connect_plugs(out_plug(&graph, n1), out_plug(&graph, n2)),
            Err(ConnectionError::SameRole)
        ));
        // IN to IN
        assert!(matches!(
            graph.connect_plugs(in_plug(&graph, m, 0), in_plug(&graph, n1, 0)),
            Err(ConnectionError::SameRole)
        ));
        // self-loop
        assert!(matches!(
            graph.connect_plugs(out_plug(&graph, m), in_plug(&graph, m, 0)),
            Err(ConnectionError::SelfLoop)
        ));
        assert_eq!(graph.connection_count(), 0);

        // occupied non-multi input, from either side
        graph.connect_plugs(out_plug(&graph, n1), in_plug(&graph, m, 0)).unwrap();
        assert!(matches!(
            graph.connect_plugs(out_plug(&graph, n2), in_plug(&graph, m, 0)),
            Err(ConnectionError::InputOccupied(_))
        ));
        assert!(matches!(
            graph.connect_plugs(in_plug(&graph, m, 0), out_plug(&graph, n2)),
            Err(ConnectionError::InputOccupied(_))
        ));
        assert_eq!(graph.connection_count(), 1);

        // outputs fan out
        graph.connect_plugs(out_plug(&graph, n1), in_plug(&graph, m, 1)).unwrap();
        assert_eq!(graph.connection_count(), 2);
    }

    #[test]
    fn test_connect_toggles() {
        let mut graph = Graph::default();
        let n = graph.create_node("numeric_input").unwrap();
        let m = graph.create_node("multiply").unwrap();
        let (a, b) = (out_plug(&graph, n), in_plug(&graph, m, 0));

        let first = graph.connect(a, b).unwrap();
        let ConnectOutcome::Connected(id) = first else {
            panic!("expected a connection, got {first:?}");
        };
        assert_eq!(graph.connect(b, a).unwrap(), ConnectOutcome::Disconnected(id));
        assert_eq!(graph.connection_count(), 0);
        assert!(!graph.plug(a).unwrap().is_connected());
        assert!(!graph.plug(b).unwrap().is_connected());
    }

    #[test]
    fn test_multi_connect_socket() {
        let mut registry = NodeRegistry::with_builtins();
        registry.load_definitions_str(
            r#"{"Nodes": {"sum": {"name": "Sum", "cat": "Math",
                "in": [{"name": "values", "type": "in", "allowMultiConnect": true}],
                "out": ["total"]}}}"#,
            crate::node::NodeOrigin::Definition,
        )
        .unwrap();
        let mut graph = Graph::with_registry("multi", Arc::new(registry));

        let n1 = graph.create_node("numeric_input").unwrap();
        let n2 = graph.create_node("numeric_input").unwrap();
        let sum = graph.create_node("sum").unwrap();
        graph.connect_plugs(out_plug(&graph, n1), in_plug(&graph, sum, 0)).unwrap();
        graph.connect_plugs(out_plug(&graph, n2), in_plug(&graph, sum, 0)).unwrap();
        assert_eq!(graph.connection_count(), 2);
    }

    #[test]
    fn test_remove_node_severs_connections() {
        let mut graph = Graph::default();
        let n = graph.create_node("numeric_input").unwrap();
        let m = graph.create_node("multiply").unwrap();
        graph.set_socket_value(n, graph.node(n).unwrap().inputs[0].id, 4.0.into()).unwrap();
        graph.connect_plugs(out_plug(&graph, n), in_plug(&graph, m, 0)).unwrap();
        assert_eq!(graph.node(m).unwrap().inputs[0].value(), Value::Number(4.0));

        graph.remove_node(n).unwrap();
        assert_eq!(graph.connection_count(), 0);
        let m = graph.node(m).unwrap();
        assert!(!m.inputs[0].is_connected());
        assert_eq!(m.inputs[0].value(), Value::Unset);
        assert!(graph.remove_node(n).is_none());
    }

    #[test]
    fn test_user_value_rejected_on_connected_input() {
        let mut graph = Graph::default();
        let n = graph.create_node("numeric_input").unwrap();
        let m = graph.create_node("multiply").unwrap();
        graph.connect_plugs(out_plug(&graph, n), in_plug(&graph, m, 0)).unwrap();

        let socket = graph.node(m).unwrap().inputs[0].id;
        assert!(matches!(
            graph.set_socket_value(m, socket, 2.0.into()),
            Err(GraphError::Socket(SocketError::Connected(_)))
        ));
        let output = graph.node(m).unwrap().outputs[0].id;
        assert!(matches!(
            graph.set_socket_value(m, output, 2.0.into()),
            Err(GraphError::Socket(SocketError::OutputSocket(_)))
        ));
    }

    #[test]
    fn test_variadic_plugs() {
        let mut graph = Graph::default();
        let n = graph.create_node("numeric_input").unwrap();
        let collect = graph.create_node("collect").unwrap();
        let socket = graph.node(collect).unwrap().inputs[0].id;

        let extra = graph.add_plug(socket, None).unwrap();
        assert_eq!(graph.node(collect).unwrap().inputs[0].plugs().len(), 3);
        graph.connect_plugs(out_plug(&graph, n), extra).unwrap();
        assert_eq!(
            graph.node(collect).unwrap().outputs[0].value(),
            Value::List(vec![Value::Unset, Value::Unset, Value::Number(0.0)])
        );

        graph.remove_plug(extra).unwrap();
        assert_eq!(graph.connection_count(), 0);
        assert_eq!(
            graph.node(collect).unwrap().outputs[0].value(),
            Value::List(vec![Value::Unset, Value::Unset])
        );

        let add = graph.create_node("add").unwrap();
        let fixed = in_plug(&graph, add, 0);
        assert!(matches!(
            graph.remove_plug(fixed),
            Err(GraphError::Socket(SocketError::NotVariadic(_)))
        ));
    }

    #[test]
    fn test_selection() {
        let mut graph = Graph::default();
        let a = graph.create_node("add").unwrap();
        let b = graph.create_node("add").unwrap();
        let c = graph.create_node("add").unwrap();

        graph.select_node(a, true, false);
        graph.select_node(b, true, true);
        assert_eq!(graph.selected_nodes(), vec![a, b]);
        graph.select_node(c, true, false);
        assert_eq!(graph.selected_nodes(), vec![c]);

        graph.select_node(a, true, true);
        assert_eq!(graph.remove_selected(), 2);
        assert_eq!(graph.node_ids().collect::<Vec<_>>(), vec![b]);
        assert!(graph.selected_nodes().is_empty());
    }

    #[test]
    fn test_copy_preserves_internal_connections() {
        let mut graph = Graph::default();
        let n = graph.create_node("numeric_input").unwrap();
        let m = graph.create_node("multiply").unwrap();
        let outside = graph.create_node("numeric_input").unwrap();
        graph.set_socket_value(n, graph.node(n).unwrap().inputs[0].id, 6.0.into()).unwrap();
        graph.connect_plugs(out_plug(&graph, n), in_plug(&graph, m, 0)).unwrap();
        graph.connect_plugs(out_plug(&graph, outside), in_plug(&graph, m, 1)).unwrap();

        let copies = graph.copy_nodes(&[n, m], [10.0, 5.0, 0.0]);
        assert_eq!(copies.len(), 2);
        assert_eq!(graph.node_count(), 5);
        // internal edge recreated, edge from `outside` not
        assert_eq!(graph.connection_count(), 3);
        assert_eq!(graph.selected_nodes(), copies);

        let n_copy = graph.node(copies[0]).unwrap();
        assert_eq!(n_copy.position, [10.0, 5.0, 0.0]);
        assert_eq!(n_copy.inputs[0].value(), Value::Number(6.0));
        let m_copy = graph.node(copies[1]).unwrap();
        assert!(m_copy.inputs[0].is_connected());
        assert!(!m_copy.inputs[1].is_connected());
        assert_eq!(m_copy.inputs[0].value(), Value::Number(6.0));
        assert_eq!(m_copy.inputs[1].value(), Value::Unset);
    }

    #[test]
    fn test_observers_receive_events() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let mut graph = Graph::default();
        graph.subscribe(move |event: &GraphEvent| sink.lock().push(event.clone()));

        let n = graph.create_node("numeric_input").unwrap();
        let d = graph.create_node("debug_out").unwrap();
        let outcome = graph.connect(out_plug(&graph, n), in_plug(&graph, d, 0)).unwrap();
        let ConnectOutcome::Connected(id) = outcome else {
            panic!("expected a connection");
        };
        graph.disconnect(id);
        graph.remove_all_nodes();

        let events = events.lock();
        assert_eq!(events[0], GraphEvent::NodeAdded(n));
        assert!(events.contains(&GraphEvent::Connected(id)));
        assert!(events.contains(&GraphEvent::Disconnected(id)));
        assert!(events.contains(&GraphEvent::NodeEvaluated(d)));
        assert_eq!(events.last(), Some(&GraphEvent::Cleared));
    }

    #[test]
    fn test_remove_all_nodes() {
        let mut graph = Graph::default();
        let n = graph.create_node("numeric_input").unwrap();
        let m = graph.create_node("multiply").unwrap();
        graph.connect_plugs(out_plug(&graph, n), in_plug(&graph, m, 0)).unwrap();
        graph.select_node(m, true, false);
        graph.mark_clean();

        graph.remove_all_nodes();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.connection_count(), 0);
        assert!(graph.selected_nodes().is_empty());
        assert!(graph.is_dirty());
    }
}
