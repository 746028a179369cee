// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the graph.

use crate::node::NodeId;
use crate::plug::PlugId;
use crate::socket::{SocketId, SocketRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// One end of a connection, resolved down to the owning node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlugRef {
    /// Owning node
    pub node: NodeId,
    /// Owning socket
    pub socket: SocketId,
    /// The plug itself
    pub plug: PlugId,
    /// Role of the owning socket
    pub role: SocketRole,
}

/// Result of the last propagation that crossed a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not traversed yet
    #[default]
    Idle,
    /// Traversed and values pushed
    Checked,
    /// Revisited inside one propagation call: part of a feedback loop
    Feedback,
}

/// A connection between two plugs.
///
/// Lookup is symmetric (`a`/`b` carry no direction); propagation reads the
/// OUT end as source and the IN end as sink.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// First endpoint, as given to connect
    pub a: PlugRef,
    /// Second endpoint, as given to connect
    pub b: PlugRef,
    /// Propagation marker
    pub state: ConnectionState,
}

impl Connection {
    /// Create a new connection
    pub fn new(a: PlugRef, b: PlugRef) -> Self {
        Self::with_id(ConnectionId::new(), a, b)
    }

    /// Create a connection with a known ID
    pub fn with_id(id: ConnectionId, a: PlugRef, b: PlugRef) -> Self {
        Self {
            id,
            a,
            b,
            state: ConnectionState::Idle,
        }
    }

    /// The OUT endpoint
    pub fn source(&self) -> &PlugRef {
        if self.a.role == SocketRole::Out {
            &self.a
        } else {
            &self.b
        }
    }

    /// The IN endpoint
    pub fn sink(&self) -> &PlugRef {
        if self.a.role == SocketRole::Out {
            &self.b
        } else {
            &self.a
        }
    }

    /// Check if this connection joins plugs `x` and `y`, in any order
    pub fn connects(&self, x: PlugId, y: PlugId) -> bool {
        (self.a.plug == x && self.b.plug == y) || (self.a.plug == y && self.b.plug == x)
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.a.node == node_id || self.b.node == node_id
    }

    /// Check if this connection involves a specific socket
    pub fn involves_socket(&self, socket_id: SocketId) -> bool {
        self.a.socket == socket_id || self.b.socket == socket_id
    }

    /// Check if this connection involves a specific plug
    pub fn involves_plug(&self, plug_id: PlugId) -> bool {
        self.a.plug == plug_id || self.b.plug == plug_id
    }

    /// The endpoint opposite to `node_id`, if the connection touches it
    pub fn other_end(&self, node_id: NodeId) -> Option<&PlugRef> {
        if self.a.node == node_id {
            Some(&self.b)
        } else if self.b.node == node_id {
            Some(&self.a)
        } else {
            None
        }
    }
}
