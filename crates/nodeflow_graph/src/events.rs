// SPDX-License-Identifier: MIT OR Apache-2.0
//! Change notifications for views observing a graph.

use crate::connection::ConnectionId;
use crate::node::NodeId;

/// Something that changed in a graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    /// A node was added
    NodeAdded(NodeId),
    /// A node was removed
    NodeRemoved(NodeId),
    /// A connection was created
    Connected(ConnectionId),
    /// A connection was removed
    Disconnected(ConnectionId),
    /// A node's logic ran and its outputs may have changed
    NodeEvaluated(NodeId),
    /// A connection was found to close a feedback loop
    FeedbackDetected(ConnectionId),
    /// The selection changed
    SelectionChanged,
    /// All nodes and connections were removed
    Cleared,
}

/// Receives graph events synchronously, in the order they happen
pub trait GraphObserver: Send {
    /// Called after each change
    fn on_event(&mut self, event: &GraphEvent);
}

impl<F> GraphObserver for F
where
    F: FnMut(&GraphEvent) + Send,
{
    fn on_event(&mut self, event: &GraphEvent) {
        self(event);
    }
}
