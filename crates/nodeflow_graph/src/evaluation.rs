// SPDX-License-Identifier: MIT OR Apache-2.0
//! Incremental dataflow evaluation.
//!
//! Propagation walks connections depth-first from a start node: for every
//! connection leaving it, the source node's logic runs, the value is pushed
//! into the sink plug and the sink node's logic runs, then the walk recurses
//! into the sink node. The connections on the current recursion path are
//! kept on an explicit stack; meeting one of them again means the graph
//! contains a feedback loop, and the walk stops along that connection.

use crate::connection::{Connection, ConnectionId, ConnectionState};
use crate::events::GraphEvent;
use crate::graph::Graph;
use crate::node::NodeId;
use indexmap::IndexSet;

/// What a propagation call touched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationReport {
    /// Nodes whose logic ran, in first-visit order
    pub visited: IndexSet<NodeId>,
    /// Connections found to close a feedback loop
    pub feedback: Vec<ConnectionId>,
}

impl PropagationReport {
    /// Whether a feedback loop was found
    pub fn has_feedback(&self) -> bool {
        !self.feedback.is_empty()
    }

    fn merge(&mut self, other: PropagationReport) {
        self.visited.extend(other.visited);
        for id in other.feedback {
            if !self.feedback.contains(&id) {
                self.feedback.push(id);
            }
        }
    }
}

/// Propagate from one node with a fresh connection stack
pub(crate) fn propagate_from(graph: &mut Graph, start: NodeId) -> PropagationReport {
    let mut report = PropagationReport::default();
    let mut stack = Vec::new();
    propagate(graph, start, &mut stack, &mut report);
    flag_feedback(graph, &report);
    report
}

/// Evaluate every leaf node and propagate from each.
///
/// Brings a freshly restored graph to a consistent state regardless of the
/// order its connections were restored in.
pub(crate) fn update_all_leaf_nodes(graph: &mut Graph) -> PropagationReport {
    let mut report = PropagationReport::default();
    for leaf in graph.leaf_nodes() {
        graph.run_logic(leaf);
        report.visited.insert(leaf);
        let mut single = PropagationReport::default();
        let mut stack = Vec::new();
        propagate(graph, leaf, &mut stack, &mut single);
        report.merge(single);
    }
    flag_feedback(graph, &report);
    report
}

/// Re-evaluate both former endpoints of a removed connection.
///
/// The released sink plug is cleared first, then re-fed by any connection
/// still attached to it.
pub(crate) fn update_disconnected_nodes(graph: &mut Graph, connection: &Connection) {
    let source = *connection.source();
    let sink = *connection.sink();
    clear_stale_feedback(graph);

    graph.run_logic(source.node);
    propagate_from(graph, source.node);

    graph.clear_value(&sink);
    let remaining: Vec<Connection> = graph.connections_at_plug(sink.plug).cloned().collect();
    for other in remaining {
        if let Some(value) = graph.plug(other.source().plug).map(|p| p.value().clone()) {
            graph.push_value(&sink, value);
        }
    }

    graph.run_logic(sink.node);
    propagate_from(graph, sink.node);
}

fn propagate(
    graph: &mut Graph,
    node_id: NodeId,
    stack: &mut Vec<ConnectionId>,
    report: &mut PropagationReport,
) {
    report.visited.insert(node_id);

    for connection_id in graph.outgoing_connections(node_id) {
        let Some(connection) = graph.connection(connection_id).cloned() else {
            continue;
        };
        let source = *connection.source();
        let sink = *connection.sink();

        graph.set_connection_state(connection_id, ConnectionState::Checked);
        graph.run_logic(source.node);
        let value = graph.plug(source.plug).map(|p| p.value().clone()).unwrap_or_default();
        graph.push_value(&sink, value);
        graph.run_logic(sink.node);
        report.visited.insert(sink.node);

        if stack.contains(&connection_id) {
            tracing::debug!("Feedback loop through connection {:?}", connection_id);
            if !report.feedback.contains(&connection_id) {
                report.feedback.push(connection_id);
            }
            continue;
        }

        stack.push(connection_id);
        propagate(graph, sink.node, stack, report);
        stack.pop();
    }
}

/// Reset feedback markers on connections that no longer close a loop
fn clear_stale_feedback(graph: &mut Graph) {
    let view: &Graph = graph;
    let stale: Vec<ConnectionId> = view
        .connections()
        .filter(|c| c.state == ConnectionState::Feedback)
        .filter(|c| !reaches(view, c.sink().node, c.source().node))
        .map(|c| c.id)
        .collect();
    for connection_id in stale {
        graph.set_connection_state(connection_id, ConnectionState::Checked);
    }
}

fn reaches(graph: &Graph, from: NodeId, to: NodeId) -> bool {
    let mut seen = IndexSet::new();
    let mut pending = vec![from];
    while let Some(node_id) = pending.pop() {
        if node_id == to {
            return true;
        }
        if seen.insert(node_id) {
            pending.extend(
                graph
                    .connections()
                    .filter(|c| c.source().node == node_id)
                    .map(|c| c.sink().node),
            );
        }
    }
    false
}

fn flag_feedback(graph: &mut Graph, report: &PropagationReport) {
    for connection_id in &report.feedback {
        graph.set_connection_state(*connection_id, ConnectionState::Feedback);
        graph.emit(GraphEvent::FeedbackDetected(*connection_id));
    }
}
