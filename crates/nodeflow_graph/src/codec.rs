// SPDX-License-Identifier: MIT OR Apache-2.0
//! Project document: the persisted form of a graph.
//!
//! Only user-entered values are written; propagated values are recomputed
//! after loading. Loading runs in three phases:
//!
//! 1. instantiate every node through the registry and restore its IDs and
//!    user values (nodes of unknown type are skipped),
//! 2. restore every connection whose endpoints resolved,
//! 3. evaluate all leaf nodes once to make the graph consistent.

use crate::connection::ConnectionId;
use crate::graph::Graph;
use crate::node::{Node, NodeId};
use crate::plug::{Plug, PlugId};
use crate::socket::{Socket, SocketId};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Project document version written by this crate
pub const PROJECT_VERSION: &str = "0.1";

/// Persisted graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDocument {
    /// Format version
    #[serde(rename = "ProjectVersion")]
    pub project_version: String,
    /// Node records
    #[serde(rename = "Nodes", default)]
    pub nodes: Vec<NodeRecord>,
    /// Connection records
    #[serde(rename = "Connections", default)]
    pub connections: Vec<ConnectionRecord>,
}

/// Persisted node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node ID
    pub id: NodeId,
    /// Qualified type, e.g. `builtin::multiply`
    #[serde(rename = "type")]
    pub node_type: String,
    /// Registry key
    #[serde(rename = "typeName", default)]
    pub type_name: String,
    /// Position as `(x, y, z)`
    #[serde(default)]
    pub pos: String,
    /// Input sockets in order
    #[serde(rename = "inSockets", default)]
    pub in_sockets: Vec<SocketRecord>,
    /// Output sockets in order
    #[serde(rename = "outSockets", default)]
    pub out_sockets: Vec<SocketRecord>,
}

/// Persisted socket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketRecord {
    /// Socket ID
    pub id: SocketId,
    /// Socket name
    pub name: String,
    /// Kind name, e.g. `NumericSocket`
    #[serde(rename = "socketType")]
    pub socket_type: String,
    /// Multi-connect flag
    #[serde(rename = "allowMultiConnect", default)]
    pub allow_multi_connect: bool,
    /// Kind-specific arguments
    #[serde(rename = "extraArgs", default)]
    pub extra_args: Vec<Value>,
    /// User-entered value of a fixed socket; variadic sockets keep theirs per plug
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Plugs in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugs: Vec<PlugRecord>,
}

/// Persisted plug
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlugRecord {
    /// Plug ID
    pub id: PlugId,
    /// Dictionary key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// User-entered value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Persisted connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionRecord {
    /// Connection ID
    pub id: ConnectionId,
    /// Node of the first endpoint
    #[serde(rename = "nodeA_ID")]
    pub node_a: NodeId,
    /// Node of the second endpoint
    #[serde(rename = "nodeB_ID")]
    pub node_b: NodeId,
    /// Socket of the first endpoint
    #[serde(rename = "socketA_ID")]
    pub socket_a: SocketId,
    /// Socket of the second endpoint
    #[serde(rename = "socketB_ID")]
    pub socket_b: SocketId,
    /// Plug of the first endpoint
    #[serde(rename = "plugA_ID", default, skip_serializing_if = "Option::is_none")]
    pub plug_a: Option<PlugId>,
    /// Plug of the second endpoint
    #[serde(rename = "plugB_ID", default, skip_serializing_if = "Option::is_none")]
    pub plug_b: Option<PlugId>,
}

/// Outcome of loading a document into a graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Nodes created
    pub nodes_loaded: usize,
    /// Connections restored
    pub connections_loaded: usize,
    /// Types of nodes that could not be created
    pub skipped_nodes: Vec<String>,
    /// Connections whose endpoints did not resolve
    pub skipped_connections: Vec<ConnectionId>,
    /// Socket records that did not match the node or its values
    pub socket_warnings: usize,
}

impl LoadReport {
    /// Whether everything in the document was restored
    pub fn is_complete(&self) -> bool {
        self.skipped_nodes.is_empty()
            && self.skipped_connections.is_empty()
            && self.socket_warnings == 0
    }
}

impl ProjectDocument {
    /// Capture the persistent state of a graph
    pub fn from_graph(graph: &Graph) -> Self {
        let nodes = graph.nodes().map(NodeRecord::from_node).collect();
        let connections = graph
            .connections()
            .map(|c| ConnectionRecord {
                id: c.id,
                node_a: c.a.node,
                node_b: c.b.node,
                socket_a: c.a.socket,
                socket_b: c.b.socket,
                plug_a: Some(c.a.plug),
                plug_b: Some(c.b.plug),
            })
            .collect();

        Self {
            project_version: PROJECT_VERSION.to_string(),
            nodes,
            connections,
        }
    }

    /// Parse a document, rejecting versions newer than [`PROJECT_VERSION`]
    pub fn from_json_str(json: &str) -> Result<Self, CodecError> {
        let document: Self = serde_json::from_str(json)?;

        // Version check
        if compare_versions(&document.project_version, PROJECT_VERSION)? == Ordering::Greater {
            return Err(CodecError::UnsupportedVersion {
                found: document.project_version,
                supported: PROJECT_VERSION.to_string(),
            });
        }
        Ok(document)
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replace the contents of `graph` with this document.
    ///
    /// Per-entity failures are logged and counted in the report; they never
    /// abort the load.
    pub fn load_into(&self, graph: &mut Graph) -> LoadReport {
        let mut report = LoadReport::default();
        graph.remove_all_nodes();

        // Phase 1: nodes
        for record in &self.nodes {
            let Some(mut node) = record.instantiate(graph, &mut report) else {
                report.skipped_nodes.push(record.node_type.clone());
                continue;
            };
            node.id = record.id;
            match graph.add_node(node) {
                Ok(_) => report.nodes_loaded += 1,
                Err(error) => {
                    tracing::error!("Failed to add node {:?}: {}", record.id, error);
                    report.skipped_nodes.push(record.node_type.clone());
                }
            }
        }

        // Phase 2: connections
        for record in &self.connections {
            let endpoints = record.resolve(graph).and_then(|(a, b)| {
                graph
                    .restore_connection(record.id, a, b)
                    .map_err(|e| e.to_string())
            });
            match endpoints {
                Ok(_) => report.connections_loaded += 1,
                Err(reason) => {
                    tracing::error!("Skipping connection {:?}: {}", record.id, reason);
                    report.skipped_connections.push(record.id);
                }
            }
        }

        // Phase 3: consistency
        graph.update_all_leaf_nodes();
        graph.mark_clean();

        if !report.is_complete() {
            tracing::warn!(
                "Project loaded with {} skipped nodes and {} skipped connections",
                report.skipped_nodes.len(),
                report.skipped_connections.len()
            );
        }
        report
    }
}

impl NodeRecord {
    fn from_node(node: &Node) -> Self {
        let [x, y, z] = node.position;
        Self {
            id: node.id,
            node_type: node.descriptor().qualified_type(),
            type_name: node.type_id().to_string(),
            pos: format!("({x}, {y}, {z})"),
            in_sockets: node.inputs.iter().map(SocketRecord::from_socket).collect(),
            out_sockets: node.outputs.iter().map(SocketRecord::from_socket).collect(),
        }
    }

    fn instantiate(&self, graph: &Graph, report: &mut LoadReport) -> Option<Node> {
        let registry = graph.registry();
        // Qualified type first; `typeName` alone may be shadowed by a built-in
        let descriptor = [self.node_type.as_str(), self.type_name.as_str()]
            .into_iter()
            .filter(|key| !key.is_empty())
            .find_map(|key| registry.get(key).cloned());
        let Some(descriptor) = descriptor else {
            tracing::error!("Unknown node type '{}' for node {:?}", self.node_type, self.id);
            return None;
        };

        let mut node = Node::new(descriptor);
        node.position = parse_position(&self.pos);
        let groups = [
            (&mut node.inputs, &self.in_sockets),
            (&mut node.outputs, &self.out_sockets),
        ];
        for (sockets, records) in groups {
            if sockets.len() != records.len() {
                tracing::warn!(
                    "Node '{}' has {} sockets where the document records {}",
                    node.name,
                    sockets.len(),
                    records.len()
                );
                report.socket_warnings += 1;
            }
            for (socket, record) in sockets.iter_mut().zip(records) {
                report.socket_warnings += record.restore(socket, graph);
            }
        }
        Some(node)
    }
}

impl SocketRecord {
    fn from_socket(socket: &Socket) -> Self {
        let plugs = socket
            .plugs()
            .iter()
            .map(|plug| PlugRecord {
                id: plug.id,
                label: plug.label.clone(),
                value: plug.has_user_value().then(|| plug.value().clone()),
            })
            .collect();

        Self {
            id: socket.id,
            name: socket.name.clone(),
            socket_type: socket.kind.type_name().to_string(),
            allow_multi_connect: socket.allow_multi_connect,
            extra_args: socket.extra_args.clone(),
            value: (socket.has_user_value() && !socket.kind.is_variadic()).then(|| socket.value()),
            plugs,
        }
    }

    /// Apply IDs and user values to a freshly built socket, returning the
    /// number of problems found
    fn restore(&self, socket: &mut Socket, graph: &Graph) -> usize {
        let mut warnings = 0;
        match graph.registry().socket_kind_by_type_name(&self.socket_type) {
            Some(kind) if kind == socket.kind => {}
            Some(kind) => {
                tracing::warn!(
                    "Socket '{}' recorded as {} but built as {}",
                    self.name,
                    kind.type_name(),
                    socket.kind.type_name()
                );
                warnings += 1;
            }
            None => {
                tracing::warn!(
                    "Unknown socket type '{}' on socket '{}'",
                    self.socket_type,
                    self.name
                );
                warnings += 1;
            }
        }

        socket.id = self.id;
        if !self.extra_args.is_empty() {
            socket.extra_args = self.extra_args.clone();
        }

        if self.plugs.is_empty() {
            if let Some(value) = &self.value {
                if let Err(error) = socket.set_user_value(value.clone()) {
                    tracing::warn!("Dropping stored value of socket '{}': {}", self.name, error);
                    warnings += 1;
                }
            }
            return warnings;
        }

        let keep = if socket.kind.is_variadic() { self.plugs.len() } else { 1 };
        if self.plugs.len() > keep {
            tracing::warn!(
                "Socket '{}' takes one plug, document records {}",
                self.name,
                self.plugs.len()
            );
            warnings += 1;
        }
        for (index, record) in self.plugs.iter().take(keep).enumerate() {
            match socket.plugs_mut().get_mut(index) {
                Some(plug) => {
                    plug.id = record.id;
                    plug.label = record.label.clone();
                }
                None => {
                    let mut plug = Plug::with_id(record.id);
                    plug.label = record.label.clone();
                    socket.push_plug(plug);
                }
            }
        }
        if socket.kind.is_variadic() {
            socket.truncate_plugs(keep);
        }
        for record in self.plugs.iter().take(keep) {
            if let Some(value) = &record.value {
                if let Err(error) = socket.set_plug_user_value(record.id, value.clone()) {
                    tracing::warn!("Dropping stored value of socket '{}': {}", self.name, error);
                    warnings += 1;
                }
            }
        }
        warnings
    }
}

impl ConnectionRecord {
    /// Resolve both endpoints to plugs of nodes present in the graph
    fn resolve(&self, graph: &Graph) -> Result<(PlugId, PlugId), String> {
        let a = resolve_end(graph, self.node_a, self.socket_a, self.plug_a)?;
        let b = resolve_end(graph, self.node_b, self.socket_b, self.plug_b)?;
        Ok((a, b))
    }
}

/// Records without plug IDs resolve to the socket's primary plug
fn resolve_end(
    graph: &Graph,
    node_id: NodeId,
    socket_id: SocketId,
    plug_id: Option<PlugId>,
) -> Result<PlugId, String> {
    let node = graph.node(node_id).ok_or_else(|| format!("node {node_id:?} not loaded"))?;
    let socket = node
        .socket(socket_id)
        .ok_or_else(|| format!("socket {socket_id:?} not found"))?;
    match plug_id {
        Some(plug_id) if socket.plug(plug_id).is_some() => Ok(plug_id),
        Some(plug_id) => Err(format!("plug {plug_id:?} not found on socket {socket_id:?}")),
        None => socket
            .primary_plug()
            .map(|p| p.id)
            .ok_or_else(|| format!("socket {socket_id:?} has no plug")),
    }
}

/// Parse `(x, y, z)`, tolerating a type prefix such as `Point3(…)` and
/// missing components
pub fn parse_position(text: &str) -> [f32; 3] {
    let inner = match text.find('(') {
        Some(start) => &text[start + 1..],
        None => text,
    };
    let inner = inner.trim_end().trim_end_matches(')');
    let mut position = [0.0; 3];
    for (slot, part) in position.iter_mut().zip(inner.split(',')) {
        *slot = part.trim().parse().unwrap_or(0.0);
    }
    position
}

fn compare_versions(found: &str, supported: &str) -> Result<Ordering, CodecError> {
    let parse = |version: &str| -> Result<Vec<u32>, CodecError> {
        version
            .trim()
            .split('.')
            .map(|part| part.parse().map_err(|_| CodecError::InvalidVersion(version.to_string())))
            .collect()
    };
    Ok(parse(found)?.cmp(&parse(supported)?))
}

/// Error when reading or writing a project document
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Document is not valid JSON of the expected shape
    #[error("Malformed project document: {0}")]
    Json(#[from] serde_json::Error),

    /// Document was written by a newer version
    #[error("Project version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the document
        found: String,
        /// Newest version this crate reads
        supported: String,
    },

    /// Version field is not a dotted number
    #[error("Invalid project version: {0}")]
    InvalidVersion(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionState;
    use serde_json::json;
    use std::collections::HashSet;

    fn out_plug(graph: &Graph, node: NodeId) -> PlugId {
        graph.node(node).unwrap().outputs[0].plugs()[0].id
    }

    fn in_plug(graph: &Graph, node: NodeId, index: usize) -> PlugId {
        graph.node(node).unwrap().inputs[index].plugs()[0].id
    }

    fn sample_graph() -> (Graph, NodeId) {
        let mut graph = Graph::default();
        let n1 = graph.create_node("numeric_input").unwrap();
        let n2 = graph.create_node("numeric_input").unwrap();
        let m = graph.create_node("multiply").unwrap();
        let collect = graph.create_node("collect").unwrap();
        graph.set_position(m, [120.0, -40.5, 0.0]).unwrap();
        for (node, value) in [(n1, 5.0), (n2, 3.0)] {
            let socket = graph.node(node).unwrap().inputs[0].id;
            graph.set_socket_value(node, socket, value.into()).unwrap();
        }
        graph.connect_plugs(out_plug(&graph, n1), in_plug(&graph, m, 0)).unwrap();
        graph.connect_plugs(out_plug(&graph, n2), in_plug(&graph, m, 1)).unwrap();

        let list = graph.node(collect).unwrap().inputs[0].id;
        let third = graph.add_plug(list, None).unwrap();
        graph.set_plug_value(third, "tail".into()).unwrap();
        graph.connect_plugs(out_plug(&graph, m), in_plug(&graph, collect, 0)).unwrap();
        (graph, m)
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn topology(graph: &Graph) -> HashSet<(PlugId, PlugId)> {
        graph.connections().map(|c| (c.source().plug, c.sink().plug)).collect()
    }

    #[test]
    fn test_save_writes_only_user_values() {
        let (graph, m) = sample_graph();
        let document = ProjectDocument::from_graph(&graph);
        let value = serde_json::to_value(&document).unwrap();

        assert_eq!(value["ProjectVersion"], "0.1");
        let nodes = value["Nodes"].as_array().unwrap();
        assert_eq!(nodes[0]["type"], "builtin::numeric_input");
        assert_eq!(nodes[0]["typeName"], "numeric_input");
        assert_eq!(nodes[0]["inSockets"][0]["value"], 5.0);
        assert_eq!(nodes[0]["inSockets"][0]["socketType"], "NumericSocket");
        // outputs and propagated inputs carry no value
        assert!(nodes[0]["outSockets"][0].get("value").is_none());
        let multiply = nodes.iter().find(|n| n["id"] == json!(m.0)).unwrap();
        assert!(multiply["inSockets"][0].get("value").is_none());
        assert_eq!(multiply["pos"], "(120, -40.5, 0)");
        assert_eq!(value["Connections"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_round_trip() {
        let (graph, m) = sample_graph();
        let json = ProjectDocument::from_graph(&graph).to_json_string().unwrap();

        let mut loaded = Graph::default();
        let report = ProjectDocument::from_json_str(&json).unwrap().load_into(&mut loaded);
        assert!(report.is_complete(), "{report:?}");
        assert_eq!(report.nodes_loaded, 4);
        assert_eq!(report.connections_loaded, 3);
        assert!(!loaded.is_dirty());

        assert_eq!(topology(&loaded), topology(&graph));
        for node in graph.nodes() {
            let copy = loaded.node(node.id).unwrap();
            assert_eq!(copy.type_id(), node.type_id());
            assert_eq!(copy.position, node.position);
            let values: Vec<Value> = copy.outputs.iter().map(Socket::value).collect();
            let expected: Vec<Value> = node.outputs.iter().map(Socket::value).collect();
            assert_eq!(values, expected);
        }
        assert_eq!(loaded.node(m).unwrap().outputs[0].value(), Value::Number(15.0));
        assert!(loaded.connections().all(|c| c.state != ConnectionState::Feedback));
    }

    #[test]
    fn test_load_skips_unknown_nodes_and_dangling_connections() {
        init_tracing();
        let (graph, m) = sample_graph();
        let mut document = ProjectDocument::from_graph(&graph);
        let multiply = document.nodes.iter_mut().find(|n| n.id == m).unwrap();
        multiply.node_type = "builtin::warp_drive".to_string();
        multiply.type_name = "warp_drive".to_string();

        let mut loaded = Graph::default();
        let report = document.load_into(&mut loaded);
        assert_eq!(report.skipped_nodes, vec!["builtin::warp_drive".to_string()]);
        assert_eq!(report.nodes_loaded, 3);
        // every connection touched the multiply node
        assert_eq!(report.skipped_connections.len(), 3);
        assert_eq!(loaded.connection_count(), 0);
    }

    #[test]
    fn test_load_skips_connections_to_unknown_sockets_and_plugs() {
        init_tracing();
        let mut graph = Graph::default();
        let n = graph.create_node("numeric_input").unwrap();
        let collect = graph.create_node("collect").unwrap();
        let second = graph.node(collect).unwrap().inputs[0].plugs()[1].id;
        graph.connect_plugs(out_plug(&graph, n), second).unwrap();

        // recorded sink plug no longer exists
        let mut document = ProjectDocument::from_graph(&graph);
        let record = &mut document.connections[0];
        if record.node_b == collect {
            record.plug_b = Some(PlugId::new());
        } else {
            record.plug_a = Some(PlugId::new());
        }
        let mut loaded = Graph::default();
        let report = document.load_into(&mut loaded);
        assert_eq!(report.skipped_connections, vec![document.connections[0].id]);
        assert_eq!(report.connections_loaded, 0);
        assert_eq!(loaded.connection_count(), 0);
        let plugs = loaded.node(collect).unwrap().inputs[0].plugs();
        assert!(plugs.iter().all(|p| !p.is_connected()));

        // recorded socket no longer exists
        let mut document = ProjectDocument::from_graph(&graph);
        document.connections[0].socket_a = SocketId::new();
        let report = document.load_into(&mut loaded);
        assert_eq!(report.skipped_connections.len(), 1);
        assert_eq!(report.nodes_loaded, 2);
        assert_eq!(loaded.connection_count(), 0);
    }

    #[test]
    fn test_round_trip_keeps_shadowed_definition_type() {
        let mut registry = crate::registry::NodeRegistry::with_builtins();
        registry
            .load_definitions_str(
                r#"{"Nodes": {"multiply": {"name": "Text Multiply", "cat": "Text",
                    "in": [{"name": "text", "type": "text"}], "out": ["r"],
                    "extraAttr": {"py": "({0} * 2)"}}}}"#,
                crate::node::NodeOrigin::Definition,
            )
            .unwrap();
        let registry = std::sync::Arc::new(registry);
        let mut graph = Graph::with_registry("shadowed", std::sync::Arc::clone(&registry));
        let id = graph.create_node("definition::multiply").unwrap();
        let builtin = graph.create_node("multiply").unwrap();

        let json = ProjectDocument::from_graph(&graph).to_json_string().unwrap();
        let mut loaded = Graph::with_registry("shadowed", registry);
        let report = ProjectDocument::from_json_str(&json).unwrap().load_into(&mut loaded);
        assert!(report.is_complete(), "{report:?}");

        let node = loaded.node(id).unwrap();
        assert_eq!(node.descriptor().origin, crate::node::NodeOrigin::Definition);
        assert_eq!(node.name, "Text Multiply");
        let node = loaded.node(builtin).unwrap();
        assert_eq!(node.descriptor().origin, crate::node::NodeOrigin::Builtin);
    }

    #[test]
    fn test_load_document_without_plug_records() {
        init_tracing();
        let document = json!({
            "ProjectVersion": "0.1",
            "Nodes": [
                {"id": "00000000-0000-0000-0000-000000000001",
                 "type": "NumericInput", "typeName": "numeric_input",
                 "pos": "LPoint3f(10, 0, -4)",
                 "inSockets": [{"id": "00000000-0000-0000-0000-0000000000a1", "name": "Value",
                                "socketType": "NumericSocket", "allowMultiConnect": false,
                                "extraArgs": [], "value": "7"}],
                 "outSockets": [{"id": "00000000-0000-0000-0000-0000000000a2", "name": "Out",
                                 "socketType": "OutSocket", "allowMultiConnect": false,
                                 "extraArgs": []}]},
                {"id": "00000000-0000-0000-0000-000000000002",
                 "type": "DebugOut", "typeName": "debug_out", "pos": "(0, 0, 0)",
                 "inSockets": [{"id": "00000000-0000-0000-0000-0000000000b1", "name": "In",
                                "socketType": "InSocket", "allowMultiConnect": false,
                                "extraArgs": []}],
                 "outSockets": []}
            ],
            "Connections": [
                {"id": "00000000-0000-0000-0000-0000000000c1",
                 "nodeA_ID": "00000000-0000-0000-0000-000000000001",
                 "nodeB_ID": "00000000-0000-0000-0000-000000000002",
                 "socketA_ID": "00000000-0000-0000-0000-0000000000a2",
                 "socketB_ID": "00000000-0000-0000-0000-0000000000b1"}
            ]
        });
        let document = ProjectDocument::from_json_str(&document.to_string()).unwrap();
        let mut graph = Graph::default();
        let report = document.load_into(&mut graph);
        assert!(report.is_complete(), "{report:?}");

        let sink = graph.nodes().find(|n| n.type_id() == "debug_out").unwrap();
        assert_eq!(sink.inputs[0].value(), Value::Number(7.0));
        let source = graph.nodes().find(|n| n.type_id() == "numeric_input").unwrap();
        assert_eq!(source.position, [10.0, 0.0, -4.0]);
    }

    #[test]
    fn test_newer_version_rejected() {
        let json = json!({"ProjectVersion": "2.0", "Nodes": [], "Connections": []}).to_string();
        assert!(matches!(
            ProjectDocument::from_json_str(&json),
            Err(CodecError::UnsupportedVersion { .. })
        ));
        assert!(matches!(
            ProjectDocument::from_json_str("{\"Nodes\": ["),
            Err(CodecError::Json(_))
        ));
    }

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("(1, 2.5, -3)"), [1.0, 2.5, -3.0]);
        assert_eq!(parse_position("Vec3(4, 5)"), [4.0, 5.0, 0.0]);
        assert_eq!(parse_position(""), [0.0, 0.0, 0.0]);
    }
}
