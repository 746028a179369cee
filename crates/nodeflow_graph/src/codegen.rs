// SPDX-License-Identifier: MIT OR Apache-2.0
//! Source generation from node templates.
//!
//! Each node may carry a template in its `py` attribute. Placeholders name
//! input sockets by position (`{0}`) or by name (`{value}`); `{{` and `}}`
//! produce literal braces. Generation starts at every root node and expands
//! connected inputs into the upstream node's expression.

use crate::graph::Graph;
use crate::node::{Node, NodeId};
use crate::plug::Plug;
use crate::socket::{Socket, SocketId, SocketKind};
use crate::value::Value;

/// Renders a graph to source text
#[derive(Debug, Clone, Copy)]
pub struct CodeGenerator<'a> {
    graph: &'a Graph,
}

impl<'a> CodeGenerator<'a> {
    /// Create a generator over a graph
    pub fn new(graph: &'a Graph) -> Self {
        Self { graph }
    }

    /// One line per root node, in graph order
    pub fn generate(&self) -> Result<String, CodegenError> {
        let roots: Vec<NodeId> = self
            .graph
            .nodes()
            .filter(|n| n.attributes().is_root)
            .map(|n| n.id)
            .collect();
        if roots.is_empty() {
            return Err(CodegenError::NoRoot);
        }

        let mut source = String::new();
        for root in roots {
            source.push_str(&self.expression(root)?);
            source.push('\n');
        }
        Ok(source)
    }

    /// Expression of a single node
    pub fn expression(&self, node_id: NodeId) -> Result<String, CodegenError> {
        let mut path = Vec::new();
        self.render(node_id, None, &mut path)
    }

    fn render(
        &self,
        node_id: NodeId,
        output: Option<SocketId>,
        path: &mut Vec<NodeId>,
    ) -> Result<String, CodegenError> {
        let node = self.graph.node(node_id).ok_or(CodegenError::NodeNotFound(node_id))?;
        if path.contains(&node_id) {
            return Err(CodegenError::Cycle(node.name.clone()));
        }

        let Some(template) = &node.attributes().py else {
            let value = match output {
                Some(socket) => node.socket(socket).map(Socket::value),
                None => node.outputs.first().map(Socket::value),
            };
            return Ok(value.unwrap_or_default().to_literal());
        };

        path.push(node_id);
        let mut args = Vec::with_capacity(node.inputs.len());
        for socket in &node.inputs {
            args.push(self.render_input(socket, path)?);
        }
        path.pop();

        fill(template, node, &args)
    }

    fn render_input(
        &self,
        socket: &Socket,
        path: &mut Vec<NodeId>,
    ) -> Result<String, CodegenError> {
        match socket.kind {
            SocketKind::List => {
                let items = socket
                    .plugs()
                    .iter()
                    .map(|plug| self.render_plug(plug, path))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("[{}]", items.join(", ")))
            }
            SocketKind::Dict => {
                let mut entries = Vec::with_capacity(socket.plugs().len());
                for (index, plug) in socket.plugs().iter().enumerate() {
                    let key = plug.label.clone().unwrap_or_else(|| index.to_string());
                    let value = self.render_plug(plug, path)?;
                    entries.push(format!("{}: {}", Value::Text(key).to_literal(), value));
                }
                Ok(format!("{{{}}}", entries.join(", ")))
            }
            _ => match socket.primary_plug() {
                Some(plug) => self.render_plug(plug, path),
                None => Ok(socket.value().to_literal()),
            },
        }
    }

    fn render_plug(&self, plug: &Plug, path: &mut Vec<NodeId>) -> Result<String, CodegenError> {
        match self.graph.connections_at_plug(plug.id).next() {
            Some(connection) => {
                let source = connection.source();
                self.render(source.node, Some(source.socket), path)
            }
            None => Ok(plug.value().to_literal()),
        }
    }
}

fn fill(template: &str, node: &Node, args: &[String]) -> Result<String, CodegenError> {
    let unknown = |placeholder: &str| CodegenError::UnknownPlaceholder {
        node: node.name.clone(),
        placeholder: placeholder.to_string(),
    };

    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut key = String::new();
                let mut closed = false;
                for k in chars.by_ref() {
                    if k == '}' {
                        closed = true;
                        break;
                    }
                    key.push(k);
                }
                if !closed {
                    return Err(unknown(&key));
                }
                let index = match key.trim().parse::<usize>() {
                    Ok(index) => Some(index),
                    Err(_) => node.inputs.iter().position(|s| s.name == key.trim()),
                };
                let arg = index.and_then(|i| args.get(i)).ok_or_else(|| unknown(&key))?;
                out.push_str(arg);
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Error when generating source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodegenError {
    /// No node is marked as root
    #[error("No root node to generate from")]
    NoRoot,

    /// A node's expression depends on itself
    #[error("Cycle through node '{0}'")]
    Cycle(String),

    /// A template names an input that does not exist
    #[error("Node '{node}' has no input for placeholder '{{{placeholder}}}'")]
    UnknownPlaceholder {
        /// Node name
        node: String,
        /// Placeholder text
        placeholder: String,
    },

    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeOrigin;
    use crate::plug::PlugId;
    use crate::registry::NodeRegistry;
    use std::sync::Arc;

    const DEFINITIONS: &str = r#"{"Nodes": {
        "print": {"name": "Print", "cat": "IO", "in": [{"name": "value", "type": "in"}], "out": [],
                  "extraAttr": {"py": "print({value})", "isRoot": true}},
        "range": {"name": "Range", "cat": "Iter", "in": [{"name": "stop", "type": "num"}],
                  "out": ["result"], "extraAttr": {"py": "range({0})"}},
        "wrap": {"name": "Wrap", "cat": "Misc", "in": [{"name": "a", "type": "in"}], "out": ["r"],
                 "extraAttr": {"py": "{{ {0} }}"}},
        "bad": {"name": "Bad", "cat": "Misc", "in": [], "out": ["r"],
                "extraAttr": {"py": "f({missing})"}}
    }}"#;

    fn graph() -> Graph {
        let mut registry = NodeRegistry::with_builtins();
        registry.load_definitions_str(DEFINITIONS, NodeOrigin::Definition).unwrap();
        Graph::with_registry("codegen", Arc::new(registry))
    }

    fn out_plug(graph: &Graph, node: NodeId) -> PlugId {
        graph.node(node).unwrap().outputs[0].plugs()[0].id
    }

    fn in_plug(graph: &Graph, node: NodeId) -> PlugId {
        graph.node(node).unwrap().inputs[0].plugs()[0].id
    }

    #[test]
    fn test_builtin_expression() {
        let mut graph = graph();
        let n1 = graph.create_node("numeric_input").unwrap();
        let n2 = graph.create_node("numeric_input").unwrap();
        let m = graph.create_node("multiply").unwrap();
        let out = graph.create_node("debug_out").unwrap();
        for (node, value) in [(n1, 5.0), (n2, 3.0)] {
            let socket = graph.node(node).unwrap().inputs[0].id;
            graph.set_socket_value(node, socket, value.into()).unwrap();
        }
        let m_in2 = graph.node(m).unwrap().inputs[1].plugs()[0].id;
        graph.connect_plugs(out_plug(&graph, n1), in_plug(&graph, m)).unwrap();
        graph.connect_plugs(out_plug(&graph, n2), m_in2).unwrap();
        graph.connect_plugs(out_plug(&graph, m), in_plug(&graph, out)).unwrap();

        assert_eq!(CodeGenerator::new(&graph).generate().unwrap(), "print((5 * 3))\n");
    }

    #[test]
    fn test_named_placeholders_and_literals() {
        let mut graph = graph();
        let print = graph.create_node("print").unwrap();
        let range = graph.create_node("range").unwrap();
        let socket = graph.node(range).unwrap().inputs[0].id;
        graph.set_socket_value(range, socket, 10.0.into()).unwrap();
        graph.connect_plugs(out_plug(&graph, range), in_plug(&graph, print)).unwrap();

        let generator = CodeGenerator::new(&graph);
        assert_eq!(generator.generate().unwrap(), "print(range(10))\n");
        assert_eq!(generator.expression(range).unwrap(), "range(10)");
    }

    #[test]
    fn test_brace_escapes() {
        let mut graph = graph();
        let wrap = graph.create_node("wrap").unwrap();
        let socket = graph.node(wrap).unwrap().inputs[0].id;
        graph.set_socket_value(wrap, socket, "x".into()).unwrap();
        assert_eq!(CodeGenerator::new(&graph).expression(wrap).unwrap(), "{ \"x\" }");
    }

    #[test]
    fn test_errors() {
        let mut graph = graph();
        assert_eq!(CodeGenerator::new(&graph).generate(), Err(CodegenError::NoRoot));

        let bad = graph.create_node("bad").unwrap();
        assert!(matches!(
            CodeGenerator::new(&graph).expression(bad),
            Err(CodegenError::UnknownPlaceholder { .. })
        ));

        let print = graph.create_node("print").unwrap();
        let f1 = graph.create_node("wrap").unwrap();
        let f2 = graph.create_node("wrap").unwrap();
        graph.connect_plugs(out_plug(&graph, f1), in_plug(&graph, print)).unwrap();
        graph.connect_plugs(out_plug(&graph, f2), in_plug(&graph, f1)).unwrap();
        graph.connect_plugs(out_plug(&graph, f1), in_plug(&graph, f2)).unwrap();
        assert_eq!(
            CodeGenerator::new(&graph).generate(),
            Err(CodegenError::Cycle("Wrap".to_string()))
        );
    }
}
