// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph framework.

use crate::plug::PlugId;
use crate::socket::{Socket, SocketId, SocketKind, SocketRole, SocketSpec};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a node type was registered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeOrigin {
    /// Compiled node kinds shipped with the crate
    Builtin,
    /// Node kinds supplied by the host application
    Extension,
    /// Generic nodes built from a node-definition document
    Definition,
}

impl NodeOrigin {
    /// Prefix used in qualified type identifiers
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Builtin => "builtin",
            Self::Extension => "extension",
            Self::Definition => "definition",
        }
    }
}

/// Free-form custom attributes of a node type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeAttributes {
    /// Code-generation template
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "astRepresentation")]
    pub py: Option<String>,
    /// Whether code generation starts at this node
    #[serde(default, rename = "isRoot")]
    pub is_root: bool,
    /// Any other attribute
    #[serde(flatten)]
    pub other: IndexMap<String, Value>,
}

/// Computes output values from input values.
///
/// Implementations must be pure and must tolerate any input being
/// [`Value::Unset`]; they never panic.
pub trait NodeEvaluator: Send + Sync {
    /// Fill `outputs` (one slot per output socket, pre-set to unset) from `inputs`
    fn evaluate(&self, inputs: &[Value], outputs: &mut [Value]);
}

impl<F> NodeEvaluator for F
where
    F: Fn(&[Value], &mut [Value]) + Send + Sync,
{
    fn evaluate(&self, inputs: &[Value], outputs: &mut [Value]) {
        self(inputs, outputs);
    }
}

/// Logic of nodes that carry their behavior in a template instead of code
fn no_logic(_inputs: &[Value], _outputs: &mut [Value]) {}

/// Node type definition.
///
/// Both the registry and [`Node::duplicate`] build nodes from this value, so
/// a node never needs to remember how it was constructed.
#[derive(Clone)]
pub struct NodeDescriptor {
    /// Registry key
    pub type_id: String,
    /// Display name
    pub name: String,
    /// Registration source
    pub origin: NodeOrigin,
    /// Category path, outermost first
    pub category: Vec<String>,
    /// Description
    pub description: String,
    /// Input socket blueprints
    pub inputs: Vec<SocketSpec>,
    /// Output socket blueprints
    pub outputs: Vec<SocketSpec>,
    /// Custom attributes
    pub attributes: NodeAttributes,
    evaluator: Arc<dyn NodeEvaluator>,
}

impl NodeDescriptor {
    /// Create a descriptor without sockets or logic
    pub fn new(type_id: impl Into<String>, name: impl Into<String>, origin: NodeOrigin) -> Self {
        Self {
            type_id: type_id.into(),
            name: name.into(),
            origin,
            category: Vec::new(),
            description: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            attributes: NodeAttributes::default(),
            evaluator: Arc::new(no_logic),
        }
    }

    /// Set the category path
    pub fn with_category<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.category = path.into_iter().map(Into::into).collect();
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add an input socket
    pub fn input(mut self, spec: SocketSpec) -> Self {
        self.inputs.push(spec);
        self
    }

    /// Add an output socket
    pub fn output(mut self, spec: SocketSpec) -> Self {
        self.outputs.push(spec);
        self
    }

    /// Set the custom attributes
    pub fn with_attributes(mut self, attributes: NodeAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Set the logic
    pub fn with_logic(mut self, evaluator: impl NodeEvaluator + 'static) -> Self {
        self.evaluator = Arc::new(evaluator);
        self
    }

    /// Qualified type identifier, e.g. `builtin::multiply`
    pub fn qualified_type(&self) -> String {
        format!("{}::{}", self.origin.prefix(), self.type_id)
    }

    /// Shared handle to the logic
    pub fn evaluator(&self) -> Arc<dyn NodeEvaluator> {
        Arc::clone(&self.evaluator)
    }
}

impl fmt::Debug for NodeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeDescriptor")
            .field("type_id", &self.type_id)
            .field("name", &self.name)
            .field("origin", &self.origin)
            .field("category", &self.category)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

/// A node instance in the graph
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique instance ID (stable across save/load)
    pub id: NodeId,
    /// Display name
    pub name: String,
    /// Position in the editor view
    pub position: [f32; 3],
    /// Input sockets, in positional order
    pub inputs: Vec<Socket>,
    /// Output sockets, in positional order
    pub outputs: Vec<Socket>,
    descriptor: Arc<NodeDescriptor>,
}

impl Node {
    /// Create a new node from a type definition
    pub fn new(descriptor: Arc<NodeDescriptor>) -> Self {
        let inputs: Vec<Socket> = descriptor.inputs.iter().map(Socket::new).collect();
        let mut outputs: Vec<Socket> = descriptor.outputs.iter().map(Socket::new).collect();

        // Argument sockets expose one output per argument name
        for spec in descriptor.inputs.iter().filter(|s| s.kind == SocketKind::Arguments) {
            for name in spec.extra_args.iter().filter_map(Value::as_text) {
                outputs.push(Socket::new(&SocketSpec::output(name)));
            }
        }

        Self {
            id: NodeId::new(),
            name: descriptor.name.clone(),
            position: [0.0, 0.0, 0.0],
            inputs,
            outputs,
            descriptor,
        }
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = [x, y, z];
        self
    }

    /// Type definition this node was built from
    pub fn descriptor(&self) -> &Arc<NodeDescriptor> {
        &self.descriptor
    }

    /// Registry key of the node type
    pub fn type_id(&self) -> &str {
        &self.descriptor.type_id
    }

    /// Custom attributes of the node type
    pub fn attributes(&self) -> &NodeAttributes {
        &self.descriptor.attributes
    }

    /// Get an input socket by index
    pub fn input(&self, index: usize) -> Option<&Socket> {
        self.inputs.get(index)
    }

    /// Get an output socket by index
    pub fn output(&self, index: usize) -> Option<&Socket> {
        self.outputs.get(index)
    }

    /// Get a socket by ID
    pub fn socket(&self, socket_id: SocketId) -> Option<&Socket> {
        self.sockets().find(|s| s.id == socket_id)
    }

    /// Get a mutable socket by ID
    pub fn socket_mut(&mut self, socket_id: SocketId) -> Option<&mut Socket> {
        self.inputs
            .iter_mut()
            .chain(self.outputs.iter_mut())
            .find(|s| s.id == socket_id)
    }

    /// Get the socket owning a plug
    pub fn socket_of_plug(&self, plug_id: PlugId) -> Option<&Socket> {
        self.sockets().find(|s| s.plug(plug_id).is_some())
    }

    /// Get the input socket with the given name
    pub fn input_named(&self, name: &str) -> Option<&Socket> {
        self.inputs.iter().find(|s| s.name == name)
    }

    /// Get all sockets, inputs first
    pub fn sockets(&self) -> impl Iterator<Item = &Socket> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// Sockets of one role
    pub fn sockets_of(&self, role: SocketRole) -> &[Socket] {
        match role {
            SocketRole::In => &self.inputs,
            SocketRole::Out => &self.outputs,
        }
    }

    /// Whether this node is a leaf: no input socket is connected
    pub fn is_leaf(&self) -> bool {
        !self.inputs.iter().any(Socket::is_connected)
    }

    /// Run the node logic, recomputing every output from the current inputs
    pub fn logic(&mut self) {
        let inputs: Vec<Value> = self.inputs.iter().map(Socket::value).collect();
        let mut outputs = vec![Value::Unset; self.outputs.len()];
        self.descriptor.evaluator.evaluate(&inputs, &mut outputs);
        for (socket, value) in self.outputs.iter_mut().zip(outputs) {
            socket.set_computed(value);
        }
    }

    /// Copy this node under fresh node, socket and plug IDs.
    ///
    /// User values and plug counts are kept; connections are not.
    pub fn duplicate(&self) -> Self {
        Self {
            id: NodeId::new(),
            name: self.name.clone(),
            position: self.position,
            inputs: self.inputs.iter().map(Socket::duplicate).collect(),
            outputs: self.outputs.iter().map(Socket::duplicate).collect(),
            descriptor: Arc::clone(&self.descriptor),
        }
    }
}
