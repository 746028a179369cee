// SPDX-License-Identifier: MIT OR Apache-2.0
//! Declarative node-definition documents.
//!
//! A definition file describes generic nodes by shape only: name, category
//! path, sockets and custom attributes. Such nodes carry no compiled logic;
//! their behavior lives in the code-generation template.
//!
//! ```json
//! { "Nodes": { "print": {
//!     "name": "Print", "cat": "Builtins,IO",
//!     "in": [ {"name": "value", "type": "in"} ],
//!     "out": [ "result" ],
//!     "extraAttr": { "py": "print({0})", "isRoot": true }
//! }}}
//! ```

use crate::node::{NodeAttributes, NodeDescriptor, NodeOrigin};
use crate::socket::{SocketKind, SocketSpec};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A node-definition document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeDefinitionFile {
    /// Definitions by node key
    #[serde(rename = "Nodes")]
    pub nodes: IndexMap<String, NodeDefinition>,
}

impl NodeDefinitionFile {
    /// Parse a definition document from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a definition document
    pub fn load(path: &Path) -> Result<Self, DefinitionError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

/// Shape of one generic node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// Display name
    pub name: String,
    /// Comma-separated category path
    #[serde(default, alias = "category")]
    pub cat: String,
    /// Description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Input sockets
    #[serde(default, rename = "in", alias = "inSockets")]
    pub inputs: Vec<InSocketDefinition>,
    /// Output sockets
    #[serde(default, rename = "out", alias = "outSockets")]
    pub outputs: Vec<OutSocketDefinition>,
    /// Custom attributes
    #[serde(default, rename = "extraAttr")]
    pub extra_attr: NodeAttributes,
    /// Template given at node level by older files
    #[serde(default, rename = "astRepresentation", skip_serializing_if = "Option::is_none")]
    pub ast_representation: Option<String>,
}

impl NodeDefinition {
    /// Category path, outermost first
    pub fn category_path(&self) -> Vec<String> {
        self.cat
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Input socket of a generic node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InSocketDefinition {
    /// Socket name
    pub name: String,
    /// Type tag (`bool`, `in`, `num`, `option`, `text`, `arguments`, `list`, `dict`
    /// or a registered custom tag)
    #[serde(rename = "type")]
    pub socket_type: String,
    /// Options of an option socket
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,
    /// Argument names of an arguments socket
    #[serde(default, rename = "argNames", skip_serializing_if = "Vec::is_empty")]
    pub arg_names: Vec<String>,
    /// Whether more than one connector may terminate here
    #[serde(default, rename = "allowMultiConnect")]
    pub allow_multi_connect: bool,
    /// Kind-specific arguments
    #[serde(default, rename = "extraArgs", skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<Value>,
    /// Initial value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Output socket of a generic node: a bare name or a typed spec
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutSocketDefinition {
    /// Plain output with this name
    Name(String),
    /// Output with an explicit type
    Spec {
        /// Socket name
        name: String,
        /// Type tag, `list` for a variadic output
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        socket_type: Option<String>,
    },
}

/// Build a node descriptor from a definition.
///
/// Sockets with an unknown type tag are skipped with a logged error; the rest
/// of the node is still built.
pub(crate) fn build_descriptor<F>(
    key: &str,
    definition: &NodeDefinition,
    origin: NodeOrigin,
    resolve_kind: F,
) -> NodeDescriptor
where
    F: Fn(&str) -> Option<SocketKind>,
{
    let mut attributes = definition.extra_attr.clone();
    if attributes.py.is_none() {
        attributes.py = definition.ast_representation.clone();
    }

    let mut descriptor = NodeDescriptor::new(key, definition.name.clone(), origin)
        .with_category(definition.category_path())
        .with_description(definition.description.clone())
        .with_attributes(attributes);

    for input in &definition.inputs {
        let Some(kind) = resolve_kind(&input.socket_type) else {
            tracing::error!(
                "Unknown socket type '{}' on input '{}' of node '{}'",
                input.socket_type,
                input.name,
                definition.name
            );
            continue;
        };
        let extra_args = match kind {
            SocketKind::Option if !input.options.is_empty() => input.options.clone(),
            SocketKind::Arguments if !input.arg_names.is_empty() => {
                input.arg_names.iter().map(|n| Value::from(n.as_str())).collect()
            }
            _ => input.extra_args.clone(),
        };
        let mut spec = SocketSpec::input(input.name.clone(), kind).with_extra_args(extra_args);
        spec.allow_multi_connect = input.allow_multi_connect;
        spec.default_value = input.default.clone();
        descriptor.inputs.push(spec);
    }

    for output in &definition.outputs {
        let spec = match output {
            OutSocketDefinition::Name(name) => SocketSpec::output(name.clone()),
            OutSocketDefinition::Spec { name, socket_type } => match socket_type.as_deref() {
                None | Some("out") => SocketSpec::output(name.clone()),
                Some(tag) if tag.eq_ignore_ascii_case("list") => {
                    SocketSpec::output_list(name.clone())
                }
                Some(tag) => {
                    tracing::error!(
                        "Unknown socket type '{}' on output '{}' of node '{}'",
                        tag,
                        name,
                        definition.name
                    );
                    continue;
                }
            },
        };
        descriptor.outputs.push(spec);
    }

    descriptor
}

/// Error when reading a node-definition document
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    /// File could not be read
    #[error("Failed to read node definitions: {0}")]
    Io(#[from] std::io::Error),

    /// Document is not valid
    #[error("Failed to parse node definitions: {0}")]
    Parse(#[from] serde_json::Error),
}
