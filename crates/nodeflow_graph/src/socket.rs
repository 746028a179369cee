// SPDX-License-Identifier: MIT OR Apache-2.0
//! Socket definitions for node inputs/outputs.

use crate::plug::{Plug, PlugId};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocketId(pub Uuid);

impl SocketId {
    /// Create a new random socket ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SocketId {
    fn default() -> Self {
        Self::new()
    }
}

/// Socket role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocketRole {
    /// Output socket, the source side of a connector
    Out,
    /// Input socket, the sink side of a connector
    In,
}

/// Type tag of a socket.
///
/// The tag decides which user values a socket accepts and how many plugs it
/// may own. It is also what the project file records to recreate sockets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocketKind {
    /// Boolean entry
    Bool,
    /// Generic input without an entry of its own
    In,
    /// Numeric entry
    Numeric,
    /// Selection from the options in `extra_args`
    Option,
    /// Free text entry
    Text,
    /// Argument name list; every name adds an output socket to the node
    Arguments,
    /// Variadic list input, one plug per entry
    List,
    /// Variadic dictionary input, one labelled plug per key
    Dict,
    /// Plain output
    Out,
    /// Variadic list output
    OutList,
    /// Host-registered type, behaves like [`SocketKind::In`]
    Custom(String),
}

impl SocketKind {
    /// Name recorded as `socketType` in project files
    pub fn type_name(&self) -> &str {
        match self {
            Self::Bool => "BoolSocket",
            Self::In => "InSocket",
            Self::Numeric => "NumericSocket",
            Self::Option => "OptionSelectSocket",
            Self::Text => "TextSocket",
            Self::Arguments => "ArgumentsSocket",
            Self::List => "ListSocket",
            Self::Dict => "DictionarySocket",
            Self::Out => "OutSocket",
            Self::OutList => "OutListSocket",
            Self::Custom(name) => name,
        }
    }

    /// Resolve a built-in `socketType` name
    pub fn from_type_name(name: &str) -> Option<Self> {
        let kind = match name {
            "BoolSocket" => Self::Bool,
            "InSocket" => Self::In,
            "NumericSocket" => Self::Numeric,
            "OptionSelectSocket" => Self::Option,
            "TextSocket" => Self::Text,
            "ArgumentsSocket" => Self::Arguments,
            "ListSocket" => Self::List,
            "DictionarySocket" => Self::Dict,
            "OutSocket" => Self::Out,
            "OutListSocket" => Self::OutList,
            _ => return None,
        };
        Some(kind)
    }

    /// Resolve a built-in input tag of the node-definition format
    pub fn from_definition_tag(tag: &str) -> Option<Self> {
        let kind = match tag.to_ascii_lowercase().as_str() {
            "bool" => Self::Bool,
            "in" => Self::In,
            "num" => Self::Numeric,
            "option" => Self::Option,
            "text" => Self::Text,
            "arguments" => Self::Arguments,
            "list" => Self::List,
            "dict" => Self::Dict,
            _ => return None,
        };
        Some(kind)
    }

    /// Role implied by the kind
    pub fn role(&self) -> SocketRole {
        match self {
            Self::Out | Self::OutList => SocketRole::Out,
            _ => SocketRole::In,
        }
    }

    /// Whether the socket may own a variable number of plugs
    pub fn is_variadic(&self) -> bool {
        matches!(self, Self::List | Self::Dict | Self::OutList)
    }
}

/// Blueprint for a socket, used by node descriptors
#[derive(Debug, Clone, PartialEq)]
pub struct SocketSpec {
    /// Socket name
    pub name: String,
    /// Type tag
    pub kind: SocketKind,
    /// Whether more than one connector may terminate in the socket
    pub allow_multi_connect: bool,
    /// Kind-specific arguments (options, argument names)
    pub extra_args: Vec<Value>,
    /// Initial value (not marked as user-entered)
    pub default_value: Option<Value>,
    /// Number of plugs created initially
    pub plug_count: usize,
}

impl SocketSpec {
    /// Create an input socket spec
    pub fn input(name: impl Into<String>, kind: SocketKind) -> Self {
        Self {
            name: name.into(),
            kind,
            allow_multi_connect: false,
            extra_args: Vec::new(),
            default_value: None,
            plug_count: 1,
        }
    }

    /// Create a plain output socket spec
    pub fn output(name: impl Into<String>) -> Self {
        Self::input(name, SocketKind::Out)
    }

    /// Create a variadic list output socket spec
    pub fn output_list(name: impl Into<String>) -> Self {
        Self::input(name, SocketKind::OutList)
    }

    /// Allow more than one connector on the socket
    pub fn multi_connect(mut self) -> Self {
        self.allow_multi_connect = true;
        self
    }

    /// Set the default value
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Set the kind-specific arguments
    pub fn with_extra_args(mut self, extra_args: Vec<Value>) -> Self {
        self.extra_args = extra_args;
        self
    }

    /// Set the initial plug count (variadic kinds only)
    pub fn with_plugs(mut self, count: usize) -> Self {
        self.plug_count = count;
        self
    }

    /// Role implied by the kind
    pub fn role(&self) -> SocketRole {
        self.kind.role()
    }
}

/// A typed connection point on a node
#[derive(Debug, Clone)]
pub struct Socket {
    /// Unique socket ID (stable across save/load)
    pub id: SocketId,
    /// Socket name
    pub name: String,
    /// Socket role
    pub role: SocketRole,
    /// Type tag
    pub kind: SocketKind,
    /// Whether more than one connector may terminate in this socket
    pub allow_multi_connect: bool,
    /// Kind-specific arguments (options, argument names)
    pub extra_args: Vec<Value>,
    plugs: Vec<Plug>,
}

impl Socket {
    /// Create a socket from a spec
    pub fn new(spec: &SocketSpec) -> Self {
        let plug_count = if spec.kind.is_variadic() { spec.plug_count } else { 1 };
        let mut socket = Self {
            id: SocketId::new(),
            name: spec.name.clone(),
            role: spec.role(),
            kind: spec.kind.clone(),
            allow_multi_connect: spec.allow_multi_connect,
            extra_args: spec.extra_args.clone(),
            plugs: (0..plug_count).map(|_| Plug::new()).collect(),
        };

        let default_value = match (&spec.default_value, &spec.kind) {
            (Some(value), _) => Some(value.clone()),
            (None, SocketKind::Option) => socket.options().first().map(|o| Value::from(*o)),
            (None, SocketKind::Arguments) => Some(Value::List(spec.extra_args.clone())),
            _ => None,
        };
        if let Some(value) = default_value {
            socket.fill(value);
        }
        socket
    }

    /// All plugs in order
    pub fn plugs(&self) -> &[Plug] {
        &self.plugs
    }

    /// Get a plug by ID
    pub fn plug(&self, plug_id: PlugId) -> Option<&Plug> {
        self.plugs.iter().find(|p| p.id == plug_id)
    }

    /// Position of a plug within this socket
    pub fn plug_index(&self, plug_id: PlugId) -> Option<usize> {
        self.plugs.iter().position(|p| p.id == plug_id)
    }

    /// First plug, the only one for non-variadic sockets
    pub fn primary_plug(&self) -> Option<&Plug> {
        self.plugs.first()
    }

    /// Current value of the socket as seen by node logic
    pub fn value(&self) -> Value {
        match self.kind {
            SocketKind::List | SocketKind::OutList => {
                Value::List(self.plugs.iter().map(|p| p.value.clone()).collect())
            }
            SocketKind::Dict => {
                let map: IndexMap<String, Value> = self
                    .plugs
                    .iter()
                    .enumerate()
                    .map(|(i, p)| {
                        let key = p.label.clone().unwrap_or_else(|| i.to_string());
                        (key, p.value.clone())
                    })
                    .collect();
                Value::Map(map)
            }
            _ => self.plugs.first().map(|p| p.value.clone()).unwrap_or_default(),
        }
    }

    /// Whether any plug of this socket is connected
    pub fn is_connected(&self) -> bool {
        self.plugs.iter().any(|p| p.connected)
    }

    /// Whether any plug holds a user-entered value
    pub fn has_user_value(&self) -> bool {
        self.plugs.iter().any(|p| p.user_value)
    }

    /// Options of an option socket
    pub fn options(&self) -> Vec<&str> {
        self.extra_args
            .iter()
            .flat_map(|arg| match arg {
                Value::List(items) => items.iter().filter_map(Value::as_text).collect(),
                Value::Text(text) => vec![text.as_str()],
                _ => Vec::new(),
            })
            .collect()
    }

    /// Check and convert a user value for this socket's kind
    pub fn coerce(&self, value: Value) -> Result<Value, SocketError> {
        if value.is_unset() {
            return Ok(value);
        }
        let invalid = |expected: &'static str, value: &Value| SocketError::InvalidValue {
            socket: self.name.clone(),
            expected,
            found: value.type_name(),
        };
        match &self.kind {
            SocketKind::Out | SocketKind::OutList => Err(SocketError::OutputSocket(self.id)),
            SocketKind::Numeric => value
                .coerce_number()
                .map(Value::Number)
                .ok_or_else(|| invalid("number", &value)),
            SocketKind::Bool => value
                .coerce_bool()
                .map(Value::Bool)
                .ok_or_else(|| invalid("bool", &value)),
            SocketKind::Text => Ok(match value {
                Value::Text(text) => Value::Text(text),
                other => Value::Text(other.to_string()),
            }),
            SocketKind::Option => {
                let text = value.to_string();
                if self.options().iter().any(|o| *o == text) {
                    Ok(Value::Text(text))
                } else {
                    Err(SocketError::UnknownOption {
                        value: text,
                        options: self.options().iter().map(|o| o.to_string()).collect(),
                    })
                }
            }
            SocketKind::Arguments => match value {
                Value::List(items) => Ok(Value::List(items)),
                Value::Text(text) => Ok(Value::List(
                    text.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(Value::from)
                        .collect(),
                )),
                other => Err(invalid("list", &other)),
            },
            SocketKind::In | SocketKind::List | SocketKind::Dict | SocketKind::Custom(_) => {
                Ok(value)
            }
        }
    }

    /// Store a user-entered value for the whole socket.
    ///
    /// List sockets take a list and spread it over their plugs, growing the
    /// plug list when needed. Dictionary sockets take a map keyed by label.
    pub fn set_user_value(&mut self, value: Value) -> Result<(), SocketError> {
        if self.role == SocketRole::Out {
            return Err(SocketError::OutputSocket(self.id));
        }
        if self.is_connected() {
            return Err(SocketError::Connected(self.id));
        }
        match (self.kind.clone(), value) {
            (SocketKind::List, Value::List(items)) => {
                while self.plugs.len() < items.len() {
                    self.plugs.push(Plug::new());
                }
                for (plug, item) in self.plugs.iter_mut().zip(items) {
                    plug.value = item;
                    plug.user_value = true;
                }
            }
            (SocketKind::Dict, Value::Map(entries)) => {
                for (key, item) in entries {
                    let existing = self
                        .plugs
                        .iter()
                        .position(|p| p.label.as_deref() == Some(key.as_str()));
                    let index = match existing {
                        Some(index) => index,
                        None => {
                            self.plugs.push(Plug::new().with_label(key));
                            self.plugs.len() - 1
                        }
                    };
                    self.plugs[index].value = item;
                    self.plugs[index].user_value = true;
                }
            }
            (_, value) => {
                let value = self.coerce(value)?;
                let plug = self.plugs.first_mut().ok_or(SocketError::NoPlug(self.id))?;
                plug.value = value;
                plug.user_value = true;
            }
        }
        Ok(())
    }

    /// Store a user-entered value on one plug
    pub fn set_plug_user_value(
        &mut self,
        plug_id: PlugId,
        value: Value,
    ) -> Result<(), SocketError> {
        if self.role == SocketRole::Out {
            return Err(SocketError::OutputSocket(self.id));
        }
        let value = if self.kind.is_variadic() { value } else { self.coerce(value)? };
        let plug = self
            .plugs
            .iter_mut()
            .find(|p| p.id == plug_id)
            .ok_or(SocketError::PlugNotFound(plug_id))?;
        if plug.connected {
            return Err(SocketError::Connected(self.id));
        }
        plug.value = value;
        plug.user_value = true;
        Ok(())
    }

    /// Append a plug to a variadic socket
    pub fn add_plug(&mut self, label: Option<String>) -> Result<PlugId, SocketError> {
        if !self.kind.is_variadic() {
            return Err(SocketError::NotVariadic(self.id));
        }
        let mut plug = Plug::new();
        plug.label = label;
        let id = plug.id;
        self.plugs.push(plug);
        Ok(id)
    }

    /// Append a plug with a known ID, used when restoring saved sockets
    pub(crate) fn push_plug(&mut self, plug: Plug) {
        self.plugs.push(plug);
    }

    /// Mutable access to the plugs, used when restoring saved IDs
    pub(crate) fn plugs_mut(&mut self) -> &mut [Plug] {
        &mut self.plugs
    }

    /// Drop trailing plugs beyond `len`
    pub(crate) fn truncate_plugs(&mut self, len: usize) {
        self.plugs.truncate(len);
    }

    /// Remove a plug from a variadic socket; callers disconnect it first
    pub(crate) fn remove_plug(&mut self, plug_id: PlugId) -> Result<Plug, SocketError> {
        if !self.kind.is_variadic() {
            return Err(SocketError::NotVariadic(self.id));
        }
        let index = self.plug_index(plug_id).ok_or(SocketError::PlugNotFound(plug_id))?;
        Ok(self.plugs.remove(index))
    }

    /// Write a value computed by node logic
    pub(crate) fn set_computed(&mut self, value: Value) {
        if let (SocketKind::OutList, Value::List(items)) = (&self.kind, &value) {
            let mut items = items.iter();
            for plug in &mut self.plugs {
                plug.value = items.next().cloned().unwrap_or_default();
            }
            return;
        }
        self.fill(value);
    }

    /// Write a value pushed in through a connector
    pub(crate) fn push(&mut self, plug_id: PlugId, value: Value) {
        if let Some(plug) = self.plugs.iter_mut().find(|p| p.id == plug_id) {
            plug.value = value;
            plug.user_value = false;
        }
    }

    /// Reset a released plug to unset
    pub(crate) fn clear_plug(&mut self, plug_id: PlugId) {
        if let Some(plug) = self.plugs.iter_mut().find(|p| p.id == plug_id) {
            plug.value = Value::Unset;
            plug.user_value = false;
        }
    }

    /// Update the connected flag of a plug.
    ///
    /// A connected input no longer carries a user value.
    pub(crate) fn set_plug_connected(&mut self, plug_id: PlugId, connected: bool) {
        if let Some(plug) = self.plugs.iter_mut().find(|p| p.id == plug_id) {
            plug.connected = connected;
            if connected {
                plug.user_value = false;
            }
        }
    }

    /// Copy this socket under fresh socket and plug IDs
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            id: SocketId::new(),
            name: self.name.clone(),
            role: self.role,
            kind: self.kind.clone(),
            allow_multi_connect: self.allow_multi_connect,
            extra_args: self.extra_args.clone(),
            plugs: self.plugs.iter().map(Plug::duplicate).collect(),
        }
    }

    fn fill(&mut self, value: Value) {
        for plug in &mut self.plugs {
            plug.value = value.clone();
        }
    }
}

/// Error when reading or writing socket values
#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    /// Value entry on an output socket
    #[error("Socket {0:?} is an output and takes no user value")]
    OutputSocket(SocketId),

    /// Value entry on a connected input
    #[error("Socket {0:?} is connected and ignores user values")]
    Connected(SocketId),

    /// Value does not fit the socket kind
    #[error("Socket '{socket}' expects a {expected} value, got {found}")]
    InvalidValue {
        /// Socket name
        socket: String,
        /// Expected value type
        expected: &'static str,
        /// Received value type
        found: &'static str,
    },

    /// Value is not one of the socket's options
    #[error("'{value}' is not one of the options {options:?}")]
    UnknownOption {
        /// Rejected value
        value: String,
        /// Available options
        options: Vec<String>,
    },

    /// Plug not found on this socket
    #[error("Plug not found: {0:?}")]
    PlugNotFound(PlugId),

    /// Socket has no plug to hold a value
    #[error("Socket {0:?} has no plug")]
    NoPlug(SocketId),

    /// Plug count change on a fixed socket
    #[error("Socket {0:?} does not take extra plugs")]
    NotVariadic(SocketId),
}
