// SPDX-License-Identifier: MIT OR Apache-2.0
//! Plugs: the concrete wire endpoints owned by sockets.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a plug
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlugId(pub Uuid);

impl PlugId {
    /// Create a new random plug ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlugId {
    fn default() -> Self {
        Self::new()
    }
}

/// A single wire endpoint with one value slot
#[derive(Debug, Clone)]
pub struct Plug {
    /// Unique plug ID (stable across save/load)
    pub id: PlugId,
    /// Key for dictionary sockets
    pub label: Option<String>,
    pub(crate) value: Value,
    pub(crate) connected: bool,
    pub(crate) user_value: bool,
}

impl Plug {
    /// Create an empty, unconnected plug
    pub fn new() -> Self {
        Self::with_id(PlugId::new())
    }

    /// Create an empty plug with a known ID
    pub fn with_id(id: PlugId) -> Self {
        Self {
            id,
            label: None,
            value: Value::Unset,
            connected: false,
            user_value: false,
        }
    }

    /// Set the dictionary key
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Current value of the plug
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Whether at least one connector terminates at this plug
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Whether the current value was typed in by the user
    pub fn has_user_value(&self) -> bool {
        self.user_value
    }

    /// Copy this plug under a fresh ID, keeping value and label but not the connection
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            id: PlugId::new(),
            label: self.label.clone(),
            value: if self.connected { Value::Unset } else { self.value.clone() },
            connected: false,
            user_value: self.user_value,
        }
    }
}

impl Default for Plug {
    fn default() -> Self {
        Self::new()
    }
}
