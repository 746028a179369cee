// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in node kinds with compiled logic.
//!
//! Every built-in also carries a code-generation template so that graphs made
//! of built-ins render to source text like definition-driven nodes do.

pub mod io;
pub mod logic;
pub mod math;

use crate::node::NodeAttributes;
use crate::registry::NodeRegistry;

/// Register the whole built-in catalogue
pub fn register_builtins(registry: &mut NodeRegistry) {
    io::register(registry);
    math::register(registry);
    logic::register(registry);
}

/// Attributes holding a template
pub(crate) fn template(py: &str) -> NodeAttributes {
    NodeAttributes {
        py: Some(py.to_string()),
        ..NodeAttributes::default()
    }
}
