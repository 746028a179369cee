// SPDX-License-Identifier: MIT OR Apache-2.0
//! Input, passthrough and output nodes.

use super::template;
use crate::node::{NodeAttributes, NodeDescriptor, NodeOrigin};
use crate::registry::NodeRegistry;
use crate::socket::{SocketKind, SocketSpec};
use crate::value::Value;

/// Register the input and output nodes
pub fn register(registry: &mut NodeRegistry) {
    // ========================================================================
    // Inputs
    // ========================================================================

    registry.register(constant(
        "numeric_input",
        "Numeric Input",
        SocketSpec::input("Value", SocketKind::Numeric).with_default(0.0),
    ));
    registry.register(constant(
        "bool_input",
        "Boolean Input",
        SocketSpec::input("Value", SocketKind::Bool).with_default(false),
    ));
    registry.register(constant(
        "text_input",
        "Text Input",
        SocketSpec::input("Value", SocketKind::Text).with_default(""),
    ));
    registry.register(constant(
        "option_input",
        "Option Input",
        SocketSpec::input("Value", SocketKind::Option)
            .with_extra_args(vec!["first".into(), "second".into(), "third".into()]),
    ));

    // ========================================================================
    // Passthrough & Output
    // ========================================================================

    registry.register(
        NodeDescriptor::new("collect", "Collect", NodeOrigin::Builtin)
            .with_category(["Utility"])
            .with_description("Gathers every input value into one list")
            .input(SocketSpec::input("Values", SocketKind::List).with_plugs(2))
            .output(SocketSpec::output("Out"))
            .with_attributes(template("{0}"))
            .with_logic(passthrough),
    );

    registry.register(
        NodeDescriptor::new("debug_out", "Debug Out", NodeOrigin::Builtin)
            .with_category(["Output"])
            .with_description("Terminal node showing the value it receives")
            .input(SocketSpec::input("In", SocketKind::In))
            .with_attributes(NodeAttributes {
                py: Some("print({0})".to_string()),
                is_root: true,
                ..NodeAttributes::default()
            }),
    );
}

fn constant(type_id: &str, name: &str, input: SocketSpec) -> NodeDescriptor {
    NodeDescriptor::new(type_id, name, NodeOrigin::Builtin)
        .with_category(["Input"])
        .with_description("User-entered constant")
        .input(input)
        .output(SocketSpec::output("Out"))
        .with_logic(passthrough)
}

fn passthrough(inputs: &[Value], outputs: &mut [Value]) {
    if let (Some(value), Some(out)) = (inputs.first(), outputs.first_mut()) {
        *out = value.clone();
    }
}
