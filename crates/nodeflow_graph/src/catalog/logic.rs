// SPDX-License-Identifier: MIT OR Apache-2.0
//! Boolean logic nodes. A missing operand leaves the output unset.

use super::template;
use crate::node::{NodeDescriptor, NodeOrigin};
use crate::registry::NodeRegistry;
use crate::socket::{SocketKind, SocketSpec};
use crate::value::Value;

/// Register the boolean nodes
pub fn register(registry: &mut NodeRegistry) {
    registry.register(binary(
        "bool_and",
        "And",
        "True if both inputs are true",
        "({0} and {1})",
        |a, b| a && b,
    ));
    registry.register(binary(
        "bool_or",
        "Or",
        "True if either input is true",
        "({0} or {1})",
        |a, b| a || b,
    ));

    registry.register(
        NodeDescriptor::new("bool_not", "Not", NodeOrigin::Builtin)
            .with_category(["Logic"])
            .with_description("Negates the input")
            .input(SocketSpec::input("In", SocketKind::Bool))
            .output(SocketSpec::output("Out"))
            .with_attributes(template("(not {0})"))
            .with_logic(|inputs: &[Value], outputs: &mut [Value]| {
                if let Some(out) = outputs.first_mut() {
                    *out = match inputs.first().and_then(Value::coerce_bool) {
                        Some(value) => Value::Bool(!value),
                        None => Value::Unset,
                    };
                }
            }),
    );
}

fn binary(
    type_id: &str,
    name: &str,
    description: &str,
    py: &str,
    op: fn(bool, bool) -> bool,
) -> NodeDescriptor {
    NodeDescriptor::new(type_id, name, NodeOrigin::Builtin)
        .with_category(["Logic"])
        .with_description(description)
        .input(SocketSpec::input("In 1", SocketKind::Bool))
        .input(SocketSpec::input("In 2", SocketKind::Bool))
        .output(SocketSpec::output("Out"))
        .with_attributes(template(py))
        .with_logic(move |inputs: &[Value], outputs: &mut [Value]| {
            let a = inputs.first().and_then(Value::coerce_bool);
            let b = inputs.get(1).and_then(Value::coerce_bool);
            if let Some(out) = outputs.first_mut() {
                *out = match (a, b) {
                    (Some(a), Some(b)) => Value::Bool(op(a, b)),
                    _ => Value::Unset,
                };
            }
        })
}
