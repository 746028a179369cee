// SPDX-License-Identifier: MIT OR Apache-2.0
//! Arithmetic nodes.
//!
//! A missing or non-numeric operand yields NaN, as does division by zero.

use super::template;
use crate::node::{NodeDescriptor, NodeOrigin};
use crate::registry::NodeRegistry;
use crate::socket::{SocketKind, SocketSpec};
use crate::value::Value;

/// Register the arithmetic nodes
pub fn register(registry: &mut NodeRegistry) {
    registry.register(binary("add", "Add", "Sum of both inputs", "({0} + {1})", |a, b| a + b));
    registry.register(binary(
        "subtract",
        "Subtract",
        "First input minus the second",
        "({0} - {1})",
        |a, b| a - b,
    ));
    registry.register(binary(
        "multiply",
        "Multiply",
        "Product of both inputs",
        "({0} * {1})",
        |a, b| a * b,
    ));
    registry.register(binary(
        "divide",
        "Divide",
        "First input divided by the second",
        "({0} / {1})",
        |a, b| if b == 0.0 { f64::NAN } else { a / b },
    ));
}

fn binary(
    type_id: &str,
    name: &str,
    description: &str,
    py: &str,
    op: fn(f64, f64) -> f64,
) -> NodeDescriptor {
    NodeDescriptor::new(type_id, name, NodeOrigin::Builtin)
        .with_category(["Math"])
        .with_description(description)
        .input(SocketSpec::input("In 1", SocketKind::Numeric))
        .input(SocketSpec::input("In 2", SocketKind::Numeric))
        .output(SocketSpec::output("Out"))
        .with_attributes(template(py))
        .with_logic(move |inputs: &[Value], outputs: &mut [Value]| {
            let result = match operands(inputs) {
                Some((a, b)) => op(a, b),
                None => f64::NAN,
            };
            if let Some(out) = outputs.first_mut() {
                *out = Value::Number(result);
            }
        })
}

fn operands(inputs: &[Value]) -> Option<(f64, f64)> {
    Some((inputs.first()?.coerce_number()?, inputs.get(1)?.coerce_number()?))
}
