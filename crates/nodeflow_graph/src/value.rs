// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dynamically typed values carried by sockets and plugs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value that can be stored in a plug or produced by node logic
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// No value (never entered and never propagated)
    #[default]
    Unset,
    /// Boolean
    Bool(bool),
    /// Number
    Number(f64),
    /// Text
    Text(String),
    /// Ordered list of values
    List(Vec<Value>),
    /// Ordered key/value mapping
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Whether this is [`Value::Unset`]
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Get the number, if this is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the boolean, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the text, if this is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the list items, if this is a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Interpret this value as a number, parsing text leniently.
    ///
    /// Project files written by older editors store user values as strings,
    /// so `"5"` must still load into a numeric socket.
    pub fn coerce_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Interpret this value as a boolean, parsing text leniently
    pub fn coerce_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Number(n) => Some(*n != 0.0),
            Self::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Render this value as source-code literal text
    pub fn to_literal(&self) -> String {
        match self {
            Self::Unset => "None".to_string(),
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Number(n) if n.is_nan() => "float('nan')".to_string(),
            Self::Number(n) if n.is_infinite() => {
                if *n > 0.0 {
                    "float('inf')".to_string()
                } else {
                    "float('-inf')".to_string()
                }
            }
            Self::Number(n) => format_number(*n),
            Self::Text(s) => quote(s),
            Self::List(items) => {
                let items: Vec<String> = items.iter().map(Self::to_literal).collect();
                format!("[{}]", items.join(", "))
            }
            Self::Map(entries) => {
                let entries: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", quote(k), v.to_literal()))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(f, ""),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::Text(s) => write!(f, "{s}"),
            Self::List(_) | Self::Map(_) => write!(f, "{}", self.to_literal()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_untagged_json_shape() {
        let value = Value::List(vec![Value::Unset, 2.5.into(), true.into(), "a".into()]);
        let encoded = serde_json::to_value(&value).unwrap();
        assert_eq!(encoded, json!([null, 2.5, true, "a"]));

        let decoded: Value = serde_json::from_value(json!({"k": 3})).unwrap();
        let Value::Map(map) = decoded else {
            panic!("expected a map");
        };
        assert_eq!(map.get("k"), Some(&Value::Number(3.0)));
    }

    #[test]
    fn test_lenient_coercion() {
        assert_eq!(Value::from("5").coerce_number(), Some(5.0));
        assert_eq!(Value::from("abc").coerce_number(), None);
        assert_eq!(Value::from("True").coerce_bool(), Some(true));
        assert_eq!(Value::Unset.coerce_bool(), None);
    }

    #[test]
    fn test_literals() {
        assert_eq!(Value::Number(15.0).to_literal(), "15");
        assert_eq!(Value::Number(0.5).to_literal(), "0.5");
        assert_eq!(Value::Number(f64::NAN).to_literal(), "float('nan')");
        assert_eq!(Value::from("say \"hi\"").to_literal(), "\"say \\\"hi\\\"\"");
        assert_eq!(
            Value::List(vec![1.0.into(), false.into(), Value::Unset]).to_literal(),
            "[1, False, None]"
        );
    }
}
