// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! The values a server can hand back in a result record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single value decoded from a result record.
///
/// Values are immutable once decoded. Out-of-range record accesses hand back
/// [`Value::NULL`] rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// The absence of a value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit float.
    Float(f64),
    /// A string.
    String(String),
    /// A byte array.
    Bytes(Vec<u8>),
    /// A list of values.
    List(Vec<Value>),
    /// A map from string keys to values.
    Map(BTreeMap<String, Value>),
    /// A node in the graph.
    Node(Node),
    /// A relationship between two nodes.
    Relationship(Relationship),
    /// A walk through the graph, alternating nodes and relationships.
    Path(Path),
}

impl Value {
    /// A null value with `'static` lifetime, handed out for out-of-range
    /// field accesses.
    pub const NULL: &'static Value = &Value::Null;

    /// Is this the null value?
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Return the boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Return the integer, if this is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Return the float, if this is one.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Return the string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Return the byte array, if this is one.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Return the list elements, if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Return the map entries, if this is a map.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Return the node, if this is one.
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }

    /// Return the relationship, if this is one.
    pub fn as_relationship(&self) -> Option<&Relationship> {
        match self {
            Value::Relationship(r) => Some(r),
            _ => None,
        }
    }

    /// Return the path, if this is one.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Value::Path(p) => Some(p),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

/// A node in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// The server-assigned node id.
    pub id: i64,
    /// The labels attached to the node.
    pub labels: Vec<String>,
    /// The node's properties.
    pub properties: BTreeMap<String, Value>,
}

/// A directed relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// The server-assigned relationship id.
    pub id: i64,
    /// The id of the node the relationship starts at.
    pub start_node_id: i64,
    /// The id of the node the relationship ends at.
    pub end_node_id: i64,
    /// The relationship type.
    #[serde(rename = "type")]
    pub typ: String,
    /// The relationship's properties.
    pub properties: BTreeMap<String, Value>,
}

/// A walk through the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// The distinct nodes appearing on the path, in first-appearance order.
    pub nodes: Vec<Node>,
    /// The distinct relationships appearing on the path.
    pub relationships: Vec<Relationship>,
    /// The alternating relationship/node index sequence describing the walk;
    /// negative relationship indices mean the relationship was traversed
    /// against its direction.
    pub indices: Vec<i64>,
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn accessors_only_match_their_own_variant() {
        let v = Value::Int(42);
        assert_eq!(v.as_int(), Some(42));
        assert_eq!(v.as_float(), None);
        assert_eq!(v.as_str(), None);
        assert!(!v.is_null());
        assert!(Value::Null.is_null());
    }

    #[test]
    fn values_serialize_transparently() {
        let v = Value::List(vec![
            Value::Int(1),
            Value::String("a".into()),
            Value::Null,
        ]);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json, serde_json::json!([1, "a", null]));
    }

    #[test]
    fn values_deserialize_from_transparent_json() {
        let v: Value = serde_json::from_value(serde_json::json!([1, "a", null])).unwrap();
        assert_eq!(
            v,
            Value::List(vec![Value::Int(1), Value::String("a".into()), Value::Null])
        );
    }

    #[test]
    fn graph_entities_deserialize_from_their_serialized_form() {
        let node = Node {
            id: 7,
            labels: vec!["Person".into()],
            properties: BTreeMap::from([("name".into(), Value::String("Alice".into()))]),
        };
        let json = serde_json::to_value(&node).unwrap();
        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn nodes_serialize_with_their_properties() {
        let node = Node {
            id: 7,
            labels: vec!["Person".into()],
            properties: BTreeMap::from([("name".into(), Value::String("Alice".into()))]),
        };
        let json = serde_json::to_value(Value::Node(node)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "labels": ["Person"],
                "properties": { "name": "Alice" },
            })
        );
    }
}
