//! Raw JSON document model.
//!
//! `serde_json::Value` keeps only the last of two members with the same name.
//! A reviewer must see every byte it signs, so the document is first read into
//! a [`Node`] that keeps every member in document order, duplicates included.
//! The token tree decides what to do with them.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::Number;

/// One JSON value with all object members kept.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Object(Vec<(String, Node)>),
    Array(Vec<Node>),
    String(String),
    /// Number, boolean or null in its JSON spelling.
    Primitive(String),
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("any valid JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Primitive(v.to_string()))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Primitive(v.to_string()))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Node, E> {
        Ok(Node::Primitive(v.to_string()))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Node, E>
    where
        E: de::Error,
    {
        Number::from_f64(v)
            .map(|n| Node::Primitive(n.to_string()))
            .ok_or_else(|| de::Error::custom("invalid float value"))
    }

    fn visit_str<E>(self, v: &str) -> Result<Node, E> {
        Ok(Node::String(v.to_owned()))
    }

    fn visit_string<E>(self, v: String) -> Result<Node, E> {
        Ok(Node::String(v))
    }

    fn visit_none<E>(self) -> Result<Node, E> {
        Ok(Node::Primitive("null".to_string()))
    }

    fn visit_unit<E>(self) -> Result<Node, E> {
        Ok(Node::Primitive("null".to_string()))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Node, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element::<Node>()? {
            items.push(item);
        }
        Ok(Node::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Node, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut members = Vec::new();
        while let Some(key) = map.next_key::<String>()? {
            let value = map.next_value::<Node>()?;
            members.push((key, value));
        }
        Ok(Node::Object(members))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_members_are_all_kept() {
        let node: Node = serde_json::from_str(r#"{"memo":"a","memo":"b"}"#).unwrap();
        assert_eq!(
            node,
            Node::Object(vec![
                ("memo".to_string(), Node::String("a".to_string())),
                ("memo".to_string(), Node::String("b".to_string())),
            ])
        );
    }

    #[test]
    fn primitives_keep_json_spelling() {
        let node: Node = serde_json::from_str(r#"[1, -2, 1.5, true, null]"#).unwrap();
        let spelled: Vec<Node> = ["1", "-2", "1.5", "true", "null"]
            .iter()
            .map(|s| Node::Primitive(s.to_string()))
            .collect();
        assert_eq!(node, Node::Array(spelled));
    }

    #[test]
    fn escaped_member_names_are_decoded() {
        let node: Node = serde_json::from_str(r#"{"\u006demo":"x"}"#).unwrap();
        assert_eq!(
            node,
            Node::Object(vec![("memo".to_string(), Node::String("x".to_string()))])
        );
    }
}
