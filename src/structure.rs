//! # Structure Introspection
//!
//! A serializable snapshot of the paginated document tree, used for
//! golden-file regression tests and debugging. The tree mirrors
//! document → page → header/row/footer → col → component.
//!
//! Building it is a pure read: no provider surface is touched, details are
//! kept in a `BTreeMap`, and nothing time- or address-dependent is recorded,
//! so two snapshots of an unchanged document serialize identically.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Cell;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureNode {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<StructureNode>,
}

impl StructureNode {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            value: None,
            details: BTreeMap::new(),
            nodes: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Attach a detail. Values that fail to serialize are recorded as null.
    pub fn with_detail(mut self, key: &str, value: impl Serialize) -> Self {
        self.details.insert(
            key.to_string(),
            serde_json::to_value(value).unwrap_or(Value::Null),
        );
        self
    }

    pub fn with_cell(self, cell: &Cell) -> Self {
        self.with_detail("cell", cell)
    }

    pub fn push(&mut self, node: StructureNode) {
        self.nodes.push(node);
    }

    /// Pretty JSON with a trailing newline, the format golden files use.
    pub fn to_json(&self) -> String {
        let mut json = serde_json::to_string_pretty(self).unwrap_or_default();
        json.push('\n');
        json
    }

    /// Depth-first search for every node of the given type.
    pub fn find_all(&self, node_type: &str) -> Vec<&StructureNode> {
        let mut found = Vec::new();
        self.collect(node_type, &mut found);
        found
    }

    fn collect<'a>(&'a self, node_type: &str, found: &mut Vec<&'a StructureNode>) {
        if self.node_type == node_type {
            found.push(self);
        }
        for child in &self.nodes {
            child.collect(node_type, found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_are_omitted() {
        let node = StructureNode::new("row").with_value(20.0);
        assert_eq!(
            serde_json::to_string(&node).unwrap(),
            r#"{"type":"row","value":20.0}"#
        );
    }

    #[test]
    fn details_serialize_sorted() {
        let node = StructureNode::new("col")
            .with_detail("zeta", 1)
            .with_detail("alpha", true);
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.find("alpha").unwrap() < json.find("zeta").unwrap());
    }

    #[test]
    fn find_all_walks_depth_first() {
        let mut page = StructureNode::new("page");
        page.push(StructureNode::new("row").with_value(1));
        let mut row = StructureNode::new("row").with_value(2);
        row.push(StructureNode::new("col"));
        page.push(row);
        let rows = page.find_all("row");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].value, Some(Value::from(2)));
    }
}
