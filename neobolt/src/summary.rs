// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! Statement metadata delivered when a result stream ends.

use serde::{Deserialize, Serialize};

/// The trailing metadata the server attaches to a completed result.
///
/// Deserializable straight from the success metadata map the protocol
/// decoder receives with the final server message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResultSummary {
    /// What kind of statement this was, if the server said.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub statement_type: Option<StatementType>,
    /// The update counts of the statement.
    #[serde(rename = "stats", default)]
    pub counters: Counters,
}

/// The kind of statement a result came from, as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementType {
    /// The statement only read data.
    #[serde(rename = "r")]
    ReadOnly,
    /// The statement read and wrote data.
    #[serde(rename = "rw")]
    ReadWrite,
    /// The statement only wrote data.
    #[serde(rename = "w")]
    WriteOnly,
    /// The statement updated the schema.
    #[serde(rename = "s")]
    SchemaUpdate,
}

/// The counts of everything a statement changed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Counters {
    /// Nodes created.
    pub nodes_created: u64,
    /// Nodes deleted.
    pub nodes_deleted: u64,
    /// Relationships created.
    pub relationships_created: u64,
    /// Relationships deleted.
    pub relationships_deleted: u64,
    /// Properties set.
    pub properties_set: u64,
    /// Labels added to nodes.
    pub labels_added: u64,
    /// Labels removed from nodes.
    pub labels_removed: u64,
    /// Indexes added to the schema.
    pub indexes_added: u64,
    /// Indexes removed from the schema.
    pub indexes_removed: u64,
    /// Constraints added to the schema.
    pub constraints_added: u64,
    /// Constraints removed from the schema.
    pub constraints_removed: u64,
    /// Did the statement change anything at all?
    pub contains_updates: bool,
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn summaries_decode_from_server_metadata() {
        let summary: ResultSummary = serde_json::from_value(serde_json::json!({
            "type": "rw",
            "stats": {
                "nodes-created": 2,
                "properties-set": 3,
                "contains-updates": true,
            },
        }))
        .unwrap();

        assert_eq!(summary.statement_type, Some(StatementType::ReadWrite));
        assert_eq!(summary.counters.nodes_created, 2);
        assert_eq!(summary.counters.properties_set, 3);
        assert_eq!(summary.counters.nodes_deleted, 0);
        assert!(summary.counters.contains_updates);
    }

    #[test]
    fn missing_metadata_defaults_to_no_updates() {
        let summary: ResultSummary = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(summary.statement_type, None);
        assert_eq!(summary.counters, Counters::default());
    }
}
