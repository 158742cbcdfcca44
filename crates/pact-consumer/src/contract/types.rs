//! Wire types for the Pact contract document.
//!
//! These are the serialized form of a [`super::Pact`]: bodies are literal
//! examples and matchers live in the `matchingRules` side document.

use crate::matchers::RuleTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PACT_SPECIFICATION_VERSION: &str = "3.0.0";

/// Consumer or provider name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Pacticipant {
    pub name: String,
}

/// Complete contract document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PactDocument {
    pub consumer: Pacticipant,
    pub provider: Pacticipant,
    pub interactions: Vec<InteractionRecord>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl PactDocument {
    /// File name the contract is conventionally written to.
    pub fn file_name(&self) -> String {
        format!("{}-{}.json", self.consumer.name, self.provider.name)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub pact_specification: VersionInfo,
    #[serde(rename = "pact-consumer", default, skip_serializing_if = "Option::is_none")]
    pub library: Option<VersionInfo>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            pact_specification: VersionInfo {
                version: PACT_SPECIFICATION_VERSION.to_string(),
            },
            library: Some(VersionInfo {
                version: env!("CARGO_PKG_VERSION").to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VersionInfo {
    pub version: String,
}

/// Named precondition the provider must set up.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProviderState {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub description: String,
    #[serde(default, alias = "provider_states", skip_serializing_if = "Vec::is_empty")]
    pub provider_states: Vec<ProviderState>,
    pub request: RequestRecord,
    pub response: ResponseRecord,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub method: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_rules: Option<MatchingRules>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub status: u16,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_rules: Option<MatchingRules>,
}

/// Matching rules side document for a request or response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MatchingRules {
    #[serde(default, skip_serializing_if = "RuleTable::is_empty")]
    pub body: RuleTable,
}

impl MatchingRules {
    /// `None` when there is nothing to serialize.
    pub fn from_body(body: RuleTable) -> Option<Self> {
        if body.is_empty() {
            None
        } else {
            Some(Self { body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_document_deserializes() {
        let doc: PactDocument = serde_json::from_value(json!({
            "consumer": {"name": "ios-app"},
            "provider": {"name": "users-api"},
            "interactions": [{
                "description": "a request for users",
                "provider_states": [{"name": "users exist"}],
                "request": {"method": "GET", "path": "/users"},
                "response": {"status": 200}
            }]
        }))
        .unwrap();

        assert_eq!(doc.file_name(), "ios-app-users-api.json");
        let interaction = &doc.interactions[0];
        assert_eq!(interaction.provider_states[0].name, "users exist");
        assert!(interaction.request.matching_rules.is_none());
        assert_eq!(
            doc.metadata.pact_specification.version,
            PACT_SPECIFICATION_VERSION
        );
    }

    #[test]
    fn test_empty_rules_are_omitted() {
        assert!(MatchingRules::from_body(RuleTable::new()).is_none());
    }
}
