//! Serialized matching rule descriptors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a group of rules at one path is combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Combine {
    #[default]
    And,
    Or,
}

/// A single matching rule as it appears in the contract document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "match", rename_all = "lowercase")]
pub enum MatchingRule {
    Equality,
    /// Type match; `min`/`max` are set for array shape rules.
    Type {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
    },
    Integer,
    Decimal,
    Regex {
        regex: String,
    },
    Include {
        value: String,
    },
}

impl MatchingRule {
    /// Plain type rule without cardinality bounds.
    pub fn type_match() -> Self {
        MatchingRule::Type {
            min: None,
            max: None,
        }
    }

    /// The `match` tag this rule serializes with.
    pub fn tag(&self) -> &'static str {
        match self {
            MatchingRule::Equality => "equality",
            MatchingRule::Type { .. } => "type",
            MatchingRule::Integer => "integer",
            MatchingRule::Decimal => "decimal",
            MatchingRule::Regex { .. } => "regex",
            MatchingRule::Include { .. } => "include",
        }
    }
}

/// All rules recorded at one path.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RuleGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combine: Option<Combine>,
    pub matchers: Vec<MatchingRule>,
}

impl RuleGroup {
    pub fn single(rule: MatchingRule) -> Self {
        Self {
            combine: None,
            matchers: vec![rule],
        }
    }
}

/// Rule table keyed by path (`$.data.items[*].id`).
///
/// Backed by a `BTreeMap` so serialization order is stable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RuleTable(BTreeMap<String, RuleGroup>);

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&RuleGroup> {
        self.0.get(path)
    }

    pub fn insert(&mut self, path: impl Into<String>, group: RuleGroup) {
        self.0.insert(path.into(), group);
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RuleGroup)> {
        self.0.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rule_serialization_tags() {
        assert_eq!(
            serde_json::to_value(MatchingRule::Equality).unwrap(),
            json!({"match": "equality"})
        );
        assert_eq!(
            serde_json::to_value(MatchingRule::type_match()).unwrap(),
            json!({"match": "type"})
        );
        assert_eq!(
            serde_json::to_value(MatchingRule::Type {
                min: Some(1),
                max: Some(5)
            })
            .unwrap(),
            json!({"match": "type", "min": 1, "max": 5})
        );
        assert_eq!(
            serde_json::to_value(MatchingRule::Regex {
                regex: "\\d+".into()
            })
            .unwrap(),
            json!({"match": "regex", "regex": "\\d+"})
        );
        assert_eq!(
            serde_json::to_value(MatchingRule::Include {
                value: "abc".into()
            })
            .unwrap(),
            json!({"match": "include", "value": "abc"})
        );
    }

    #[test]
    fn test_rule_group_deserialize() {
        let group: RuleGroup = serde_json::from_value(json!({
            "combine": "OR",
            "matchers": [{"match": "include", "value": "a"}, {"match": "type", "min": 2}]
        }))
        .unwrap();
        assert_eq!(group.combine, Some(Combine::Or));
        assert_eq!(group.matchers[0].tag(), "include");
        assert_eq!(
            group.matchers[1],
            MatchingRule::Type {
                min: Some(2),
                max: None
            }
        );
    }

    #[test]
    fn test_group_without_combine_omits_field() {
        let group = RuleGroup::single(MatchingRule::Integer);
        assert_eq!(
            serde_json::to_value(&group).unwrap(),
            json!({"matchers": [{"match": "integer"}]})
        );
    }
}
