//! Splits a matcher-bearing body into a literal example and a rule table.
//!
//! The walk is depth-first. A matcher records its rules at the current path
//! and its example is then walked at the same path, so nested matchers are
//! picked up without consuming a path segment. `EachLike` is recorded once
//! at the array path and its template is walked once at `path[*]`.

use crate::body::BodyValue;
use crate::error::MatcherError;
use crate::matchers::{Matcher, MatcherKind, RuleGroup, RuleTable};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Output of [`extract`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedBody {
    /// Body with every matcher replaced by its example.
    pub example: Value,
    /// Rules keyed by path, rooted at `$`.
    pub rules: RuleTable,
}

/// JSON-Pointer-like location inside a body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RulePath(String);

impl RulePath {
    pub fn root() -> Self {
        RulePath("$".to_string())
    }

    /// Object member. Keys outside `[A-Za-z0-9_]` use bracket notation.
    pub fn key(&self, key: &str) -> Self {
        let plain = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if plain {
            RulePath(format!("{}.{}", self.0, key))
        } else {
            RulePath(format!("{}['{}']", self.0, key.replace('\'', "\\'")))
        }
    }

    pub fn index(&self, index: usize) -> Self {
        RulePath(format!("{}[{}]", self.0, index))
    }

    /// Representative element of an array shape rule.
    pub fn wildcard(&self) -> Self {
        RulePath(format!("{}[*]", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the example body and rule table from `body`.
pub fn extract(body: &BodyValue) -> Result<ExtractedBody, MatcherError> {
    let mut extractor = RuleExtractor::default();
    let example = extractor.walk(body, &RulePath::root())?;
    Ok(ExtractedBody {
        example,
        rules: extractor.rules,
    })
}

#[derive(Default)]
struct RuleExtractor {
    rules: RuleTable,
    /// Matcher kind that produced each recorded path.
    owners: HashMap<String, MatcherKind>,
}

impl RuleExtractor {
    fn walk(&mut self, node: &BodyValue, path: &RulePath) -> Result<Value, MatcherError> {
        match node {
            BodyValue::Null => Ok(Value::Null),
            BodyValue::Bool(b) => Ok(Value::Bool(*b)),
            BodyValue::Number(n) => Ok(Value::Number(n.clone())),
            BodyValue::Float(f) => float_value(*f, path),
            BodyValue::String(s) => Ok(Value::String(s.clone())),
            BodyValue::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.walk(item, &path.index(i)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            BodyValue::Object(entries) => {
                let mut object = serde_json::Map::new();
                let mut seen: HashMap<&str, &BodyValue> = HashMap::new();
                for (key, value) in entries {
                    let child = path.key(key);
                    if let Some(previous) = seen.insert(key.as_str(), value) {
                        return Err(duplicate_key(previous, value, key, &child));
                    }
                    object.insert(key.clone(), self.walk(value, &child)?);
                }
                Ok(Value::Object(object))
            }
            BodyValue::Matcher(matcher) => self.walk_matcher(matcher, path),
        }
    }

    fn walk_matcher(&mut self, matcher: &Matcher, path: &RulePath) -> Result<Value, MatcherError> {
        if let Matcher::Regex { example, pattern } = matcher {
            check_regex(example, pattern, path)?;
        }

        self.record(path, matcher.kind(), matcher.rule_group())?;

        match matcher {
            Matcher::EachLike { template, .. } => {
                let element = self.walk(template, &path.wildcard())?;
                Ok(Value::Array(vec![element]))
            }
            other => self.walk(&other.example(), path),
        }
    }

    fn record(
        &mut self,
        path: &RulePath,
        kind: MatcherKind,
        group: RuleGroup,
    ) -> Result<(), MatcherError> {
        if let Some(existing) = self.owners.get(path.as_str()) {
            let same = *existing == kind && self.rules.get(path.as_str()) == Some(&group);
            if same {
                return Ok(());
            }
            return Err(MatcherError::ConflictingMatcher {
                path: path.to_string(),
                existing: *existing,
                incoming: kind,
            });
        }
        self.owners.insert(path.to_string(), kind);
        self.rules.insert(path.as_str(), group);
        Ok(())
    }
}

/// Two matchers under one key conflict; anything else is a plain duplicate.
fn duplicate_key(
    previous: &BodyValue,
    incoming: &BodyValue,
    key: &str,
    path: &RulePath,
) -> MatcherError {
    match (previous, incoming) {
        (BodyValue::Matcher(existing), BodyValue::Matcher(other))
            if existing.kind() != other.kind() =>
        {
            MatcherError::ConflictingMatcher {
                path: path.to_string(),
                existing: existing.kind(),
                incoming: other.kind(),
            }
        }
        _ => MatcherError::DuplicateKey {
            path: path.to_string(),
            key: key.to_string(),
        },
    }
}

fn float_value(f: f64, path: &RulePath) -> Result<Value, MatcherError> {
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| MatcherError::UnsupportedValueType {
            path: path.to_string(),
            reason: format!("non-finite number {f} cannot be represented in JSON"),
        })
}

fn check_regex(example: &str, pattern: &str, path: &RulePath) -> Result<(), MatcherError> {
    let regex = Regex::new(pattern).map_err(|e| MatcherError::InvalidPattern {
        path: path.to_string(),
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;
    if !regex.is_match(example) {
        return Err(MatcherError::RegexExampleMismatch {
            path: path.to_string(),
            example: example.to_string(),
            pattern: pattern.to_string(),
        });
    }
    Ok(())
}
