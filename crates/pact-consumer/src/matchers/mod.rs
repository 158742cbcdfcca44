//! Structural matchers that can be embedded in request and response bodies.
//!
//! A matcher contributes two things when a body is extracted:
//!
//! - an example value written verbatim into the contract body
//! - one or more [`MatchingRule`]s recorded at the matcher's path
//!
//! # Example
//!
//! ```
//! use pact_consumer::matchers::{each_like_range, integer_like, something_like};
//! use pact_consumer::BodyValue;
//!
//! let body = BodyValue::object([(
//!     "users",
//!     BodyValue::from(
//!         each_like_range(
//!             BodyValue::object([
//!                 ("id", BodyValue::from(integer_like(1))),
//!                 ("name", BodyValue::from(something_like("Mary"))),
//!             ]),
//!             1,
//!             Some(10),
//!         )
//!         .unwrap(),
//!     ),
//! )]);
//! assert!(body.contains_matcher());
//! ```

mod rules;

pub use rules::{Combine, MatchingRule, RuleGroup, RuleTable};

use crate::body::BodyValue;
use crate::error::MatcherError;
use std::fmt;

/// Kind of a [`Matcher`], used for conflict reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatcherKind {
    Equality,
    Type,
    Integer,
    Decimal,
    Regex,
    EachLike,
    Includes,
}

impl fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatcherKind::Equality => "EqualTo",
            MatcherKind::Type => "SomethingLike",
            MatcherKind::Integer => "IntegerLike",
            MatcherKind::Decimal => "DecimalLike",
            MatcherKind::Regex => "RegexLike",
            MatcherKind::EachLike => "EachLike",
            MatcherKind::Includes => "IncludesLike",
        };
        f.write_str(name)
    }
}

/// A structural matching rule together with its example.
#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    /// Actual value must equal the example exactly.
    Equality(BodyValue),
    /// Actual value must have the same JSON type as the example.
    Type(BodyValue),
    Integer(i64),
    Decimal(f64),
    /// Actual value must satisfy `pattern`; the example must too.
    Regex { example: String, pattern: String },
    /// Array whose elements are each like `template`.
    EachLike {
        template: BodyValue,
        min: usize,
        max: Option<usize>,
    },
    /// String must include every value (`And`) or any value (`Or`).
    Includes {
        values: Vec<String>,
        combine: Combine,
    },
}

impl Matcher {
    pub fn kind(&self) -> MatcherKind {
        match self {
            Matcher::Equality(_) => MatcherKind::Equality,
            Matcher::Type(_) => MatcherKind::Type,
            Matcher::Integer(_) => MatcherKind::Integer,
            Matcher::Decimal(_) => MatcherKind::Decimal,
            Matcher::Regex { .. } => MatcherKind::Regex,
            Matcher::EachLike { .. } => MatcherKind::EachLike,
            Matcher::Includes { .. } => MatcherKind::Includes,
        }
    }

    /// The example this matcher contributes, which may itself contain matchers.
    ///
    /// `EachLike` yields a single-element array built from its template.
    pub fn example(&self) -> BodyValue {
        match self {
            Matcher::Equality(value) | Matcher::Type(value) => value.clone(),
            Matcher::Integer(n) => BodyValue::Number((*n).into()),
            Matcher::Decimal(f) => BodyValue::Float(*f),
            Matcher::Regex { example, .. } => BodyValue::String(example.clone()),
            Matcher::EachLike { template, .. } => BodyValue::Array(vec![template.clone()]),
            Matcher::Includes { values, .. } => BodyValue::String(values.join(" ")),
        }
    }

    /// The fully resolved literal example, with nested matchers replaced.
    pub fn example_value(&self) -> Result<serde_json::Value, MatcherError> {
        crate::extract::extract(&BodyValue::from(self.clone())).map(|body| body.example)
    }

    /// Rule descriptors recorded at this matcher's path.
    pub fn rule_descriptors(&self) -> Vec<MatchingRule> {
        match self {
            Matcher::Equality(_) => vec![MatchingRule::Equality],
            Matcher::Type(_) => vec![MatchingRule::type_match()],
            Matcher::Integer(_) => vec![MatchingRule::Integer],
            Matcher::Decimal(_) => vec![MatchingRule::Decimal],
            Matcher::Regex { pattern, .. } => vec![MatchingRule::Regex {
                regex: pattern.clone(),
            }],
            Matcher::EachLike { min, max, .. } => vec![MatchingRule::Type {
                min: Some(*min),
                max: *max,
            }],
            Matcher::Includes { values, .. } => values
                .iter()
                .map(|value| MatchingRule::Include {
                    value: value.clone(),
                })
                .collect(),
        }
    }

    /// Rule descriptors grouped with their combine mode.
    pub fn rule_group(&self) -> RuleGroup {
        let combine = match self {
            Matcher::Includes { values, combine } if !values.is_empty() => Some(*combine),
            _ => None,
        };
        RuleGroup {
            combine,
            matchers: self.rule_descriptors(),
        }
    }
}

/// Value must equal `value` exactly.
pub fn equal_to(value: impl Into<BodyValue>) -> Matcher {
    Matcher::Equality(value.into())
}

/// Value must have the same type as `value`.
pub fn something_like(value: impl Into<BodyValue>) -> Matcher {
    Matcher::Type(value.into())
}

pub fn integer_like(value: i64) -> Matcher {
    Matcher::Integer(value)
}

pub fn decimal_like(value: f64) -> Matcher {
    Matcher::Decimal(value)
}

/// Value must match `pattern`. The pattern is compiled during extraction.
pub fn regex_like(example: impl Into<String>, pattern: impl Into<String>) -> Matcher {
    Matcher::Regex {
        example: example.into(),
        pattern: pattern.into(),
    }
}

/// Array of at least one element shaped like `template`.
pub fn each_like(template: impl Into<BodyValue>) -> Matcher {
    Matcher::EachLike {
        template: template.into(),
        min: 1,
        max: None,
    }
}

/// Array of `min..=max` elements shaped like `template`.
pub fn each_like_range(
    template: impl Into<BodyValue>,
    min: usize,
    max: Option<usize>,
) -> Result<Matcher, MatcherError> {
    if let Some(max) = max {
        if max < min {
            return Err(MatcherError::InvalidRange { min, max });
        }
    }
    Ok(Matcher::EachLike {
        template: template.into(),
        min,
        max,
    })
}

/// String including every one of `values`.
///
/// An empty `values` list records no rules.
pub fn includes_like<I, S>(values: I) -> Matcher
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    includes_like_with(values, Combine::default())
}

/// String including each (`And`) or any (`Or`) of `values`.
pub fn includes_like_with<I, S>(values: I, combine: Combine) -> Matcher
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Matcher::Includes {
        values: values.into_iter().map(Into::into).collect(),
        combine,
    }
}
