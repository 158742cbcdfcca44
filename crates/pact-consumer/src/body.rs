//! Request and response body trees that may embed matchers.

use crate::matchers::Matcher;

/// A JSON-like body value where any node may be a [`Matcher`].
///
/// Object entries keep the order they were given in. Keys must be unique:
/// a repeated key is rejected when the body is extracted.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    /// Floating point literal, checked for finiteness during extraction.
    Float(f64),
    String(String),
    Array(Vec<BodyValue>),
    Object(Vec<(String, BodyValue)>),
    Matcher(Box<Matcher>),
}

impl BodyValue {
    /// Build an object from key/value pairs.
    pub fn object<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<BodyValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        BodyValue::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build an array from values.
    pub fn array<V, I>(items: I) -> Self
    where
        V: Into<BodyValue>,
        I: IntoIterator<Item = V>,
    {
        BodyValue::Array(items.into_iter().map(Into::into).collect())
    }

    /// Whether this node or any descendant is a matcher.
    pub fn contains_matcher(&self) -> bool {
        match self {
            BodyValue::Matcher(_) => true,
            BodyValue::Array(items) => items.iter().any(BodyValue::contains_matcher),
            BodyValue::Object(entries) => entries.iter().any(|(_, v)| v.contains_matcher()),
            _ => false,
        }
    }
}

impl From<serde_json::Value> for BodyValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => BodyValue::Null,
            serde_json::Value::Bool(b) => BodyValue::Bool(b),
            serde_json::Value::Number(n) => BodyValue::Number(n),
            serde_json::Value::String(s) => BodyValue::String(s),
            serde_json::Value::Array(items) => {
                BodyValue::Array(items.into_iter().map(BodyValue::from).collect())
            }
            serde_json::Value::Object(map) => BodyValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, BodyValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Matcher> for BodyValue {
    fn from(matcher: Matcher) -> Self {
        BodyValue::Matcher(Box::new(matcher))
    }
}

impl From<&str> for BodyValue {
    fn from(s: &str) -> Self {
        BodyValue::String(s.to_string())
    }
}

impl From<String> for BodyValue {
    fn from(s: String) -> Self {
        BodyValue::String(s)
    }
}

impl From<bool> for BodyValue {
    fn from(b: bool) -> Self {
        BodyValue::Bool(b)
    }
}

impl From<f64> for BodyValue {
    fn from(f: f64) -> Self {
        BodyValue::Float(f)
    }
}

macro_rules! body_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for BodyValue {
                fn from(n: $t) -> Self {
                    BodyValue::Number(n.into())
                }
            }
        )*
    };
}

body_from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl<T: Into<BodyValue>> From<Vec<T>> for BodyValue {
    fn from(items: Vec<T>) -> Self {
        BodyValue::array(items)
    }
}

impl<T: Into<BodyValue>> From<Option<T>> for BodyValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(BodyValue::Null)
    }
}
