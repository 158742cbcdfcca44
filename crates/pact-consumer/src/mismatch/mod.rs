//! Decoding and rendering of mock server verification failures.
//!
//! The mock server reports mismatches as a loosely typed JSON array. Some
//! fields change type between requests (`expected`/`actual` are either a
//! string or an array of integers), so decoding is lenient and never fails:
//! a payload that cannot be understood becomes a single synthetic
//! `mock-server-parsing-fail` entry.

mod report;

use serde::Deserialize;
use std::fmt;
use tracing::warn;

/// What went wrong with one expected or observed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum VerificationErrorKind {
    /// Expected but never received.
    MissingRequest,
    /// Received but never expected.
    RequestNotFound,
    /// Received with different query, headers or body.
    RequestMismatch,
    MockServerParsingFailed,
    Unknown,
}

impl From<String> for VerificationErrorKind {
    fn from(value: String) -> Self {
        VerificationErrorKind::from(value.as_str())
    }
}

impl From<&str> for VerificationErrorKind {
    fn from(value: &str) -> Self {
        match value {
            "missing-request" => VerificationErrorKind::MissingRequest,
            "request-not-found" => VerificationErrorKind::RequestNotFound,
            "request-mismatch" => VerificationErrorKind::RequestMismatch,
            "mock-server-parsing-fail" | "mock-server-parsing-failed" => {
                VerificationErrorKind::MockServerParsingFailed
            }
            _ => VerificationErrorKind::Unknown,
        }
    }
}

impl VerificationErrorKind {
    /// Wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationErrorKind::MissingRequest => "missing-request",
            VerificationErrorKind::RequestNotFound => "request-not-found",
            VerificationErrorKind::RequestMismatch => "request-mismatch",
            VerificationErrorKind::MockServerParsingFailed => "mock-server-parsing-fail",
            VerificationErrorKind::Unknown => "unknown",
        }
    }

    /// Human-readable reason shown in reports.
    pub fn reason(&self) -> &'static str {
        match self {
            VerificationErrorKind::MissingRequest => "Missing request",
            VerificationErrorKind::RequestNotFound => "Unexpected request",
            VerificationErrorKind::RequestMismatch => "Request does not match",
            VerificationErrorKind::MockServerParsingFailed => {
                "Failed to parse the mock server error response"
            }
            VerificationErrorKind::Unknown => "Unrecognised mock server error",
        }
    }
}

/// Part of the request a field-level mismatch refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum MismatchKind {
    Query,
    Body,
    Headers,
    Unknown,
}

impl From<String> for MismatchKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "QueryMismatch" => MismatchKind::Query,
            "BodyMismatch" | "BodyTypeMismatch" => MismatchKind::Body,
            "HeaderMismatch" => MismatchKind::Headers,
            _ => MismatchKind::Unknown,
        }
    }
}

/// Expected or actual value, which the server emits either as a string or
/// as a sequence of integers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MismatchValue {
    Text(String),
    Integers(Vec<i64>),
}

impl fmt::Display for MismatchValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchValue::Text(s) => f.write_str(s),
            MismatchValue::Integers(values) => {
                let joined: Vec<String> = values.iter().map(i64::to_string).collect();
                f.write_str(&joined.join(","))
            }
        }
    }
}

/// Field-level difference within a mismatched request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldMismatch {
    #[serde(rename = "type")]
    pub kind: MismatchKind,
    #[serde(default)]
    pub expected: Option<MismatchValue>,
    #[serde(default)]
    pub actual: Option<MismatchValue>,
    #[serde(default)]
    pub parameter: Option<String>,
    #[serde(default)]
    pub mismatch: Option<String>,
}

/// One verification failure reported by the mock server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MismatchEntry {
    #[serde(rename = "type")]
    pub kind: VerificationErrorKind,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub mismatches: Vec<FieldMismatch>,
}

impl MismatchEntry {
    fn parsing_failed() -> Self {
        Self {
            kind: VerificationErrorKind::MockServerParsingFailed,
            method: String::new(),
            path: String::new(),
            mismatches: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPayload {
    Entries(Vec<MismatchEntry>),
    Wrapped { mismatches: Vec<MismatchEntry> },
}

/// Decoded verification failure, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchReport {
    entries: Vec<MismatchEntry>,
    /// Raw payload, kept when it could not be decoded.
    raw: Option<String>,
}

impl MismatchReport {
    /// Decode a raw payload. Never fails and never yields an empty report.
    pub fn decode(payload: &[u8]) -> Self {
        match serde_json::from_slice::<RawPayload>(payload) {
            Ok(RawPayload::Entries(entries)) | Ok(RawPayload::Wrapped { mismatches: entries })
                if !entries.is_empty() =>
            {
                Self { entries, raw: None }
            }
            Ok(_) => {
                warn!("Mock server reported a failure without any mismatch entries");
                Self::parsing_failed(payload)
            }
            Err(e) => {
                warn!("Failed to decode mock server mismatch payload: {}", e);
                Self::parsing_failed(payload)
            }
        }
    }

    pub fn decode_str(payload: &str) -> Self {
        Self::decode(payload.as_bytes())
    }

    fn parsing_failed(payload: &[u8]) -> Self {
        let raw = String::from_utf8_lossy(payload).trim().to_string();
        Self {
            entries: vec![MismatchEntry::parsing_failed()],
            raw: (!raw.is_empty()).then_some(raw),
        }
    }

    pub fn entries(&self) -> &[MismatchEntry] {
        &self.entries
    }

    /// Undecodable payload text, if decoding fell back.
    pub fn raw_payload(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_decode_missing_request() {
        let report = MismatchReport::decode_str(
            r#"[{"type": "missing-request", "method": "GET", "path": "/users", "request": {"method": "GET"}}]"#,
        );
        let entry = &report.entries()[0];
        assert_eq!(entry.kind, VerificationErrorKind::MissingRequest);
        assert_eq!(entry.method, "GET");
        assert_eq!(entry.path, "/users");
        assert!(entry.mismatches.is_empty());
        assert!(report.raw_payload().is_none());
    }

    #[test]
    fn test_decode_integer_array_values() {
        let report = MismatchReport::decode_str(
            r#"[{
                "type": "request-mismatch",
                "method": "POST",
                "path": "/users",
                "mismatches": [
                    {"type": "BodyMismatch", "expected": [123, 34, 97], "actual": "{\"b\"", "mismatch": "Expected 'a'"},
                    {"type": "QueryMismatch", "parameter": "max", "expected": "100", "actual": "200"}
                ]
            }]"#,
        );
        let entry = &report.entries()[0];
        assert_eq!(entry.kind, VerificationErrorKind::RequestMismatch);
        let body = &entry.mismatches[0];
        assert_eq!(body.kind, MismatchKind::Body);
        assert_eq!(
            body.expected,
            Some(MismatchValue::Integers(vec![123, 34, 97]))
        );
        assert_eq!(body.expected.as_ref().unwrap().to_string(), "123,34,97");
        assert_eq!(body.actual, Some(MismatchValue::Text("{\"b\"".into())));
        assert_eq!(entry.mismatches[1].kind, MismatchKind::Query);
        assert_eq!(entry.mismatches[1].parameter.as_deref(), Some("max"));
    }

    #[test]
    fn test_unknown_type_maps_to_unknown() {
        let report = MismatchReport::decode_str(
            r#"[{"type": "something-new", "method": "GET", "path": "/"}]"#,
        );
        assert_eq!(report.entries()[0].kind, VerificationErrorKind::Unknown);
    }

    #[test]
    fn test_unknown_field_mismatch_kind() {
        let report = MismatchReport::decode_str(
            r#"[{"type": "request-mismatch", "method": "GET", "path": "/", "mismatches": [{"type": "MethodMismatch", "expected": "GET", "actual": "POST"}]}]"#,
        );
        assert_eq!(
            report.entries()[0].mismatches[0].kind,
            MismatchKind::Unknown
        );
    }

    #[test]
    fn test_invalid_json_falls_back() {
        let report = MismatchReport::decode_str("<html>Internal Server Error</html>");
        assert_eq!(report.entries().len(), 1);
        assert_eq!(
            report.entries()[0].kind,
            VerificationErrorKind::MockServerParsingFailed
        );
        assert_eq!(
            report.raw_payload(),
            Some("<html>Internal Server Error</html>")
        );
    }

    #[test]
    fn test_wrong_shape_falls_back() {
        let report = MismatchReport::decode_str(r#"{"error": "boom"}"#);
        assert_eq!(
            report.entries()[0].kind,
            VerificationErrorKind::MockServerParsingFailed
        );

        // expected as an object is neither a string nor an integer sequence
        let report = MismatchReport::decode_str(
            r#"[{"type": "request-mismatch", "mismatches": [{"type": "BodyMismatch", "expected": {"a": 1}}]}]"#,
        );
        assert_eq!(
            report.entries()[0].kind,
            VerificationErrorKind::MockServerParsingFailed
        );
    }

    #[test]
    fn test_missing_optional_fields() {
        let report = MismatchReport::decode_str(
            r#"[{"type": "request-mismatch", "mismatches": [{"type": "QueryMismatch"}]}]"#,
        );
        let entry = &report.entries()[0];
        assert_eq!(entry.kind, VerificationErrorKind::RequestMismatch);
        assert_eq!(entry.method, "");
        assert!(entry.mismatches[0].expected.is_none());
    }

    #[test]
    fn test_empty_payload_is_never_empty_report() {
        assert_eq!(MismatchReport::decode_str("[]").entries().len(), 1);
        let report = MismatchReport::decode(b"");
        assert_eq!(report.entries().len(), 1);
        assert!(report.raw_payload().is_none());
    }

    #[test]
    fn test_wrapped_payload() {
        let report = MismatchReport::decode_str(
            r#"{"mismatches": [{"type": "request-not-found", "method": "DELETE", "path": "/users/1"}]}"#,
        );
        assert_eq!(
            report.entries()[0].kind,
            VerificationErrorKind::RequestNotFound
        );
    }

    #[test]
    fn test_parsing_fail_aliases() {
        assert_eq!(
            VerificationErrorKind::from("mock-server-parsing-fail"),
            VerificationErrorKind::MockServerParsingFailed
        );
        assert_eq!(
            VerificationErrorKind::from("mock-server-parsing-failed"),
            VerificationErrorKind::MockServerParsingFailed
        );
    }

    #[test]
    #[traced_test]
    fn test_fallback_is_logged() {
        MismatchReport::decode_str("oops");
        assert!(logs_contain("Failed to decode mock server mismatch payload"));
    }
}
