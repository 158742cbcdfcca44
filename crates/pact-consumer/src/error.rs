//! Error types for matcher construction, mock server communication and the
//! test lifecycle.

use crate::matchers::MatcherKind;
use crate::mismatch::MismatchReport;
use std::time::Duration;
use thiserror::Error;

/// Malformed matcher configuration.
///
/// Raised at construction or extraction time. Any of these aborts building
/// the contract for the interaction that carried the matcher.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatcherError {
    #[error("Invalid array range: max ({max}) is less than min ({min})")]
    InvalidRange { min: usize, max: usize },
    #[error("Invalid regex pattern '{pattern}' at {path}: {reason}")]
    InvalidPattern {
        path: String,
        pattern: String,
        reason: String,
    },
    #[error("Example '{example}' at {path} does not match pattern '{pattern}'")]
    RegexExampleMismatch {
        path: String,
        example: String,
        pattern: String,
    },
    #[error("Conflicting matchers at {path}: {existing} already set, cannot add {incoming}")]
    ConflictingMatcher {
        path: String,
        existing: MatcherKind,
        incoming: MatcherKind,
    },
    #[error("Duplicate key '{key}' at {path}")]
    DuplicateKey { path: String, key: String },
    #[error("Unsupported value at {path}: {reason}")]
    UnsupportedValueType { path: String, reason: String },
}

/// Transport-level failures talking to the external mock server.
#[derive(Error, Debug)]
pub enum MockServerError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Mock server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("Connection failed: {0}")]
    Connection(String),
}

/// Invalid environment configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: '{value}' ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Lifecycle stage bounded by a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Setup,
    Run,
    Verify,
    WriteContract,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Stage::Setup => "setup",
            Stage::Run => "run",
            Stage::Verify => "verify",
            Stage::WriteContract => "write contract",
        };
        f.write_str(label)
    }
}

/// Coarse error taxonomy used to decide whether a suite may continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ValidationFailure,
    MismatchFailure,
    Timeout,
    MalformedMatcherConfig,
    ServerCommunication,
    TestRoutine,
    Serialization,
    Usage,
}

impl ErrorKind {
    /// Whether the suite keeps running after an error of this kind.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorKind::MismatchFailure
                | ErrorKind::Timeout
                | ErrorKind::ServerCommunication
                | ErrorKind::TestRoutine
        )
    }
}

/// Errors surfaced by [`crate::MockService`].
#[derive(Error, Debug)]
pub enum MockServiceError {
    #[error("Pact validation failed, unverified interactions: {}", .unverified.join(", "))]
    ValidationFailure { unverified: Vec<String> },
    #[error("{0}")]
    Mismatch(MismatchReport),
    #[error("Timed out after {after:?} during {stage}")]
    Timeout { stage: Stage, after: Duration },
    #[error("Malformed matcher configuration: {0}")]
    MalformedMatcherConfig(#[from] MatcherError),
    #[error("Mock server communication failed: {0}")]
    ServerCommunication(#[from] MockServerError),
    #[error("Error thrown in test function: {0}")]
    TestRoutine(String),
    #[error("Failed to serialize contract: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("No interaction described, call upon_receiving() before run()")]
    NoInteraction,
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl MockServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MockServiceError::ValidationFailure { .. } => ErrorKind::ValidationFailure,
            MockServiceError::Mismatch(_) => ErrorKind::MismatchFailure,
            MockServiceError::Timeout { .. } => ErrorKind::Timeout,
            MockServiceError::MalformedMatcherConfig(_) => ErrorKind::MalformedMatcherConfig,
            MockServiceError::ServerCommunication(_) => ErrorKind::ServerCommunication,
            MockServiceError::TestRoutine(_) => ErrorKind::TestRoutine,
            MockServiceError::Serialization(_) => ErrorKind::Serialization,
            MockServiceError::NoInteraction | MockServiceError::Config(_) => ErrorKind::Usage,
        }
    }
}
