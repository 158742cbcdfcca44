//! Human-readable rendering of a [`MismatchReport`].

use super::{FieldMismatch, MismatchEntry, MismatchKind, MismatchReport, VerificationErrorKind};
use std::fmt;

const HEADER: &str = "Actual request does not match expected interactions...";

impl MismatchEntry {
    /// The request as the contract expected it.
    pub fn expected_request(&self) -> String {
        match self.kind {
            VerificationErrorKind::MissingRequest => self.request_line(),
            VerificationErrorKind::RequestMismatch => {
                let query: Vec<String> = self
                    .mismatches
                    .iter()
                    .filter(|m| m.kind == MismatchKind::Query)
                    .map(|m| {
                        format!(
                            "{}={}",
                            m.parameter.as_deref().unwrap_or("unknown_parameter"),
                            m.expected.as_ref().map(|v| v.to_string()).unwrap_or_default()
                        )
                    })
                    .collect();
                if query.is_empty() {
                    self.request_line()
                } else {
                    format!("{}?{}", self.request_line(), query.join("&"))
                }
            }
            _ => String::new(),
        }
    }

    /// What the mock server actually observed.
    pub fn actual_request(&self) -> String {
        match self.kind {
            VerificationErrorKind::MissingRequest => "expected but not observed".to_string(),
            VerificationErrorKind::RequestNotFound => {
                format!("{} (observed but not expected)", self.request_line())
            }
            VerificationErrorKind::RequestMismatch => {
                let mut lines = vec![self.request_line()];
                lines.extend(self.mismatches.iter().map(FieldMismatch::describe));
                lines.join("\n\t")
            }
            VerificationErrorKind::MockServerParsingFailed | VerificationErrorKind::Unknown => {
                self.request_line()
            }
        }
    }

    fn request_line(&self) -> String {
        format!("{} {}", self.method, self.path).trim().to_string()
    }
}

impl FieldMismatch {
    /// One labeled line describing this difference.
    pub fn describe(&self) -> String {
        let detail = match &self.mismatch {
            Some(text) => text.clone(),
            None => format!(
                "expected '{}', received '{}'",
                self.expected
                    .as_ref()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "<none>".to_string()),
                self.actual
                    .as_ref()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "<none>".to_string())
            ),
        };

        match self.kind {
            MismatchKind::Query => format!(
                "query param '{}': {}",
                self.parameter.as_deref().unwrap_or("unknown_parameter"),
                detail
            ),
            MismatchKind::Headers => format!(
                "header '{}': {}",
                self.parameter.as_deref().unwrap_or("unknown_header"),
                detail
            ),
            MismatchKind::Body => format!(
                "body: Body in request does not match the expected body definition: {detail}"
            ),
            MismatchKind::Unknown => detail,
        }
    }
}

impl fmt::Display for MismatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{HEADER}")?;

        for entry in &self.entries {
            let actual = match (&entry.kind, &self.raw) {
                (VerificationErrorKind::MockServerParsingFailed, Some(raw)) => raw.clone(),
                _ => entry.actual_request(),
            };

            writeln!(f)?;
            writeln!(f, "Reason:\n\t{}", entry.kind.reason())?;
            writeln!(f)?;
            writeln!(f, "Request:\n\t{}", entry.expected_request())?;
            writeln!(f)?;
            writeln!(f, "Error:\n\t{actual}")?;
        }

        Ok(())
    }
}
