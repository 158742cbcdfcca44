//! Consumer side of consumer-driven contract testing.
//!
//! Describe the interactions a consumer expects from a provider, run the
//! consumer code against an external mock server, and write the verified
//! interactions as a Pact contract file. Bodies may embed structural
//! matchers, which are split into an example body and a table of matching
//! rules when the contract is built.
//!
//! # Example
//!
//! ```no_run
//! use pact_consumer::{something_like, BodyValue, Method, MockService};
//!
//! # async fn consumer_test() -> Result<(), Box<dyn std::error::Error>> {
//! let mut service = MockService::new("web-app", "user-service")?;
//!
//! service
//!     .upon_receiving("a request for a user")
//!     .given("user 1 exists")
//!     .with_request(Method::Get, "/users/1")
//!     .will_respond_with(200)
//!     .response_body(BodyValue::object([("name", something_like("Mary"))]));
//!
//! service
//!     .run(None, |base_url, done| async move {
//!         let user = reqwest::get(format!("{base_url}/users/1")).await?;
//!         assert_eq!(user.status(), 200);
//!         done.complete();
//!         Ok::<_, reqwest::Error>(())
//!     })
//!     .await?;
//!
//! let path = service.finalize().await?;
//! println!("contract written to {path}");
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod config;
pub mod contract;
pub mod error;
pub mod extract;
pub mod matchers;
pub mod mismatch;
pub mod mock_server;
pub mod service;

// Re-export public types
pub use body::BodyValue;
pub use config::PactConfig;
pub use contract::{Interaction, Method, Pact, PactDocument, Request, Response};
pub use error::{
    ConfigError, ErrorKind, MatcherError, MockServerError, MockServiceError, Stage,
};
pub use extract::{extract, ExtractedBody, RulePath};
pub use mismatch::{MismatchEntry, MismatchReport, VerificationErrorKind};
pub use mock_server::{HttpMockServer, MockServer, VerifyOutcome};
pub use service::{Completion, ConsoleReporter, FailureReporter, InteractionState, MockService};

// Matcher constructors are used inline in bodies
pub use matchers::{
    decimal_like, each_like, each_like_range, equal_to, includes_like, includes_like_with,
    integer_like, regex_like, something_like, Combine, Matcher, MatcherKind,
};
