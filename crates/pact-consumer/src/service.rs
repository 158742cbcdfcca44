//! Consumer test lifecycle against an external mock server.
//!
//! Each interaction goes through `Described -> Running -> Verifying` and
//! ends up `Passed` or `Failed`. Failures of one interaction are reported
//! and do not stop the rest of the suite; [`MockService::finalize`] only
//! writes the contract once every interaction has passed.

use crate::config::PactConfig;
use crate::contract::{Interaction, Pact};
use crate::error::{MockServerError, MockServiceError, Stage};
use crate::mismatch::MismatchReport;
use crate::mock_server::{HttpMockServer, MockServer, VerifyOutcome};
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, warn};

/// Where an interaction is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Described,
    Running,
    Verifying,
    Passed,
    Failed,
}

/// Receives a formatted message for every failed interaction.
pub trait FailureReporter: Send + Sync {
    fn report_failure(&self, message: &str);
}

/// Writes failures to stderr and the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl FailureReporter for ConsoleReporter {
    fn report_failure(&self, message: &str) {
        error!(failure = %message, "Interaction failed");
        eprintln!("{message}");
    }
}

/// Handed to the test routine; signals that the consumer code is done.
///
/// Dropping it without calling [`Completion::complete`] makes the gateway
/// wait for the routine to return instead, so a routine that fails with
/// `?` is reported as a routine error rather than a timeout. A routine
/// that completes early is still awaited after verification; an error or
/// panic it raises later fails the interaction.
#[derive(Debug)]
pub struct Completion {
    tx: oneshot::Sender<()>,
}

impl Completion {
    fn channel() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    pub fn complete(self) {
        let _ = self.tx.send(());
    }
}

/// Drives interactions through a [`MockServer`] and writes the contract.
pub struct MockService<S = HttpMockServer> {
    pact: Pact,
    states: Vec<InteractionState>,
    server: S,
    reporter: Box<dyn FailureReporter>,
    pact_dir: PathBuf,
    timeout: Duration,
}

impl MockService<HttpMockServer> {
    /// Connect to the mock server named by the environment.
    pub fn new(
        consumer: impl Into<String>,
        provider: impl Into<String>,
    ) -> Result<Self, MockServiceError> {
        let config = PactConfig::from_env()?;
        Self::with_config(consumer, provider, &config)
    }

    pub fn with_config(
        consumer: impl Into<String>,
        provider: impl Into<String>,
        config: &PactConfig,
    ) -> Result<Self, MockServiceError> {
        let server = HttpMockServer::new(&config.mock_server_url)?;
        Ok(Self::with_server(consumer, provider, server, config))
    }
}

impl<S: MockServer> MockService<S> {
    pub fn with_server(
        consumer: impl Into<String>,
        provider: impl Into<String>,
        server: S,
        config: &PactConfig,
    ) -> Self {
        Self {
            pact: Pact::new(consumer, provider),
            states: Vec::new(),
            server,
            reporter: Box::new(ConsoleReporter),
            pact_dir: config.pact_dir.clone(),
            timeout: config.timeout,
        }
    }

    /// Replace the default [`ConsoleReporter`].
    pub fn with_reporter(mut self, reporter: impl FailureReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// URL consumer code should send its requests to.
    pub fn base_url(&self) -> &str {
        self.server.base_url()
    }

    pub fn pact(&self) -> &Pact {
        &self.pact
    }

    pub fn pact_dir(&self) -> &Path {
        &self.pact_dir
    }

    /// Start describing the next interaction.
    pub fn upon_receiving(&mut self, description: impl Into<String>) -> &mut Interaction {
        self.states.push(InteractionState::Described);
        self.pact.add_interaction(Interaction::upon_receiving(description))
    }

    pub fn states(&self) -> &[InteractionState] {
        &self.states
    }

    pub fn state(&self, index: usize) -> Option<InteractionState> {
        self.states.get(index).copied()
    }

    /// True once every described interaction has passed.
    pub fn all_verified(&self) -> bool {
        self.states.iter().all(|s| *s == InteractionState::Passed)
    }

    /// Run the most recently described interaction.
    ///
    /// The interaction is registered with the mock server, `routine` is
    /// spawned with the server's base URL, and once it signals completion
    /// the observed traffic is verified and the routine's own result is
    /// collected. Every stage is bounded by `timeout` (or the configured
    /// default); a routine still running when it expires is aborted.
    /// Verification failures take precedence over routine errors. Failures
    /// are passed to the reporter before being returned.
    pub async fn run<F, Fut, E>(
        &mut self,
        timeout: Option<Duration>,
        routine: F,
    ) -> Result<(), MockServiceError>
    where
        F: FnOnce(String, Completion) -> Fut,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let index = self
            .states
            .len()
            .checked_sub(1)
            .ok_or(MockServiceError::NoInteraction)?;
        let timeout = timeout.unwrap_or(self.timeout);
        let description = self.pact.interactions()[index].description.clone();

        info!("Running interaction '{}'", description);
        let result = self.drive(index, timeout, routine).await;

        match &result {
            Ok(()) => {
                self.states[index] = InteractionState::Passed;
                info!("Interaction '{}' verified", description);
            }
            Err(e) => {
                self.states[index] = InteractionState::Failed;
                warn!("Interaction '{}' failed: {:?}", description, e.kind());
                self.reporter
                    .report_failure(&format!("Interaction '{description}' failed\n{e}"));
            }
        }

        result
    }

    async fn drive<F, Fut, E>(
        &mut self,
        index: usize,
        timeout: Duration,
        routine: F,
    ) -> Result<(), MockServiceError>
    where
        F: FnOnce(String, Completion) -> Fut,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let current = &self.pact.interactions()[index..=index];
        let contract = serde_json::to_vec(&self.pact.document_for(current)?)?;

        self.states[index] = InteractionState::Running;
        bounded(Stage::Setup, timeout, self.server.setup(&contract)).await?;
        debug!("Mock server ready at {}", self.server.base_url());

        let deadline = Instant::now() + timeout;
        let (completion, signal) = Completion::channel();
        let mut handle = tokio::spawn(routine(self.server.base_url().to_string(), completion));

        let completed = match timeout_at(deadline, signal).await {
            Err(_) => {
                handle.abort();
                return Err(MockServiceError::Timeout {
                    stage: Stage::Run,
                    after: timeout,
                });
            }
            Ok(Ok(())) => true,
            Ok(Err(_)) => false,
        };
        if !completed {
            // Completion dropped unsignalled: the routine's own result decides.
            join_routine(deadline, timeout, &mut handle).await?;
        }

        self.states[index] = InteractionState::Verifying;
        let verified = bounded(Stage::Verify, timeout, self.server.verify())
            .await
            .and_then(|outcome| match outcome {
                VerifyOutcome::Verified => Ok(()),
                VerifyOutcome::Mismatches(payload) => Err(MockServiceError::Mismatch(
                    MismatchReport::decode_str(&payload),
                )),
            });

        // A routine that signalled early must still finish cleanly.
        let finished = if completed {
            join_routine(deadline, timeout, &mut handle).await
        } else {
            Ok(())
        };

        verified.and(finished)
    }

    /// Write the contract once every interaction has passed.
    ///
    /// Returns the path reported by the mock server. Nothing is written
    /// while any interaction is unverified.
    pub async fn finalize(&self) -> Result<String, MockServiceError> {
        let unverified: Vec<String> = self
            .pact
            .interactions()
            .iter()
            .zip(&self.states)
            .filter(|(_, state)| **state != InteractionState::Passed)
            .map(|(interaction, _)| interaction.description.clone())
            .collect();

        if !unverified.is_empty() {
            let err = MockServiceError::ValidationFailure { unverified };
            self.reporter.report_failure(&err.to_string());
            return Err(err);
        }

        let contract = self.pact.serialize()?;
        let written = bounded(
            Stage::WriteContract,
            self.timeout,
            self.server.write_contract(&contract, &self.pact_dir),
        )
        .await;

        match written {
            Ok(path) => {
                info!(
                    "Wrote pact between {} and {} to {}",
                    self.pact.consumer(),
                    self.pact.provider(),
                    path
                );
                Ok(path)
            }
            Err(e) => {
                self.reporter.report_failure(&e.to_string());
                Err(e)
            }
        }
    }
}

/// Wait for the spawned routine, aborting it once `deadline` passes.
async fn join_routine<E: fmt::Display>(
    deadline: Instant,
    after: Duration,
    handle: &mut JoinHandle<Result<(), E>>,
) -> Result<(), MockServiceError> {
    match timeout_at(deadline, &mut *handle).await {
        Err(_) => {
            handle.abort();
            Err(MockServiceError::Timeout {
                stage: Stage::Run,
                after,
            })
        }
        Ok(Ok(Ok(()))) => Ok(()),
        Ok(Ok(Err(e))) => Err(MockServiceError::TestRoutine(e.to_string())),
        Ok(Err(join)) => Err(MockServiceError::TestRoutine(join.to_string())),
    }
}

async fn bounded<T, F>(stage: Stage, after: Duration, fut: F) -> Result<T, MockServiceError>
where
    F: Future<Output = Result<T, MockServerError>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(MockServiceError::Timeout { stage, after }),
    }
}
