//! A mock provider session: configuration, interaction registration, and
//! verification.
//!
//! One [`MockSession`] belongs to one test. Matching is stateful, so sessions
//! must not be shared between tests running concurrently.
//!
//! ```ignore
//! let session = Arc::new(MockSession::start(PactConfig::new("xo-sdk", "xenorchestra")).await?);
//! session
//!     .add_interaction()
//!     .given("No user exists")
//!     .upon_receiving("A request to create ddelnano")
//!     .with_request(RequestExpectation::post("/api").header("Content-Type", "application/json"))
//!     .will_respond_with(ResponseSpec::ok().json_body(json!("a1234abcd")));
//!
//! session.verify(|| async { client.create_user(&user).await.map(drop) }).await?;
//! ```

use std::fmt::Display;
use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::server::{lock, MockServer, SharedRegistry};
use crate::{
    contract_file, ContractError, Interaction, InteractionRegistry, RequestExpectation,
    ResponseSpec, VerificationFailure,
};

/// Default interface the mock binds to.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Identity of the contract and where the mock listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PactConfig {
    /// Name of the consumer (this client), e.g. `"xo-sdk"`.
    pub consumer: String,
    /// Name of the provider being mocked, e.g. `"xenorchestra"`.
    pub provider: String,
    /// Host the mock binds to. The port is always assigned by the OS.
    pub host: String,
    /// Directory the contract file is written to at teardown; `None` skips it.
    pub contract_dir: Option<PathBuf>,
}

impl PactConfig {
    /// Binds to [`DEFAULT_HOST`] and writes no contract file.
    pub fn new(consumer: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            consumer: consumer.into(),
            provider: provider.into(),
            host: DEFAULT_HOST.to_string(),
            contract_dir: None,
        }
    }

    /// Binds the mock to `host` instead.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Writes the contract file into `dir` at teardown.
    pub fn with_contract_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.contract_dir = Some(dir.into());
        self
    }
}

/// A running mock provider and its interaction registry.
#[derive(Debug)]
pub struct MockSession {
    config: PactConfig,
    registry: SharedRegistry,
    server: MockServer,
    torn_down: AtomicBool,
}

impl MockSession {
    /// Starts the mock server on an OS-assigned port.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn start(config: PactConfig) -> Result<Self, ContractError> {
        let registry: SharedRegistry = Arc::new(Mutex::new(InteractionRegistry::new()));
        let server = MockServer::bind(&config.host, registry.clone()).await?;
        info!(
            consumer = %config.consumer,
            provider = %config.provider,
            addr = %server.addr(),
            "mock provider session started"
        );

        Ok(Self {
            config,
            registry,
            server,
            torn_down: AtomicBool::new(false),
        })
    }

    /// Configuration the session was started with.
    pub fn config(&self) -> &PactConfig {
        &self.config
    }

    /// Address the mock is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.server.addr()
    }

    /// Port assigned to the mock.
    pub fn port(&self) -> u16 {
        self.server.addr().port()
    }

    /// `http://<host>:<port>` of the mock.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.server.addr())
    }

    /// Absolute URL of `path` on the mock. `path` must start with `/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Starts registering a new interaction.
    pub fn add_interaction(&self) -> InteractionBuilder<'_> {
        InteractionBuilder {
            session: self,
            provider_state: None,
            description: String::new(),
        }
    }

    /// Number of registered interactions not yet verified.
    pub fn pending(&self) -> usize {
        lock(&self.registry).len()
    }

    /// Interactions confirmed so far; these go into the contract file.
    pub fn confirmed(&self) -> Vec<Interaction> {
        lock(&self.registry).confirmed().to_vec()
    }

    /// Runs `test`, then verifies every registered interaction.
    ///
    /// Fails if `test` returned an error, any request went unmatched, or any
    /// registered interaction was never received.
    pub async fn verify<F, Fut, E>(&self, test: F) -> Result<(), VerificationFailure>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let outcome = test().await;
        let verdict = self.verify_interactions();

        match outcome {
            Ok(()) => verdict,
            Err(e) => {
                let mut failure = verdict.err().unwrap_or_default();
                failure.test_error = Some(e.to_string());
                Err(failure)
            }
        }
    }

    /// Verifies the traffic observed since the last verification and clears
    /// the registry.
    pub fn verify_interactions(&self) -> Result<(), VerificationFailure> {
        let verdict = lock(&self.registry).verify();
        if let Err(failure) = &verdict {
            warn!(
                mismatches = failure.mismatches.len(),
                missing = failure.missing.len(),
                "contract verification failed"
            );
        }
        verdict
    }

    /// Writes the contract file for the confirmed interactions.
    ///
    /// Returns `None` when no contract directory is configured or nothing has
    /// been confirmed.
    pub fn write_contract(&self) -> Result<Option<PathBuf>, ContractError> {
        let Some(dir) = self.config.contract_dir.as_deref() else {
            return Ok(None);
        };
        let interactions = self.confirmed();
        if interactions.is_empty() {
            return Ok(None);
        }
        self.write_contract_to(dir, &interactions).map(Some)
    }

    fn write_contract_to(
        &self,
        dir: &Path,
        interactions: &[Interaction],
    ) -> Result<PathBuf, ContractError> {
        let path = contract_file::write(
            dir,
            &self.config.consumer,
            &self.config.provider,
            interactions,
        )?;
        info!(path = %path.display(), interactions = interactions.len(), "contract written");
        Ok(path)
    }

    /// Stops the mock, verifies anything registered since the last
    /// verification, and writes the contract file.
    ///
    /// Only the first call does anything. An outstanding verification failure
    /// is fatal: this panics with the rendered [`VerificationFailure`] (unless
    /// the thread is already unwinding).
    pub fn teardown(&self) -> Result<(), ContractError> {
        if self.torn_down.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.server.stop();
        info!(addr = %self.server.addr(), "mock provider session torn down");

        if let Err(failure) = self.verify_interactions() {
            if !std::thread::panicking() {
                panic!("{failure}");
            }
            return Ok(());
        }

        self.write_contract()?;
        Ok(())
    }

    /// Returns `true` once [`teardown`](Self::teardown) has run.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }
}

// ---------------------------------------------------------------------------
// Registration builder
// ---------------------------------------------------------------------------

/// First stage of registering an interaction: state and description.
#[must_use = "an interaction is only registered by `will_respond_with`"]
pub struct InteractionBuilder<'a> {
    session: &'a MockSession,
    provider_state: Option<String>,
    description: String,
}

impl<'a> InteractionBuilder<'a> {
    /// Sets the precondition label.
    pub fn given(mut self, state: impl Into<String>) -> Self {
        self.provider_state = Some(state.into());
        self
    }

    /// Sets the human-readable description.
    pub fn upon_receiving(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the expected request.
    pub fn with_request(self, request: RequestExpectation) -> ResponseBuilder<'a> {
        ResponseBuilder {
            session: self.session,
            provider_state: self.provider_state,
            description: self.description,
            request,
        }
    }
}

/// Second stage: the response, which completes registration.
#[must_use = "an interaction is only registered by `will_respond_with`"]
pub struct ResponseBuilder<'a> {
    session: &'a MockSession,
    provider_state: Option<String>,
    description: String,
    request: RequestExpectation,
}

impl ResponseBuilder<'_> {
    /// Registers the interaction with its mocked response.
    pub fn will_respond_with(self, response: ResponseSpec) {
        lock(&self.session.registry).register(Interaction {
            description: self.description,
            provider_state: self.provider_state,
            request: self.request,
            response,
        });
    }
}
