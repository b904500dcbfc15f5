//! Harness errors and the verification outcome.
//!
//! [`ContractError`] covers the harness itself failing (the mock could not
//! bind, the contract file could not be written). [`VerificationFailure`] is
//! the verdict that the consumer broke the contract. It is deliberately not
//! an [`rpc::RpcError`]: callers never see it through the ordinary error
//! channel, and at teardown it aborts the test.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the contract harness itself.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The mock server could not listen on the configured host.
    #[error("failed to start mock server on {host}: {source}")]
    Bind {
        /// Configured host.
        host: String,
        /// Underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// The contract file could not be written.
    #[error("failed to write contract file {}: {source}", .path.display())]
    ContractFile {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The contract could not be serialised.
    #[error("failed to serialise contract: {0}")]
    Serialise(#[source] serde_json::Error),
}

/// A request the mock could not match to any registered interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Summary of the offending request, e.g. `POST /api`.
    pub request: String,
    /// Description of the interaction it came closest to, if any were registered.
    pub closest: Option<String>,
    /// What differed from that interaction.
    pub problems: Vec<String>,
}

/// Outcome of a failed verification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationFailure {
    /// Requests that matched no interaction.
    pub mismatches: Vec<Mismatch>,
    /// Descriptions of registered interactions that were never received.
    pub missing: Vec<String>,
    /// Error returned by the test function passed to `verify`, if any.
    pub test_error: Option<String>,
}

impl VerificationFailure {
    /// Returns `true` if nothing went wrong.
    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty() && self.missing.is_empty() && self.test_error.is_none()
    }
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contract verification failed")?;

        if let Some(err) = &self.test_error {
            write!(f, "\n  test function failed: {err}")?;
        }

        for mismatch in &self.mismatches {
            write!(f, "\n  unexpected request {}", mismatch.request)?;
            if let Some(closest) = &mismatch.closest {
                write!(f, " (closest interaction: {closest:?})")?;
            }
            for problem in &mismatch.problems {
                write!(f, "\n    - {problem}")?;
            }
        }

        for description in &self.missing {
            write!(f, "\n  interaction never received: {description:?}")?;
        }

        Ok(())
    }
}

impl std::error::Error for VerificationFailure {}
