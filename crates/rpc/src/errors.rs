//! Call error taxonomy shared by every transport.
//!
//! [`RpcError`] is the ordinary error channel of [`crate::RpcCaller`]: every
//! failure is reported once, synchronously, to the immediate invoker. Nothing
//! in this workspace retries.
//!
//! Contract-verification failures are deliberately *not* part of this enum;
//! they are a separate outcome owned by the `contract` crate.

use thiserror::Error;

/// Boxed error used for transport-level causes (HTTP client, body reads).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by an [`crate::RpcCaller`].
#[derive(Debug, Error)]
pub enum RpcError {
    /// The parameters (or the envelope around them) could not be turned into
    /// JSON.
    ///
    /// Always produced before any network I/O takes place.
    #[error("failed to serialise `{method}` request: {source}")]
    Serialization {
        /// Method being called.
        method: String,
        /// Underlying serde failure.
        #[source]
        source: serde_json::Error,
    },

    /// Building, sending, or reading the HTTP exchange failed (connection
    /// refused, body read error, ...).
    #[error("transport failure calling `{method}`: {source}")]
    Transport {
        /// Method being called.
        method: String,
        /// Underlying client error.
        #[source]
        source: BoxError,
    },

    /// The server answered with a non-success HTTP status.
    ///
    /// Produced by: the production transport only. The contract transport
    /// never inspects the status code.
    #[error("`{method}` returned HTTP status {status}")]
    Status {
        /// Method being called.
        method: String,
        /// HTTP status code received.
        status: u16,
    },

    /// The response body was not valid JSON, or did not have the shape the
    /// caller asked for.
    #[error("failed to decode `{method}` response: {source}")]
    Decode {
        /// Method being called.
        method: String,
        /// Underlying serde failure.
        #[source]
        source: serde_json::Error,
    },

    /// The server replied with a JSON-RPC `error` member.
    ///
    /// Produced by: the production transport, which unwraps response envelopes.
    #[error("`{method}` failed with server error {code}: {message}")]
    Remote {
        /// Method being called.
        method: String,
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
        /// Optional additional data.
        data: Option<serde_json::Value>,
    },

    /// The caller has been closed.
    #[error("transport is closed")]
    Closed,

    /// Releasing the transport failed. Not tied to any method call.
    #[error("failed to close transport: {source}")]
    Shutdown {
        #[source]
        source: BoxError,
    },
}

impl RpcError {
    /// Wraps any client-side error as [`RpcError::Transport`].
    pub fn transport(method: &str, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            method: method.to_owned(),
            source: source.into(),
        }
    }

    /// Method the failing call targeted, if the error is tied to one.
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Serialization { method, .. }
            | Self::Transport { method, .. }
            | Self::Status { method, .. }
            | Self::Decode { method, .. }
            | Self::Remote { method, .. } => Some(method.as_str()),
            Self::Closed | Self::Shutdown { .. } => None,
        }
    }
}
