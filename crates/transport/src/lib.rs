//! Production transport for the xo-sdk client.
//!
//! Implements the [`rpc::RpcCaller`] trait as JSON-RPC 2.0 over HTTP POST to
//! `<base url>/api`, using `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request id allocation, status checks,
//! and response-envelope unwrapping live here. The `client` crate sees only
//! [`rpc::RpcCaller`].

pub mod caller;
pub mod config;

pub use caller::HttpCaller;
pub use config::{ConfigError, HttpConfig, API_PATH, DEFAULT_TIMEOUT_SECS};
