//! RPC core for the xo-sdk workspace.
//!
//! This crate holds the JSON-RPC 2.0 envelope types, the [`RpcCaller`] port
//! trait, and the error taxonomy every transport reports through. Transport
//! crates implement [`RpcCaller`]; the domain client depends only on it.
//!
//! ## Architectural Layer
//!
//! **Port definitions.** No I/O happens here. The production transport lives
//! in `transport`, the contract-test double in `contract`.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`envelope`] | Request/response envelopes, request ids, id sequences |
//! | [`caller`] | [`RpcCaller`], [`CallOptions`], typed helpers ([`RpcCallerExt`]) |
//! | [`method`] | [`RpcMethod`] per-method parameter records |
//! | [`errors`] | [`RpcError`] |

pub mod caller;
pub mod envelope;
pub mod errors;
pub mod method;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use caller::{to_params, CallOptions, RpcCaller, RpcCallerExt};
pub use envelope::{
    ErrorObject, IdSequence, Request, RequestId, Response, Version, JSONRPC_VERSION,
};
pub use errors::{BoxError, RpcError};
pub use method::RpcMethod;
