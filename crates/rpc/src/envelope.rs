//! JSON-RPC 2.0 wire envelopes.
//!
//! [`Request`] is what every transport puts on the wire. The contract
//! transport sends it as-is and decodes the raw reply body; the production
//! transport additionally unwraps the [`Response`] envelope.
//!
//! See <https://www.jsonrpc.org/specification> §4 (request object) and §5
//! (response object).

use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::RpcError;

/// The literal protocol version carried in every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

// ---------------------------------------------------------------------------
// Protocol version marker
// ---------------------------------------------------------------------------

/// Zero-sized marker that always serialises as `"2.0"` and refuses any other
/// value on the way in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Version;

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(JSONRPC_VERSION)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == JSONRPC_VERSION {
            Ok(Version)
        } else {
            Err(de::Error::invalid_value(
                de::Unexpected::Str(&raw),
                &JSONRPC_VERSION,
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Request identifiers
// ---------------------------------------------------------------------------

/// Correlation id of a request envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// Creates a request id from a raw integer.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of request ids for one caller session.
///
/// A fixed sequence hands out the same id forever; a stepping sequence
/// increments by one per call. Safe to share between concurrent calls, but no
/// uniqueness guarantee is made for a fixed sequence.
#[derive(Debug)]
pub struct IdSequence {
    next: AtomicU64,
    step: u64,
}

impl IdSequence {
    /// A sequence that always yields `id`.
    pub fn fixed(id: u64) -> Self {
        Self {
            next: AtomicU64::new(id),
            step: 0,
        }
    }

    /// A sequence yielding `first`, `first + 1`, ...
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
            step: 1,
        }
    }

    /// Returns the next id.
    pub fn next_id(&self) -> RequestId {
        RequestId(self.next.fetch_add(self.step, Ordering::Relaxed))
    }
}

// ---------------------------------------------------------------------------
// Request envelope
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request or notification.
///
/// Serialises as `{"method", "params", "id", "jsonrpc"}`. `params` is left out
/// when it is `null`; `id` is left out for notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Name of the remote method, e.g. `"user.create"`.
    pub method: String,

    /// Structured parameters.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,

    /// Correlation id. `None` marks a notification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,

    /// Always `"2.0"`.
    pub jsonrpc: Version,
}

impl Request {
    /// Builds a request expecting a reply.
    pub fn call(method: impl Into<String>, params: Value, id: RequestId) -> Self {
        Self {
            method: method.into(),
            params,
            id: Some(id),
            jsonrpc: Version,
        }
    }

    /// Builds a notification (no `id`, no reply expected).
    pub fn notification(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
            id: None,
            jsonrpc: Version,
        }
    }

    /// Returns `true` if this envelope carries no id.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Serialises the envelope to a JSON body.
    pub fn to_body(&self) -> Result<Vec<u8>, RpcError> {
        serde_json::to_vec(self).map_err(|source| RpcError::Serialization {
            method: self.method.clone(),
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

/// The `error` member of a response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// JSON-RPC error code (e.g. `-32601` for method not found).
    pub code: i64,
    /// Short description of the error.
    pub message: String,
    /// Optional server-defined detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A JSON-RPC 2.0 response object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Always `"2.0"`.
    pub jsonrpc: Version,

    /// Id of the request this answers; `null` when the server could not read it.
    #[serde(default)]
    pub id: Option<RequestId>,

    /// Present on success. A `null` result deserialises as `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Present on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl Response {
    /// Unwraps the envelope into its result, converting an `error` member
    /// into [`RpcError::Remote`].
    pub fn into_result(self, method: &str) -> Result<Value, RpcError> {
        if let Some(err) = self.error {
            return Err(RpcError::Remote {
                method: method.to_owned(),
                code: err.code,
                message: err.message,
                data: err.data,
            });
        }
        Ok(self.result.unwrap_or(Value::Null))
    }
}
