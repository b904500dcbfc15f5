//! The [`RpcCaller`] port and its typed convenience layer.
//!
//! Every transport (the production HTTP client, the contract-test double)
//! implements [`RpcCaller`]. Domain code depends only on the trait, usually
//! through the generic helpers on [`RpcCallerExt`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::{RequestId, RpcError, RpcMethod};

/// Per-call knobs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    id: Option<RequestId>,
}

impl CallOptions {
    /// Default options: the transport picks the request id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces the envelope id for this call instead of drawing one from the
    /// transport's sequence.
    pub fn with_id(mut self, id: RequestId) -> Self {
        self.id = Some(id);
        self
    }

    /// The forced id, if any.
    pub fn id(&self) -> Option<RequestId> {
        self.id
    }
}

/// Capability to send JSON-RPC method calls and notifications.
///
/// Implementations must never panic on malformed input; every failure is an
/// [`RpcError`] value.
#[async_trait]
pub trait RpcCaller: Send + Sync {
    /// Sends one request and waits for its response.
    ///
    /// When `slot` is `Some`, the decoded response is written into it. When it
    /// is `None`, the response body is not decoded at all.
    async fn call(
        &self,
        method: &str,
        params: Value,
        slot: Option<&mut Value>,
        options: &CallOptions,
    ) -> Result<(), RpcError>;

    /// Sends a notification; no response is expected.
    ///
    /// Implementations may treat this as a no-op.
    async fn notify(&self, method: &str, params: Value, options: &CallOptions)
        -> Result<(), RpcError>;

    /// Releases the transport.
    ///
    /// A second call returns `Ok(())` without doing anything.
    async fn close(&self) -> Result<(), RpcError>;
}

#[async_trait]
impl<C: RpcCaller + ?Sized> RpcCaller for Box<C> {
    async fn call(
        &self,
        method: &str,
        params: Value,
        slot: Option<&mut Value>,
        options: &CallOptions,
    ) -> Result<(), RpcError> {
        (**self).call(method, params, slot, options).await
    }

    async fn notify(
        &self,
        method: &str,
        params: Value,
        options: &CallOptions,
    ) -> Result<(), RpcError> {
        (**self).notify(method, params, options).await
    }

    async fn close(&self) -> Result<(), RpcError> {
        (**self).close().await
    }
}

#[async_trait]
impl<C: RpcCaller + ?Sized> RpcCaller for Arc<C> {
    async fn call(
        &self,
        method: &str,
        params: Value,
        slot: Option<&mut Value>,
        options: &CallOptions,
    ) -> Result<(), RpcError> {
        (**self).call(method, params, slot, options).await
    }

    async fn notify(
        &self,
        method: &str,
        params: Value,
        options: &CallOptions,
    ) -> Result<(), RpcError> {
        (**self).notify(method, params, options).await
    }

    async fn close(&self) -> Result<(), RpcError> {
        (**self).close().await
    }
}

// ---------------------------------------------------------------------------
// Typed layer
// ---------------------------------------------------------------------------

/// Serialises `params` into a [`Value`], tagging failures with `method`.
pub fn to_params<P: Serialize + ?Sized>(method: &str, params: &P) -> Result<Value, RpcError> {
    serde_json::to_value(params).map_err(|source| RpcError::Serialization {
        method: method.to_owned(),
        source,
    })
}

/// Typed helpers available on every [`RpcCaller`], including `dyn RpcCaller`.
#[async_trait]
pub trait RpcCallerExt: RpcCaller {
    /// Calls `method` and decodes the response into `R`.
    async fn call_typed<P, R>(&self, method: &str, params: &P) -> Result<R, RpcError>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned + Send,
    {
        let params = to_params(method, params)?;
        let mut slot = Value::Null;
        self.call(method, params, Some(&mut slot), &CallOptions::default())
            .await?;
        serde_json::from_value(slot).map_err(|source| RpcError::Decode {
            method: method.to_owned(),
            source,
        })
    }

    /// Calls `method` without decoding the response.
    async fn call_discarding<P>(&self, method: &str, params: &P) -> Result<(), RpcError>
    where
        P: Serialize + ?Sized + Sync,
    {
        let params = to_params(method, params)?;
        self.call(method, params, None, &CallOptions::default())
            .await
    }

    /// Calls the method described by `request` and decodes its declared output.
    async fn invoke<M: RpcMethod>(&self, request: &M) -> Result<M::Output, RpcError> {
        self.call_typed::<M, M::Output>(M::NAME, request).await
    }
}

impl<C: RpcCaller + ?Sized> RpcCallerExt for C {}
