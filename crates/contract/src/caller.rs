//! [`ContractCaller`]: the [`RpcCaller`] that talks to a [`MockSession`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use rpc::{CallOptions, IdSequence, Request, RpcCaller, RpcError};
use serde_json::Value;
use tracing::debug;

use crate::MockSession;

/// Path of the JSON-RPC endpoint on the mock.
pub const API_PATH: &str = "/api";

/// Contract-test transport.
///
/// Posts each call as a JSON-RPC envelope to the session's mock and decodes
/// the *raw* response body into the result slot; no `result`/`error`
/// unwrapping and no status check. Request ids are a fixed `0` unless another
/// [`IdSequence`] is supplied, which is what registered contracts expect.
///
/// Closing the caller tears the session down, which makes verification
/// failures fatal; later calls fail with [`RpcError::Closed`].
#[derive(Debug)]
pub struct ContractCaller {
    session: Arc<MockSession>,
    http: reqwest::Client,
    ids: IdSequence,
}

impl ContractCaller {
    /// Creates a caller posting to `session`'s mock with request id `0`.
    pub fn new(session: Arc<MockSession>) -> Self {
        Self {
            session,
            http: reqwest::Client::new(),
            ids: IdSequence::fixed(0),
        }
    }

    /// Replaces the id sequence.
    pub fn with_ids(mut self, ids: IdSequence) -> Self {
        self.ids = ids;
        self
    }

    /// The session this caller drives.
    pub fn session(&self) -> &Arc<MockSession> {
        &self.session
    }
}

#[async_trait]
impl RpcCaller for ContractCaller {
    async fn call(
        &self,
        method: &str,
        params: Value,
        slot: Option<&mut Value>,
        options: &CallOptions,
    ) -> Result<(), RpcError> {
        if self.session.is_torn_down() {
            return Err(RpcError::Closed);
        }

        let id = options.id().unwrap_or_else(|| self.ids.next_id());
        let envelope = Request::call(method, params, id);
        let body = envelope.to_body()?;

        // The mock matches headers exactly; without an explicit content type
        // every interaction registered with one is a mismatch.
        let url = self.session.url(API_PATH);
        debug!(method, %id, %url, "sending request to mock provider");
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| RpcError::transport(method, e))?;

        if let Some(slot) = slot {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| RpcError::transport(method, e))?;
            *slot = serde_json::from_slice(&bytes).map_err(|source| RpcError::Decode {
                method: method.to_owned(),
                source,
            })?;
        }

        Ok(())
    }

    async fn notify(
        &self,
        method: &str,
        _params: Value,
        _options: &CallOptions,
    ) -> Result<(), RpcError> {
        debug!(method, "notification ignored by contract transport");
        Ok(())
    }

    async fn close(&self) -> Result<(), RpcError> {
        // Contract-file I/O is the only fallible part of teardown.
        self.session
            .teardown()
            .map_err(|e| RpcError::Shutdown { source: e.into() })
    }
}
