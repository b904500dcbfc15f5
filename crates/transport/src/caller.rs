//! [`HttpCaller`]: the production [`RpcCaller`].

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use rpc::{CallOptions, IdSequence, Request, Response, RpcCaller, RpcError};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{ConfigError, HttpConfig};

/// JSON-RPC 2.0 client over HTTP POST.
///
/// Unlike the contract-test double, this transport checks the HTTP status and
/// unwraps the response envelope, so a JSON-RPC `error` member surfaces as
/// [`RpcError::Remote`]. Request ids start at `0` and increment per call.
///
/// The underlying `reqwest::Client` pools connections and is safe to share;
/// concurrent calls are independent requests with no ordering between them.
#[derive(Debug)]
pub struct HttpCaller {
    http: reqwest::Client,
    endpoint: Url,
    ids: IdSequence,
    closed: AtomicBool,
}

impl HttpCaller {
    /// Builds a caller posting to `<config.url>/api`.
    pub fn new(config: &HttpConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ConfigError::Client)?;

        Ok(Self {
            http,
            endpoint: config.endpoint()?,
            ids: IdSequence::starting_at(0),
            closed: AtomicBool::new(false),
        })
    }

    /// URL every request is posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn ensure_open(&self) -> Result<(), RpcError> {
        if self.closed.load(Ordering::Acquire) {
            Err(RpcError::Closed)
        } else {
            Ok(())
        }
    }

    /// Posts `envelope` and checks the status line.
    async fn post(&self, envelope: &Request) -> Result<reqwest::Response, RpcError> {
        let body = envelope.to_body()?;

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| RpcError::transport(&envelope.method, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(method = %envelope.method, status = status.as_u16(), "non-success HTTP status");
            return Err(RpcError::Status {
                method: envelope.method.clone(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl RpcCaller for HttpCaller {
    async fn call(
        &self,
        method: &str,
        params: Value,
        slot: Option<&mut Value>,
        options: &CallOptions,
    ) -> Result<(), RpcError> {
        self.ensure_open()?;

        let id = options.id().unwrap_or_else(|| self.ids.next_id());
        let envelope = Request::call(method, params, id);
        debug!(method, %id, endpoint = %self.endpoint, "sending request");

        let response = self.post(&envelope).await?;

        let Some(slot) = slot else {
            return Ok(());
        };

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RpcError::transport(method, e))?;
        let reply: Response =
            serde_json::from_slice(&bytes).map_err(|source| RpcError::Decode {
                method: method.to_owned(),
                source,
            })?;

        if reply.id.is_some_and(|reply_id| reply_id != id) {
            warn!(method, %id, reply_id = ?reply.id, "response id does not match request id");
        }

        *slot = reply.into_result(method)?;
        Ok(())
    }

    async fn notify(
        &self,
        method: &str,
        params: Value,
        _options: &CallOptions,
    ) -> Result<(), RpcError> {
        self.ensure_open()?;

        let envelope = Request::notification(method, params);
        debug!(method, endpoint = %self.endpoint, "sending notification");
        self.post(&envelope).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), RpcError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!(endpoint = %self.endpoint, "transport closed");
        }
        Ok(())
    }
}
