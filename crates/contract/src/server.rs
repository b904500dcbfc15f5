//! The mock provider: an axum server answering every route from the registry.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::registry::{InteractionRegistry, MockReply};
use crate::{ContractError, ObservedRequest};

pub(crate) type SharedRegistry = Arc<Mutex<InteractionRegistry>>;

/// Locks the registry. A panic while holding the lock cannot leave it
/// half-updated, so poisoning is ignored.
pub(crate) fn lock(registry: &SharedRegistry) -> MutexGuard<'_, InteractionRegistry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A running mock server bound to an OS-assigned port.
#[derive(Debug)]
pub(crate) struct MockServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl MockServer {
    /// Binds `host:0` and starts serving in the background.
    pub(crate) async fn bind(host: &str, registry: SharedRegistry) -> Result<Self, ContractError> {
        let bind_err = |source| ContractError::Bind {
            host: host.to_string(),
            source,
        };

        let listener = TcpListener::bind((host, 0)).await.map_err(bind_err)?;
        let addr = listener.local_addr().map_err(bind_err)?;

        let app = Router::new().fallback(handle).with_state(registry);
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                warn!(error = %e, "mock server stopped with an error");
            }
        });

        debug!(%addr, "mock server listening");
        Ok(Self { addr, task })
    }

    pub(crate) fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stops accepting connections. Safe to call more than once.
    pub(crate) fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle(
    State(registry): State<SharedRegistry>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let observed = ObservedRequest {
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        headers: collect_headers(&headers),
        body: body.to_vec(),
    };

    let reply = lock(&registry).handle(&observed);
    into_response(reply)
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    collected
}

fn into_response(reply: MockReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut headers = HeaderMap::new();
    for (name, value) in &reply.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => warn!(%name, %value, "skipping invalid response header"),
        }
    }

    (status, headers, reply.body).into_response()
}
