//! Integration tests for the production HTTP transport.
//!
//! Each test starts a small axum stub that speaks just enough JSON-RPC to
//! exercise one behaviour of [`HttpCaller`].

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use rpc::{CallOptions, RequestId, RpcCaller, RpcCallerExt, RpcError};
use serde_json::{json, Value};
use transport::{HttpCaller, HttpConfig};

type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

/// Replies according to the method name and records every body it receives
/// together with its `Content-Type` header.
async fn stub(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    seen.lock().unwrap().push((content_type, body.clone()));

    let id = body.get("id").cloned().unwrap_or(Value::Null);
    match body["method"].as_str() {
        Some("user.create") => (
            StatusCode::OK,
            Json(json!({"jsonrpc": "2.0", "id": id, "result": "a1234abcd"})),
        ),
        Some("echo.id") => (
            StatusCode::OK,
            Json(json!({"jsonrpc": "2.0", "id": id, "result": id})),
        ),
        Some("down") => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({}))),
        Some("garbled") => (StatusCode::OK, Json(json!(["not", "an", "envelope"]))),
        _ => (
            StatusCode::OK,
            Json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {"code": -32601, "message": "Method not found"},
            })),
        ),
    }
}

async fn start_stub() -> (SocketAddr, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/api", post(stub))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, seen)
}

fn caller_for(addr: SocketAddr) -> HttpCaller {
    let config = HttpConfig::new(&format!("http://{addr}")).unwrap();
    HttpCaller::new(&config).unwrap()
}

#[tokio::test]
async fn test_call_unwraps_result_and_sets_content_type() {
    let (addr, seen) = start_stub().await;
    let caller = caller_for(addr);

    let id: String = caller
        .call_typed(
            "user.create",
            &json!({"email": "ddelnano", "password": "password"}),
        )
        .await
        .unwrap();

    assert_eq!(id, "a1234abcd");
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0.as_deref(), Some("application/json"));
    assert_eq!(
        seen[0].1,
        json!({
            "method": "user.create",
            "params": {"email": "ddelnano", "password": "password"},
            "id": 0,
            "jsonrpc": "2.0",
        })
    );
}

#[tokio::test]
async fn test_ids_increment_and_can_be_forced() {
    let (addr, _seen) = start_stub().await;
    let caller = caller_for(addr);

    let first: u64 = caller.call_typed("echo.id", &json!({})).await.unwrap();
    let second: u64 = caller.call_typed("echo.id", &json!({})).await.unwrap();
    assert_eq!((first, second), (0, 1));

    let mut slot = Value::Null;
    caller
        .call(
            "echo.id",
            json!({}),
            Some(&mut slot),
            &CallOptions::new().with_id(RequestId::new(99)),
        )
        .await
        .unwrap();
    assert_eq!(slot, json!(99));
}

#[tokio::test]
async fn test_error_member_becomes_remote_error() {
    let (addr, _seen) = start_stub().await;
    let caller = caller_for(addr);

    let err = caller
        .call_typed::<_, Value>("user.nope", &json!({}))
        .await
        .unwrap_err();

    match err {
        RpcError::Remote { code, message, .. } => {
            assert_eq!(code, -32601);
            assert_eq!(message, "Method not found");
        }
        other => panic!("expected Remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_success_status_is_reported() {
    let (addr, _seen) = start_stub().await;
    let caller = caller_for(addr);

    let err = caller
        .call_typed::<_, Value>("down", &json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, RpcError::Status { status: 503, .. }), "got {err:?}");
}

#[tokio::test]
async fn test_non_envelope_body_is_decode_error() {
    let (addr, _seen) = start_stub().await;
    let caller = caller_for(addr);

    let err = caller
        .call_typed::<_, Value>("garbled", &json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, RpcError::Decode { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_null_slot_ignores_body() {
    let (addr, _seen) = start_stub().await;
    let caller = caller_for(addr);

    // "garbled" would fail to decode; with no slot the body is never read.
    caller
        .call("garbled", json!({}), None, &CallOptions::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_notify_sends_envelope_without_id() {
    let (addr, seen) = start_stub().await;
    let caller = caller_for(addr);

    caller
        .notify("session.ping", json!({"at": 1}), &CallOptions::new())
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(
        seen[0].1,
        json!({"method": "session.ping", "params": {"at": 1}, "jsonrpc": "2.0"})
    );
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let caller = caller_for(addr);
    let err = caller
        .call_typed::<_, Value>("user.getAll", &json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, RpcError::Transport { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_close_is_idempotent_and_blocks_further_calls() {
    let (addr, seen) = start_stub().await;
    let caller = caller_for(addr);

    caller.close().await.unwrap();
    caller.close().await.unwrap();

    let err = caller
        .call_typed::<_, Value>("user.getAll", &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Closed));
    assert!(seen.lock().unwrap().is_empty());
}
