//! Contract tests for the user operations of [`Client`].
//!
//! Each test registers the interactions it expects against a mock
//! Xen Orchestra and drives the real client through [`ContractCaller`].

use std::sync::Arc;

use client::{Client, ClientError, User, UserId};
use contract::{ContractCaller, MockSession, PactConfig, RequestExpectation, ResponseSpec};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

struct Harness {
    session: Arc<MockSession>,
    client: Client,
}

async fn harness() -> Harness {
    let session = Arc::new(
        MockSession::start(PactConfig::new("xo-sdk", "xenorchestra"))
            .await
            .expect("mock provider should start"),
    );
    let client = Client::new(ContractCaller::new(session.clone()));
    Harness { session, client }
}

fn rpc_request(method: &str, params: Value) -> RequestExpectation {
    RequestExpectation::post("/api")
        .header("Content-Type", "application/json")
        .json_body(json!({
            "method": method,
            "params": params,
            "id": 0,
            "jsonrpc": "2.0",
        }))
}

fn json_response(body: Value) -> ResponseSpec {
    ResponseSpec::ok()
        .header("Content-Type", "application/json")
        .json_body(body)
}

fn ddelnano() -> User {
    User::new("ddelnano", "password")
}

fn existing_ddelnano() -> User {
    ddelnano().with_id(UserId::new("a1234abcd").unwrap())
}

fn register_get_all(session: &MockSession) {
    session
        .add_interaction()
        .given("User ddelnano exists")
        .upon_receiving("A request to get all users")
        .with_request(rpc_request("user.getAll", json!({"dummy": "dummy"})))
        .will_respond_with(json_response(
            serde_json::to_value(vec![existing_ddelnano()]).unwrap(),
        ));
}

#[tokio::test]
async fn test_create_user() {
    let Harness { session, client } = harness().await;
    session
        .add_interaction()
        .given("No user exists")
        .upon_receiving("A request to create ddelnano")
        .with_request(rpc_request(
            "user.create",
            json!({"email": "ddelnano", "password": "password"}),
        ))
        .will_respond_with(json_response(json!("a1234abcd")));

    let mut created = None;
    let slot = &mut created;
    let client_ref = &client;
    session
        .verify(move || async move {
            *slot = Some(client_ref.create_user(&ddelnano()).await?);
            Ok::<_, ClientError>(())
        })
        .await
        .unwrap();

    let created = created.unwrap();
    assert_eq!(created.id.as_ref().map(UserId::as_str), Some("a1234abcd"));
    assert_eq!(created, existing_ddelnano());

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_get_all_users() {
    let Harness { session, client } = harness().await;
    register_get_all(&session);

    let users = client.get_all_users().await.unwrap();

    assert_eq!(users, vec![existing_ddelnano()]);
    session.verify_interactions().unwrap();
    client.close().await.unwrap();
}

#[tokio::test]
async fn test_get_user_filters_listing() {
    let Harness { session, client } = harness().await;
    register_get_all(&session);
    register_get_all(&session);

    let found = client
        .get_user(&UserId::new("a1234abcd").unwrap())
        .await
        .unwrap();
    assert_eq!(found, existing_ddelnano());

    let missing = client
        .get_user(&UserId::new("zzz").unwrap())
        .await
        .unwrap_err();
    assert!(
        matches!(missing, ClientError::UserNotFound(ref id) if id.as_str() == "zzz"),
        "got {missing:?}"
    );

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_delete_user_does_not_decode_reply() {
    let Harness { session, client } = harness().await;
    session
        .add_interaction()
        .given("User ddelnano exists")
        .upon_receiving("A request to delete ddelnano")
        .with_request(rpc_request("user.delete", json!({"id": "a1234abcd"})))
        .will_respond_with(ResponseSpec::ok());

    client
        .delete_user(&UserId::new("a1234abcd").unwrap())
        .await
        .unwrap();

    session.verify_interactions().unwrap();
    client.close().await.unwrap();
}

#[tokio::test]
async fn test_sign_in() {
    let Harness { session, client } = harness().await;
    session
        .add_interaction()
        .given("User ddelnano exists")
        .upon_receiving("A request to sign in as ddelnano")
        .with_request(rpc_request(
            "session.signInWithPassword",
            json!({"email": "ddelnano", "password": "password"}),
        ))
        .will_respond_with(json_response(json!({
            "id": "a1234abcd",
            "email": "ddelnano",
            "password": "password",
        })));

    let user = client.sign_in("ddelnano", "password").await.unwrap();

    assert_eq!(user, existing_ddelnano());
    client.close().await.unwrap();
}

#[tokio::test]
async fn test_caller_errors_pass_through() {
    let Harness { session, client } = harness().await;
    // Registered reply is a number, not an id string.
    session
        .add_interaction()
        .given("No user exists")
        .upon_receiving("A malformed create reply")
        .with_request(rpc_request(
            "user.create",
            json!({"email": "ddelnano", "password": "password"}),
        ))
        .will_respond_with(json_response(json!(42)));

    let err = client.create_user(&ddelnano()).await.unwrap_err();

    assert!(
        matches!(err, ClientError::Rpc(rpc::RpcError::Decode { ref method, .. }) if method == "user.create"),
        "got {err:?}"
    );
    client.close().await.unwrap();
}

#[tokio::test]
async fn test_closing_twice_raises_no_second_error() {
    let Harness { session, client } = harness().await;
    register_get_all(&session);
    client.get_all_users().await.unwrap();

    client.close().await.unwrap();
    client.close().await.unwrap();
    assert!(session.is_torn_down());
}

#[tokio::test]
async fn test_empty_id_from_server_is_a_decode_error() {
    let Harness { session, client } = harness().await;
    session
        .add_interaction()
        .given("No user exists")
        .upon_receiving("A create reply with an empty id")
        .with_request(rpc_request(
            "user.create",
            json!({"email": "ddelnano", "password": "password"}),
        ))
        .will_respond_with(json_response(json!("")));

    let err = client.create_user(&ddelnano()).await.unwrap_err();

    assert!(
        matches!(err, ClientError::Rpc(rpc::RpcError::Decode { ref method, .. }) if method == "user.create"),
        "got {err:?}"
    );
    client.close().await.unwrap();
}
