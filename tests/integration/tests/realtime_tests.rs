//! Realtime gateway integration tests
//!
//! Same requirements as the API tests: PostgreSQL, Redis, DATABASE_URL,
//! REDIS_URL and JWT_SECRET.
//!
//! Run with: cargo test -p integration-tests --test realtime_tests

use std::time::Duration;

use integration_tests::{assert_json, check_test_env, StayFixture, TestGateway, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};
use stay_core::chat::{Applied, ConnectionState, EntryStatus};
use stay_core::entities::SenderRole;
use stay_realtime::client::{ChatClient, ChatClientConfig, ClientError};
use tokio::time::timeout;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

async fn start() -> (TestServer, TestGateway, StayFixture) {
    let server = TestServer::start().await.expect("Failed to start server");
    let gateway = TestGateway::start_with_config(server.config.clone())
        .await
        .expect("Failed to start gateway");
    let stay = StayFixture::create(&server).await.expect("Failed to create stay");
    (server, gateway, stay)
}

/// Connect, then give the gateway time to finish its Redis subscription
async fn connect(config: ChatClientConfig) -> ChatClient {
    let client = ChatClient::connect(config).await.expect("Failed to connect");
    tokio::time::sleep(Duration::from_millis(200)).await;
    client
}

fn client_config(server: &TestServer, gateway: &TestGateway, token: &str) -> ChatClientConfig {
    ChatClientConfig {
        api_base_url: server.base_url(),
        gateway_url: gateway.ws_url(),
        guest_token: token.to_string(),
    }
}

#[tokio::test]
async fn test_guest_receives_host_reply() {
    if !check_test_env().await {
        return;
    }

    let (server, gateway, stay) = start().await;
    let mut client = connect(client_config(&server, &gateway, &stay.reservation.guest_token)).await;
    assert_eq!(client.session().connection_state(), ConnectionState::Subscribed);
    assert!(client.session().messages().is_empty());

    let response = server
        .post_auth(
            &format!("/api/admin/threads/{}/messages", client.thread_id()),
            &stay.admin.token,
            &json!({ "content": "Welcome! The door code arrives on the day." }),
        )
        .await
        .unwrap();
    let reply: Value = assert_json(response, StatusCode::CREATED).await.unwrap();

    let applied = timeout(EVENT_TIMEOUT, client.next_event())
        .await
        .expect("No realtime event")
        .unwrap();
    assert_eq!(applied, Applied::Inserted);

    let entry = &client.session().messages()[0];
    assert_eq!(entry.id.map(|id| id.to_string()), reply["id"].as_str().map(str::to_string));
    assert_eq!(entry.sender_role, SenderRole::Host);
    assert_eq!(client.session().unread_count(), 1);
}

#[tokio::test]
async fn test_own_message_is_not_duplicated() {
    if !check_test_env().await {
        return;
    }

    let (server, gateway, stay) = start().await;
    let mut client = connect(client_config(&server, &gateway, &stay.reservation.guest_token)).await;

    let record = client.send("Can we check in early?").await.unwrap();
    assert_eq!(record.sender_role, SenderRole::Guest);
    assert_eq!(client.session().pending_count(), 0);

    let applied = timeout(EVENT_TIMEOUT, client.next_event())
        .await
        .expect("No realtime event")
        .unwrap();
    assert_eq!(applied, Applied::Duplicate);

    let messages = client.session().messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].status, EntryStatus::Confirmed);
    assert_eq!(messages[0].id, Some(record.id));
}

#[tokio::test]
async fn test_read_receipts_are_pushed() {
    if !check_test_env().await {
        return;
    }

    let (server, gateway, stay) = start().await;
    let mut client = connect(client_config(&server, &gateway, &stay.reservation.guest_token)).await;

    server
        .post_auth(
            &format!("/api/admin/threads/{}/messages", client.thread_id()),
            &stay.admin.token,
            &json!({ "content": "Your room is ready." }),
        )
        .await
        .unwrap();
    timeout(EVENT_TIMEOUT, client.next_event())
        .await
        .expect("No insert event")
        .unwrap();

    assert_eq!(client.mark_read().await.unwrap(), 1);

    let applied = timeout(EVENT_TIMEOUT, client.next_event())
        .await
        .expect("No update event")
        .unwrap();
    assert_eq!(applied, Applied::Updated);
    assert_eq!(client.session().unread_count(), 0);
}

#[tokio::test]
async fn test_history_survives_reconnect() {
    if !check_test_env().await {
        return;
    }

    let (server, gateway, stay) = start().await;
    let config = client_config(&server, &gateway, &stay.reservation.guest_token);

    let mut first = ChatClient::connect(config.clone()).await.unwrap();
    first.send("Is parking available?").await.unwrap();
    first.close().await.unwrap();

    let mut second = ChatClient::connect(config).await.unwrap();
    assert_eq!(second.session().messages().len(), 1);

    second.reconnect().await.unwrap();
    assert_eq!(second.session().messages().len(), 1);
    assert_eq!(second.session().connection_state(), ConnectionState::Subscribed);
}

#[tokio::test]
async fn test_unknown_token_is_rejected() {
    if !check_test_env().await {
        return;
    }

    let (server, gateway, _stay) = start().await;
    let token = stay_common::generate_guest_token();

    let result = ChatClient::connect(client_config(&server, &gateway, &token)).await;
    assert!(matches!(result, Err(ClientError::Api { status: 404, .. })));
}
