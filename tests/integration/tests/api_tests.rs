//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance with the platform schema
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL, JWT_SECRET
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_error, assert_json, assert_status, check_in_body, check_test_env, property_body,
    reservation_body, StaffUser, StayFixture, TestServer,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_readiness() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_admin_routes_require_token() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/api/admin/properties").await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "MISSING_AUTHORIZATION");

    let response = server
        .get_auth("/api/admin/properties", "not-a-jwt")
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_current_user() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let owner = StaffUser::owner(&server.config).await.unwrap();

    let response = server.get_auth("/api/admin/me", &owner.token).await.unwrap();
    let me: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me["id"], owner.id.to_string());
    assert_eq!(me["email"], owner.email);
}

#[tokio::test]
async fn test_cleaner_cannot_create_property() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let cleaner = StaffUser::cleaner(&server.config).await.unwrap();

    let response = server
        .post_auth("/api/admin/properties", &cleaner.token, &property_body(None))
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

// ============================================================================
// Property Tests
// ============================================================================

#[tokio::test]
async fn test_property_lifecycle() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let owner = StaffUser::owner(&server.config).await.unwrap();

    let response = server
        .post_auth("/api/admin/properties", &owner.token, &property_body(None))
        .await
        .unwrap();
    let property: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    let id = property["id"].as_str().unwrap().to_string();
    assert_eq!(property["ownerId"], owner.id.to_string());
    assert_eq!(property["timezone"], "Asia/Tokyo");

    let response = server
        .patch_auth(
            &format!("/api/admin/properties/{id}"),
            &owner.token,
            &json!({ "name": "Renamed House" }),
        )
        .await
        .unwrap();
    let updated: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(updated["name"], "Renamed House");

    let response = server
        .delete_auth(&format!("/api/admin/properties/{id}"), &owner.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    // Soft-deleted properties stay readable
    let response = server
        .get_auth(&format!("/api/admin/properties/{id}"), &owner.token)
        .await
        .unwrap();
    let deleted: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(deleted["isActive"], false);
}

#[tokio::test]
async fn test_owner_cannot_read_foreign_property() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let stay = StayFixture::create(&server).await.unwrap();
    let other = StaffUser::owner(&server.config).await.unwrap();

    let response = server
        .get_auth(&format!("/api/admin/properties/{}", stay.property_id), &other.token)
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_invalid_property_body() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let admin = StaffUser::admin(&server.config).await.unwrap();

    let response = server
        .post_auth("/api/admin/properties", &admin.token, &json!({ "name": "" }))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "VALIDATION_ERROR");
}

// ============================================================================
// Reservation Tests
// ============================================================================

#[tokio::test]
async fn test_reservation_gets_guest_token() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let stay = StayFixture::create(&server).await.unwrap();

    assert_eq!(stay.reservation.guest_token.len(), 43);
    assert_eq!(stay.reservation.property_id, stay.property_id);

    let response = server
        .get_auth(
            &format!("/api/admin/reservations/{}", stay.reservation.id),
            &stay.admin.token,
        )
        .await
        .unwrap();
    let reservation: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(reservation["nights"], 3);
    assert!(reservation["portalUrl"]
        .as_str()
        .is_some_and(|url| url.ends_with(&stay.reservation.guest_token)));
}

#[tokio::test]
async fn test_reservation_rejects_inverted_dates() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let stay = StayFixture::create(&server).await.unwrap();

    let response = server
        .post_auth(
            "/api/admin/reservations",
            &stay.admin.token,
            &reservation_body(stay.property_id, 7, -2),
        )
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_cancelled_reservation_is_final() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let stay = StayFixture::create(&server).await.unwrap();
    let base = format!("/api/admin/reservations/{}", stay.reservation.id);

    let response = server
        .post_auth(&format!("{base}/cancel"), &stay.admin.token, &json!({}))
        .await
        .unwrap();
    let cancelled: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(cancelled["status"], "cancelled");

    let response = server
        .put_auth(
            &format!("{base}/status"),
            &stay.admin.token,
            &json!({ "status": "checked_in" }),
        )
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

// ============================================================================
// Guest Portal Tests
// ============================================================================

#[tokio::test]
async fn test_guest_overview() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let stay = StayFixture::create(&server).await.unwrap();

    let response = server.get(&stay.guest_path("")).await.unwrap();
    let overview: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(overview["reservation"]["id"], stay.reservation.id.to_string());
    assert_eq!(overview["reservation"]["checkInCompleted"], false);
    assert!(overview["threadId"].is_string());
    assert_eq!(overview["access"]["unlocked"], false);
}

#[tokio::test]
async fn test_unknown_guest_token() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let token = stay_common::generate_guest_token();

    let response = server.get(&format!("/api/guest/{token}")).await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_access_hidden_before_check_in() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let stay = StayFixture::create(&server).await.unwrap();

    let response = server.get(&stay.guest_path("/access")).await.unwrap();
    let access: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(access["unlocked"], false);
    assert!(access["accessCode"].is_null());
    assert!(access["wifiPassword"].is_null());
    assert!(!access["reasons"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_check_in_requires_passport_for_foreign_guest() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let stay = StayFixture::create(&server).await.unwrap();

    let response = server
        .post(&stay.guest_path("/check-in"), &check_in_body("GB", None))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server
        .post(&stay.guest_path("/check-in"), &check_in_body("GB", Some("123456789")))
        .await
        .unwrap();
    let overview: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(overview["reservation"]["checkInCompleted"], true);

    // A second submission is refused
    let response = server
        .post(&stay.guest_path("/check-in"), &check_in_body("GB", Some("123456789")))
        .await
        .unwrap();
    assert_status(response, StatusCode::UNPROCESSABLE_ENTITY).await.unwrap();
}

#[tokio::test]
async fn test_domestic_guest_needs_no_passport() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let stay = StayFixture::create(&server).await.unwrap();

    let response = server
        .post(&stay.guest_path("/check-in"), &check_in_body("jp", None))
        .await
        .unwrap();
    let overview: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(overview["reservation"]["checkInCompleted"], true);
}

// ============================================================================
// Chat Tests
// ============================================================================

#[tokio::test]
async fn test_guest_and_host_exchange_messages() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let stay = StayFixture::create(&server).await.unwrap();

    let response = server
        .post(&stay.guest_path("/messages"), &json!({ "content": "What time is check-in?" }))
        .await
        .unwrap();
    let sent: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(sent["senderRole"], "guest");
    let thread_id = sent["threadId"].as_str().unwrap().to_string();

    let response = server
        .post_auth(
            &format!("/api/admin/threads/{thread_id}/messages"),
            &stay.admin.token,
            &json!({ "content": "From 15:00. See you soon!" }),
        )
        .await
        .unwrap();
    let reply: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(reply["senderRole"], "host");
    assert_eq!(reply["senderId"], stay.admin.id.to_string());

    let response = server.get(&stay.guest_path("/messages")).await.unwrap();
    let history: Vec<Value> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["id"], sent["id"]);
    assert_eq!(history[1]["id"], reply["id"]);

    // The guest reads the host reply; their own message is untouched
    let response = server
        .post(&stay.guest_path("/messages/read"), &json!({}))
        .await
        .unwrap();
    let read: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(read["updated"], 1);
}

#[tokio::test]
async fn test_empty_message_is_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let stay = StayFixture::create(&server).await.unwrap();

    let response = server
        .post(&stay.guest_path("/messages"), &json!({ "content": "" }))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Webhook Tests
// ============================================================================

#[tokio::test]
async fn test_beds24_webhook_is_idempotent() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let admin = StaffUser::admin(&server.config).await.unwrap();
    let beds24_property_id = 900_000 + i64::try_from(integration_tests::unique_suffix()).unwrap();

    let mut body = property_body(None);
    body["beds24PropertyId"] = json!(beds24_property_id);
    let response = server
        .post_auth("/api/admin/properties", &admin.token, &body)
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let booking_id = beds24_property_id * 10;
    let payload = json!({
        "event": "NEW",
        "booking": {
            "id": booking_id.to_string(),
            "propertyId": beds24_property_id,
            "arrival": "2030-04-01",
            "departure": "2030-04-04",
            "firstName": "Sam",
            "lastName": "Lee",
            "numAdult": "2",
            "status": "confirmed",
        }
    });

    let response = server.post("/api/webhooks/beds24", &payload).await.unwrap();
    let first: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(first["created"], true);

    let response = server.post("/api/webhooks/beds24", &payload).await.unwrap();
    let second: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(second["created"], false);
    assert_eq!(second["reservationId"], first["reservationId"]);
}

#[tokio::test]
async fn test_beds24_webhook_unknown_property() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let payload = json!({
        "booking": {
            "id": 1,
            "propertyId": -1,
            "arrival": "2030-04-01",
            "departure": "2030-04-02",
        }
    });

    let response = server.post("/api/webhooks/beds24", &payload).await.unwrap();
    assert!(response.status().is_client_error());
}
