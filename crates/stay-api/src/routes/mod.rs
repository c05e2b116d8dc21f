//! Route definitions
//!
//! Admin dashboard routes live under `/api/admin`, the guest portal under
//! `/api/guest/:token` and inbound webhooks under `/api/webhooks`.

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::{
    automation, chat, cleaning, guest, health, properties, reservations, rooms, services, users,
    webhooks,
};
use crate::state::AppState;

/// Create the main router with all routes
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .nest("/api", api_routes())
}

/// Liveness and readiness probes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/admin", admin_routes())
        .nest("/guest", guest_routes())
        .route("/webhooks/beds24", post(webhooks::beds24))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(users::get_current_user))
        .merge(property_routes())
        .merge(reservation_routes())
        .merge(cleaning_routes())
        .merge(user_routes())
        .merge(automation_routes())
        .merge(service_routes())
        .merge(chat_routes())
}

/// Properties, room types and room units
fn property_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/properties",
            get(properties::list_properties).post(properties::create_property),
        )
        .route(
            "/properties/:id",
            get(properties::get_property)
                .patch(properties::update_property)
                .delete(properties::delete_property),
        )
        .route(
            "/properties/:id/room-types",
            get(rooms::list_room_types).post(rooms::create_room_type),
        )
        .route(
            "/room-types/:id",
            get(rooms::get_room_type)
                .patch(rooms::update_room_type)
                .delete(rooms::delete_room_type),
        )
        .route(
            "/room-types/:id/units",
            get(rooms::list_room_units).post(rooms::create_room_unit),
        )
        .route(
            "/room-units/:id",
            get(rooms::get_room_unit)
                .patch(rooms::update_room_unit)
                .delete(rooms::delete_room_unit),
        )
}

fn reservation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reservations",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route(
            "/reservations/:id",
            get(reservations::get_reservation)
                .patch(reservations::update_reservation)
                .delete(reservations::delete_reservation),
        )
        .route("/reservations/:id/status", put(reservations::update_reservation_status))
        .route("/reservations/:id/cancel", post(reservations::cancel_reservation))
}

fn cleaning_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cleaning-tasks",
            get(cleaning::list_tasks).post(cleaning::create_task),
        )
        .route(
            "/cleaning-tasks/:id",
            get(cleaning::get_task)
                .patch(cleaning::update_task)
                .delete(cleaning::delete_task),
        )
        .route("/cleaning-tasks/:id/assign", put(cleaning::assign_task))
        .route("/cleaning-tasks/:id/status", put(cleaning::update_task_status))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
}

/// Message rules, templates and scheduled messages
fn automation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/properties/:id/message-rules",
            get(automation::list_rules).post(automation::create_rule),
        )
        .route(
            "/message-rules/:id",
            get(automation::get_rule)
                .patch(automation::update_rule)
                .delete(automation::delete_rule),
        )
        .route(
            "/message-templates",
            get(automation::list_templates).post(automation::create_template),
        )
        .route(
            "/message-templates/:id",
            get(automation::get_template)
                .patch(automation::update_template)
                .delete(automation::delete_template),
        )
        .route("/reservations/:id/messages/plan", post(automation::plan_reservation))
        .route("/reservations/:id/scheduled-messages", get(automation::list_scheduled))
        .route("/scheduled-messages/:id/cancel", post(automation::cancel_scheduled))
}

/// Guest service catalog and per-reservation items
fn service_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/properties/:id/services",
            get(services::list_services).post(services::create_service),
        )
        .route(
            "/services/:id",
            get(services::get_service)
                .patch(services::update_service)
                .delete(services::delete_service),
        )
        .route(
            "/reservations/:id/services",
            get(services::list_reservation_services).post(services::attach_service),
        )
        .route("/reservation-services/:id/paid", post(services::mark_paid))
        .route("/reservation-services/:id/exempt", post(services::exempt))
}

fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/properties/:id/threads", get(chat::list_threads))
        .route("/reservations/:id/thread", get(chat::reservation_thread))
        .route(
            "/threads/:id/messages",
            get(chat::list_messages).post(chat::post_message),
        )
        .route("/threads/:id/read", post(chat::mark_read))
}

fn guest_routes() -> Router<AppState> {
    Router::new()
        .route("/:token", get(guest::overview))
        .route("/:token/check-in", post(guest::check_in))
        .route("/:token/services", get(guest::services))
        .route("/:token/access", get(guest::access))
        .route(
            "/:token/messages",
            get(guest::messages).post(guest::post_message),
        )
        .route("/:token/messages/read", post(guest::mark_read))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    // The routes below reject before touching application state, so a
    // router without state is enough to exercise them.
    fn stateless() -> Router {
        Router::new()
            .nest(
                "/api/guest",
                Router::new().route("/:token", get(|_: crate::extractors::GuestTokenPath| async { "ok" })),
            )
            .route(
                "/api/admin/reservations/:id",
                get(|_: crate::extractors::IdPath<uuid::Uuid>| async { "ok" }),
            )
    }

    async fn call(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = stateless()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_malformed_guest_token_is_rejected() {
        let (status, body) = call("/api/guest/short").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_GUEST_TOKEN");

        let token = stay_common::generate_guest_token();
        let (status, _) = call(&format!("/api/guest/{token}")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_non_uuid_id_is_rejected() {
        let (status, body) = call("/api/admin/reservations/not-a-uuid").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_PATH_PARAMETER");
    }

    #[test]
    fn test_router_builds() {
        // Overlapping or malformed paths panic at construction time.
        let _ = create_router();
    }
}
