//! Authentication extractor
//!
//! Verifies the bearer token from the `Authorization` header and loads the
//! caller's staff profile. Capability checks happen in the services.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use stay_common::AppError;
use stay_service::services::{Actor, PermissionService};
use stay_service::ServiceError;

use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated, active staff user
#[derive(Debug, Clone)]
pub struct AdminUser(pub Actor);

impl AdminUser {
    #[inline]
    pub fn actor(&self) -> &Actor {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let app_state = AppState::from_ref(state);

        let actor = PermissionService::new(app_state.service_context())
            .authenticate(bearer.token())
            .await
            .map_err(|e| match e {
                ServiceError::App(AppError::InvalidToken | AppError::TokenExpired) => {
                    tracing::warn!(error = %e, "Rejected bearer token");
                    ApiError::InvalidToken
                }
                other => ApiError::Service(other),
            })?;

        Ok(AdminUser(actor))
    }
}
