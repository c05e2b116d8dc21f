//! Pagination and query-string extractors

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use stay_core::PageRequest;

use crate::response::ApiError;

/// Raw pagination query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

/// Offset pagination, clamped to the repository limits
#[derive(Debug, Clone, Copy, Default)]
pub struct Pagination(pub PageRequest);

impl Pagination {
    #[inline]
    pub fn page(self) -> PageRequest {
        self.0
    }
}

impl From<PaginationParams> for Pagination {
    fn from(params: PaginationParams) -> Self {
        Self(PageRequest::new(
            params.limit.unwrap_or(PageRequest::DEFAULT_LIMIT),
            params.offset.unwrap_or(0),
        ))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.body_text()))?;

        Ok(Pagination::from(params))
    }
}

/// `Query` with rejections turned into `INVALID_QUERY_PARAMETER` errors
#[derive(Debug, Clone, Default)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.body_text()))?;
        Ok(QueryParams(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(uri: &str) -> Result<Pagination, ApiError> {
        let (mut parts, ()) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        Pagination::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_defaults_without_query() {
        let page = extract("/api/admin/reservations").await.unwrap().page();
        assert_eq!(page.limit, PageRequest::DEFAULT_LIMIT);
        assert_eq!(page.offset, 0);
    }

    #[tokio::test]
    async fn test_limits_are_clamped() {
        let page = extract("/x?limit=5000&offset=-3").await.unwrap().page();
        assert_eq!(page.limit, PageRequest::MAX_LIMIT);
        assert_eq!(page.offset, 0);

        let page = extract("/x?limit=0&offset=40").await.unwrap().page();
        assert_eq!(page.limit, 1);
        assert_eq!(page.offset, 40);
    }

    #[tokio::test]
    async fn test_malformed_limit_is_rejected() {
        let err = extract("/x?limit=ten").await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_QUERY_PARAMETER");
    }
}
