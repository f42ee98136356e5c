//! Page selection from the query string, with rejections rendered as [`AppError`].

use crate::error::AppError;
use crate::pagination::{self, PageParams, PageSelection, INVALID_PARAMS};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};

/// Resolved `current` / `pageSize`. A query string that cannot be read at all
/// (repeated keys, broken encoding) is reported like any unparseable value.
#[derive(Debug, Clone, Copy)]
pub struct PageQuery(pub PageSelection);

#[async_trait]
impl<S> FromRequestParts<S> for PageQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PageParams>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection.body_text(), "unreadable page query");
                AppError::BadRequest(INVALID_PARAMS.into())
            })?;
        let selection = pagination::resolve(params.current.as_deref(), params.page_size.as_deref())?;
        Ok(PageQuery(selection))
    }
}
