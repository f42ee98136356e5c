//! JSON body extractor whose rejections are rendered as [`AppError`].

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;

/// Like [`axum::Json`], but rejections reach the client enveloped.
/// Malformed or mistyped bodies are 400; a missing JSON content type (415)
/// and an oversized body (413) keep their status.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Payload(value)),
            Err(rejection) => Err(rejection_error(rejection)),
        }
    }
}

fn rejection_error(rejection: JsonRejection) -> AppError {
    let status = rejection.status();
    match status {
        StatusCode::UNSUPPORTED_MEDIA_TYPE | StatusCode::PAYLOAD_TOO_LARGE => AppError::Rejected {
            status,
            message: rejection.body_text(),
        },
        _ => AppError::BadRequest(rejection.body_text()),
    }
}
