//! Router assembly: resource routes plus the cross-cutting layers.

pub mod common;
pub mod docs;
pub mod student;

pub use common::common_routes_with_ready;
pub use docs::{docs_routes, ApiDoc};
pub use student::student_routes;

use crate::error::AppError;
use crate::response::envelope;
use crate::state::AppState;
use axum::{
    http::Uri,
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "handler panicked");
    AppError::Unexpected("An unexpected error occurred".into()).into_response()
}

/// Full application: health, students and docs. Panic recovery and the body
/// size limit sit inside the response envelope, so their errors are
/// enveloped too; request tracing is outermost.
pub fn app(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .merge(student_routes(state))
        .merge(docs_routes())
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .layer(middleware::from_fn(envelope))
        .layer(TraceLayer::new_for_http())
}
