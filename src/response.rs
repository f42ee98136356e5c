//! Standard response envelope and the middleware that applies it.
//!
//! Every JSON response leaves the service as
//! `{ statusCode, error?, message, data? }`. Handlers return plain payloads and
//! [`envelope`] wraps them; errors are rendered in envelope form by
//! [`crate::error::AppError`] and tagged with [`Enveloped`] so they pass through
//! untouched.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SUCCESS_MESSAGE: &str = "Call api success";
const FALLBACK_ERROR_LABEL: &str = "Error occurred";

/// Path prefixes served without an envelope (interactive API documentation).
pub const EXCLUDED_PATHS: &[&str] = &[
    "/v3/api-docs",
    "/swagger-ui",
    "/swagger-ui.html",
    "/webjars",
    "/favicon.ico",
];

/// Either one message or the full list of field messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    Text(String),
    List(Vec<String>),
}

impl Message {
    /// A single entry collapses to a plain string; clients depend on that shape.
    pub fn from_list(mut messages: Vec<String>) -> Self {
        if messages.len() == 1 {
            Message::Text(messages.remove(0))
        } else {
            Message::List(messages)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn success(status: StatusCode, data: Value) -> Self {
        Envelope {
            status_code: status.as_u16(),
            error: None,
            message: Message::Text(SUCCESS_MESSAGE.into()),
            data: Some(data),
        }
    }

    pub fn failure(status: StatusCode, label: &str, message: Message) -> Self {
        Envelope {
            status_code: status.as_u16(),
            error: Some(label.to_string()),
            message,
            data: None,
        }
    }

    /// Wrap an arbitrary JSON body produced under `status`.
    pub fn wrap(status: StatusCode, body: Value) -> Self {
        if status.as_u16() < 400 {
            return Envelope::success(status, body);
        }
        let message = match body {
            Value::String(s) => Message::Text(s),
            Value::Null => Message::Text("Unknown error".into()),
            other => Message::Text(other.to_string()),
        };
        Envelope::failure(status, FALLBACK_ERROR_LABEL, message)
    }
}

/// Response extension marking a body that is already in envelope shape.
#[derive(Debug, Clone, Copy)]
pub struct Enveloped;

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut res = (status, Json(self)).into_response();
        res.extensions_mut().insert(Enveloped);
        res
    }
}

pub fn is_excluded(path: &str) -> bool {
    EXCLUDED_PATHS.iter().any(|p| path.starts_with(p))
}

fn is_json(content_type: Option<&HeaderValue>) -> bool {
    content_type
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

fn is_error(status: StatusCode) -> bool {
    status.is_client_error() || status.is_server_error()
}

/// Envelope for an error produced outside the handlers (the router's 405, a
/// body-limit 413): the text body becomes the message, an empty body the
/// status reason.
fn plain_error(status: StatusCode, bytes: &[u8]) -> Envelope {
    let text = String::from_utf8_lossy(bytes).trim().to_string();
    let message = if text.is_empty() {
        status.canonical_reason().unwrap_or(FALLBACK_ERROR_LABEL).to_string()
    } else {
        text
    };
    Envelope::failure(status, FALLBACK_ERROR_LABEL, Message::Text(message))
}

/// Keeps the original headers (such as `Allow`) except the body framing ones.
fn copy_headers(from: &HeaderMap, to: &mut Response) {
    for (name, value) in from.iter() {
        if name != header::CONTENT_LENGTH && name != header::CONTENT_TYPE {
            to.headers_mut().append(name.clone(), value.clone());
        }
    }
}

/// Middleware: wrap responses into [`Envelope`].
///
/// Bypassed for excluded paths and already-enveloped responses. Successful
/// non-JSON bodies (plain strings, the empty delete response) pass through
/// as-is; non-JSON error bodies are enveloped as plain errors.
pub async fn envelope(req: Request, next: Next) -> Response {
    let excluded = is_excluded(req.uri().path());
    let res = next.run(req).await;
    if excluded || res.extensions().get::<Enveloped>().is_some() {
        return res;
    }
    let json = is_json(res.headers().get(header::CONTENT_TYPE));
    if !json && !is_error(res.status()) {
        return res;
    }

    let (parts, body) = res.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(error = %e, "failed to buffer response body");
            return crate::error::AppError::Unexpected("Failed to read response body".into()).into_response();
        }
    };

    let envelope = if !json {
        plain_error(parts.status, &bytes)
    } else if bytes.is_empty() {
        Envelope::wrap(parts.status, Value::Null)
    } else {
        match serde_json::from_slice(&bytes) {
            Ok(value) => Envelope::wrap(parts.status, value),
            Err(_) => return Response::from_parts(parts, Body::from(bytes)),
        }
    };

    let mut wrapped = envelope.into_response();
    copy_headers(&parts.headers, &mut wrapped);
    wrapped
}
