//! Request and response bodies for the HTTP API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

// --- Errors ---

/// JSON error response: `{"error": message, ...extra}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 500 with a generic message; the cause goes to the log, not the client.
    pub fn internal(message: impl Into<String>, cause: &dyn std::fmt::Display) -> Self {
        let message = message.into();
        tracing::error!(error = %cause, "{message}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Attach an extra field to the body.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        if let (Some(body), Ok(value)) = (self.body.as_object_mut(), serde_json::to_value(value)) {
            body.insert(key.to_string(), value);
        }
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// Ids arrive as numbers or numeric strings depending on the client.
pub(crate) fn parse_id(value: &Option<Value>) -> Option<i64> {
    match value.as_ref()? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// --- Health ---

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// --- Visitors ---

#[derive(Debug, Deserialize)]
pub struct TempCreateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub duration: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub message: &'static str,
    pub visitor_id: i64,
    pub queue_number: i64,
}

/// Body carrying a single visitor id.
#[derive(Debug, Deserialize)]
pub struct VisitorIdRequest {
    #[serde(default)]
    pub visitor_id: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub message: &'static str,
    pub session_id: i64,
}

// --- Feedback ---

#[derive(Debug, Serialize)]
pub struct FeedbackTokenInfo {
    pub visitor_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackSubmitRequest {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub rating: Option<Value>,
    #[serde(default)]
    pub feedback: Option<String>,
}
