//! Envelope response format for all API responses.
//!
//! Every response is wrapped in a consistent envelope:
//! ```json
//! {
//!   "data": { ... },
//!   "meta": { "request_id": "...", "timestamp": "...", "response_time_ms": 5 },
//!   "errors": [],
//!   "_links": { "self": "..." }
//! }
//! ```

use std::collections::HashMap;
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Envelope response wrapping all API data.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    pub meta: ApiMeta,

    /// Empty on success.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ApiErrorDetail>,

    #[serde(rename = "_links", skip_serializing_if = "HashMap::is_empty")]
    pub links: HashMap<String, String>,
}

/// Metadata included in every response.
#[derive(Debug, Serialize)]
pub struct ApiMeta {
    pub request_id: String,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
    pub response_time_ms: u64,
}

impl ApiMeta {
    pub fn new(request_id: String, response_time_ms: u64) -> Self {
        Self {
            request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
            response_time_ms,
        }
    }
}

/// Individual error detail.
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    pub message: String,
}

/// Request timing and id shared by every handler.
pub struct RequestClock {
    start: Instant,
    request_id: String,
}

impl RequestClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            request_id: uuid::Uuid::now_v7().to_string(),
        }
    }

    /// Wrap `data` in a success envelope stamped with this request.
    pub fn respond<T: Serialize>(self, data: T) -> ApiResponse<T> {
        let elapsed = self.start.elapsed().as_millis() as u64;
        ApiResponse::success(data, self.request_id, elapsed)
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, request_id: String, response_time_ms: u64) -> Self {
        Self {
            data: Some(data),
            meta: ApiMeta::new(request_id, response_time_ms),
            errors: Vec::new(),
            links: HashMap::new(),
        }
    }

    pub fn with_link(mut self, rel: &str, href: &str) -> Self {
        self.links.insert(rel.to_string(), href.to_string());
        self
    }
}

impl ApiResponse<()> {
    /// Create an error response (no data).
    pub fn error(code: &str, message: &str, request_id: String, response_time_ms: u64) -> Self {
        Self {
            data: None,
            meta: ApiMeta::new(request_id, response_time_ms),
            errors: vec![ApiErrorDetail {
                code: code.to_string(),
                message: message.to_string(),
            }],
            links: HashMap::new(),
        }
    }
}

/// HTTP status for a machine-readable error code.
pub fn status_for_code(code: &str) -> StatusCode {
    match code {
        "NOT_FOUND" | "KEY_NOT_FOUND" => StatusCode::NOT_FOUND,
        "CONFLICT" => StatusCode::CONFLICT,
        "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
        "STORE_UNAVAILABLE" => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = match self.errors.first() {
            None => StatusCode::OK,
            Some(error) => status_for_code(&error.code),
        };

        let body = serde_json::to_string(&self).unwrap_or_else(|_| {
            r#"{"errors":[{"code":"SERIALIZATION_ERROR","message":"Failed to serialize response"}]}"#.to_string()
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}
