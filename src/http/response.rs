//! Response envelope construction.
//!
//! # Responsibilities
//! - Return successful upstream bodies verbatim
//! - Wrap failures into the uniform `{success:false, error, details}` shape
//! - Keep the fixed wire messages in one place
//!
//! # Design Decisions
//! - Named handlers normalize success to 200; the generic passthrough
//!   preserves the upstream status and is assembled in server.rs
//! - Upstream failure statuses are forwarded verbatim, never remapped

use axum::body::Bytes;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

/// Fixed message for a missing `dateFrom`/`dateTo` pair.
pub const MISSING_DATE_RANGE: &str = "Parameters dateFrom and dateTo are required";

/// Fixed error for the funnel when both upstream calls failed.
pub const FUNNEL_UNAVAILABLE: &str = "Could not retrieve product data";

/// Uniform JSON error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

fn envelope(status: StatusCode, error: String, details: Option<String>) -> Response {
    let body = ErrorBody {
        success: false,
        error,
        details,
    };
    (status, Json(body)).into_response()
}

/// 400: required query parameters absent. Issued before any upstream call.
pub fn validation_error() -> Response {
    envelope(StatusCode::BAD_REQUEST, MISSING_DATE_RANGE.to_string(), None)
}

/// Upstream returned non-2xx: forward its status with an endpoint-specific
/// detail message.
pub fn upstream_unavailable(status: StatusCode, resource: &str) -> Response {
    envelope(
        status,
        format!("Upstream unavailable: {}", status.as_u16()),
        Some(format!("could not retrieve {}", resource)),
    )
}

/// 500: transport failure (network error, or non-JSON where JSON was
/// expected).
pub fn connection_error(details: impl Into<String>) -> Response {
    envelope(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Connection error".to_string(),
        Some(details.into()),
    )
}

/// 500: both funnel fetches failed; details cite both outcomes.
pub fn funnel_failure(details: String) -> Response {
    envelope(
        StatusCode::INTERNAL_SERVER_ERROR,
        FUNNEL_UNAVAILABLE.to_string(),
        Some(details),
    )
}

/// 200 with the upstream body verbatim as JSON (named handlers).
pub fn json_body(body: Bytes) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}
