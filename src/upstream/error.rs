//! Upstream error definitions.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised while building or sending an upstream request.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The upstream configuration produced an unusable header.
    /// Normally caught by config validation before the client exists.
    #[error("invalid upstream configuration: {0}")]
    Config(String),

    /// The target URL could not be built from base + path.
    #[error("invalid target URL: {0}")]
    Url(#[from] url::ParseError),

    /// Network-level failure: DNS, connection, malformed response.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// Outcome classification for a typed record fetch (funnel inputs).
///
/// The `Display` output is embedded verbatim in the funnel's combined
/// failure message ("orders: <this>, sales: <this>"), so a bad status
/// renders as the bare numeric code.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream answered with a non-2xx status.
    #[error("{}", .0.as_u16())]
    Status(StatusCode),

    /// The request itself failed before a status was available.
    #[error("connection error ({0})")]
    Upstream(#[from] UpstreamError),

    /// Upstream answered 2xx with a body that is not the expected JSON.
    #[error("invalid JSON ({0})")]
    Decode(String),
}
