//! Upstream client subsystem.
//!
//! # Data Flow
//! ```text
//! handler (path, query, method, body, content-type)
//!     → client.rs (build target URL, inject credential header)
//!     → marketplace API
//!     → UpstreamResponse (raw status + headers + body)
//!       or typed record list for the funnel
//! ```
//!
//! # Design Decisions
//! - One request per inbound call; nothing is reused or cached
//! - No retries; no per-call timeout (the inbound request deadline applies)
//! - Credential header name and value precomputed at construction so an
//!   unusable configuration fails at startup, not per request

pub mod client;
pub mod error;

pub use client::{UpstreamClient, UpstreamResponse};
pub use error::{FetchError, UpstreamError};
