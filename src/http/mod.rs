//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layer stack, dispatch)
//!     → middleware/cors.rs (OPTIONS short-circuit, response headers)
//!     → request.rs (request ID stamping)
//!     → handlers.rs (named endpoints, funnel)
//!       or generic passthrough (server.rs)
//!     → response.rs (uniform success/error envelope)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
