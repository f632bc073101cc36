//! Marketplace API gateway library.
//!
//! A stateless HTTP gateway in front of a marketplace seller API. Requests
//! either pass through to the upstream with injected credentials, or fan out
//! into two upstream calls (orders, sales) whose results are merged into a
//! per-product daily sales-funnel report.

pub mod config;
pub mod funnel;
pub mod http;
pub mod observability;
pub mod routing;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::HttpServer;
