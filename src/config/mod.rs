//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML file, parse & deserialize)
//!     → environment overrides (WB_BASE, WB_TOKEN, WB_BEARER, WB_AUTH_HEADER)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → passed explicitly into the server constructor
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the gateway holds no reloadable state
//! - All fields have defaults so a file-less, env-only deployment works
//! - Validation separates syntactic (serde) from semantic checks
//! - Credentials come from the environment in production; the TOML file
//!   exists for local development and tests

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::UpstreamConfig;
