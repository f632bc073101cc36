//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (exact-path lookup)
//!     → Return: named Endpoint or NoMatch
//!
//! NoMatch is not an error: unmatched paths fall through to the
//! generic passthrough in the HTTP layer.
//! ```
//!
//! # Design Decisions
//! - Route table compiled at startup, immutable at runtime
//! - Exact string matching only; query string never participates
//! - Deterministic: same path always resolves the same endpoint

pub mod router;

pub use router::{Endpoint, RouteTable};
