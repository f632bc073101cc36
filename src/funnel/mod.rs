//! Sales-funnel subsystem.
//!
//! # Data Flow
//! ```text
//! upstream orders + sales (independent fetches, joined by the handler)
//!     → records.rs (typed, defaulted record schemas)
//!     → aggregator.rs (group by (nmId, calendar day), accumulate, round)
//!     → FunnelReport (per-day metrics + global summary)
//! ```
//!
//! # Design Decisions
//! - Aggregation is a pure function over the two record slices; the date
//!   range is diagnostic context only and never filters
//! - Emission order is insertion order of first encounter (orders scanned
//!   before sales) so repeated runs produce identical output
//! - Display attributes come from per-nmId first-record indexes built once,
//!   not a re-scan per group

pub mod aggregator;
pub mod records;

pub use aggregator::{aggregate, FunnelDailyMetric, FunnelReport, FunnelSummary};
pub use records::{OrderRecord, SaleRecord};
