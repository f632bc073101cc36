//! Upstream record schemas for funnel aggregation.
//!
//! The upstream API is loosely typed; these schemas pin down exactly the
//! fields the aggregator reads, with explicit defaults for the optional
//! ones. Unknown fields are ignored. Records are read-only inputs.

use serde::{Deserialize, Serialize};

/// One order event from `/api/v1/supplier/orders`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// Product identifier; the join key for aggregation.
    pub nm_id: i64,

    /// Event timestamp, e.g. "2024-01-01T10:00:00Z". The calendar date is
    /// the part before the first 'T', taken as-is.
    pub date: String,

    /// Monetary amount of the order.
    #[serde(default)]
    pub total_price: f64,

    #[serde(default)]
    pub supplier_article: String,

    #[serde(default)]
    pub brand: String,

    #[serde(default)]
    pub subject: String,
}

/// One realized sale event from `/api/v1/supplier/sales`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub nm_id: i64,

    pub date: String,

    /// Amount actually paid. Falls back to `price_with_disc`, then 0.
    #[serde(default)]
    pub finished_price: Option<f64>,

    #[serde(default)]
    pub price_with_disc: Option<f64>,

    #[serde(default)]
    pub supplier_article: String,

    #[serde(default)]
    pub brand: String,

    #[serde(default)]
    pub subject: String,
}

impl SaleRecord {
    /// Monetary amount of the sale: `finishedPrice`, else `priceWithDisc`,
    /// else 0.
    pub fn amount(&self) -> f64 {
        self.finished_price
            .or(self.price_with_disc)
            .unwrap_or(0.0)
    }
}
