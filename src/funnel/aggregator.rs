//! Funnel aggregation: join orders and sales into per-product daily metrics.
//!
//! # Responsibilities
//! - Truncate timestamps to calendar days (string prefix before 'T';
//!   deliberately no timezone normalization, matching the upstream feed)
//! - Group both collections by (nmId, day) into one mapping
//! - Accumulate counts and amounts, compute conversion rates
//! - Produce the global summary over the raw inputs
//!
//! # Design Decisions
//! - One metric per distinct (nmId, day) present in either input
//! - Emission order = insertion order of first encounter; orders are
//!   scanned before sales, so output is stable across runs
//! - Display attributes resolved through per-nmId first-record indexes
//!   built once up front (O(n) total instead of a scan per group)
//! - Amounts rounded to 2 decimal places at emission, not accumulation

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::funnel::records::{OrderRecord, SaleRecord};

/// Per-(product, day) funnel metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelDailyMetric {
    pub date: String,
    #[serde(rename = "nmId")]
    pub nm_id: i64,
    #[serde(rename = "supplierArticle")]
    pub supplier_article: String,
    pub brand: String,
    pub subject: String,
    pub orders: u64,
    pub sales: u64,
    pub orders_amount: f64,
    pub sales_amount: f64,
    pub conversion_rate: f64,
}

/// Global summary computed over the raw input collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelSummary {
    pub total_products: usize,
    pub total_orders: usize,
    pub total_sales: usize,
    pub total_orders_amount: f64,
    pub total_sales_amount: f64,
}

/// Complete funnel report as returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelReport {
    pub success: bool,
    pub data: Vec<FunnelDailyMetric>,
    pub message: String,
    pub source: String,
    pub summary: FunnelSummary,
}

/// Round to 2 decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Calendar date of a timestamp: everything before the first 'T', as-is.
fn calendar_date(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

#[derive(Default)]
struct Accumulator {
    orders: u64,
    sales: u64,
    orders_amount: f64,
    sales_amount: f64,
}

/// First non-empty of order attribute, sale attribute, empty string.
fn pick<'a>(order: Option<&'a str>, sale: Option<&'a str>) -> &'a str {
    match order {
        Some(v) if !v.is_empty() => v,
        _ => match sale {
            Some(v) if !v.is_empty() => v,
            _ => "",
        },
    }
}

/// Join orders and sales into the funnel report.
///
/// The date range does not filter; upstream already applied it. It is
/// carried for diagnostics only.
pub fn aggregate(
    orders: &[OrderRecord],
    sales: &[SaleRecord],
    date_from: &str,
    date_to: &str,
) -> FunnelReport {
    tracing::debug!(
        orders = orders.len(),
        sales = sales.len(),
        date_from,
        date_to,
        "Aggregating funnel report"
    );

    // Per-nmId first-record indexes for display attributes.
    let mut first_order: HashMap<i64, &OrderRecord> = HashMap::new();
    for order in orders {
        first_order.entry(order.nm_id).or_insert(order);
    }
    let mut first_sale: HashMap<i64, &SaleRecord> = HashMap::new();
    for sale in sales {
        first_sale.entry(sale.nm_id).or_insert(sale);
    }

    // Group by (nmId, calendar day), preserving first-encounter order.
    let mut index: HashMap<(i64, String), usize> = HashMap::new();
    let mut keys: Vec<(i64, String)> = Vec::new();
    let mut groups: Vec<Accumulator> = Vec::new();

    fn slot(
        index: &mut HashMap<(i64, String), usize>,
        keys: &mut Vec<(i64, String)>,
        groups: &mut Vec<Accumulator>,
        key: (i64, String),
    ) -> usize {
        match index.get(&key) {
            Some(&i) => i,
            None => {
                let i = groups.len();
                keys.push(key.clone());
                groups.push(Accumulator::default());
                index.insert(key, i);
                i
            }
        }
    }

    for order in orders {
        let key = (order.nm_id, calendar_date(&order.date).to_string());
        let i = slot(&mut index, &mut keys, &mut groups, key);
        groups[i].orders += 1;
        groups[i].orders_amount += order.total_price;
    }

    for sale in sales {
        let key = (sale.nm_id, calendar_date(&sale.date).to_string());
        let i = slot(&mut index, &mut keys, &mut groups, key);
        groups[i].sales += 1;
        groups[i].sales_amount += sale.amount();
    }

    let data: Vec<FunnelDailyMetric> = keys
        .iter()
        .zip(groups.iter())
        .map(|((nm_id, day), acc)| {
            let order = first_order.get(nm_id).copied();
            let sale = first_sale.get(nm_id).copied();

            let conversion_rate = if acc.orders > 0 {
                round2(acc.sales as f64 / acc.orders as f64 * 100.0)
            } else {
                0.0
            };

            FunnelDailyMetric {
                date: day.clone(),
                nm_id: *nm_id,
                supplier_article: pick(
                    order.map(|o| o.supplier_article.as_str()),
                    sale.map(|s| s.supplier_article.as_str()),
                )
                .to_string(),
                brand: pick(
                    order.map(|o| o.brand.as_str()),
                    sale.map(|s| s.brand.as_str()),
                )
                .to_string(),
                subject: pick(
                    order.map(|o| o.subject.as_str()),
                    sale.map(|s| s.subject.as_str()),
                )
                .to_string(),
                orders: acc.orders,
                sales: acc.sales,
                orders_amount: round2(acc.orders_amount),
                sales_amount: round2(acc.sales_amount),
                conversion_rate,
            }
        })
        .collect();

    // Summary over the raw inputs, not the grouped metrics.
    let total_products = keys.iter().map(|(nm_id, _)| *nm_id).collect::<HashSet<_>>().len();
    let summary = FunnelSummary {
        total_products,
        total_orders: orders.len(),
        total_sales: sales.len(),
        total_orders_amount: round2(orders.iter().map(|o| o.total_price).sum()),
        total_sales_amount: round2(sales.iter().map(|s| s.amount()).sum()),
    };

    FunnelReport {
        success: true,
        data,
        message: "Per-product daily metrics built from orders and sales".to_string(),
        source: "orders_and_sales_by_product".to_string(),
        summary,
    }
}
