//! Named endpoint handlers.
//!
//! Each named endpoint is a thin binding of the upstream client to a fixed
//! upstream path. Date-ranged endpoints validate `dateFrom`/`dateTo` first
//! and answer 400 before any upstream call. The sales-funnel endpoint fans
//! out into two concurrent upstream fetches and aggregates whatever
//! succeeded.

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};

use crate::funnel::{aggregate, OrderRecord, SaleRecord};
use crate::http::response;
use crate::routing::Endpoint;
use crate::upstream::client::date_range_query;
use crate::upstream::UpstreamClient;

/// Validated `dateFrom`/`dateTo` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub date_from: String,
    pub date_to: String,
}

/// Extract a complete date range from a raw query string. Empty values
/// count as missing.
pub fn parse_date_range(raw_query: Option<&str>) -> Option<DateRange> {
    let query = raw_query.unwrap_or("");
    let mut date_from = None;
    let mut date_to = None;

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            "dateFrom" => date_from = Some(value.into_owned()),
            "dateTo" => date_to = Some(value.into_owned()),
            _ => {}
        }
    }

    match (date_from, date_to) {
        (Some(date_from), Some(date_to)) => Some(DateRange { date_from, date_to }),
        _ => None,
    }
}

/// Dispatch a request that matched a named endpoint.
pub async fn dispatch_named(
    upstream: &UpstreamClient,
    endpoint: Endpoint,
    raw_query: Option<&str>,
) -> Response {
    if endpoint.requires_date_range() {
        let Some(range) = parse_date_range(raw_query) else {
            tracing::debug!(endpoint = endpoint.label(), "Missing dateFrom/dateTo");
            return response::validation_error();
        };
        if endpoint == Endpoint::SalesFunnel {
            return sales_funnel(upstream, &range).await;
        }
        return named_passthrough(upstream, endpoint, Some(&range)).await;
    }

    named_passthrough(upstream, endpoint, None).await
}

/// Forward to the endpoint's fixed upstream path and envelope the result.
async fn named_passthrough(
    upstream: &UpstreamClient,
    endpoint: Endpoint,
    range: Option<&DateRange>,
) -> Response {
    let query = range.map(|r| date_range_query(&r.date_from, &r.date_to));

    match upstream
        .forward(Method::GET, endpoint.path(), query.as_deref(), None, None)
        .await
    {
        Ok(result) if result.is_success() => {
            // Named endpoints promise JSON; a 2xx body that does not parse
            // is treated as a transport-level failure.
            if serde_json::from_slice::<serde_json::Value>(&result.body).is_err() {
                tracing::error!(
                    endpoint = endpoint.label(),
                    "Upstream returned 2xx with a non-JSON body"
                );
                return response::connection_error("upstream body is not valid JSON");
            }
            response::json_body(result.body)
        }
        Ok(result) => {
            tracing::warn!(
                endpoint = endpoint.label(),
                status = result.status.as_u16(),
                "Upstream returned error status"
            );
            response::upstream_unavailable(result.status, endpoint.resource())
        }
        Err(e) => {
            tracing::error!(endpoint = endpoint.label(), error = %e, "Upstream request failed");
            response::connection_error(e.to_string())
        }
    }
}

/// Fetch orders and sales concurrently and aggregate into the funnel
/// report. One failed fetch degrades to a partial report; two failed
/// fetches escalate to an error citing both outcomes.
async fn sales_funnel(upstream: &UpstreamClient, range: &DateRange) -> Response {
    let (orders_result, sales_result) = tokio::join!(
        upstream.fetch_records::<OrderRecord>(
            Endpoint::SupplierOrders.path(),
            &range.date_from,
            &range.date_to,
        ),
        upstream.fetch_records::<SaleRecord>(
            Endpoint::SupplierSales.path(),
            &range.date_from,
            &range.date_to,
        ),
    );

    if let (Err(orders_err), Err(sales_err)) = (&orders_result, &sales_result) {
        tracing::error!(
            orders_error = %orders_err,
            sales_error = %sales_err,
            "Both funnel fetches failed"
        );
        return response::funnel_failure(format!("orders: {}, sales: {}", orders_err, sales_err));
    }

    let orders = orders_result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Orders fetch failed; aggregating sales only");
        Vec::new()
    });
    let sales = sales_result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Sales fetch failed; aggregating orders only");
        Vec::new()
    });

    let report = aggregate(&orders, &sales, &range.date_from, &range.date_to);
    (StatusCode::OK, Json(report)).into_response()
}
