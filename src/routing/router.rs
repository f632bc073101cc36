//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store the fixed path → endpoint table
//! - Look up the endpoint for a request path
//! - Return matched endpoint or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) exact-path lookup via HashMap
//! - Explicit None rather than silent default; the caller decides that
//!   no-match means generic passthrough

use std::collections::HashMap;

/// The fixed set of named gateway endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    SalesFunnel,
    SupplierOrders,
    SupplierSales,
    SuppliesStocks,
    Supplies,
    SupplierReturns,
    ReportDetailByPeriod,
    WbCategories,
    SearchQueries,
    HiddenProducts,
    BrandShare,
}

impl Endpoint {
    /// Inbound path this endpoint is bound to. Identical to the upstream
    /// path: named handlers are thin bindings, not rewrites.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::SalesFunnel => "/api/v1/sales-funnel",
            Endpoint::SupplierOrders => "/api/v1/supplier/orders",
            Endpoint::SupplierSales => "/api/v1/supplier/sales",
            Endpoint::SuppliesStocks => "/api/v3/supplies/stocks",
            Endpoint::Supplies => "/api/v3/supplies",
            Endpoint::SupplierReturns => "/api/v1/supplier/returns",
            Endpoint::ReportDetailByPeriod => "/api/v5/supplier/reportDetailByPeriod",
            Endpoint::WbCategories => "/api/lite/products/wb_categories",
            Endpoint::SearchQueries => "/api/v1/search-queries",
            Endpoint::HiddenProducts => "/api/v1/hidden-products",
            Endpoint::BrandShare => "/api/v1/brand-share",
        }
    }

    /// Whether the endpoint requires `dateFrom`/`dateTo` query parameters.
    pub fn requires_date_range(&self) -> bool {
        matches!(
            self,
            Endpoint::SalesFunnel
                | Endpoint::SupplierOrders
                | Endpoint::SupplierSales
                | Endpoint::ReportDetailByPeriod
        )
    }

    /// Resource name used in upstream-failure details
    /// ("could not retrieve <resource>").
    pub fn resource(&self) -> &'static str {
        match self {
            Endpoint::SalesFunnel => "product data",
            Endpoint::SupplierOrders => "orders data",
            Endpoint::SupplierSales => "sales data",
            Endpoint::SuppliesStocks => "stocks data",
            Endpoint::Supplies => "supplies data",
            Endpoint::SupplierReturns => "returns data",
            Endpoint::ReportDetailByPeriod => "detailed statistics",
            Endpoint::WbCategories => "product categories",
            Endpoint::SearchQueries => "search queries data",
            Endpoint::HiddenProducts => "hidden products data",
            Endpoint::BrandShare => "brand share data",
        }
    }

    /// Stable label for logging and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::SalesFunnel => "sales_funnel",
            Endpoint::SupplierOrders => "supplier_orders",
            Endpoint::SupplierSales => "supplier_sales",
            Endpoint::SuppliesStocks => "supplies_stocks",
            Endpoint::Supplies => "supplies",
            Endpoint::SupplierReturns => "supplier_returns",
            Endpoint::ReportDetailByPeriod => "report_detail_by_period",
            Endpoint::WbCategories => "wb_categories",
            Endpoint::SearchQueries => "search_queries",
            Endpoint::HiddenProducts => "hidden_products",
            Endpoint::BrandShare => "brand_share",
        }
    }

    /// Every named endpoint, in route-table order.
    pub fn all() -> [Endpoint; 11] {
        [
            Endpoint::SalesFunnel,
            Endpoint::SupplierOrders,
            Endpoint::SupplierSales,
            Endpoint::SuppliesStocks,
            Endpoint::Supplies,
            Endpoint::SupplierReturns,
            Endpoint::ReportDetailByPeriod,
            Endpoint::WbCategories,
            Endpoint::SearchQueries,
            Endpoint::HiddenProducts,
            Endpoint::BrandShare,
        ]
    }
}

/// Exact-path route table, compiled once at startup.
#[derive(Debug)]
pub struct RouteTable {
    routes: HashMap<&'static str, Endpoint>,
}

impl RouteTable {
    pub fn new() -> Self {
        let routes = Endpoint::all().into_iter().map(|e| (e.path(), e)).collect();
        Self { routes }
    }

    /// Resolve a request path to a named endpoint. The query string must
    /// already be stripped; it never participates in routing.
    pub fn resolve(&self, path: &str) -> Option<Endpoint> {
        self.routes.get(path).copied()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}
