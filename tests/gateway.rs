//! End-to-end gateway tests against a live server and a mock upstream.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;
use wb_gateway::config::GatewayConfig;
use wb_gateway::http::HttpServer;

mod common;
use common::{start_mock_upstream, MockRequest};

fn gateway_config(upstream: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.upstream.base_url = format!("http://{}", upstream);
    config.upstream.token = "test-token".to_string();
    config
}

async fn start_gateway(config: GatewayConfig) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    addr
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_options_preflight_short_circuits() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let upstream = start_mock_upstream(move |_req| {
        cc.fetch_add(1, Ordering::SeqCst);
        async move { (200, "application/json", "[]".to_string()) }
    })
    .await;
    let addr = start_gateway(gateway_config(upstream)).await;

    // Matched and unmatched paths behave identically for OPTIONS.
    for path in ["/api/v1/supplier/orders", "/anything/at/all"] {
        let res = client()
            .request(reqwest::Method::OPTIONS, format!("http://{}{}", addr, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 204);
        assert_eq!(res.headers()["access-control-allow-origin"], "*");
        assert_eq!(res.headers()["access-control-allow-headers"], "*");
        assert_eq!(
            res.headers()["access-control-allow-methods"],
            "GET,POST,OPTIONS"
        );
        let body = res.bytes().await.unwrap();
        assert!(body.is_empty());
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0, "no upstream call for OPTIONS");
}

#[tokio::test]
async fn test_missing_date_range_is_rejected_before_upstream() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let upstream = start_mock_upstream(move |_req| {
        cc.fetch_add(1, Ordering::SeqCst);
        async move { (200, "application/json", "[]".to_string()) }
    })
    .await;
    let addr = start_gateway(gateway_config(upstream)).await;

    for path in [
        "/api/v1/supplier/orders",
        "/api/v1/supplier/sales?dateFrom=2024-01-01",
        "/api/v5/supplier/reportDetailByPeriod?dateTo=2024-01-31",
        "/api/v1/sales-funnel",
    ] {
        let res = client()
            .get(format!("http://{}{}", addr, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400, "path: {}", path);
        assert_eq!(res.headers()["access-control-allow-origin"], "*");
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Parameters dateFrom and dateTo are required");
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0, "no upstream call on validation failure");
}

#[tokio::test]
async fn test_orders_passthrough_returns_upstream_body_verbatim() {
    let seen = Arc::new(Mutex::new(Vec::<MockRequest>::new()));
    let sc = seen.clone();
    let upstream = start_mock_upstream(move |req| {
        sc.lock().unwrap().push(req);
        async move {
            (
                200,
                "application/json",
                r#"[{"nmId":1,"date":"2024-01-01T10:00:00Z","totalPrice":100}]"#.to_string(),
            )
        }
    })
    .await;
    let addr = start_gateway(gateway_config(upstream)).await;

    let res = client()
        .get(format!(
            "http://{}/api/v1/supplier/orders?dateFrom=2024-01-01&dateTo=2024-01-31",
            addr
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    let body = res.text().await.unwrap();
    assert_eq!(
        body,
        r#"[{"nmId":1,"date":"2024-01-01T10:00:00Z","totalPrice":100}]"#
    );

    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path(), "/api/v1/supplier/orders");
    assert!(requests[0].query().contains("dateFrom=2024-01-01"));
    assert!(requests[0].query().contains("dateTo=2024-01-31"));
    assert_eq!(requests[0].header("authorization"), Some("Bearer test-token"));
}

#[tokio::test]
async fn test_upstream_error_status_is_enveloped_and_forwarded() {
    let upstream =
        start_mock_upstream(|_req| async move { (503, "text/plain", "down".to_string()) }).await;
    let addr = start_gateway(gateway_config(upstream)).await;

    let res = client()
        .get(format!(
            "http://{}/api/v1/supplier/orders?dateFrom=2024-01-01&dateTo=2024-01-31",
            addr
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 503);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Upstream unavailable: 503");
    assert_eq!(body["details"], "could not retrieve orders data");
}

#[tokio::test]
async fn test_undated_endpoint_passes_through_without_query() {
    let seen = Arc::new(Mutex::new(Vec::<MockRequest>::new()));
    let sc = seen.clone();
    let upstream = start_mock_upstream(move |req| {
        sc.lock().unwrap().push(req);
        async move { (200, "application/json", r#"{"categories":[]}"#.to_string()) }
    })
    .await;
    let addr = start_gateway(gateway_config(upstream)).await;

    let res = client()
        .get(format!("http://{}/api/lite/products/wb_categories", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let requests = seen.lock().unwrap();
    assert_eq!(requests[0].target, "/api/lite/products/wb_categories");
}

#[tokio::test]
async fn test_sales_funnel_merges_orders_and_sales() {
    let upstream = start_mock_upstream(|req: MockRequest| async move {
        let body = match req.path() {
            "/api/v1/supplier/orders" => json!([{
                "nmId": 1,
                "date": "2024-01-01T10:00:00Z",
                "totalPrice": 100,
                "supplierArticle": "A1",
                "brand": "B",
                "subject": "S"
            }]),
            "/api/v1/supplier/sales" => json!([{
                "nmId": 1,
                "date": "2024-01-01T12:00:00Z",
                "finishedPrice": 90
            }]),
            _ => json!([]),
        };
        (200, "application/json", body.to_string())
    })
    .await;
    let addr = start_gateway(gateway_config(upstream)).await;

    let res = client()
        .get(format!(
            "http://{}/api/v1/sales-funnel?dateFrom=2024-01-01&dateTo=2024-01-01",
            addr
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["source"], "orders_and_sales_by_product");

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    let metric = &data[0];
    assert_eq!(metric["date"], "2024-01-01");
    assert_eq!(metric["nmId"], 1);
    assert_eq!(metric["supplierArticle"], "A1");
    assert_eq!(metric["brand"], "B");
    assert_eq!(metric["subject"], "S");
    assert_eq!(metric["orders"], 1);
    assert_eq!(metric["sales"], 1);
    assert_eq!(metric["orders_amount"], 100.0);
    assert_eq!(metric["sales_amount"], 90.0);
    assert_eq!(metric["conversion_rate"], 100.0);

    let summary = &body["summary"];
    assert_eq!(summary["total_products"], 1);
    assert_eq!(summary["total_orders"], 1);
    assert_eq!(summary["total_sales"], 1);
    assert_eq!(summary["total_orders_amount"], 100.0);
    assert_eq!(summary["total_sales_amount"], 90.0);
}

#[tokio::test]
async fn test_sales_funnel_tolerates_one_failed_fetch() {
    // Orders succeed with zero records; sales are down. Still a 200.
    let upstream = start_mock_upstream(|req: MockRequest| async move {
        match req.path() {
            "/api/v1/supplier/orders" => (200, "application/json", "[]".to_string()),
            _ => (503, "text/plain", "down".to_string()),
        }
    })
    .await;
    let addr = start_gateway(gateway_config(upstream)).await;

    let res = client()
        .get(format!(
            "http://{}/api/v1/sales-funnel?dateFrom=2024-01-01&dateTo=2024-01-31",
            addr
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    assert_eq!(body["summary"]["total_products"], 0);
    assert_eq!(body["summary"]["total_orders"], 0);
    assert_eq!(body["summary"]["total_sales"], 0);
    assert_eq!(body["summary"]["total_orders_amount"], 0.0);
    assert_eq!(body["summary"]["total_sales_amount"], 0.0);
}

#[tokio::test]
async fn test_sales_funnel_reports_combined_failure() {
    let upstream =
        start_mock_upstream(|_req| async move { (503, "text/plain", "down".to_string()) }).await;
    let addr = start_gateway(gateway_config(upstream)).await;

    let res = client()
        .get(format!(
            "http://{}/api/v1/sales-funnel?dateFrom=2024-01-01&dateTo=2024-01-31",
            addr
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Could not retrieve product data");
    let details = body["details"].as_str().unwrap();
    assert!(details.contains("orders: 503"), "details: {}", details);
    assert!(details.contains("sales: 503"), "details: {}", details);
}

#[tokio::test]
async fn test_generic_passthrough_preserves_status_and_body() {
    let upstream = start_mock_upstream(|_req| async move {
        (418, "text/plain", "short and stout".to_string())
    })
    .await;
    let addr = start_gateway(gateway_config(upstream)).await;

    let res = client()
        .get(format!("http://{}/content/v2/get/cards/list", addr))
        .send()
        .await
        .unwrap();

    // The generic passthrough keeps the upstream's original status.
    assert_eq!(res.status(), 418);
    assert_eq!(res.headers()["content-type"], "text/plain");
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert_eq!(res.text().await.unwrap(), "short and stout");
}

#[tokio::test]
async fn test_generic_passthrough_forwards_method_body_and_content_type() {
    let seen = Arc::new(Mutex::new(Vec::<MockRequest>::new()));
    let sc = seen.clone();
    let upstream = start_mock_upstream(move |req: MockRequest| {
        sc.lock().unwrap().push(req.clone());
        async move { (200, "application/json", req.body) }
    })
    .await;
    let addr = start_gateway(gateway_config(upstream)).await;

    let res = client()
        .post(format!("http://{}/content/v2/cards/update?x=1", addr))
        .header("content-type", "application/json")
        .body(r#"{"vendorCode":"A1"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), r#"{"vendorCode":"A1"}"#);

    let requests = seen.lock().unwrap();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].target, "/content/v2/cards/update?x=1");
    assert_eq!(requests[0].header("content-type"), Some("application/json"));
    assert_eq!(requests[0].body, r#"{"vendorCode":"A1"}"#);
    assert_eq!(requests[0].header("authorization"), Some("Bearer test-token"));
}

#[tokio::test]
async fn test_raw_token_and_custom_auth_header() {
    let seen = Arc::new(Mutex::new(Vec::<MockRequest>::new()));
    let sc = seen.clone();
    let upstream = start_mock_upstream(move |req| {
        sc.lock().unwrap().push(req);
        async move { (200, "application/json", "[]".to_string()) }
    })
    .await;

    let mut config = gateway_config(upstream);
    config.upstream.bearer = false;
    config.upstream.auth_header = "X-Api-Key".to_string();
    let addr = start_gateway(config).await;

    let res = client()
        .get(format!("http://{}/api/v3/supplies", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let requests = seen.lock().unwrap();
    assert_eq!(requests[0].header("x-api-key"), Some("test-token"));
    assert_eq!(requests[0].header("authorization"), None);
}

#[tokio::test]
async fn test_transport_failure_is_connection_error() {
    // Point the gateway at a port nothing listens on.
    let unused = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = unused.local_addr().unwrap();
    drop(unused);

    let addr = start_gateway(gateway_config(dead_addr)).await;

    let res = client()
        .get(format!(
            "http://{}/api/v1/supplier/orders?dateFrom=2024-01-01&dateTo=2024-01-31",
            addr
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Connection error");
    assert!(body["details"].as_str().unwrap().len() > 0);
}

#[tokio::test]
async fn test_non_json_success_body_is_connection_error() {
    let upstream = start_mock_upstream(|_req| async move {
        (200, "text/html", "<html>not json</html>".to_string())
    })
    .await;
    let addr = start_gateway(gateway_config(upstream)).await;

    let res = client()
        .get(format!("http://{}/api/v1/supplier/returns", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Connection error");
}
