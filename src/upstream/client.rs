//! Outbound request construction and credential injection.
//!
//! # Responsibilities
//! - Build target address = configured base + path + query
//! - Inject the configured authorization header ("Bearer <token>" or raw)
//! - Forward method, body and content-type; omit bodies on GET/HEAD
//! - Return the raw upstream status, headers and body
//!
//! # Design Decisions
//! - The gateway never interprets passthrough bodies; only the typed
//!   `fetch_records` path decodes JSON
//! - Transport failures surface as errors; non-2xx statuses do not — the
//!   response envelope layer decides what a bad status means per endpoint

use axum::body::Bytes;
use axum::http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::UpstreamConfig;
use crate::upstream::error::{FetchError, UpstreamError};

/// Raw result of one upstream call.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamResponse {
    /// `2xx` success flag.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// HTTP client for the upstream marketplace API.
pub struct UpstreamClient {
    http: reqwest::Client,
    base: Url,
    auth_header: HeaderName,
    auth_value: HeaderValue,
}

impl UpstreamClient {
    /// Create a client from validated upstream configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let base = Url::parse(&config.base_url)?;
        let (auth_header, auth_value) = build_auth(config)?;

        Ok(Self {
            http: reqwest::Client::new(),
            base,
            auth_header,
            auth_value,
        })
    }

    /// Build the full target URL for a path and optional raw query string.
    fn target(&self, path: &str, query: Option<&str>) -> Result<Url, UpstreamError> {
        let mut url = self.base.join(path)?;
        url.set_query(query);
        Ok(url)
    }

    /// Forward a request to the upstream and return its raw response.
    ///
    /// No retries, no explicit timeout; the inbound request deadline is the
    /// only clock running.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        body: Option<Bytes>,
        content_type: Option<HeaderValue>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let url = self.target(path, query)?;

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(self.auth_header.clone(), self.auth_value.clone());

        if let Some(ct) = content_type {
            request = request.header(CONTENT_TYPE, ct);
        }

        // GET and HEAD never carry a body upstream.
        if method != Method::GET && method != Method::HEAD {
            if let Some(bytes) = body {
                request = request.body(bytes);
            }
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }

    /// Fetch a date-ranged JSON record list (funnel inputs).
    pub async fn fetch_records<T: DeserializeOwned>(
        &self,
        path: &str,
        date_from: &str,
        date_to: &str,
    ) -> Result<Vec<T>, FetchError> {
        let query = date_range_query(date_from, date_to);
        let response = self
            .forward(Method::GET, path, Some(&query), None, None)
            .await?;

        if !response.is_success() {
            return Err(FetchError::Status(response.status));
        }

        serde_json::from_slice(&response.body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// Encode the `dateFrom`/`dateTo` pair as a query string.
pub fn date_range_query(date_from: &str, date_to: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("dateFrom", date_from)
        .append_pair("dateTo", date_to)
        .finish()
}

fn build_auth(config: &UpstreamConfig) -> Result<(HeaderName, HeaderValue), UpstreamError> {
    let name: HeaderName = config
        .auth_header
        .parse()
        .map_err(|_| UpstreamError::Config(format!("bad header name: {}", config.auth_header)))?;

    let raw = if config.bearer {
        format!("Bearer {}", config.token)
    } else {
        config.token.clone()
    };
    let mut value = HeaderValue::from_str(&raw)
        .map_err(|_| UpstreamError::Config("token contains invalid header bytes".to_string()))?;
    value.set_sensitive(true);

    Ok((name, value))
}
