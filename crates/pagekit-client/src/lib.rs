//! Generic JSON request helper
//!
//! The page's `apiCall` wrapper: issue a request with a default JSON
//! content type, fail on non-success statuses, parse the body into a
//! typed value. Every failure is logged and returned; retries, backoff
//! and timeouts are the caller's concern.

pub mod error;

use pagekit_config::NetworkConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use error::{ApiError, ApiResult};
pub use reqwest::Method;

/// Options for a single request
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// HTTP method
    pub method: Method,
    /// Extra headers; applied after the default content type, so a
    /// caller-supplied `Content-Type` overrides it
    pub headers: Vec<(String, String)>,
    /// Raw request body
    pub body: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
        }
    }
}

/// JSON API client
pub struct ApiClient {
    http: reqwest::Client,
    config: NetworkConfig,
}

impl ApiClient {
    /// Create a client with the given network settings
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Issue a request and parse the JSON response body
    ///
    /// Non-success statuses become [`ApiError::Status`] carrying the
    /// numeric code. Network and parse failures are surfaced likewise;
    /// all three are logged before returning.
    pub async fn call<T: DeserializeOwned>(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        let url = self.resolve(url);

        // Inserts replace by name, so a caller Content-Type displaces the
        // default instead of being sent alongside it.
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            parse_header_value("Content-Type", &self.config.default_content_type)?,
        );
        for (name, value) in &options.headers {
            let parsed_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| ApiError::InvalidHeader {
                    name: name.clone(),
                    message: e.to_string(),
                })?;
            headers.insert(parsed_name, parse_header_value(name, value)?);
        }

        let mut request = self.http.request(options.method, &url).headers(headers);
        if let Some(body) = options.body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            log::error!(target: "pagekit::client", "API call failed: {} - {}", url, e);
            ApiError::Network {
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error = ApiError::Status {
                status: status.as_u16(),
            };
            log::error!(target: "pagekit::client", "API call failed: {} - {}", url, error);
            return Err(error);
        }

        response.json::<T>().await.map_err(|e| {
            log::error!(target: "pagekit::client", "API call failed: {} - {}", url, e);
            ApiError::Parse {
                message: e.to_string(),
            }
        })
    }

    /// GET a URL and parse the JSON response body
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        self.call(url, RequestOptions::default()).await
    }

    /// POST a JSON payload and parse the JSON response body
    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        payload: &B,
    ) -> ApiResult<T> {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::Parse {
            message: e.to_string(),
        })?;
        self.call(
            url,
            RequestOptions {
                method: Method::POST,
                headers: Vec::new(),
                body: Some(body),
            },
        )
        .await
    }

    /// Resolve a request path against the configured base URL
    fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        match &self.config.base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), url.trim_start_matches('/')),
            None => url.to_string(),
        }
    }
}

fn parse_header_value(name: &str, value: &str) -> ApiResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| ApiError::InvalidHeader {
        name: name.to_string(),
        message: e.to_string(),
    })
}

// ==================== Tests ====================
