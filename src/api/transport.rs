use crate::api::client::Transport;
use crate::api::errors::ApiError;
use crate::api::types::{ApiRequest, ApiResponse};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder, Method};
use std::collections::BTreeMap;
use std::time::Duration;

const USER_AGENT: &str = "CredoBot/0.1 (+https://credo.example.com)";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .default_headers({
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert(
                reqwest::header::ACCEPT,
                "application/json".parse().unwrap(),
            );
            headers
        })
        .build()
        .expect("Failed to build HTTP client")
});

/// Real network transport over a shared connection-pooled client. The
/// resilience layers (retries, circuit breaking, timeouts) live above this;
/// it only turns an [`ApiRequest`] into JSON over the wire.
pub struct HttpTransport;

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = url::Url::parse(&request.url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", request.url)))?;
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| ApiError::InvalidUrl(format!("bad method: {}", request.method)))?;

        let mut builder = HTTP_CLIENT.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(ApiError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                retriable: status.is_server_error() || status.as_u16() == 429,
            });
        }

        let mut headers = BTreeMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.to_string(), v.to_string());
            }
        }

        let data = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        Ok(ApiResponse {
            status: status.as_u16(),
            headers,
            data,
            cached: false,
        })
    }
}
