//! Shared HTTP request helper
//!
//! Every plugin owns an [`ApiClient`] bound to one API family. The client
//! joins base URL and path, attaches the fixed JSON headers plus any auth
//! headers, sends through a [`Transport`], and turns anything outside 2xx
//! into a [`PluginError`] with the plugin name and operation label.

use crate::auth::AuthStrategy;
use crate::config::{AgentConfiguration, ApiKind};
use crate::error::PluginError;
use crate::telemetry::Telemetry;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

pub const USER_AGENT_VALUE: &str = "BICS-Semantic-Kernel-Agent/1.0.0";
const JSON: &str = "application/json";

/// An outgoing request, fully resolved
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// Status and full body of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Why a request never produced a response
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection, TLS, timeout or body read failure
    #[error("IO error: {0}")]
    Io(#[source] reqwest::Error),
    /// The request itself could not be built
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            TransportError::Other(err.to_string())
        } else {
            TransportError::Io(err)
        }
    }
}

/// Moves requests over the wire
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Production transport backed by a shared `reqwest::Client`
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(ApiResponse { status, body })
    }
}

/// Join base URL and path with exactly one `/`, then append a non-empty query
pub fn build_url(base_url: &str, path: &str, query: Option<&str>) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    let mut url = format!("{}/{}", base, path);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

/// Join present, non-empty `key=value` pairs with `&`. Values are not encoded.
pub fn build_query(params: &[(&str, Option<&str>)]) -> String {
    params
        .iter()
        .filter_map(|(key, value)| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| format!("{}={}", key, v))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Things every plugin needs to build its client
#[derive(Clone)]
pub struct PluginContext {
    pub config: Arc<AgentConfiguration>,
    pub transport: Arc<dyn Transport>,
    pub telemetry: Arc<Telemetry>,
}

impl PluginContext {
    pub fn new(
        config: Arc<AgentConfiguration>,
        transport: Arc<dyn Transport>,
        telemetry: Arc<Telemetry>,
    ) -> Self {
        Self {
            config,
            transport,
            telemetry,
        }
    }
}

/// Request helper bound to one API family
#[derive(Clone)]
pub struct ApiClient {
    kind: ApiKind,
    config: Arc<AgentConfiguration>,
    transport: Arc<dyn Transport>,
    auth: Arc<dyn AuthStrategy>,
    telemetry: Arc<Telemetry>,
}

impl ApiClient {
    /// Resolves the auth strategy; fails if it is misconfigured
    pub fn new(kind: ApiKind, ctx: &PluginContext) -> Result<Self, PluginError> {
        let auth = ctx
            .config
            .auth_strategy(kind)
            .map_err(|e| PluginError::unexpected(kind.plugin_name(), "initialize", e))?;

        debug!(
            plugin = kind.plugin_name(),
            auth = auth.scheme(),
            "API client created"
        );

        Ok(Self {
            kind,
            config: ctx.config.clone(),
            transport: ctx.transport.clone(),
            auth,
            telemetry: ctx.telemetry.clone(),
        })
    }

    pub fn kind(&self) -> ApiKind {
        self.kind
    }

    pub fn plugin_name(&self) -> &'static str {
        self.kind.plugin_name()
    }

    /// Resolved from configuration on every call
    pub fn base_url(&self) -> &str {
        self.config.base_url(self.kind)
    }

    pub async fn get(&self, path: &str, query: Option<&str>) -> Result<String, PluginError> {
        self.execute(Method::GET, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: Option<&str>) -> Result<String, PluginError> {
        self.execute(Method::POST, path, None, body).await
    }

    pub async fn put(&self, path: &str, body: Option<&str>) -> Result<String, PluginError> {
        self.execute(Method::PUT, path, None, body).await
    }

    pub async fn delete(&self, path: &str) -> Result<String, PluginError> {
        self.execute(Method::DELETE, path, None, None).await
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        self.auth.apply(&mut headers);
        headers
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        body: Option<&str>,
    ) -> Result<String, PluginError> {
        let plugin = self.plugin_name();
        let operation = format!("{} {}", method, path);
        let url = build_url(self.base_url(), path, query);

        debug!("Performing {} request to: {}", method, url);

        let request = ApiRequest {
            method: method.clone(),
            url,
            headers: self.headers(),
            body: body.map(String::from),
        };

        let started = Instant::now();
        let result = self.transport.send(request).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let outcome = match result {
            Ok(response) if response.is_success() => {
                debug!("{} request successful. Status: {}", method, response.status);
                Ok(response.body)
            }
            Ok(response) => Err(PluginError::Status {
                plugin: plugin.to_string(),
                operation: operation.clone(),
                status: response.status,
                body: response.body,
            }),
            Err(TransportError::Io(source)) => Err(PluginError::Io {
                plugin: plugin.to_string(),
                operation: operation.clone(),
                source,
            }),
            Err(TransportError::Other(detail)) => {
                Err(PluginError::unexpected(plugin, operation.clone(), detail))
            }
        };

        self.telemetry
            .record_call(plugin, &operation, duration_ms, outcome.is_ok());

        outcome
    }
}
