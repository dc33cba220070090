//! HTTP client for the `query_range` proxy endpoint.
//!
//! Queries go to `{endpoint}/api/{backend}/query_range`, where the backend is
//! either the Prometheus or the Grafana proxy.
//!
//! ## Example
//!
//! ```rust,no_run
//! use panelwatch_query::{QueryBackend, QueryClient, QueryRangeRequest, RangeQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = QueryClient::builder()
//!         .endpoint("http://localhost:9081")
//!         .backend(QueryBackend::Prometheus)
//!         .build()?;
//!
//!     let request = QueryRangeRequest {
//!         datasource: "prometheus".to_string(),
//!         query: "up".to_string(),
//!         start: 1_700_000_000,
//!         end: 1_700_003_600,
//!         step: 20,
//!     };
//!     let response = client.query_range(&request).await?;
//!     println!("{} results", response.into_results()?.len());
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::request::{QueryRangeRequest, RangeQuery};
use crate::response::QueryRangeResponse;
use crate::QueryError;

/// Which configured backend the proxy forwards queries to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryBackend {
    /// `/api/prometheus/query_range`
    #[default]
    Prometheus,
    /// `/api/grafana/query_range`
    Grafana,
}

impl QueryBackend {
    /// Path segment for this backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryBackend::Prometheus => "prometheus",
            QueryBackend::Grafana => "grafana",
        }
    }
}

impl fmt::Display for QueryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prometheus" => Ok(QueryBackend::Prometheus),
            "grafana" => Ok(QueryBackend::Grafana),
            other => Err(format!("Unknown backend: {}", other)),
        }
    }
}

/// HTTP range query client.
#[derive(Debug, Clone)]
pub struct QueryClient {
    client: Client,
    endpoint: String,
    backend: QueryBackend,
}

impl QueryClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> QueryClientBuilder {
        QueryClientBuilder::default()
    }

    /// Full URL of the query endpoint.
    pub fn url(&self) -> String {
        format!("{}/api/{}/query_range", self.endpoint, self.backend)
    }

    /// The backend queries are routed to.
    pub fn backend(&self) -> QueryBackend {
        self.backend
    }
}

#[async_trait]
impl RangeQuery for QueryClient {
    async fn query_range(
        &self,
        request: &QueryRangeRequest,
    ) -> Result<QueryRangeResponse, QueryError> {
        let url = self.url();
        debug!(
            "GET {} query={} start={} end={} step={}",
            url, request.query, request.start, request.end, request.step
        );

        let response = self
            .client
            .get(&url)
            .query(&request.query_pairs())
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(QueryError::Auth(format!("API returned status {}", status)));
        }

        if !status.is_success() {
            // Prometheus reports bad queries as 400/422 with an error body
            let body = response.text().await.unwrap_or_default();
            if let Ok(parsed) = serde_json::from_str::<QueryRangeResponse>(&body) {
                if let Some(message) = parsed.error {
                    warn!("Query rejected by backend: {}", message);
                    return Err(QueryError::Api(message));
                }
            }
            return Err(QueryError::Http(format!("API returned status {}", status)));
        }

        response
            .json::<QueryRangeResponse>()
            .await
            .map_err(|e| QueryError::Parse(e.to_string()))
    }

    fn description(&self) -> String {
        format!("{} via {}", self.backend, self.endpoint)
    }
}

/// Builder for QueryClient.
#[derive(Debug, Default)]
pub struct QueryClientBuilder {
    endpoint: Option<String>,
    backend: Option<QueryBackend>,
    timeout: Option<Duration>,
}

impl QueryClientBuilder {
    /// Set the proxy endpoint (e.g., "http://localhost:9081").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the backend (default: Prometheus).
    pub fn backend(mut self, backend: QueryBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<QueryClient, QueryError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QueryError::Http(e.to_string()))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://localhost:9081".to_string());

        Ok(QueryClient {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            backend: self.backend.unwrap_or_default(),
        })
    }
}
