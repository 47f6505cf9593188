use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::model::{
    Certificate, CertificateListResponse, CertificateQuery, DomainSearchResponse, HealthStatus,
    RecentActivityResponse, SearchResponse, SearchSources, Statistics,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

pub const DEFAULT_SEARCH_LIMIT: u32 = 50;
pub const DEFAULT_DOMAIN_LIMIT: u32 = 10;
pub const DEFAULT_RECENT_LIMIT: u32 = 10;

type QueryPairs<'a> = &'a [(&'static str, String)];

/// Read-only client for the PhishScope REST API.
///
/// Every call is a single GET with the configured timeout. Nothing is retried;
/// failures go straight back to the caller.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("PhishScope/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .connect_timeout(config.timeout())
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // Health endpoints

    pub async fn health_check(&self) -> Result<HealthStatus> {
        self.get("/health/", &[]).await
    }

    pub async fn database_health(&self) -> Result<HealthStatus> {
        self.get("/health/db/", &[]).await
    }

    // Certificate endpoints

    pub async fn get_certificates(&self, params: &CertificateQuery) -> Result<CertificateListResponse> {
        self.get("/certificates/", &params.to_query_pairs()).await
    }

    pub async fn get_certificate(&self, id: i64) -> Result<Certificate> {
        self.get(&format!("/certificates/{}", id), &[]).await
    }

    pub async fn search_domains(&self, query: &str, limit: u32) -> Result<DomainSearchResponse> {
        self.get(
            "/certificates/search/domains/",
            &[("query", query.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    // Search endpoints

    /// Searches every feed, or only `sources` when it is non-empty.
    pub async fn universal_search(
        &self,
        query: &str,
        sources: &[String],
        limit: u32,
        offset: u32,
    ) -> Result<SearchResponse> {
        self.get("/search/", &search_query_pairs(query, sources, limit, offset))
            .await
    }

    pub async fn get_search_sources(&self) -> Result<SearchSources> {
        self.get("/search/sources/", &[]).await
    }

    // Statistics endpoints

    pub async fn get_statistics(&self) -> Result<Statistics> {
        let value = self.get_value("/stats/", &[]).await?;
        reject_backend_error(&value)?;
        decode("/stats/", value)
    }

    pub async fn get_recent_activity(&self, limit: u32) -> Result<RecentActivityResponse> {
        let value = self
            .get_value("/stats/recent/", &[("limit", limit.to_string())])
            .await?;
        reject_backend_error(&value)?;
        decode("/stats/recent/", value)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: QueryPairs<'_>) -> Result<T> {
        let value = self.get_value(path, query).await?;
        decode(path, value)
    }

    async fn get_value(&self, path: &str, query: QueryPairs<'_>) -> Result<Value> {
        let url = self.config.endpoint(path)?;
        debug!("API request: GET {} {:?}", path, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                error!("Request error for {}: {}", path, e);
                transport_error(path, e)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(path, e))?;

        if !status.is_success() {
            error!("Response error: {} {} {}", status.as_u16(), path, body);
            return Err(ApiError::Status {
                status: status.as_u16(),
                path: path.to_string(),
                body,
            });
        }

        debug!("API response: {} {}", status.as_u16(), path);

        serde_json::from_str(&body).map_err(|source| {
            error!("Undecodable body from {}: {}", path, source);
            ApiError::Decode {
                path: path.to_string(),
                source,
            }
        })
    }
}

/// Query string for `/search/`; `sources` is omitted entirely when empty.
pub fn search_query_pairs(
    query: &str,
    sources: &[String],
    limit: u32,
    offset: u32,
) -> Vec<(&'static str, String)> {
    let mut pairs = vec![("q", query.to_string())];
    if !sources.is_empty() {
        pairs.push(("sources", sources.join(",")));
    }
    pairs.push(("limit", limit.to_string()));
    pairs.push(("offset", offset.to_string()));
    pairs
}

fn transport_error(path: &str, e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout(path.to_string())
    } else {
        ApiError::HttpError(e)
    }
}

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| ApiError::Decode {
        path: path.to_string(),
        source,
    })
}

// Some endpoints answer 200 with {"error": "..."} instead of a payload
fn reject_backend_error(value: &Value) -> Result<()> {
    match value.get("error").and_then(Value::as_str) {
        Some(message) => Err(ApiError::Backend(message.to_string())),
        None => Ok(()),
    }
}
