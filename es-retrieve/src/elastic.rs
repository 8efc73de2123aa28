//! Elasticsearch backend over the HTTP `_search` API.
//!
//! [`ElasticClient`] wraps a configured [`reqwest::Client`] and implements
//! [`SearchBackend`]. Connection parameters are opaque to the rest of the
//! crate; they only reach this module.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::backend::{BackendIdentity, SearchBackend, SearchRequest};
use crate::error::RetrieveError;
use crate::types::Hit;

/// Default backend endpoint.
pub const DEFAULT_URL: &str = "http://localhost:9200";

/// Longest backend error body quoted in an error message.
const MAX_ERROR_BODY: usize = 512;

fn default_url() -> String {
    DEFAULT_URL.to_owned()
}

fn default_timeout_seconds() -> u64 {
    30
}

/// How to reach and authenticate against the backend.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Base URL of the cluster.
    #[serde(default = "default_url")]
    pub url: String,
    /// Basic-auth user name.
    #[serde(default)]
    pub username: Option<String>,
    /// Basic-auth password.
    #[serde(default)]
    pub password: Option<String>,
    /// API key sent as `Authorization: ApiKey <key>`. Takes precedence over basic auth.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: None,
            password: None,
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl ConnectionParams {
    /// Connect to `url` without authentication.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Authenticate with HTTP basic auth.
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Authenticate with an API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

// Credentials stay out of logs.
impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: Option<String>,
    #[serde(rename = "_score")]
    score: Option<f64>,
    #[serde(rename = "_source", default)]
    source: serde_json::Value,
}

impl RawHit {
    fn into_hit(self) -> Result<Hit, RetrieveError> {
        let id = self
            .id
            .ok_or_else(|| RetrieveError::Backend("hit without _id in search response".into()))?;
        let score = self
            .score
            .ok_or_else(|| RetrieveError::Backend(format!("hit '{id}' has no _score")))?;
        Ok(Hit {
            id,
            score,
            source: self.source,
        })
    }
}

/// Parse an Elasticsearch `_search` response body into hits, in order.
///
/// # Errors
///
/// Returns [`RetrieveError::Backend`] if the body is not a search response
/// or a hit lacks an identifier or score.
pub fn parse_search_response(body: &str) -> Result<Vec<Hit>, RetrieveError> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| RetrieveError::Backend(format!("malformed search response: {e}")))?;
    response.hits.hits.into_iter().map(RawHit::into_hit).collect()
}

/// An Elasticsearch cluster reached over HTTP.
#[derive(Debug, Clone)]
pub struct ElasticClient {
    client: reqwest::Client,
    base_url: Url,
    params: ConnectionParams,
}

impl ElasticClient {
    /// Build a client from connection parameters. No request is sent.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieveError::Config`] if the URL is invalid or the timeout
    /// is zero, and [`RetrieveError::Backend`] if the HTTP client cannot be
    /// constructed.
    pub fn new(params: ConnectionParams) -> Result<Self, RetrieveError> {
        if params.timeout_seconds == 0 {
            return Err(RetrieveError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }

        let mut base_url = Url::parse(&params.url)
            .map_err(|e| RetrieveError::Config(format!("invalid backend url '{}': {e}", params.url)))?;
        // Identity is read from the base itself, so keep it in directory form.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(params.timeout_seconds))
            .gzip(true)
            .build()
            .map_err(|e| RetrieveError::Backend(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            params,
        })
    }

    /// The normalised base URL requests are sent to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/{index}/_search`, with the index pushed as a single encoded
    /// path segment so names like `remote:logs` stay relative to the base.
    fn search_url(&self, index: &str) -> Result<Url, RetrieveError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                RetrieveError::Backend(format!("backend url '{}' cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .push(index)
            .push("_search");
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(key) = &self.params.api_key {
            request.header("Authorization", format!("ApiKey {key}"))
        } else if let Some(user) = &self.params.username {
            request.basic_auth(user, self.params.password.as_deref())
        } else {
            request
        }
    }

    async fn read_body(response: reqwest::Response) -> Result<String, RetrieveError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RetrieveError::Backend(format!("failed to read response: {e}")))?;
        if !status.is_success() {
            let excerpt: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(RetrieveError::Backend(format!("HTTP {status}: {excerpt}")));
        }
        Ok(body)
    }
}

impl SearchBackend for ElasticClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Hit>, RetrieveError> {
        let url = self.search_url(&request.index)?;
        tracing::trace!(index = %request.index, query = %request.query, "search request");

        let response = self
            .authorize(self.client.post(url))
            .json(&request.to_body())
            .send()
            .await
            .map_err(|e| RetrieveError::Backend(format!("search request failed: {e}")))?;
        let body = Self::read_body(response).await?;
        parse_search_response(&body)
    }

    async fn identity(&self) -> Result<BackendIdentity, RetrieveError> {
        let response = self
            .authorize(self.client.get(self.base_url.clone()))
            .send()
            .await
            .map_err(|e| RetrieveError::Backend(format!("info request failed: {e}")))?;
        let body = Self::read_body(response).await?;
        let info: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| RetrieveError::Backend(format!("malformed info response: {e}")))?;
        Ok(BackendIdentity {
            endpoint: self.base_url.to_string(),
            info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_target_localhost() {
        let params = ConnectionParams::default();
        assert_eq!(params.url, "http://localhost:9200");
        assert_eq!(params.timeout_seconds, 30);
        assert!(params.api_key.is_none());
    }

    #[test]
    fn debug_redacts_credentials() {
        let params = ConnectionParams::new("http://es:9200")
            .with_basic_auth("elastic", "hunter2")
            .with_api_key("secret-key");
        let debug = format!("{params:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("elastic"));
    }

    #[test]
    fn client_rejects_invalid_url() {
        let err = ElasticClient::new(ConnectionParams::new("not a url")).unwrap_err();
        assert!(matches!(err, RetrieveError::Config(_)));
    }

    #[test]
    fn client_rejects_zero_timeout() {
        let params = ConnectionParams::default().with_timeout_seconds(0);
        let err = ElasticClient::new(params).unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = ElasticClient::new(ConnectionParams::new("http://es:9200/prefix")).expect("client");
        assert_eq!(client.base_url().as_str(), "http://es:9200/prefix/");
        let search = client.search_url("docs").expect("search url");
        assert_eq!(search.as_str(), "http://es:9200/prefix/docs/_search");
    }

    #[test]
    fn index_is_one_path_segment() {
        let client = ElasticClient::new(ConnectionParams::new("http://es:9200/")).expect("client");
        let remote = client.search_url("remote:logs").expect("search url");
        assert_eq!(remote.as_str(), "http://es:9200/remote:logs/_search");
        let rooted = client.search_url("/docs").expect("search url");
        assert_eq!(rooted.as_str(), "http://es:9200/%2Fdocs/_search");
    }

    #[test]
    fn parse_response_keeps_backend_order() {
        let body = r#"{
            "took": 3,
            "hits": {
                "hits": [
                    {"_id": "b", "_score": 2.5, "_source": {"title": "B"}},
                    {"_id": "a", "_score": 3.0, "_source": {"title": "A"}}
                ]
            }
        }"#;
        let hits = parse_search_response(body).expect("parse");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "b");
        assert_eq!(hits[1].source["title"], "A");
    }

    #[test]
    fn parse_response_without_hits_is_empty() {
        let hits = parse_search_response(r#"{"hits": {}}"#).expect("parse");
        assert!(hits.is_empty());
    }

    #[test]
    fn parse_response_rejects_null_score() {
        let body = r#"{"hits": {"hits": [{"_id": "a", "_score": null, "_source": {}}]}}"#;
        let err = parse_search_response(body).unwrap_err();
        assert!(err.to_string().contains("'a' has no _score"));
    }

    #[test]
    fn parse_response_rejects_garbage() {
        let err = parse_search_response("<html>").unwrap_err();
        assert!(matches!(err, RetrieveError::Backend(_)));
    }
}
