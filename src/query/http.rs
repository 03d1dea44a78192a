//! SPARQL protocol client over blocking HTTP
//!
//! Queries are POSTed form-encoded. SELECT results are requested as SPARQL
//! JSON, CONSTRUCT results as N-Triples.

use super::results::parse_select_json;
use super::{Bindings, QueryClient, QueryError, QueryResult};
use crate::rdf::{ntriples, Graph};
use crate::util::{one_line, truncate_str};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, trace};

const SELECT_ACCEPT: &str = "application/sparql-results+json";
const CONSTRUCT_ACCEPT: &str = "application/n-triples, text/plain;q=0.9";

/// Connection settings for the HTTP client
#[derive(Clone)]
pub struct HttpQueryConfig {
    /// SPARQL endpoint URL
    pub endpoint: String,
    /// Basic auth user (optional)
    pub username: Option<String>,
    /// Basic auth password (optional)
    pub password: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Pause before every request
    pub request_delay: Duration,
}

impl fmt::Debug for HttpQueryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpQueryConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("has_password", &self.password.is_some())
            .field("timeout", &self.timeout)
            .field("request_delay", &self.request_delay)
            .finish()
    }
}

impl Default for HttpQueryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8890/sparql".to_string(),
            username: None,
            password: None,
            timeout: Duration::from_secs(30),
            request_delay: Duration::ZERO,
        }
    }
}

/// Blocking SPARQL-over-HTTP client
#[derive(Debug)]
pub struct HttpQueryClient {
    client: Client,
    config: HttpQueryConfig,
}

impl HttpQueryClient {
    /// Create a new client
    pub fn new(config: HttpQueryConfig) -> QueryResult<Self> {
        info!(
            "Initializing SPARQL client: endpoint={}, authenticated={}",
            config.endpoint,
            config.username.is_some()
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("catalog-dump/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    fn post(&self, query: &str, accept: &str) -> QueryResult<String> {
        if !self.config.request_delay.is_zero() {
            std::thread::sleep(self.config.request_delay);
        }
        trace!("POST {}: {}", self.config.endpoint, truncate_str(&one_line(query), 500));

        let mut request = self
            .client
            .post(&self.config.endpoint)
            .header(ACCEPT, accept)
            .form(&[("query", query)]);
        if let Some(user) = &self.config.username {
            request = request.basic_auth(user, self.config.password.as_ref());
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(QueryError::Status {
                status: status.as_u16(),
                body: truncate_str(&one_line(&body), 300),
            });
        }

        let body = response.text()?;
        debug!("{} bytes from {}", body.len(), self.config.endpoint);
        Ok(body)
    }

    pub fn config(&self) -> &HttpQueryConfig {
        &self.config
    }
}

impl QueryClient for HttpQueryClient {
    fn select(&self, query: &str) -> QueryResult<Vec<Bindings>> {
        let body = self.post(query, SELECT_ACCEPT)?;
        parse_select_json(&body)
    }

    fn construct(&self, query: &str) -> QueryResult<Graph> {
        let body = self.post(query, CONSTRUCT_ACCEPT)?;
        Ok(ntriples::parse(&body)?)
    }

    fn name(&self) -> &str {
        "http"
    }
}
