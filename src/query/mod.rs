//! Read-only access to the remote triple store
//!
//! - `QueryClient`: the capability the dump pipeline consumes
//! - `HttpQueryClient`: SPARQL 1.1 protocol over blocking HTTP
//! - `RetryingClient`: bounded retry decorator for any client
//! - `QueryTemplates`: the query shapes, for named-graph or flat stores

pub mod http;
pub mod results;
pub mod retry;
pub mod templates;

pub use http::{HttpQueryClient, HttpQueryConfig};
pub use retry::{RetryPolicy, RetryingClient};
pub use templates::{QueryDialect, QueryTemplates};

use crate::rdf::ntriples::NTriplesError;
use crate::rdf::{Graph, Term};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// One solution of a SELECT query, keyed by variable name
pub type Bindings = HashMap<String, Term>;

/// Errors raised while talking to the triple store
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Network or HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be understood
    #[error("malformed response: {0}")]
    Malformed(String),

    /// CONSTRUCT response was not valid N-Triples
    #[error(transparent)]
    Syntax(#[from] NTriplesError),

    /// Every attempt of a retried call failed
    #[error("backend unavailable after {attempts} attempts: {last}")]
    Unavailable {
        attempts: u32,
        #[source]
        last: Box<QueryError>,
    },
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Read-only query capability against a triple store
///
/// Object-safe so the pipeline can hold an `Arc<dyn QueryClient>`.
pub trait QueryClient: Send + Sync + Debug {
    /// Run a SELECT query
    fn select(&self, query: &str) -> QueryResult<Vec<Bindings>>;

    /// Run a CONSTRUCT query
    fn construct(&self, query: &str) -> QueryResult<Graph>;

    /// Run a SELECT whose first solution binds `var` to an integer.
    ///
    /// An empty result is `Ok(None)`: absence of results is not an error.
    fn count(&self, query: &str, var: &str) -> QueryResult<Option<u64>> {
        let rows = self.select(query)?;
        let Some(term) = rows.first().and_then(|row| row.get(var)) else {
            return Ok(None);
        };
        let value = term
            .literal_value()
            .ok_or_else(|| QueryError::Malformed(format!("?{} is not a literal: {}", var, term)))?;
        value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| QueryError::Malformed(format!("?{} = {:?}: {}", var, value, e)))
    }

    /// Short client name for logs
    fn name(&self) -> &str;
}

impl<T: QueryClient + ?Sized> QueryClient for Arc<T> {
    fn select(&self, query: &str) -> QueryResult<Vec<Bindings>> {
        (**self).select(query)
    }

    fn construct(&self, query: &str) -> QueryResult<Graph> {
        (**self).construct(query)
    }

    fn count(&self, query: &str, var: &str) -> QueryResult<Option<u64>> {
        (**self).count(query, var)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
