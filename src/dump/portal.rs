//! Portal resolution strategies
//!
//! Each source family identifies the owning portal of a dataset differently:
//! - `StorePortalResolver`: asks the store which catalog aggregates the dataset
//! - `UriPortalResolver`: derives the portal from the dataset URI's host
//! - `FixedPortalResolver`: a single-portal store

use super::DatasetId;
use crate::config::PortalConfig;
use crate::query::templates::PORTAL_VAR;
use crate::query::{QueryClient, QueryError, QueryTemplates};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::info;
use url::Url;

/// Name used when a dataset URI has no recognizable host
pub const UNKNOWN_PORTAL: &str = "unknown";

/// A source portal
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Portal {
    /// Catalog resource emitted in the output
    pub iri: String,
    /// Short name used in disambiguated titles and ledger keys
    pub name: String,
}

impl Portal {
    pub fn new(iri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            iri: iri.into(),
            name: name.into(),
        }
    }

    /// Portal whose short name is the last path segment of its IRI
    pub fn from_iri(iri: impl Into<String>) -> Self {
        let iri = iri.into();
        let name = iri
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Self { iri, name }
    }
}

/// Why a portal could not be resolved
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// No single owning portal; the dataset is skipped
    #[error("{0}")]
    NotResolved(String),

    /// The store could not be queried
    #[error(transparent)]
    Backend(#[from] QueryError),
}

/// Maps a dataset to its owning portal
pub trait PortalResolver: Send + Sync + Debug {
    fn resolve(&self, dataset: &DatasetId) -> Result<Portal, PortalError>;

    /// Strategy name for logs
    fn name(&self) -> &str;
}

/// Looks up `?portal dcat:dataset <dataset>` in the store
#[derive(Debug)]
pub struct StorePortalResolver {
    client: Arc<dyn QueryClient>,
    templates: QueryTemplates,
}

impl StorePortalResolver {
    pub fn new(client: Arc<dyn QueryClient>, templates: QueryTemplates) -> Self {
        Self { client, templates }
    }
}

impl PortalResolver for StorePortalResolver {
    fn resolve(&self, dataset: &DatasetId) -> Result<Portal, PortalError> {
        let rows = self.client.select(&self.templates.select_portal(dataset))?;
        let portals: Vec<&str> = rows
            .iter()
            .filter_map(|row| row.get(PORTAL_VAR).and_then(|t| t.as_iri()))
            .collect();

        match portals.as_slice() {
            [portal] => Ok(Portal::from_iri(*portal)),
            [] => Err(PortalError::NotResolved("no catalog links to it".to_string())),
            many => Err(PortalError::NotResolved(format!(
                "{} catalogs link to it: {}",
                many.len(),
                many.join(", ")
            ))),
        }
    }

    fn name(&self) -> &str {
        "store"
    }
}

/// Portal name is the first label of the dataset URI's host
#[derive(Debug, Clone)]
pub struct UriPortalResolver {
    namespace: String,
}

impl UriPortalResolver {
    /// `namespace` is prefixed to the portal name to form the catalog IRI
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    fn portal_name(dataset: &str) -> String {
        Url::parse(dataset)
            .ok()
            .and_then(|url| {
                url.host_str()
                    .and_then(|host| host.split_once('.'))
                    .map(|(first, _)| first.to_string())
            })
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_PORTAL.to_string())
    }
}

impl PortalResolver for UriPortalResolver {
    fn resolve(&self, dataset: &DatasetId) -> Result<Portal, PortalError> {
        let name = Self::portal_name(dataset);
        Ok(Portal::new(format!("{}{}", self.namespace, name), name))
    }

    fn name(&self) -> &str {
        "uri"
    }
}

/// Every dataset belongs to one configured portal
#[derive(Debug, Clone)]
pub struct FixedPortalResolver {
    portal: Portal,
}

impl FixedPortalResolver {
    pub fn new(portal: Portal) -> Self {
        Self { portal }
    }
}

impl PortalResolver for FixedPortalResolver {
    fn resolve(&self, _dataset: &DatasetId) -> Result<Portal, PortalError> {
        Ok(self.portal.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Create the configured resolver
pub fn create_resolver(
    config: &PortalConfig,
    client: Arc<dyn QueryClient>,
    templates: QueryTemplates,
) -> Arc<dyn PortalResolver> {
    match config {
        PortalConfig::Store => {
            info!("Resolving portals from the store");
            Arc::new(StorePortalResolver::new(client, templates))
        }
        PortalConfig::Uri { namespace } => {
            info!("Resolving portals from dataset URIs (namespace {})", namespace);
            Arc::new(UriPortalResolver::new(namespace.clone()))
        }
        PortalConfig::Fixed { iri, name } => {
            info!("Using fixed portal {} ({})", name, iri);
            Arc::new(FixedPortalResolver::new(Portal::new(iri.clone(), name.clone())))
        }
    }
}
