//! Data sources
//!
//! Read-only lookups against the platform. The only data source today
//! lists the caches visible to the configured credentials.

use std::sync::Arc;

use reef_core::provider::{ProviderError, ProviderResult};
use tracing::debug;

use crate::api::CacheApi;

/// One cache in the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheListEntry {
    pub name: String,
}

/// Result model of the caches data source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachesModel {
    /// Synthetic identifier; the listing itself has no natural id
    pub id: String,
    pub caches: Vec<CacheListEntry>,
}

/// Lists every cache the credentials can see
pub struct CachesDataSource {
    api: Arc<dyn CacheApi>,
}

impl CachesDataSource {
    pub fn new(api: Arc<dyn CacheApi>) -> Self {
        Self { api }
    }

    pub async fn read(&self) -> ProviderResult<CachesModel> {
        let names = self
            .api
            .list_caches()
            .await
            .map_err(|e| ProviderError::new(format!("unable to list caches: {}", e)).with_cause(e))?;

        debug!(count = names.len(), "listed caches");
        Ok(CachesModel {
            id: "placeholder".to_string(),
            caches: names
                .into_iter()
                .map(|name| CacheListEntry { name })
                .collect(),
        })
    }
}
