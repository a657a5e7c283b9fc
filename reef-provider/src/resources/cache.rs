//! Serverless cache resource
//!
//! Caches live behind the vendor SDK boundary. Creation treats an
//! already-existing cache as an error rather than adopting it; reads go
//! through the listing, so a cache is "found" exactly while it is
//! listed.

use std::sync::Arc;

use reef_core::diag::AttributePath;
use reef_core::differ::{self, Diff};
use reef_core::provider::{ProviderError, ProviderResult, ResourceId};
use tracing::debug;

use crate::api::{CacheApi, CreateCacheOutcome, DeleteCacheOutcome};
use crate::resources::api_error;

pub const RESOURCE_TYPE: &str = "cache";

/// Desired cache configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSpec {
    pub name: String,
}

/// Observed cache state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheState {
    /// Computed identifier, equal to the cache name
    pub id: String,
    pub name: String,
}

/// Handle for cache operations
pub struct CacheResource {
    api: Arc<dyn CacheApi>,
}

impl CacheResource {
    pub fn new(api: Arc<dyn CacheApi>) -> Self {
        Self { api }
    }

    fn id(name: &str) -> ResourceId {
        ResourceId::new(RESOURCE_TYPE, name)
    }

    /// Validate desired configuration before any network call
    pub fn validate(spec: &CacheSpec) -> ProviderResult<()> {
        if spec.name.is_empty() {
            return Err(ProviderError::invalid_attribute(
                AttributePath::root("name"),
                "The cache name is required.",
            ));
        }
        Ok(())
    }

    /// Decide whether anything needs to be done for this cache
    ///
    /// Applying an unchanged configuration yields `NoChange` and
    /// therefore no creation call.
    pub fn plan(desired: Option<&CacheSpec>, current: Option<&CacheSpec>) -> Diff<CacheSpec> {
        differ::diff(desired, current)
    }

    pub async fn create(&self, spec: &CacheSpec) -> ProviderResult<CacheState> {
        Self::validate(spec)?;

        let outcome = self
            .api
            .create_cache(&spec.name)
            .await
            .map_err(|e| api_error(Self::id(&spec.name), "create cache", e))?;

        match outcome {
            CreateCacheOutcome::Created => {
                debug!(cache = %spec.name, "cache created");
                Ok(CacheState {
                    id: spec.name.clone(),
                    name: spec.name.clone(),
                })
            }
            CreateCacheOutcome::AlreadyExists => Err(ProviderError::new(format!(
                "cache with name {:?} already exists",
                spec.name
            ))
            .for_resource(Self::id(&spec.name))),
            CreateCacheOutcome::Unrecognized(variant) => Err(ProviderError::new(format!(
                "unrecognized create cache response variant: {}",
                variant
            ))
            .for_resource(Self::id(&spec.name))),
        }
    }

    /// Look the cache up in the listing; `None` when not listed
    pub async fn read(&self, name: &str) -> ProviderResult<Option<CacheState>> {
        let caches = self
            .api
            .list_caches()
            .await
            .map_err(|e| api_error(Self::id(name), "list caches", e))?;

        Ok(caches.iter().any(|c| c == name).then(|| CacheState {
            id: name.to_string(),
            name: name.to_string(),
        }))
    }

    /// Delete the cache; an already-absent cache is treated as deleted
    pub async fn delete(&self, name: &str) -> ProviderResult<()> {
        let outcome = self
            .api
            .delete_cache(name)
            .await
            .map_err(|e| api_error(Self::id(name), "delete cache", e))?;

        match outcome {
            DeleteCacheOutcome::Deleted | DeleteCacheOutcome::NotFound => Ok(()),
            DeleteCacheOutcome::Unrecognized(variant) => Err(ProviderError::new(format!(
                "unrecognized delete cache response variant: {}",
                variant
            ))
            .for_resource(Self::id(name))),
        }
    }

    /// Import by name; the cache must currently exist
    pub async fn import_state(&self, name: &str) -> ProviderResult<CacheState> {
        self.read(name).await?.ok_or_else(|| {
            ProviderError::new(format!("cache with name {:?} not found", name))
                .for_resource(Self::id(name))
        })
    }
}
