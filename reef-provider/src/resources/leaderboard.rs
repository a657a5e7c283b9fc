//! Leaderboard resource
//!
//! Leaderboards are provisioned inside an existing cache via the vendor
//! SDK. They have no update path; any attribute change requires
//! replacement.

use std::sync::Arc;

use reef_core::diag::AttributePath;
use reef_core::provider::{ProviderError, ProviderResult, ResourceId};
use tracing::debug;

use crate::api::{LeaderboardApi, ProvisionLeaderboardOutcome};
use crate::resources::api_error;

pub const RESOURCE_TYPE: &str = "leaderboard";

/// Desired leaderboard configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardSpec {
    pub name: String,
    pub cache_name: String,
}

/// Observed leaderboard state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardState {
    /// Computed identifier, equal to the leaderboard name
    pub id: String,
    pub name: String,
    pub cache_name: String,
}

/// Handle for leaderboard operations
pub struct LeaderboardResource {
    api: Arc<dyn LeaderboardApi>,
}

impl LeaderboardResource {
    pub fn new(api: Arc<dyn LeaderboardApi>) -> Self {
        Self { api }
    }

    fn id(name: &str) -> ResourceId {
        ResourceId::new(RESOURCE_TYPE, name)
    }

    pub fn validate(spec: &LeaderboardSpec) -> ProviderResult<()> {
        if spec.name.is_empty() {
            return Err(ProviderError::invalid_attribute(
                AttributePath::root("name"),
                "The leaderboard name is required.",
            ));
        }
        if spec.cache_name.is_empty() {
            return Err(ProviderError::invalid_attribute(
                AttributePath::root("cache_name"),
                "The cache name is required.",
            ));
        }
        Ok(())
    }

    pub async fn create(&self, spec: &LeaderboardSpec) -> ProviderResult<LeaderboardState> {
        Self::validate(spec)?;

        let outcome = self
            .api
            .provision_leaderboard(&spec.cache_name, &spec.name)
            .await
            .map_err(|e| api_error(Self::id(&spec.name), "create leaderboard", e))?;

        match outcome {
            ProvisionLeaderboardOutcome::Provisioned => {
                debug!(leaderboard = %spec.name, cache = %spec.cache_name, "leaderboard provisioned");
                Ok(LeaderboardState {
                    id: spec.name.clone(),
                    name: spec.name.clone(),
                    cache_name: spec.cache_name.clone(),
                })
            }
            ProvisionLeaderboardOutcome::Unrecognized(variant) => {
                Err(ProviderError::new(format!(
                    "unrecognized provision leaderboard response variant: {}",
                    variant
                ))
                .for_resource(Self::id(&spec.name)))
            }
        }
    }

    /// Mirror the stored configuration back; the SDK exposes no
    /// describe call for leaderboards
    pub fn read(&self, spec: &LeaderboardSpec) -> LeaderboardState {
        LeaderboardState {
            id: spec.name.clone(),
            name: spec.name.clone(),
            cache_name: spec.cache_name.clone(),
        }
    }

    /// Leaderboards cannot be updated in place
    pub fn update(&self, spec: &LeaderboardSpec) -> ProviderResult<LeaderboardState> {
        Err(
            ProviderError::new("leaderboard resource does not support updates")
                .for_resource(Self::id(&spec.name)),
        )
    }

    pub async fn delete(&self, spec: &LeaderboardSpec) -> ProviderResult<()> {
        self.api
            .close_leaderboard(&spec.cache_name, &spec.name)
            .await
            .map_err(|e| api_error(Self::id(&spec.name), "close leaderboard", e))
    }
}
