//! Reef Provider
//!
//! Translates declarative resource configuration into calls against the
//! Reef control plane: serverless caches, leaderboards, object stores,
//! and Valkey clusters. Each resource handle owns nothing beyond the
//! client it was given; there is no shared mutable provider state.

pub mod api;
pub mod client;
pub mod config;
pub mod datasources;
pub mod resources;

use std::sync::Arc;

use crate::api::{CacheApi, ControlPlaneApi, LeaderboardApi};

/// Bundle of API clients handed to resource handles
///
/// Constructed once at provider configure time and passed explicitly to
/// every handle. The cache and leaderboard clients sit behind the vendor
/// SDK boundary; the control plane client is the HTTP implementation in
/// [`client`].
#[derive(Clone)]
pub struct ReefClients {
    pub control_plane: Arc<dyn ControlPlaneApi>,
    pub caches: Arc<dyn CacheApi>,
    pub leaderboards: Arc<dyn LeaderboardApi>,
}

impl ReefClients {
    pub fn new(
        control_plane: Arc<dyn ControlPlaneApi>,
        caches: Arc<dyn CacheApi>,
        leaderboards: Arc<dyn LeaderboardApi>,
    ) -> Self {
        Self {
            control_plane,
            caches,
            leaderboards,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::cache::{CacheResource, CacheSpec};
    use crate::testing::{FakeCacheApi, FakeControlPlane, FakeLeaderboardApi};

    #[tokio::test]
    async fn clients_bundle_feeds_resource_handles() {
        let clients = ReefClients::new(
            Arc::new(FakeControlPlane::default()),
            Arc::new(FakeCacheApi::default()),
            Arc::new(FakeLeaderboardApi::default()),
        );

        let cache = CacheResource::new(clients.caches.clone());
        let state = cache
            .create(&CacheSpec {
                name: "orders".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(state.id, "orders");
    }
}
