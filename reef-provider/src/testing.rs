//! In-memory fakes for the API seams
//!
//! Each fake keeps its state behind a mutex and records the methods
//! invoked on it, so tests can assert both outcomes and call order.
//! Failure injection returns a 500 from one named operation; the poll
//! knobs control how many listings a cluster takes to become Active,
//! to leave the listing after deletion, or to vanish outright.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{
    ApiError, ApiResult, CacheApi, ClusterDescription, ControlPlaneApi, CreateCacheOutcome,
    CreateClusterRequest, DeleteCacheOutcome, LeaderboardApi, ObjectStoreRecord,
    ProvisionLeaderboardOutcome, ReplicaCountUpdate, ReplicationGroupUpdate,
    ShardConfigurationUpdate,
};

fn injected_failure(op: &str) -> ApiError {
    ApiError::Status {
        status: 500,
        body: format!("injected failure in {}", op),
    }
}

// =============================================================================
// Control plane
// =============================================================================

#[derive(Default)]
struct ControlPlaneState {
    clusters: Vec<ClusterDescription>,
    object_stores: HashMap<String, ObjectStoreRecord>,
    calls: Vec<String>,
    fail_op: Option<&'static str>,
    /// Listings reporting "Creating" before a cluster turns Active
    lists_until_active: u32,
    deleting: HashSet<String>,
    /// Listings still showing a deleted cluster before it disappears
    lists_until_absent: u32,
    /// Listings before every cluster vanishes from the backend
    vanish_after: Option<u32>,
}

#[derive(Default)]
pub(crate) struct FakeControlPlane {
    state: Mutex<ControlPlaneState>,
}

impl FakeControlPlane {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn set_fail_op(&self, op: &'static str) {
        self.state.lock().unwrap().fail_op = Some(op);
    }

    pub(crate) fn set_lists_until_active(&self, listings: u32) {
        self.state.lock().unwrap().lists_until_active = listings;
    }

    pub(crate) fn set_lists_until_absent(&self, listings: u32) {
        self.state.lock().unwrap().lists_until_absent = listings;
    }

    pub(crate) fn set_vanish_after(&self, listings: u32) {
        self.state.lock().unwrap().vanish_after = Some(listings);
    }

    pub(crate) fn set_cluster_errors(&self, name: &str, errors: Vec<String>) {
        let mut state = self.state.lock().unwrap();
        if let Some(cluster) = state.clusters.iter_mut().find(|c| c.name == name) {
            cluster.errors = errors;
        }
    }

    fn record(state: &mut ControlPlaneState, op: &'static str) -> ApiResult<()> {
        state.calls.push(op.to_string());
        if state.fail_op == Some(op) {
            return Err(injected_failure(op));
        }
        Ok(())
    }
}

#[async_trait]
impl ControlPlaneApi for FakeControlPlane {
    async fn put_cluster(&self, name: &str, request: &CreateClusterRequest) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "put_cluster")?;
        state.clusters.retain(|c| c.name != name);
        state.clusters.push(ClusterDescription {
            name: name.to_string(),
            description: request.description.clone(),
            node_instance_type: request.node_instance_type.clone(),
            shard_count: request.shard_count,
            replication_factor: request.replication_factor,
            enforce_shard_multi_az: request.enforce_shard_multi_az,
            shard_placements: request.shard_placements.clone().unwrap_or_default(),
            status: "Active".to_string(),
            errors: Vec::new(),
        });
        Ok(())
    }

    async fn list_clusters(&self) -> ApiResult<Vec<ClusterDescription>> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "list_clusters")?;

        if let Some(remaining) = state.vanish_after {
            if remaining == 0 {
                state.clusters.clear();
            } else {
                state.vanish_after = Some(remaining - 1);
            }
        }

        if !state.deleting.is_empty() {
            if state.lists_until_absent == 0 {
                let deleting = std::mem::take(&mut state.deleting);
                state.clusters.retain(|c| !deleting.contains(&c.name));
            } else {
                state.lists_until_absent -= 1;
            }
        }

        let mut clusters = state.clusters.clone();
        if state.lists_until_active > 0 {
            state.lists_until_active -= 1;
            for cluster in &mut clusters {
                cluster.status = "Creating".to_string();
            }
        }
        Ok(clusters)
    }

    async fn delete_cluster(&self, name: &str) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "delete_cluster")?;
        state.deleting.insert(name.to_string());
        Ok(())
    }

    async fn update_replication_group(
        &self,
        name: &str,
        request: &ReplicationGroupUpdate,
    ) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "update_replication_group")?;
        if let Some(cluster) = state.clusters.iter_mut().find(|c| c.name == name) {
            if let Some(node_instance_type) = &request.node_instance_type {
                cluster.node_instance_type = node_instance_type.clone();
            }
            if let Some(multi_az) = request.enforce_shard_multi_az {
                cluster.enforce_shard_multi_az = multi_az;
            }
        }
        Ok(())
    }

    async fn update_shard_configuration(
        &self,
        name: &str,
        request: &ShardConfigurationUpdate,
    ) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "update_shard_configuration")?;
        if let Some(cluster) = state.clusters.iter_mut().find(|c| c.name == name) {
            cluster.shard_count = request.shard_count;
            if let Some(placements) = &request.shard_placements {
                cluster.shard_placements = placements.clone();
            }
        }
        Ok(())
    }

    async fn increase_replica_count(
        &self,
        name: &str,
        request: &ReplicaCountUpdate,
    ) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "increase_replica_count")?;
        if let Some(cluster) = state.clusters.iter_mut().find(|c| c.name == name) {
            cluster.replication_factor = request.replication_factor;
        }
        Ok(())
    }

    async fn decrease_replica_count(
        &self,
        name: &str,
        request: &ReplicaCountUpdate,
    ) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "decrease_replica_count")?;
        if let Some(cluster) = state.clusters.iter_mut().find(|c| c.name == name) {
            cluster.replication_factor = request.replication_factor;
        }
        Ok(())
    }

    async fn put_object_store(&self, name: &str, record: &ObjectStoreRecord) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "put_object_store")?;
        state.object_stores.insert(name.to_string(), record.clone());
        Ok(())
    }

    async fn get_object_store(&self, name: &str) -> ApiResult<ObjectStoreRecord> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "get_object_store")?;
        state
            .object_stores
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                body: format!("object store {:?} not found", name),
            })
    }

    async fn delete_object_store(&self, name: &str) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "delete_object_store")?;
        state.object_stores.remove(name);
        Ok(())
    }
}

// =============================================================================
// Vendor SDK seams
// =============================================================================

#[derive(Default)]
struct CacheApiState {
    caches: Vec<String>,
    create_calls: usize,
}

#[derive(Default)]
pub(crate) struct FakeCacheApi {
    state: Mutex<CacheApiState>,
}

impl FakeCacheApi {
    pub(crate) fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }
}

#[async_trait]
impl CacheApi for FakeCacheApi {
    async fn create_cache(&self, name: &str) -> ApiResult<CreateCacheOutcome> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;
        if state.caches.iter().any(|c| c == name) {
            Ok(CreateCacheOutcome::AlreadyExists)
        } else {
            state.caches.push(name.to_string());
            Ok(CreateCacheOutcome::Created)
        }
    }

    async fn list_caches(&self) -> ApiResult<Vec<String>> {
        Ok(self.state.lock().unwrap().caches.clone())
    }

    async fn delete_cache(&self, name: &str) -> ApiResult<DeleteCacheOutcome> {
        let mut state = self.state.lock().unwrap();
        let before = state.caches.len();
        state.caches.retain(|c| c != name);
        if state.caches.len() < before {
            Ok(DeleteCacheOutcome::Deleted)
        } else {
            Ok(DeleteCacheOutcome::NotFound)
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeLeaderboardApi {
    provisioned: Mutex<HashSet<(String, String)>>,
}

impl FakeLeaderboardApi {
    pub(crate) fn is_provisioned(&self, cache_name: &str, name: &str) -> bool {
        self.provisioned
            .lock()
            .unwrap()
            .contains(&(cache_name.to_string(), name.to_string()))
    }
}

#[async_trait]
impl LeaderboardApi for FakeLeaderboardApi {
    async fn provision_leaderboard(
        &self,
        cache_name: &str,
        name: &str,
    ) -> ApiResult<ProvisionLeaderboardOutcome> {
        self.provisioned
            .lock()
            .unwrap()
            .insert((cache_name.to_string(), name.to_string()));
        Ok(ProvisionLeaderboardOutcome::Provisioned)
    }

    async fn close_leaderboard(&self, cache_name: &str, name: &str) -> ApiResult<()> {
        self.provisioned
            .lock()
            .unwrap()
            .remove(&(cache_name.to_string(), name.to_string()));
        Ok(())
    }
}
