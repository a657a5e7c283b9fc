//! Valkey cluster resource
//!
//! The most involved resource: creation and deletion are asynchronous
//! on the backend and are awaited through the listing, and updates are
//! dispatched field-by-field to distinct partial-update endpoints. The
//! dispatch itself is a pure planning step over a [`FieldDiff`]; the
//! executor then issues the planned calls in order, aborting on the
//! first failure. No rollback is attempted: partial application is an
//! accepted, unrecovered failure mode.

use std::sync::Arc;

use reef_core::diag::{AttributePath, Diagnostics};
use reef_core::poll::{self, Observation, PollError, PollPolicy};
use reef_core::provider::{ProviderError, ProviderResult, ResourceId};
use tracing::{debug, warn};

use crate::api::{
    ClusterDescription, ControlPlaneApi, CreateClusterRequest, ReplicaCountUpdate,
    ReplicationGroupUpdate, ShardConfigurationUpdate, ShardPlacement,
};
use crate::resources::api_error;

pub const RESOURCE_TYPE: &str = "valkey_cluster";

/// Status reported by the backend once a cluster is usable
pub const STATUS_ACTIVE: &str = "Active";

const INVALID_UPDATE_DETAIL: &str =
    "Updates to shard_placements without an accompanying change to shard_count or \
     replication_factor are not allowed. Manually delete and recreate the resource.";

/// Desired cluster configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSpec {
    pub cluster_name: String,
    pub description: Option<String>,
    pub node_instance_type: String,
    pub shard_count: u32,
    pub replication_factor: u32,
    pub enforce_shard_multi_az: bool,
    /// Explicit placement per shard; when absent the backend places
    /// shards automatically
    pub shard_placements: Option<Vec<ShardPlacement>>,
}

/// Observed cluster state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterState {
    /// Computed identifier, equal to the cluster name
    pub id: String,
    pub spec: ClusterSpec,
    pub status: String,
    /// Errors the backend reports against the cluster
    pub errors: Vec<String>,
}

impl ClusterState {
    fn from_description(description: ClusterDescription) -> Self {
        let spec = ClusterSpec {
            cluster_name: description.name.clone(),
            description: (!description.description.is_empty()).then_some(description.description),
            node_instance_type: description.node_instance_type,
            shard_count: description.shard_count,
            replication_factor: description.replication_factor,
            enforce_shard_multi_az: description.enforce_shard_multi_az,
            shard_placements: (!description.shard_placements.is_empty())
                .then_some(description.shard_placements),
        };
        Self {
            id: description.name,
            spec,
            status: description.status,
            errors: description.errors,
        }
    }
}

// =============================================================================
// Diff engine
// =============================================================================

/// Field-level change set between two cluster configurations
///
/// One flag per updatable top-level field. Descriptions are not
/// updatable and are not diffed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldDiff {
    pub shard_count: bool,
    pub replication_factor: bool,
    pub node_instance_type: bool,
    pub enforce_shard_multi_az: bool,
    pub shard_placements: bool,
}

impl FieldDiff {
    pub fn any(&self) -> bool {
        self.shard_count
            || self.replication_factor
            || self.node_instance_type
            || self.enforce_shard_multi_az
            || self.shard_placements
    }
}

/// Compare two cluster configurations field by field
///
/// Placement comparison is strictly positional: a change in presence,
/// length, or any element (index, primary zone, or replica zone list)
/// marks the placements changed. No re-ordering is attempted.
pub fn field_diff(prior: &ClusterSpec, planned: &ClusterSpec) -> FieldDiff {
    FieldDiff {
        shard_count: prior.shard_count != planned.shard_count,
        replication_factor: prior.replication_factor != planned.replication_factor,
        node_instance_type: prior.node_instance_type != planned.node_instance_type,
        enforce_shard_multi_az: prior.enforce_shard_multi_az != planned.enforce_shard_multi_az,
        shard_placements: prior.shard_placements != planned.shard_placements,
    }
}

// =============================================================================
// Update dispatcher
// =============================================================================

/// One planned partial-update call, in dispatch order
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterUpdate {
    ReplicationGroup(ReplicationGroupUpdate),
    IncreaseShardCount(ShardConfigurationUpdate),
    DecreaseShardCount(ShardConfigurationUpdate),
    IncreaseReplicaCount(ReplicaCountUpdate),
    DecreaseReplicaCount(ReplicaCountUpdate),
}

impl ClusterUpdate {
    /// Human-readable name used in warnings and errors
    pub fn operation(&self) -> &'static str {
        match self {
            ClusterUpdate::ReplicationGroup(_) => "replication group update",
            ClusterUpdate::IncreaseShardCount(_) => "shard count increase",
            ClusterUpdate::DecreaseShardCount(_) => "shard count decrease",
            ClusterUpdate::IncreaseReplicaCount(_) => "replica count increase",
            ClusterUpdate::DecreaseReplicaCount(_) => "replica count decrease",
        }
    }
}

/// Decide which partial-update calls an update needs, in fixed order
///
/// Placements cannot be repositioned on their own: a placement change
/// without a shard count or replication factor change is a hard
/// rejection instructing manual recreation, not a retryable condition.
pub fn plan_update(prior: &ClusterSpec, planned: &ClusterSpec) -> ProviderResult<Vec<ClusterUpdate>> {
    let diff = field_diff(prior, planned);
    let mut updates = Vec::new();

    if diff.shard_placements && !diff.shard_count && !diff.replication_factor {
        return Err(ProviderError::new(INVALID_UPDATE_DETAIL)
            .for_resource(ResourceId::new(RESOURCE_TYPE, &prior.cluster_name)));
    }

    if diff.node_instance_type || diff.enforce_shard_multi_az {
        updates.push(ClusterUpdate::ReplicationGroup(ReplicationGroupUpdate {
            node_instance_type: diff
                .node_instance_type
                .then(|| planned.node_instance_type.clone()),
            enforce_shard_multi_az: diff
                .enforce_shard_multi_az
                .then_some(planned.enforce_shard_multi_az),
        }));
    }

    if diff.shard_count && planned.shard_count > prior.shard_count {
        updates.push(ClusterUpdate::IncreaseShardCount(ShardConfigurationUpdate {
            shard_count: planned.shard_count,
            shard_placements: planned.shard_placements.clone(),
            shards_to_remove: None,
        }));
    }

    if diff.shard_count && planned.shard_count < prior.shard_count {
        // Shard indexes are 0-based and stable, so the removed shards
        // are exactly the top indexes above the new count.
        let shards_to_remove: Vec<u32> = (planned.shard_count..prior.shard_count).collect();
        updates.push(ClusterUpdate::DecreaseShardCount(ShardConfigurationUpdate {
            shard_count: planned.shard_count,
            shard_placements: None,
            shards_to_remove: Some(shards_to_remove),
        }));
    }

    if diff.replication_factor && planned.replication_factor > prior.replication_factor {
        updates.push(ClusterUpdate::IncreaseReplicaCount(ReplicaCountUpdate {
            replication_factor: planned.replication_factor,
            shard_placements: planned.shard_placements.clone(),
        }));
    }

    if diff.replication_factor && planned.replication_factor < prior.replication_factor {
        updates.push(ClusterUpdate::DecreaseReplicaCount(ReplicaCountUpdate {
            replication_factor: planned.replication_factor,
            shard_placements: planned.shard_placements.clone(),
        }));
    }

    Ok(updates)
}

// =============================================================================
// Resource handle
// =============================================================================

/// Handle for Valkey cluster operations
pub struct ValkeyClusterResource {
    api: Arc<dyn ControlPlaneApi>,
    poll: PollPolicy,
}

impl ValkeyClusterResource {
    pub fn new(api: Arc<dyn ControlPlaneApi>) -> Self {
        Self {
            api,
            poll: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    fn id(name: &str) -> ResourceId {
        ResourceId::new(RESOURCE_TYPE, name)
    }

    /// Validate desired configuration before any network call
    pub fn validate(spec: &ClusterSpec) -> ProviderResult<()> {
        if spec.cluster_name.is_empty() {
            return Err(ProviderError::invalid_attribute(
                AttributePath::root("cluster_name"),
                "The Valkey cluster name is required.",
            ));
        }
        if spec.node_instance_type.is_empty() {
            return Err(ProviderError::invalid_attribute(
                AttributePath::root("node_instance_type"),
                "The node instance type is required.",
            ));
        }
        if spec.shard_count == 0 {
            return Err(ProviderError::invalid_attribute(
                AttributePath::root("shard_count"),
                "Shard count must be a positive integer.",
            ));
        }
        if let Some(placements) = &spec.shard_placements {
            if placements.len() != spec.shard_count as usize {
                return Err(ProviderError::invalid_attribute(
                    AttributePath::root("shard_placements"),
                    format!(
                        "Number of shard placements must match shard count ({}).",
                        spec.shard_count
                    ),
                ));
            }
            for (i, placement) in placements.iter().enumerate() {
                if placement.replica_availability_zones.len() != spec.replication_factor as usize {
                    return Err(ProviderError::invalid_attribute(
                        AttributePath::root("shard_placements")
                            .index(i)
                            .name("replica_availability_zones"),
                        format!(
                            "Number of replica availability zones must match replication factor ({}).",
                            spec.replication_factor
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    async fn find(&self, name: &str) -> ProviderResult<Option<ClusterDescription>> {
        let clusters = self
            .api
            .list_clusters()
            .await
            .map_err(|e| api_error(Self::id(name), "list clusters", e))?;
        Ok(clusters.into_iter().find(|c| c.name == name))
    }

    /// Create the cluster and wait for it to become Active
    ///
    /// Disappearing from the listing mid-poll is fatal, not eventual
    /// success.
    pub async fn create(&self, spec: &ClusterSpec) -> ProviderResult<ClusterState> {
        Self::validate(spec)?;

        let request = CreateClusterRequest {
            description: spec.description.clone().unwrap_or_default(),
            node_instance_type: spec.node_instance_type.clone(),
            shard_count: spec.shard_count,
            replication_factor: spec.replication_factor,
            enforce_shard_multi_az: spec.enforce_shard_multi_az,
            shard_placements: spec.shard_placements.clone(),
        };
        self.api
            .put_cluster(&spec.cluster_name, &request)
            .await
            .map_err(|e| api_error(Self::id(&spec.cluster_name), "create valkey cluster", e))?;

        debug!(cluster = %spec.cluster_name, "cluster creation accepted, waiting for Active");

        let api = Arc::clone(&self.api);
        let name = spec.cluster_name.clone();
        let description = poll::wait_for(&self.poll, move || {
            let api = Arc::clone(&api);
            let name = name.clone();
            async move {
                let clusters = api
                    .list_clusters()
                    .await
                    .map_err(|e| api_error(Self::id(&name), "list clusters", e))?;
                Ok(match clusters.into_iter().find(|c| c.name == name) {
                    Some(cluster) if cluster.status == STATUS_ACTIVE => Observation::Ready(cluster),
                    Some(cluster) => {
                        debug!(cluster = %name, status = %cluster.status, "cluster not yet Active");
                        Observation::Pending
                    }
                    None => Observation::Gone,
                })
            }
        })
        .await
        .map_err(|e| Self::poll_error(&spec.cluster_name, "become Active", e))?;

        Ok(ClusterState::from_description(description))
    }

    /// Look the cluster up in the listing
    ///
    /// Backend-reported cluster errors surface as a warning, not an
    /// error.
    pub async fn read(
        &self,
        name: &str,
        diags: &mut Diagnostics,
    ) -> ProviderResult<Option<ClusterState>> {
        let Some(description) = self.find(name).await? else {
            return Ok(None);
        };

        if !description.errors.is_empty() {
            warn!(cluster = %name, errors = ?description.errors, "cluster reports errors");
            diags.add_warning(
                "Valkey cluster error",
                format!(
                    "Found valkey cluster {:?} with errors: {:?}",
                    name, description.errors
                ),
            );
        }

        Ok(Some(ClusterState::from_description(description)))
    }

    /// Dispatch the planned partial updates, in order
    ///
    /// The partial-update endpoints are provisional contracts; each
    /// executed operation also records a warning diagnostic. Calls are
    /// independent: a failure aborts the remaining steps but nothing
    /// already applied is rolled back.
    pub async fn update(
        &self,
        prior: &ClusterSpec,
        planned: &ClusterSpec,
        diags: &mut Diagnostics,
    ) -> ProviderResult<()> {
        Self::validate(planned)?;

        let name = &prior.cluster_name;
        for update in plan_update(prior, planned)? {
            let operation = update.operation();
            warn!(cluster = %name, operation, "dispatching provisional update path");
            diags.add_warning(
                "Provisional update path",
                format!("The {} endpoint is a provisional contract.", operation),
            );

            let result = match &update {
                ClusterUpdate::ReplicationGroup(body) => {
                    self.api.update_replication_group(name, body).await
                }
                ClusterUpdate::IncreaseShardCount(body)
                | ClusterUpdate::DecreaseShardCount(body) => {
                    self.api.update_shard_configuration(name, body).await
                }
                ClusterUpdate::IncreaseReplicaCount(body) => {
                    self.api.increase_replica_count(name, body).await
                }
                ClusterUpdate::DecreaseReplicaCount(body) => {
                    self.api.decrease_replica_count(name, body).await
                }
            };
            result.map_err(|e| api_error(Self::id(name), &format!("apply {}", operation), e))?;
        }
        Ok(())
    }

    /// Delete the cluster and wait until it leaves the listing
    pub async fn delete(&self, name: &str) -> ProviderResult<()> {
        self.api
            .delete_cluster(name)
            .await
            .map_err(|e| api_error(Self::id(name), "delete valkey cluster", e))?;

        debug!(cluster = %name, "cluster deletion accepted, waiting for absence");

        let api = Arc::clone(&self.api);
        let name_owned = name.to_string();
        poll::wait_for(&self.poll, move || {
            let api = Arc::clone(&api);
            let name = name_owned.clone();
            async move {
                let clusters = api
                    .list_clusters()
                    .await
                    .map_err(|e| api_error(Self::id(&name), "list clusters", e))?;
                Ok(if clusters.iter().any(|c| c.name == name) {
                    Observation::Pending
                } else {
                    Observation::Ready(())
                })
            }
        })
        .await
        .map_err(|e| Self::poll_error(name, "be deleted", e))
    }

    /// Import by name; the cluster must currently exist
    pub async fn import_state(&self, name: &str) -> ProviderResult<ClusterState> {
        let mut diags = Diagnostics::new();
        self.read(name, &mut diags).await?.ok_or_else(|| {
            ProviderError::new(format!("valkey cluster with name {:?} not found", name))
                .for_resource(Self::id(name))
        })
    }

    fn poll_error(name: &str, waiting_for: &str, err: PollError) -> ProviderError {
        match err {
            PollError::Gone => ProviderError::new(format!(
                "cluster with name {:?} disappeared from the listing while waiting for it to {}",
                name, waiting_for
            ))
            .for_resource(Self::id(name)),
            PollError::Timeout { waited } => ProviderError::new(format!(
                "timed out after {:?} waiting for cluster {:?} to {}",
                waited, name, waiting_for
            ))
            .for_resource(Self::id(name)),
            PollError::Probe(err) => err,
        }
    }
}
