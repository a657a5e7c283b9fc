//! API seams and wire types
//!
//! `ControlPlaneApi` is the JSON-over-HTTPS control plane surface; the
//! concrete implementation lives in [`crate::client`]. `CacheApi` and
//! `LeaderboardApi` sit at the vendor SDK boundary: the SDK constructs
//! its own clients, so this crate only defines the operations and their
//! tagged outcomes. Backend response variants are enums matched
//! exhaustively, with an explicit fallback for unrecognized variants.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors crossing any API seam
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be constructed (malformed URL or body)
    #[error("unable to build request: {0}")]
    InvalidRequest(String),

    /// The request never completed; not retried
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON shape
    #[error("unable to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Cluster wire types
// =============================================================================

/// Availability-zone assignment for one shard
///
/// The index is a stable 0-based identifier; placements are never
/// re-ordered on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardPlacement {
    #[serde(rename = "shard_index")]
    pub index: u32,
    /// Availability zone for the primary node
    pub availability_zone: String,
    /// Availability zones for replica nodes, one per replica
    pub replica_availability_zones: Vec<String>,
}

/// Body of `PUT /cluster/{name}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateClusterRequest {
    pub description: String,
    pub node_instance_type: String,
    pub shard_count: u32,
    pub replication_factor: u32,
    pub enforce_shard_multi_az: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard_placements: Option<Vec<ShardPlacement>>,
}

/// One element of the `GET /cluster` listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterDescription {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub node_instance_type: String,
    pub shard_count: u32,
    pub replication_factor: u32,
    pub enforce_shard_multi_az: bool,
    #[serde(default)]
    pub shard_placements: Vec<ShardPlacement>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Body of `POST /ec-cluster/{name}/replication-group`; both fields
/// optional, only changed fields are carried
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicationGroupUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_instance_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforce_shard_multi_az: Option<bool>,
}

/// Body of `POST /ec-cluster/{name}/shard-configuration`
///
/// Increases carry the full planned placement list; decreases carry the
/// explicit indexes of the shards being removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardConfigurationUpdate {
    pub shard_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard_placements: Option<Vec<ShardPlacement>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shards_to_remove: Option<Vec<u32>>,
}

/// Body of the increase/decrease replica count operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicaCountUpdate {
    pub replication_factor: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard_placements: Option<Vec<ShardPlacement>>,
}

// =============================================================================
// Object store wire types
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3StorageConfig {
    pub bucket_name: String,
    #[serde(default)]
    pub prefix: String,
    pub iam_role_arn: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub s3: S3StorageConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValkeyClusterRef {
    pub cluster_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub valkey_cluster: ValkeyClusterRef,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudwatchLogging {
    pub log_group_name: String,
    pub iam_role_arn: String,
    pub region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLoggingWire {
    pub cloudwatch: CloudwatchLogging,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudwatchMetrics {
    pub iam_role_arn: String,
    pub region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsWire {
    pub cloudwatch: CloudwatchMetrics,
}

/// Body of `PUT /objectstore/{name}` and of the describe response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectStoreRecord {
    pub name: String,
    pub storage_config: StorageConfig,
    pub cache_config: CacheConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_logging_config: Option<AccessLoggingWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_config: Option<MetricsWire>,
}

// =============================================================================
// Control plane trait
// =============================================================================

/// Control plane operations used by the resource handles
///
/// Every partial-update call expects the backend to answer 202 Accepted;
/// anything else is surfaced as [`ApiError::Status`].
#[async_trait]
pub trait ControlPlaneApi: Send + Sync {
    /// `PUT /cluster/{name}` - create or replace a Valkey cluster
    async fn put_cluster(&self, name: &str, request: &CreateClusterRequest) -> ApiResult<()>;

    /// `GET /cluster` - list all clusters; used for read and for
    /// existence polling
    async fn list_clusters(&self) -> ApiResult<Vec<ClusterDescription>>;

    /// `DELETE /cluster/{name}`
    async fn delete_cluster(&self, name: &str) -> ApiResult<()>;

    /// `POST /ec-cluster/{name}/replication-group`
    async fn update_replication_group(
        &self,
        name: &str,
        request: &ReplicationGroupUpdate,
    ) -> ApiResult<()>;

    /// `POST /ec-cluster/{name}/shard-configuration`
    async fn update_shard_configuration(
        &self,
        name: &str,
        request: &ShardConfigurationUpdate,
    ) -> ApiResult<()>;

    /// `POST /ec-cluster/{name}/increase-replica-count`
    async fn increase_replica_count(
        &self,
        name: &str,
        request: &ReplicaCountUpdate,
    ) -> ApiResult<()>;

    /// `POST /ec-cluster/{name}/decrease-replica-count`
    async fn decrease_replica_count(
        &self,
        name: &str,
        request: &ReplicaCountUpdate,
    ) -> ApiResult<()>;

    /// `PUT /objectstore/{name}` - create or replace an object store
    async fn put_object_store(&self, name: &str, record: &ObjectStoreRecord) -> ApiResult<()>;

    /// `GET /objectstore/{name}`
    async fn get_object_store(&self, name: &str) -> ApiResult<ObjectStoreRecord>;

    /// `DELETE /objectstore/{name}`
    async fn delete_object_store(&self, name: &str) -> ApiResult<()>;
}

// =============================================================================
// Vendor SDK boundary
// =============================================================================

/// Outcome of a cache creation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateCacheOutcome {
    Created,
    AlreadyExists,
    /// Response variant this crate does not know about
    Unrecognized(String),
}

/// Outcome of a cache deletion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteCacheOutcome {
    Deleted,
    NotFound,
    /// Response variant this crate does not know about
    Unrecognized(String),
}

/// Cache operations provided by the vendor SDK
#[async_trait]
pub trait CacheApi: Send + Sync {
    async fn create_cache(&self, name: &str) -> ApiResult<CreateCacheOutcome>;

    async fn list_caches(&self) -> ApiResult<Vec<String>>;

    async fn delete_cache(&self, name: &str) -> ApiResult<DeleteCacheOutcome>;
}

/// Outcome of a leaderboard provisioning call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionLeaderboardOutcome {
    Provisioned,
    /// Response variant this crate does not know about
    Unrecognized(String),
}

/// Leaderboard operations provided by the vendor SDK
#[async_trait]
pub trait LeaderboardApi: Send + Sync {
    async fn provision_leaderboard(
        &self,
        cache_name: &str,
        name: &str,
    ) -> ApiResult<ProvisionLeaderboardOutcome>;

    async fn close_leaderboard(&self, cache_name: &str, name: &str) -> ApiResult<()>;
}
