//! Object store resource
//!
//! An object store binds an S3 bucket to a Valkey cluster for automatic
//! caching, with optional CloudWatch access-logging and metrics export.
//! Create and update are both a full `PUT` replace of the record.

use std::sync::Arc;

use reef_core::diag::AttributePath;
use reef_core::differ::{self, Diff};
use reef_core::provider::{ProviderError, ProviderResult, ResourceId};
use tracing::debug;

use crate::api::{
    AccessLoggingWire, ApiError, CacheConfig, CloudwatchLogging, CloudwatchMetrics,
    ControlPlaneApi, MetricsWire, ObjectStoreRecord, S3StorageConfig, StorageConfig,
    ValkeyClusterRef,
};
use crate::resources::api_error;

pub const RESOURCE_TYPE: &str = "object_store";

/// Optional CloudWatch access-logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLoggingSpec {
    pub region: String,
    pub iam_role_arn: String,
    /// The log group must already exist
    pub log_group_name: String,
}

/// Optional CloudWatch metrics-export configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSpec {
    pub region: String,
    pub iam_role_arn: String,
}

/// Desired object store configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStoreSpec {
    pub name: String,
    pub s3_bucket_name: String,
    pub s3_prefix: Option<String>,
    pub s3_iam_role_arn: String,
    pub valkey_cluster_name: String,
    pub access_logging: Option<AccessLoggingSpec>,
    pub metrics: Option<MetricsSpec>,
}

/// Observed object store state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStoreState {
    /// Computed identifier, equal to the object store name
    pub id: String,
    pub spec: ObjectStoreSpec,
}

fn valid_arn(arn: &str) -> bool {
    arn.len() >= 20 && arn.starts_with("arn:aws:")
}

/// Handle for object store operations
pub struct ObjectStoreResource {
    api: Arc<dyn ControlPlaneApi>,
}

impl ObjectStoreResource {
    pub fn new(api: Arc<dyn ControlPlaneApi>) -> Self {
        Self { api }
    }

    fn id(name: &str) -> ResourceId {
        ResourceId::new(RESOURCE_TYPE, name)
    }

    /// Validate desired configuration before any network call
    pub fn validate(spec: &ObjectStoreSpec) -> ProviderResult<()> {
        if spec.name.is_empty() {
            return Err(ProviderError::invalid_attribute(
                AttributePath::root("name"),
                "The object store name is required.",
            ));
        }
        if spec.s3_bucket_name.is_empty() {
            return Err(ProviderError::invalid_attribute(
                AttributePath::root("s3_bucket_name"),
                "The S3 bucket name is required.",
            ));
        }
        if !valid_arn(&spec.s3_iam_role_arn) {
            return Err(ProviderError::invalid_attribute(
                AttributePath::root("s3_iam_role_arn"),
                "A valid S3 IAM role ARN is required.",
            ));
        }
        if spec.valkey_cluster_name.is_empty() {
            return Err(ProviderError::invalid_attribute(
                AttributePath::root("valkey_cluster_name"),
                "The Valkey cluster name is required.",
            ));
        }
        if let Some(logging) = &spec.access_logging {
            if logging.log_group_name.is_empty() {
                return Err(ProviderError::invalid_attribute(
                    AttributePath::root("access_logging_config").name("log_group_name"),
                    "The CloudWatch log group name is required when access logging is set.",
                ));
            }
            if !valid_arn(&logging.iam_role_arn) {
                return Err(ProviderError::invalid_attribute(
                    AttributePath::root("access_logging_config").name("iam_role_arn"),
                    "A valid IAM role ARN is required when access logging is set.",
                ));
            }
            if logging.region.is_empty() {
                return Err(ProviderError::invalid_attribute(
                    AttributePath::root("access_logging_config").name("region"),
                    "The AWS region is required when access logging is set.",
                ));
            }
        }
        if let Some(metrics) = &spec.metrics {
            if !valid_arn(&metrics.iam_role_arn) {
                return Err(ProviderError::invalid_attribute(
                    AttributePath::root("metrics_config").name("iam_role_arn"),
                    "A valid IAM role ARN is required when metrics config is set.",
                ));
            }
            if metrics.region.is_empty() {
                return Err(ProviderError::invalid_attribute(
                    AttributePath::root("metrics_config").name("region"),
                    "The AWS region is required when metrics config is set.",
                ));
            }
        }
        Ok(())
    }

    /// Decide whether the record needs to be re-put
    pub fn plan(
        desired: Option<&ObjectStoreSpec>,
        current: Option<&ObjectStoreSpec>,
    ) -> Diff<ObjectStoreSpec> {
        differ::diff(desired, current)
    }

    fn to_record(spec: &ObjectStoreSpec) -> ObjectStoreRecord {
        ObjectStoreRecord {
            name: spec.name.clone(),
            storage_config: StorageConfig {
                s3: S3StorageConfig {
                    bucket_name: spec.s3_bucket_name.clone(),
                    prefix: spec.s3_prefix.clone().unwrap_or_default(),
                    iam_role_arn: spec.s3_iam_role_arn.clone(),
                },
            },
            cache_config: CacheConfig {
                valkey_cluster: ValkeyClusterRef {
                    cluster_name: spec.valkey_cluster_name.clone(),
                },
            },
            access_logging_config: spec.access_logging.as_ref().map(|l| AccessLoggingWire {
                cloudwatch: CloudwatchLogging {
                    log_group_name: l.log_group_name.clone(),
                    iam_role_arn: l.iam_role_arn.clone(),
                    region: l.region.clone(),
                },
            }),
            metrics_config: spec.metrics.as_ref().map(|m| MetricsWire {
                cloudwatch: CloudwatchMetrics {
                    iam_role_arn: m.iam_role_arn.clone(),
                    region: m.region.clone(),
                },
            }),
        }
    }

    fn from_record(record: ObjectStoreRecord) -> ObjectStoreState {
        let spec = ObjectStoreSpec {
            name: record.name.clone(),
            s3_bucket_name: record.storage_config.s3.bucket_name,
            s3_prefix: (!record.storage_config.s3.prefix.is_empty())
                .then_some(record.storage_config.s3.prefix),
            s3_iam_role_arn: record.storage_config.s3.iam_role_arn,
            valkey_cluster_name: record.cache_config.valkey_cluster.cluster_name,
            access_logging: record.access_logging_config.map(|l| AccessLoggingSpec {
                region: l.cloudwatch.region,
                iam_role_arn: l.cloudwatch.iam_role_arn,
                log_group_name: l.cloudwatch.log_group_name,
            }),
            metrics: record.metrics_config.map(|m| MetricsSpec {
                region: m.cloudwatch.region,
                iam_role_arn: m.cloudwatch.iam_role_arn,
            }),
        };
        ObjectStoreState {
            id: record.name,
            spec,
        }
    }

    async fn put(&self, spec: &ObjectStoreSpec, action: &str) -> ProviderResult<ObjectStoreState> {
        Self::validate(spec)?;

        let record = Self::to_record(spec);
        self.api
            .put_object_store(&spec.name, &record)
            .await
            .map_err(|e| api_error(Self::id(&spec.name), action, e))?;

        debug!(object_store = %spec.name, "object store record put");
        Ok(ObjectStoreState {
            id: spec.name.clone(),
            spec: spec.clone(),
        })
    }

    pub async fn create(&self, spec: &ObjectStoreSpec) -> ProviderResult<ObjectStoreState> {
        self.put(spec, "create object store").await
    }

    /// Update is a full replace of the record
    pub async fn update(&self, spec: &ObjectStoreSpec) -> ProviderResult<ObjectStoreState> {
        self.put(spec, "update object store").await
    }

    /// Fetch the record; `None` when the backend reports it absent
    pub async fn read(&self, name: &str) -> ProviderResult<Option<ObjectStoreState>> {
        match self.api.get_object_store(name).await {
            Ok(record) => Ok(Some(Self::from_record(record))),
            Err(ApiError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(api_error(Self::id(name), "read object store", e)),
        }
    }

    pub async fn delete(&self, name: &str) -> ProviderResult<()> {
        self.api
            .delete_object_store(name)
            .await
            .map_err(|e| api_error(Self::id(name), "delete object store", e))
    }

    /// Import by name; the object store must currently exist
    pub async fn import_state(&self, name: &str) -> ProviderResult<ObjectStoreState> {
        self.read(name).await?.ok_or_else(|| {
            ProviderError::new(format!("object store with name {:?} not found", name))
                .for_resource(Self::id(name))
        })
    }
}
