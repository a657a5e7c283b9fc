//! HTTP control plane client
//!
//! Thin request/response builder over `reqwest`. One request/response
//! cycle per call, no retries, no caching; transport failures abort the
//! operation. The auth token is sent as-is in the `Authorization`
//! header.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::{
    ApiError, ApiResult, ControlPlaneApi, CreateClusterRequest, ClusterDescription,
    ObjectStoreRecord, ReplicaCountUpdate, ReplicationGroupUpdate, ShardConfigurationUpdate,
};
use crate::config::{ConfigError, Credentials};

/// Client for the Reef control plane
#[derive(Debug, Clone)]
pub struct ControlPlaneClient {
    http: reqwest::Client,
    endpoint: String,
    auth_token: String,
}

impl ControlPlaneClient {
    /// Create a client for the given endpoint
    ///
    /// The endpoint is validated once here so malformed configuration
    /// surfaces before any resource operation runs.
    pub fn new(
        endpoint: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let endpoint = endpoint.into();
        let trimmed = endpoint.trim_end_matches('/').to_string();
        Url::parse(&trimmed).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: trimmed,
            auth_token: auth_token.into(),
        })
    }

    /// Create a client from resolved credentials
    ///
    /// Only v2 credentials carry a control plane endpoint; legacy tokens
    /// are rejected here.
    pub fn from_credentials(credentials: &Credentials) -> Result<Self, ConfigError> {
        match credentials {
            Credentials::V2 { api_key, endpoint } => Self::new(endpoint.clone(), api_key.clone()),
            Credentials::Legacy { .. } => Err(ConfigError::EndpointRequired),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> ApiResult<Url> {
        let raw = format!("{}/{}", self.endpoint, path);
        Url::parse(&raw).map_err(|e| ApiError::InvalidRequest(format!("{}: {}", raw, e)))
    }

    async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<()> {
        let url = self.url(path)?;
        let response = self
            .http
            .put(url)
            .header("Authorization", &self.auth_token)
            .json(body)
            .send()
            .await?;
        self.expect_success("PUT", path, response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.url(path)?;
        let response = self
            .http
            .get(url)
            .header("Authorization", &self.auth_token)
            .send()
            .await?;

        let status = response.status();
        debug!(method = "GET", path, status = status.as_u16(), "control plane response");
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let url = self.url(path)?;
        let response = self
            .http
            .delete(url)
            .header("Authorization", &self.auth_token)
            .send()
            .await?;
        self.expect_success("DELETE", path, response).await
    }

    /// POST a partial-update body; the backend must answer 202 Accepted
    async fn post_accepted<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<()> {
        let url = self.url(path)?;
        let response = self
            .http
            .post(url)
            .header("Authorization", &self.auth_token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        debug!(method = "POST", path, status = status.as_u16(), "control plane response");
        if status != StatusCode::ACCEPTED {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }

    async fn expect_success(
        &self,
        method: &str,
        path: &str,
        response: reqwest::Response,
    ) -> ApiResult<()> {
        let status = response.status();
        debug!(method, path, status = status.as_u16(), "control plane response");
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ControlPlaneApi for ControlPlaneClient {
    async fn put_cluster(&self, name: &str, request: &CreateClusterRequest) -> ApiResult<()> {
        self.put_json(&format!("cluster/{}", name), request).await
    }

    async fn list_clusters(&self) -> ApiResult<Vec<ClusterDescription>> {
        self.get_json("cluster").await
    }

    async fn delete_cluster(&self, name: &str) -> ApiResult<()> {
        self.delete(&format!("cluster/{}", name)).await
    }

    async fn update_replication_group(
        &self,
        name: &str,
        request: &ReplicationGroupUpdate,
    ) -> ApiResult<()> {
        self.post_accepted(&format!("ec-cluster/{}/replication-group", name), request)
            .await
    }

    async fn update_shard_configuration(
        &self,
        name: &str,
        request: &ShardConfigurationUpdate,
    ) -> ApiResult<()> {
        self.post_accepted(&format!("ec-cluster/{}/shard-configuration", name), request)
            .await
    }

    async fn increase_replica_count(
        &self,
        name: &str,
        request: &ReplicaCountUpdate,
    ) -> ApiResult<()> {
        self.post_accepted(&format!("ec-cluster/{}/increase-replica-count", name), request)
            .await
    }

    async fn decrease_replica_count(
        &self,
        name: &str,
        request: &ReplicaCountUpdate,
    ) -> ApiResult<()> {
        self.post_accepted(&format!("ec-cluster/{}/decrease-replica-count", name), request)
            .await
    }

    async fn put_object_store(&self, name: &str, record: &ObjectStoreRecord) -> ApiResult<()> {
        self.put_json(&format!("objectstore/{}", name), record).await
    }

    async fn get_object_store(&self, name: &str) -> ApiResult<ObjectStoreRecord> {
        self.get_json(&format!("objectstore/{}", name)).await
    }

    async fn delete_object_store(&self, name: &str) -> ApiResult<()> {
        self.delete(&format!("objectstore/{}", name)).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::ShardPlacement;

    #[test]
    fn endpoint_is_normalized_and_validated() {
        let client = ControlPlaneClient::new("https://control.example.com/", "token").unwrap();
        assert_eq!(client.endpoint(), "https://control.example.com");

        let err = ControlPlaneClient::new("not a url", "token").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
    }

    #[test]
    fn legacy_credentials_cannot_reach_the_control_plane() {
        let err = ControlPlaneClient::from_credentials(&Credentials::Legacy {
            token: "token".into(),
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::EndpointRequired);
    }

    #[test]
    fn shard_placement_serializes_with_wire_field_names() {
        let placement = ShardPlacement {
            index: 1,
            availability_zone: "us-west-2a".into(),
            replica_availability_zones: vec!["us-west-2b".into()],
        };
        assert_eq!(
            serde_json::to_value(&placement).unwrap(),
            json!({
                "shard_index": 1,
                "availability_zone": "us-west-2a",
                "replica_availability_zones": ["us-west-2b"],
            })
        );
    }

    #[test]
    fn optional_update_fields_are_omitted_when_unset() {
        let body = ShardConfigurationUpdate {
            shard_count: 2,
            shard_placements: None,
            shards_to_remove: Some(vec![2, 3]),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"shard_count": 2, "shards_to_remove": [2, 3]})
        );

        let body = ReplicationGroupUpdate {
            node_instance_type: Some("cache.m7g.large".into()),
            enforce_shard_multi_az: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"node_instance_type": "cache.m7g.large"})
        );
    }
}
