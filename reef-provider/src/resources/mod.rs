//! Resource handles
//!
//! One module per managed resource type. Every handle follows the same
//! pattern: decode/validate the desired configuration, build the
//! request, issue the call, and mirror computed fields (an id equal to
//! the resource name) back into the returned state.

pub mod cache;
pub mod leaderboard;
pub mod object_store;
pub mod valkey_cluster;

use reef_core::provider::{ProviderError, ResourceId};

use crate::api::ApiError;

/// Wrap an API failure with the operation and resource it belongs to
pub(crate) fn api_error(id: ResourceId, action: &str, err: ApiError) -> ProviderError {
    let message = format!("unable to {}: {}", action, err);
    ProviderError::new(message).for_resource(id).with_cause(err)
}
