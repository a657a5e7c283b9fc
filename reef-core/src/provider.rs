//! Provider error surface
//!
//! Resource handles return `ProviderResult` from every operation. The
//! error carries enough context to be turned into an operator-facing
//! diagnostic: the failing resource, an optional attribute path for
//! validation failures, and the underlying cause when one exists.

use crate::diag::{AttributePath, Diagnostic};

/// Identifies a resource by type and configured name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    /// Resource type (e.g., "cache", "valkey_cluster")
    pub resource_type: String,
    /// Name given to the resource in configuration
    pub name: String,
}

impl ResourceId {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

/// Error type for resource operations
#[derive(Debug)]
pub struct ProviderError {
    pub message: String,
    pub resource_id: Option<ResourceId>,
    /// Set when the error is scoped to a configuration attribute
    pub attribute: Option<AttributePath>,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref id) = self.resource_id {
            write!(f, "[{}.{}] ", id.resource_type, id.name)?;
        }
        if let Some(ref path) = self.attribute {
            write!(f, "{}: ", path)?;
        }
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            resource_id: None,
            attribute: None,
            cause: None,
        }
    }

    /// Validation error scoped to one configuration attribute
    pub fn invalid_attribute(attribute: AttributePath, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            resource_id: None,
            attribute: Some(attribute),
            cause: None,
        }
    }

    pub fn for_resource(mut self, id: ResourceId) -> Self {
        self.resource_id = Some(id);
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Convert into an operator-facing diagnostic
    pub fn to_diagnostic(&self, summary: impl Into<String>) -> Diagnostic {
        match &self.attribute {
            Some(path) => Diagnostic::attribute_error(path.clone(), summary, self.message.clone()),
            None => Diagnostic::error(summary, self.to_string()),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_resource_and_attribute() {
        let err = ProviderError::invalid_attribute(
            AttributePath::root("shard_count"),
            "Shard count must be a positive integer.",
        )
        .for_resource(ResourceId::new("valkey_cluster", "orders"));

        assert_eq!(
            err.to_string(),
            "[valkey_cluster.orders] shard_count: Shard count must be a positive integer."
        );
    }

    #[test]
    fn to_diagnostic_preserves_attribute_scope() {
        let err = ProviderError::invalid_attribute(AttributePath::root("name"), "required");
        let diag = err.to_diagnostic("Missing required value");
        assert_eq!(diag.attribute, Some(AttributePath::root("name")));
    }
}
