//! Differ - Compare desired configuration with observed state
//!
//! Compares the declared desired state of one resource with what the
//! backend currently reports and decides which lifecycle operation, if
//! any, is needed. Comparison is plain value equality on the typed spec;
//! no normalization is performed.

/// Result of diffing one resource
#[derive(Debug, Clone, PartialEq)]
pub enum Diff<S> {
    /// Resource does not exist -> needs creation
    Create(S),
    /// Resource exists with differences -> needs update
    Update { from: S, to: S },
    /// Resource exists and matches the desired state -> no action needed
    NoChange,
    /// Resource exists but is no longer desired -> needs deletion
    Delete,
}

impl<S> Diff<S> {
    /// Returns whether this Diff involves a change
    pub fn is_change(&self) -> bool {
        !matches!(self, Diff::NoChange)
    }
}

/// Compute the Diff between desired configuration and observed state
pub fn diff<S: PartialEq + Clone>(desired: Option<&S>, current: Option<&S>) -> Diff<S> {
    match (desired, current) {
        (Some(desired), None) => Diff::Create(desired.clone()),
        (Some(desired), Some(current)) if desired == current => Diff::NoChange,
        (Some(desired), Some(current)) => Diff::Update {
            from: current.clone(),
            to: desired.clone(),
        },
        (None, Some(_)) => Diff::Delete,
        (None, None) => Diff::NoChange,
    }
}
