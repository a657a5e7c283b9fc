//! Reef Core
//!
//! Framework-independent building blocks for declaratively managing
//! Reef platform resources: diagnostics, provider errors, typed diffs,
//! and the async completion poller.

pub mod diag;
pub mod differ;
pub mod poll;
pub mod provider;
