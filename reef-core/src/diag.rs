//! Diagnostics - Operator-facing errors and warnings
//!
//! Every resource operation reports its problems through a `Diagnostics`
//! collection rather than aborting the process. Validation failures are
//! scoped to the attribute that caused them so the operator sees
//! `shard_placements[2].replica_availability_zones` instead of a bare
//! message.

use std::fmt;

/// One step in an attribute path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    /// Named attribute (root or nested)
    Name(String),
    /// Positional element of a list attribute
    Index(usize),
}

/// Path to the configuration attribute a diagnostic refers to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributePath {
    steps: Vec<PathStep>,
}

impl AttributePath {
    /// Path rooted at a top-level attribute
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            steps: vec![PathStep::Name(name.into())],
        }
    }

    /// Descend into a named nested attribute
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.steps.push(PathStep::Name(name.into()));
        self
    }

    /// Descend into a list element
    pub fn index(mut self, index: usize) -> Self {
        self.steps.push(PathStep::Index(index));
        self
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                PathStep::Name(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathStep::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// Severity of a diagnostic entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A single operator-facing message
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    /// Set when the diagnostic is scoped to a configuration attribute
    pub attribute: Option<AttributePath>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn attribute_error(
        attribute: AttributePath,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: Some(attribute),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match &self.attribute {
            Some(path) => write!(f, "{} [{}]: {}: {}", severity, path, self.summary, self.detail),
            None => write!(f, "{}: {}: {}", severity, self.summary, self.detail),
        }
    }
}

/// Collection of diagnostics produced by one operation
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn add_error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Diagnostic::error(summary, detail));
    }

    pub fn add_warning(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Diagnostic::warning(summary, detail));
    }

    pub fn add_attribute_error(
        &mut self,
        attribute: AttributePath,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.push(Diagnostic::attribute_error(attribute, summary, detail));
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_path_display() {
        let path = AttributePath::root("shard_placements")
            .index(2)
            .name("replica_availability_zones");
        assert_eq!(path.to_string(), "shard_placements[2].replica_availability_zones");
    }

    #[test]
    fn has_errors_ignores_warnings() {
        let mut diags = Diagnostics::new();
        diags.add_warning("Provisional", "update path is provisional");
        assert!(!diags.has_errors());

        diags.add_attribute_error(AttributePath::root("name"), "Missing required value", "required");
        assert!(diags.has_errors());
        assert_eq!(diags.warnings().count(), 1);
    }
}
