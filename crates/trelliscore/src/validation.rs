use serde::{Deserialize, Serialize};

/// One validation finding tied to a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub node_id: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            message: message.into(),
        }
    }
}

/// Aggregated outcome of validating a node or a whole document.
/// Errors are blocking, warnings advisory; nothing is executed either way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, node_id: &str, message: impl Into<String>) {
        self.errors.push(ValidationIssue::new(node_id, message));
    }

    pub fn warn(&mut self, node_id: &str, message: impl Into<String>) {
        self.warnings.push(ValidationIssue::new(node_id, message));
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}
