use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Execution error: {0}")]
    Exec(#[from] ExecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure raised while executing one node. Propagates up the branch it
/// occurred in unless an enclosing try-catch intercepts it.
#[derive(Error, Debug, Clone)]
pub enum ExecError {
    #[error("No executor registered for kind '{0}'")]
    UnsupportedKind(String),

    #[error("Node '{node}' is missing required field '{field}'")]
    MissingField { node: String, field: String },

    #[error("Invalid input on node '{node}': {message}")]
    InvalidInput { node: String, message: String },

    #[error("Action invocation failed: {0}")]
    Action(String),

    #[error("Execution failed: {0}")]
    Failed(String),

    #[error("Execution cancelled")]
    Cancelled,

    #[error("Execution deadline exceeded")]
    TimedOut,
}

impl ExecError {
    pub fn missing_field(node: &str, field: &str) -> Self {
        ExecError::MissingField {
            node: node.to_string(),
            field: field.to_string(),
        }
    }

    pub fn invalid_input(node: &str, message: impl Into<String>) -> Self {
        ExecError::InvalidInput {
            node: node.to_string(),
            message: message.into(),
        }
    }
}
