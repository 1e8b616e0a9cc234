//! Core data model for the trellis flow engine
//!
//! This crate provides the document, value and execution-state types that
//! all other components depend on. It has no runtime dependencies.

mod context;
mod document;
mod error;
mod log;
pub mod rules;
pub mod template;
mod validation;
mod value;

pub use context::{
    reserved, resolve_input, ConditionContext, ExecutionContext, ExecutionId, ExecutionStatus,
    LoopContext, NodeExecutionResult,
};
pub use document::{
    kind, ErrorPolicy, FlowDocument, FlowNode, FlowSettings, InputValue, NodeData,
};
pub use error::{ExecError, FlowError};
pub use log::{ExecutionLog, LogEntry, LogLevel};
pub use validation::{ValidationIssue, ValidationReport};
pub use value::Value;

/// Result type for flow operations
pub type Result<T> = std::result::Result<T, FlowError>;
