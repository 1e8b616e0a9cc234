//! Flow execution runtime
//!
//! This crate provides the interpreter that walks flow documents: the
//! node executor contract, the kind registry, the recursive walker and
//! the orchestrating engine.

mod contract;
mod engine;
mod registry;
mod walker;

pub use contract::NodeExecutor;
pub use engine::{EngineConfig, FlowEngine, FlowExecutionResult};
pub use registry::NodeRegistry;
pub use walker::Walker;
