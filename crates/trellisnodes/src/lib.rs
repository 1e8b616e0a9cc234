//! Built-in executor library
//!
//! One executor per node kind, registered through `register_defaults`.
//! Callers may register further kinds on the same registry before
//! handing it to the engine.

mod action;
mod agent;
mod basic;
mod conditional;
mod looping;
mod switch;
mod trycatch;

pub use action::{ActionExecutor, ActionRequest, ActionService, NoActionService};
pub use agent::{AgentExecutor, LlmExecutor, MemoryExecutor, ToolsExecutor};
pub use basic::{
    EndExecutor, PassThroughExecutor, SetVariableExecutor, StartExecutor, TemplateExecutor,
};
pub use conditional::IfExecutor;
pub use looping::{BreakExecutor, LoopExecutor};
pub use switch::{CaseExecutor, SwitchExecutor};
pub use trycatch::TryCatchExecutor;

use std::sync::Arc;
use trelliscore::kind;
use trellisruntime::NodeRegistry;

/// Register every built-in executor with a registry
pub fn register_defaults(registry: &mut NodeRegistry, actions: Arc<dyn ActionService>) {
    registry.register(Arc::new(StartExecutor));
    registry.register(Arc::new(EndExecutor));
    registry.register(Arc::new(SetVariableExecutor));
    registry.register(Arc::new(TemplateExecutor));
    registry.register(Arc::new(ActionExecutor::new(actions)));

    registry.register(Arc::new(SwitchExecutor));
    registry.register(Arc::new(CaseExecutor));
    registry.register(Arc::new(PassThroughExecutor::new(kind::DEFAULT_CASE)));

    registry.register(Arc::new(IfExecutor));
    registry.register(Arc::new(PassThroughExecutor::new(kind::TRUE_BRANCH)));
    registry.register(Arc::new(PassThroughExecutor::new(kind::FALSE_BRANCH)));

    registry.register(Arc::new(LoopExecutor));
    registry.register(Arc::new(BreakExecutor));

    registry.register(Arc::new(TryCatchExecutor));
    registry.register(Arc::new(PassThroughExecutor::new(kind::TRY_BLOCK)));
    registry.register(Arc::new(PassThroughExecutor::new(kind::CATCH_BLOCK)));

    registry.register(Arc::new(AgentExecutor));
    registry.register(Arc::new(LlmExecutor));
    registry.register(Arc::new(MemoryExecutor));
    registry.register(Arc::new(ToolsExecutor));
}
