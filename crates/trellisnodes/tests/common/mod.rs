#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use trelliscore::{ExecError, ExecutionContext, ExecutionLog, FlowNode, Value};
use trellisnodes::{register_defaults, ActionRequest, ActionService, NoActionService};
use trellisruntime::{FlowEngine, NodeExecutor, NodeRegistry, Walker};

pub fn engine() -> FlowEngine {
    engine_with_actions(Arc::new(NoActionService))
}

pub fn engine_with_actions(actions: Arc<dyn ActionService>) -> FlowEngine {
    let mut registry = NodeRegistry::new();
    register_defaults(&mut registry, actions);
    FlowEngine::new(Arc::new(registry))
}

/// Engine with an extra "record" kind that appends its resolved 'value'
/// input to a shared list; used to observe visit order.
pub fn engine_with_recorder() -> (FlowEngine, Arc<Mutex<Vec<Value>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut registry = NodeRegistry::new();
    register_defaults(&mut registry, Arc::new(NoActionService));
    registry.register(Arc::new(RecorderExecutor { seen: seen.clone() }));
    (FlowEngine::new(Arc::new(registry)), seen)
}

pub struct RecorderExecutor {
    pub seen: Arc<Mutex<Vec<Value>>>,
}

#[async_trait]
impl NodeExecutor for RecorderExecutor {
    fn kind(&self) -> &str {
        "record"
    }

    async fn execute(
        &self,
        node: &FlowNode,
        ctx: &mut ExecutionContext,
        _walker: &Walker,
        _log: &mut ExecutionLog,
    ) -> Result<Value, ExecError> {
        let value = node
            .data
            .inputs
            .get("value")
            .map(|input| ctx.resolve(input))
            .unwrap_or(Value::Null);
        self.seen.lock().unwrap().push(value);
        Ok(Value::Null)
    }
}

/// Action collaborator stub that records requests and answers with a
/// fixed payload
pub struct RecordingActionService {
    pub requests: Mutex<Vec<ActionRequest>>,
    pub response: Value,
}

impl RecordingActionService {
    pub fn new(response: Value) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            response,
        }
    }
}

#[async_trait]
impl ActionService for RecordingActionService {
    async fn execute_action(&self, request: ActionRequest) -> Result<Value, ExecError> {
        self.requests.lock().unwrap().push(request);
        Ok(self.response.clone())
    }
}
