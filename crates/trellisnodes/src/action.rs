use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use trelliscore::{
    kind, ExecError, ExecutionContext, ExecutionLog, FlowNode, ValidationReport, Value,
};
use trellisruntime::{NodeExecutor, Walker};

/// Request handed to the external action-invocation collaborator
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub action: String,
    pub parameters: HashMap<String, Value>,
    /// Reference to the credential the collaborator should use; never a
    /// raw secret
    pub auth_token: Option<String>,
}

/// External action-invocation service. Only the 'action' node kind talks
/// to it; the engine itself never does.
#[async_trait]
pub trait ActionService: Send + Sync {
    async fn execute_action(&self, request: ActionRequest) -> Result<Value, ExecError>;
}

/// Placeholder used when no collaborator is wired in; every invocation
/// fails with a clear message.
pub struct NoActionService;

#[async_trait]
impl ActionService for NoActionService {
    async fn execute_action(&self, request: ActionRequest) -> Result<Value, ExecError> {
        Err(ExecError::Action(format!(
            "no action service configured (requested action '{}')",
            request.action
        )))
    }
}

/// Leaf node that invokes the external action service with its resolved
/// inputs as parameters
pub struct ActionExecutor {
    service: Arc<dyn ActionService>,
}

impl ActionExecutor {
    pub fn new(service: Arc<dyn ActionService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl NodeExecutor for ActionExecutor {
    fn kind(&self) -> &str {
        kind::ACTION
    }

    async fn execute(
        &self,
        node: &FlowNode,
        ctx: &mut ExecutionContext,
        _walker: &Walker,
        log: &mut ExecutionLog,
    ) -> Result<Value, ExecError> {
        let action = node
            .field_str("action")
            .ok_or_else(|| ExecError::missing_field(&node.id, "action"))?
            .to_string();

        let parameters: HashMap<String, Value> = node
            .data
            .inputs
            .iter()
            .map(|(name, input)| (name.clone(), ctx.resolve(input)))
            .collect();

        let request = ActionRequest {
            action: action.clone(),
            parameters,
            auth_token: node.field_str("auth_token").map(str::to_string),
        };

        log.info(&node.id, format!("invoking action '{}'", action));
        self.service.execute_action(request).await
    }

    fn validate_kind(&self, node: &FlowNode, report: &mut ValidationReport) {
        if node.field_str("action").map_or(true, str::is_empty) {
            report.error(&node.id, "action node requires a non-empty 'action' field");
        }
    }
}
