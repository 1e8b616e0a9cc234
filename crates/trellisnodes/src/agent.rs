use async_trait::async_trait;
use std::collections::HashMap;
use trelliscore::{
    kind, reserved, rules, template, ExecError, ExecutionContext, ExecutionLog, FlowNode, Value,
};
use trellisruntime::{NodeExecutor, Walker};

/// Multi-part orchestration node. Components run in the canonical
/// llm -> memory -> tools order regardless of how they were authored,
/// each tagged with the current phase via the reserved `agent.phase`
/// variable. Partial results are folded into one composite object plus a
/// summary string.
pub struct AgentExecutor;

#[async_trait]
impl NodeExecutor for AgentExecutor {
    fn kind(&self) -> &str {
        kind::AGENT
    }

    fn handles_children(&self) -> bool {
        true
    }

    async fn execute(
        &self,
        node: &FlowNode,
        ctx: &mut ExecutionContext,
        walker: &Walker,
        log: &mut ExecutionLog,
    ) -> Result<Value, ExecError> {
        let ordered = rules::execution_order(kind::AGENT, &node.children);

        let mut components: HashMap<String, Value> = HashMap::new();
        let mut phases: Vec<String> = Vec::new();

        for component in ordered {
            log.debug(&node.id, format!("agent phase '{}'", component.kind));
            ctx.set_variable(reserved::AGENT_PHASE, Value::String(component.kind.clone()));

            if let Err(err) = walker.visit(component, ctx, log).await {
                ctx.variables.remove(reserved::AGENT_PHASE);
                return Err(err);
            }

            let partial = ctx
                .results
                .get(&component.id)
                .and_then(|r| r.data.clone())
                .unwrap_or(Value::Null);
            // key by component kind, falling back to the id when a kind
            // appears more than once
            let key = if components.contains_key(&component.kind) {
                component.id.clone()
            } else {
                component.kind.clone()
            };
            components.insert(key, partial);
            phases.push(component.kind.clone());
        }
        ctx.variables.remove(reserved::AGENT_PHASE);

        let label = node.data.title.as_deref().unwrap_or(&node.id);
        let summary = format!(
            "agent '{}' ran {} component(s): {}",
            label,
            phases.len(),
            phases.join(" -> ")
        );

        Ok(Value::Object(HashMap::from([
            ("components".to_string(), Value::Object(components)),
            ("summary".to_string(), Value::String(summary)),
        ])))
    }
}

/// Reasoning component: renders its prompt against the variables
pub struct LlmExecutor;

#[async_trait]
impl NodeExecutor for LlmExecutor {
    fn kind(&self) -> &str {
        kind::LLM
    }

    async fn execute(
        &self,
        node: &FlowNode,
        ctx: &mut ExecutionContext,
        _walker: &Walker,
        _log: &mut ExecutionLog,
    ) -> Result<Value, ExecError> {
        let prompt = node
            .data
            .inputs
            .get("prompt")
            .map(|input| ctx.resolve(input))
            .unwrap_or(Value::Null);
        let rendered = match &prompt {
            Value::String(s) => template::render(s, &ctx.variables),
            other => other.clone(),
        };

        Ok(Value::Object(HashMap::from([
            ("phase".to_string(), Value::String(kind::LLM.to_string())),
            ("prompt".to_string(), rendered),
        ])))
    }
}

/// Memory component: snapshots the requested variables (or the variable
/// count when no keys are given)
pub struct MemoryExecutor;

#[async_trait]
impl NodeExecutor for MemoryExecutor {
    fn kind(&self) -> &str {
        kind::MEMORY
    }

    async fn execute(
        &self,
        node: &FlowNode,
        ctx: &mut ExecutionContext,
        _walker: &Walker,
        _log: &mut ExecutionLog,
    ) -> Result<Value, ExecError> {
        let mut recalled: HashMap<String, Value> = HashMap::new();
        if let Some(keys) = node.data.inputs.get("keys").map(|i| ctx.resolve(i)) {
            if let Value::Array(names) = keys {
                for name in names.iter().filter_map(Value::as_str) {
                    if let Some(value) = ctx.variables.get(name) {
                        recalled.insert(name.to_string(), value.clone());
                    }
                }
            }
        }

        Ok(Value::Object(HashMap::from([
            ("phase".to_string(), Value::String(kind::MEMORY.to_string())),
            ("recalled".to_string(), Value::Object(recalled)),
            (
                "variable_count".to_string(),
                Value::Number(ctx.variables.len() as f64),
            ),
        ])))
    }
}

/// Tool component: resolves its inputs as tool parameters; actual tool
/// nodes nested beneath it run under the default child policy
pub struct ToolsExecutor;

#[async_trait]
impl NodeExecutor for ToolsExecutor {
    fn kind(&self) -> &str {
        kind::TOOLS
    }

    async fn execute(
        &self,
        node: &FlowNode,
        ctx: &mut ExecutionContext,
        _walker: &Walker,
        _log: &mut ExecutionLog,
    ) -> Result<Value, ExecError> {
        let parameters: HashMap<String, Value> = node
            .data
            .inputs
            .iter()
            .map(|(name, input)| (name.clone(), ctx.resolve(input)))
            .collect();

        Ok(Value::Object(HashMap::from([
            ("phase".to_string(), Value::String(kind::TOOLS.to_string())),
            ("parameters".to_string(), Value::Object(parameters)),
        ])))
    }
}
