use async_trait::async_trait;
use std::collections::HashMap;
use trelliscore::{
    kind, template, ExecError, ExecutionContext, ExecutionLog, FlowNode, ValidationReport, Value,
};
use trellisruntime::{NodeExecutor, Walker};

/// Entry marker: the engine starts the walk at every top-level node of
/// this kind. Runs nothing of its own.
pub struct StartExecutor;

#[async_trait]
impl NodeExecutor for StartExecutor {
    fn kind(&self) -> &str {
        kind::START
    }

    async fn execute(
        &self,
        node: &FlowNode,
        _ctx: &mut ExecutionContext,
        _walker: &Walker,
        log: &mut ExecutionLog,
    ) -> Result<Value, ExecError> {
        log.debug(&node.id, "flow entry");
        Ok(Value::Null)
    }
}

/// Terminal marker
pub struct EndExecutor;

#[async_trait]
impl NodeExecutor for EndExecutor {
    fn kind(&self) -> &str {
        kind::END
    }

    async fn execute(
        &self,
        node: &FlowNode,
        _ctx: &mut ExecutionContext,
        _walker: &Walker,
        log: &mut ExecutionLog,
    ) -> Result<Value, ExecError> {
        log.debug(&node.id, "flow exit");
        Ok(Value::Null)
    }
}

/// Writes a resolved input into the shared variable mapping
pub struct SetVariableExecutor;

#[async_trait]
impl NodeExecutor for SetVariableExecutor {
    fn kind(&self) -> &str {
        kind::SET_VARIABLE
    }

    async fn execute(
        &self,
        node: &FlowNode,
        ctx: &mut ExecutionContext,
        _walker: &Walker,
        _log: &mut ExecutionLog,
    ) -> Result<Value, ExecError> {
        let name = node
            .field_str("name")
            .ok_or_else(|| ExecError::missing_field(&node.id, "name"))?
            .to_string();
        let input = node
            .data
            .inputs
            .get("value")
            .ok_or_else(|| ExecError::missing_field(&node.id, "value"))?;
        let value = ctx.resolve(input);
        ctx.set_variable(name.clone(), value.clone());

        Ok(Value::Object(HashMap::from([
            ("name".to_string(), Value::String(name)),
            ("value".to_string(), value),
        ])))
    }

    fn validate_kind(&self, node: &FlowNode, report: &mut ValidationReport) {
        if node.field_str("name").map_or(true, str::is_empty) {
            report.error(&node.id, "set-variable requires a non-empty 'name' field");
        }
        if !node.data.inputs.contains_key("value") {
            report.error(&node.id, "set-variable requires a 'value' input");
        }
    }
}

/// Leaf compute node: resolves all of its inputs into one object and,
/// when a 'template' field is present, renders it against the variables
/// under the 'text' key.
pub struct TemplateExecutor;

#[async_trait]
impl NodeExecutor for TemplateExecutor {
    fn kind(&self) -> &str {
        kind::TEMPLATE
    }

    async fn execute(
        &self,
        node: &FlowNode,
        ctx: &mut ExecutionContext,
        _walker: &Walker,
        _log: &mut ExecutionLog,
    ) -> Result<Value, ExecError> {
        let mut data: HashMap<String, Value> = node
            .data
            .inputs
            .iter()
            .map(|(name, input)| (name.clone(), ctx.resolve(input)))
            .collect();

        if let Some(text) = node.field_str("template") {
            data.insert("text".to_string(), template::render(text, &ctx.variables));
        }

        Ok(Value::Object(data))
    }

    fn validate_kind(&self, node: &FlowNode, report: &mut ValidationReport) {
        if node.data.inputs.is_empty() && node.field_str("template").is_none() {
            report.warn(&node.id, "template node has no inputs and no template field");
        }
    }
}

/// Shared executor for marker kinds: branch arms and blocks selected by a
/// control-flow parent. They carry no selection logic of their own; their
/// children run under the walker's default policy.
pub struct PassThroughExecutor {
    kind: &'static str,
}

impl PassThroughExecutor {
    pub fn new(kind: &'static str) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl NodeExecutor for PassThroughExecutor {
    fn kind(&self) -> &str {
        self.kind
    }

    async fn execute(
        &self,
        _node: &FlowNode,
        _ctx: &mut ExecutionContext,
        _walker: &Walker,
        _log: &mut ExecutionLog,
    ) -> Result<Value, ExecError> {
        Ok(Value::Null)
    }
}
