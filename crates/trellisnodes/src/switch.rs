use async_trait::async_trait;
use std::collections::HashMap;
use trelliscore::{
    kind, template, ConditionContext, ExecError, ExecutionContext, ExecutionLog, FlowNode,
    ValidationReport, Value,
};
use trellisruntime::{NodeExecutor, Walker};

/// Multi-way branch. Renders its expression against the variables, then
/// compares the value to each case child's declared value in authored
/// order; the first match wins. With no match the single default-case
/// child runs if present, otherwise nothing runs and a warning is logged.
pub struct SwitchExecutor;

impl SwitchExecutor {
    fn pick_branch<'a>(node: &'a FlowNode, value: &Value) -> Option<&'a FlowNode> {
        node.children
            .iter()
            .filter(|c| c.kind == kind::CASE)
            .find(|case| {
                let declared = case.data.fields.get("value").cloned().unwrap_or(Value::Null);
                template::values_match(value, &declared)
            })
            .or_else(|| node.child_of_kind(kind::DEFAULT_CASE))
    }
}

#[async_trait]
impl NodeExecutor for SwitchExecutor {
    fn kind(&self) -> &str {
        kind::SWITCH
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
        let expression = node
            .field_str("expression")
            .ok_or_else(|| ExecError::missing_field(&node.id, "expression"))?;
        let value = template::render(expression, &ctx.variables);

        let chosen = Self::pick_branch(node, &value);
        let mut data = HashMap::from([("value".to_string(), value.clone())]);

        match chosen {
            Some(branch) => {
                log.debug(
                    &node.id,
                    format!("switch matched '{}' branch '{}'", value.display_string(), branch.id),
                );
                ctx.condition_stack.push(ConditionContext {
                    node_id: node.id.clone(),
                    branch: Some(branch.id.clone()),
                });
                let outcome = walker.visit(branch, ctx, log).await;
                ctx.condition_stack.pop();
                outcome?;
                data.insert("matched".to_string(), Value::String(branch.id.clone()));
            }
            None => {
                log.warn(
                    &node.id,
                    format!(
                        "no case matched '{}' and no default-case present",
                        value.display_string()
                    ),
                );
                data.insert("matched".to_string(), Value::Null);
            }
        }

        Ok(Value::Object(data))
    }

    fn validate_kind(&self, node: &FlowNode, report: &mut ValidationReport) {
        if node.field_str("expression").map_or(true, str::is_empty) {
            report.error(&node.id, "switch requires a non-empty 'expression' field");
        }
        if node.children_of_kind(kind::DEFAULT_CASE).len() > 1 {
            report.error(&node.id, "switch permits at most one default-case child");
        }
    }
}

/// One switch arm; selected by its parent, never by itself
pub struct CaseExecutor;

#[async_trait]
impl NodeExecutor for CaseExecutor {
    fn kind(&self) -> &str {
        kind::CASE
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

    fn validate_kind(&self, node: &FlowNode, report: &mut ValidationReport) {
        if !node.data.fields.contains_key("value") {
            report.warn(&node.id, "case without a 'value' field only matches null");
        }
    }
}
