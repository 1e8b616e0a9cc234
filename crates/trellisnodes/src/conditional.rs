use async_trait::async_trait;
use std::collections::HashMap;
use trelliscore::{
    kind, template, ConditionContext, ExecError, ExecutionContext, ExecutionLog, FlowNode,
    ValidationReport, Value,
};
use trellisruntime::{NodeExecutor, Walker};

/// Two-way branch on a boolean condition. Exactly one of the labeled
/// branch children runs; when the needed branch is absent nothing runs
/// for that outcome.
pub struct IfExecutor;

#[async_trait]
impl NodeExecutor for IfExecutor {
    fn kind(&self) -> &str {
        kind::IF
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
        let input = node
            .data
            .inputs
            .get("condition")
            .ok_or_else(|| ExecError::missing_field(&node.id, "condition"))?;
        let mut value = ctx.resolve(input);
        // string conditions go through template substitution first
        if let Value::String(s) = &value {
            value = template::render(s, &ctx.variables);
        }
        let outcome = template::truthy(&value);

        let wanted = if outcome {
            kind::TRUE_BRANCH
        } else {
            kind::FALSE_BRANCH
        };
        let branch = node.child_of_kind(wanted);

        let mut data = HashMap::from([("condition".to_string(), Value::Bool(outcome))]);
        match branch {
            Some(block) => {
                log.debug(&node.id, format!("condition is {}, entering '{}'", outcome, block.id));
                ctx.condition_stack.push(ConditionContext {
                    node_id: node.id.clone(),
                    branch: Some(block.id.clone()),
                });
                let walked = walker.visit(block, ctx, log).await;
                ctx.condition_stack.pop();
                walked?;
                data.insert("branch".to_string(), Value::String(block.id.clone()));
            }
            None => {
                log.debug(
                    &node.id,
                    format!("condition is {} but no '{}' block exists", outcome, wanted),
                );
                data.insert("branch".to_string(), Value::Null);
            }
        }

        Ok(Value::Object(data))
    }

    fn validate_kind(&self, node: &FlowNode, report: &mut ValidationReport) {
        if !node.data.inputs.contains_key("condition") {
            report.error(&node.id, "if requires a 'condition' input");
        }
    }
}
