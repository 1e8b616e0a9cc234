use async_trait::async_trait;
use std::collections::HashMap;
use trelliscore::{
    kind, reserved, resolve_input, template, ExecError, ExecutionContext, ExecutionLog, FlowNode,
    ValidationReport, Value,
};
use trellisruntime::{NodeExecutor, Walker};

/// Exception-handling construct. Runs its single try-block; on failure
/// offers the error to each catch-block in authored order, evaluating the
/// guard condition against a transient variable view holding an `error`
/// descriptor. The first catch whose guard is true runs instead; no match
/// (or a failing handler) re-propagates the original failure.
pub struct TryCatchExecutor;

impl TryCatchExecutor {
    fn error_descriptor(err: &ExecError, node_id: Option<&str>) -> Value {
        Value::Object(HashMap::from([
            ("message".to_string(), Value::String(err.to_string())),
            (
                "node".to_string(),
                node_id.map_or(Value::Null, |id| Value::String(id.to_string())),
            ),
        ]))
    }

    /// Guard evaluation never mutates the real context: the condition is
    /// resolved against a cloned variable view with the error merged in.
    fn guard_matches(catch: &FlowNode, ctx: &ExecutionContext, descriptor: &Value) -> bool {
        let Some(input) = catch.data.inputs.get("condition") else {
            return true; // no guard means catch-all
        };
        let mut view = ctx.variables.clone();
        view.insert(reserved::ERROR.to_string(), descriptor.clone());
        let mut value = resolve_input(input, &view, &ctx.results);
        if let Value::String(s) = &value {
            value = template::render(s, &view);
        }
        template::truthy(&value)
    }
}

#[async_trait]
impl NodeExecutor for TryCatchExecutor {
    fn kind(&self) -> &str {
        kind::TRY_CATCH
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
        let try_block = node
            .child_of_kind(kind::TRY_BLOCK)
            .ok_or_else(|| ExecError::invalid_input(&node.id, "missing try-block child"))?;

        let original = match walker.visit(try_block, ctx, log).await {
            Ok(()) => {
                return Ok(Value::Object(HashMap::from([
                    ("caught".to_string(), Value::Bool(false)),
                    ("handled_by".to_string(), Value::Null),
                ])))
            }
            Err(err) => err,
        };

        let failed_node = ctx.current_node.clone();
        let descriptor = Self::error_descriptor(&original, failed_node.as_deref());
        log.warn(
            &node.id,
            format!("try-block failed ({}), offering to catch blocks", original),
        );

        for catch in node.children_of_kind(kind::CATCH_BLOCK) {
            if !Self::guard_matches(catch, ctx, &descriptor) {
                continue;
            }

            // the handler subtree sees the error descriptor as a scoped
            // variable, removed again on both outcomes
            ctx.set_variable(reserved::ERROR, descriptor.clone());
            let handled = walker.visit(catch, ctx, log).await;
            ctx.variables.remove(reserved::ERROR);

            return match handled {
                Ok(()) => Ok(Value::Object(HashMap::from([
                    ("caught".to_string(), Value::Bool(true)),
                    ("handled_by".to_string(), Value::String(catch.id.clone())),
                ]))),
                Err(handler_err) => {
                    log.error(
                        &node.id,
                        format!(
                            "catch block '{}' failed ({}), propagating original failure",
                            catch.id, handler_err
                        ),
                    );
                    Err(original)
                }
            };
        }

        log.warn(&node.id, "no catch block matched, propagating failure");
        Err(original)
    }

    fn validate_kind(&self, node: &FlowNode, report: &mut ValidationReport) {
        if node.children_of_kind(kind::TRY_BLOCK).len() > 1 {
            report.error(&node.id, "try-catch permits exactly one try-block child");
        }
        if node.children_of_kind(kind::CATCH_BLOCK).is_empty() {
            report.warn(&node.id, "try-catch without catch blocks only re-propagates");
        }
    }
}
