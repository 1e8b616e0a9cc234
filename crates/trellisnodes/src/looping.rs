use async_trait::async_trait;
use std::collections::HashMap;
use trelliscore::{
    kind, reserved, ExecError, ExecutionContext, ExecutionLog, FlowNode, LoopContext,
    ValidationReport, Value,
};
use trellisruntime::{NodeExecutor, Walker};

/// Iterates its body subtree once per item of a resolved iterable.
///
/// A LoopContext frame is pushed around the iterations and popped on both
/// the success and the failure path, together with the reserved
/// `loop.index` / `loop.item` variables (restored to the enclosing loop's
/// values when nested). The break flag set by a descendant break node is
/// checked after every iteration, before the next one starts.
pub struct LoopExecutor;

impl LoopExecutor {
    async fn run_iterations(
        &self,
        node: &FlowNode,
        items: &[Value],
        ctx: &mut ExecutionContext,
        walker: &Walker,
        log: &mut ExecutionLog,
    ) -> Result<(usize, bool), ExecError> {
        let mut completed = 0;
        for (index, item) in items.iter().enumerate() {
            walker.check_interrupted()?;

            if let Some(frame) = ctx.current_loop_mut() {
                frame.index = index;
                frame.current_item = item.clone();
            }
            ctx.set_variable(reserved::LOOP_INDEX, Value::Number(index as f64));
            ctx.set_variable(reserved::LOOP_ITEM, item.clone());

            walker.visit_all(&node.children, ctx, log).await?;
            completed += 1;

            if ctx.loop_stack.last().is_some_and(|f| f.break_requested) {
                log.debug(&node.id, format!("break requested at iteration {}", index));
                return Ok((completed, true));
            }
        }
        Ok((completed, false))
    }

    /// Drop the loop frame and restore the reserved variables, either to
    /// the enclosing loop's values or by removing them entirely.
    fn cleanup(ctx: &mut ExecutionContext) {
        ctx.loop_stack.pop();
        match ctx.loop_stack.last() {
            Some(outer) => {
                let (index, item) = (outer.index, outer.current_item.clone());
                ctx.set_variable(reserved::LOOP_INDEX, Value::Number(index as f64));
                ctx.set_variable(reserved::LOOP_ITEM, item);
            }
            None => {
                ctx.variables.remove(reserved::LOOP_INDEX);
                ctx.variables.remove(reserved::LOOP_ITEM);
            }
        }
    }
}

#[async_trait]
impl NodeExecutor for LoopExecutor {
    fn kind(&self) -> &str {
        kind::LOOP
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
            .get("items")
            .ok_or_else(|| ExecError::missing_field(&node.id, "items"))?;
        let resolved = ctx.resolve(input);
        let items = match resolved {
            Value::Array(items) => items,
            other => {
                return Err(ExecError::invalid_input(
                    &node.id,
                    format!("iterable source must be an array, got {:?}", other),
                ))
            }
        };

        ctx.loop_stack
            .push(LoopContext::new(node.id.clone(), items.clone()));

        let outcome = self.run_iterations(node, &items, ctx, walker, log).await;
        Self::cleanup(ctx);
        let (iterations, broke) = outcome?;

        Ok(Value::Object(HashMap::from([
            ("iterations".to_string(), Value::Number(iterations as f64)),
            ("items".to_string(), Value::Number(items.len() as f64)),
            ("broke".to_string(), Value::Bool(broke)),
        ])))
    }

    fn validate_kind(&self, node: &FlowNode, report: &mut ValidationReport) {
        if !node.data.inputs.contains_key("items") {
            report.error(&node.id, "loop requires an 'items' iterable input");
        }
        if node.children.is_empty() {
            report.warn(&node.id, "loop has an empty body");
        }
    }
}

/// Signals the innermost enclosing loop to stop after the current
/// iteration completes
pub struct BreakExecutor;

#[async_trait]
impl NodeExecutor for BreakExecutor {
    fn kind(&self) -> &str {
        kind::BREAK
    }

    async fn execute(
        &self,
        node: &FlowNode,
        ctx: &mut ExecutionContext,
        _walker: &Walker,
        log: &mut ExecutionLog,
    ) -> Result<Value, ExecError> {
        match ctx.current_loop_mut() {
            Some(frame) => {
                frame.break_requested = true;
                log.debug(&node.id, "loop break requested");
            }
            None => log.warn(&node.id, "break executed outside of a loop, ignoring"),
        }
        Ok(Value::Null)
    }
}
