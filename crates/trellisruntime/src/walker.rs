use crate::NodeRegistry;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use trelliscore::{ExecError, ExecutionContext, ExecutionLog, FlowNode, NodeExecutionResult, Value};

/// Depth-first recursive visitor over one node subtree.
///
/// Visits are strictly sequential: later siblings and descendants may
/// read variables and results written by earlier ones. The cancellation
/// token and deadline are checked before every visit (executors also
/// check them before each loop iteration).
pub struct Walker {
    registry: Arc<NodeRegistry>,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl Walker {
    pub fn new(
        registry: Arc<NodeRegistry>,
        cancel: CancellationToken,
        deadline: Option<Instant>,
    ) -> Self {
        Self {
            registry,
            cancel,
            deadline,
        }
    }

    /// Error out when the run was cancelled or the deadline passed.
    pub fn check_interrupted(&self) -> Result<(), ExecError> {
        if self.cancel.is_cancelled() {
            return Err(ExecError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(ExecError::TimedOut);
            }
        }
        Ok(())
    }

    /// Visit one node: dispatch to its executor, record the timed result
    /// under the node id, then walk its children in authored order unless
    /// the executor handles them itself. A failure is recorded and then
    /// propagated so the rest of the branch is skipped.
    pub fn visit<'a>(
        &'a self,
        node: &'a FlowNode,
        ctx: &'a mut ExecutionContext,
        log: &'a mut ExecutionLog,
    ) -> BoxFuture<'a, Result<(), ExecError>> {
        Box::pin(async move {
            self.check_interrupted()?;
            ctx.current_node = Some(node.id.clone());

            let Some(executor) = self.registry.get(&node.kind) else {
                let err = ExecError::UnsupportedKind(node.kind.clone());
                log.error(&node.id, err.to_string());
                ctx.results.insert(
                    node.id.clone(),
                    NodeExecutionResult::failure(&node.kind, err.to_string(), 0),
                );
                return Err(err);
            };

            log.debug(&node.id, format!("executing '{}' node", node.kind));
            let started = Instant::now();
            let outcome = executor.execute(node, ctx, self, log).await;
            let duration_ms = started.elapsed().as_millis() as u64;

            match outcome {
                Ok(data) => {
                    let data = merge_output_defaults(node, data);
                    log.info(
                        &node.id,
                        format!("'{}' completed in {}ms", node.kind, duration_ms),
                    );
                    ctx.results.insert(
                        node.id.clone(),
                        NodeExecutionResult::success(&node.kind, data, duration_ms),
                    );
                    if !executor.handles_children() {
                        self.visit_all(&node.children, ctx, log).await?;
                    }
                    Ok(())
                }
                Err(err) => {
                    log.error(&node.id, format!("'{}' failed: {}", node.kind, err));
                    ctx.results.insert(
                        node.id.clone(),
                        NodeExecutionResult::failure(&node.kind, err.to_string(), duration_ms),
                    );
                    Err(err)
                }
            }
        })
    }

    /// Visit a slice of nodes sequentially, stopping at the first failure.
    pub async fn visit_all(
        &self,
        nodes: &[FlowNode],
        ctx: &mut ExecutionContext,
        log: &mut ExecutionLog,
    ) -> Result<(), ExecError> {
        for node in nodes {
            self.visit(node, ctx, log).await?;
        }
        Ok(())
    }
}

/// Fill keys from the node's declared output schema that the executor did
/// not produce. A null payload with a non-empty schema becomes the schema
/// defaults outright.
fn merge_output_defaults(node: &FlowNode, data: Value) -> Value {
    if node.data.outputs.is_empty() {
        return data;
    }
    match data {
        Value::Null => Value::Object(node.data.outputs.clone()),
        Value::Object(mut map) => {
            for (key, default) in &node.data.outputs {
                map.entry(key.clone()).or_insert_with(|| default.clone());
            }
            Value::Object(map)
        }
        other => other,
    }
}
