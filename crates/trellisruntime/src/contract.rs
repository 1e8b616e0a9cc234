use crate::Walker;
use async_trait::async_trait;
use trelliscore::{
    rules, ExecError, ExecutionContext, ExecutionLog, FlowDocument, FlowNode, ValidationReport,
    Value,
};

/// Capability every node kind implements.
///
/// `execute` runs the node's own logic and returns its result payload;
/// the walker wraps it into a `NodeExecutionResult` with timing. Control
/// flow executors recurse into chosen subtrees through the walker and
/// report `handles_children() == true` so the engine does not re-visit
/// children on top of what they already walked.
#[async_trait]
pub trait NodeExecutor: Send + Sync {
    /// Kind identifier this executor is registered under (e.g. "switch")
    fn kind(&self) -> &str;

    async fn execute(
        &self,
        node: &FlowNode,
        ctx: &mut ExecutionContext,
        walker: &Walker,
        log: &mut ExecutionLog,
    ) -> Result<Value, ExecError>;

    /// True when execute() itself decides which children run
    fn handles_children(&self) -> bool {
        false
    }

    /// Structural + semantic self-check. Baseline checks always run; the
    /// relationship rules run when the full document is supplied;
    /// `validate_kind` adds kind-specific checks on top.
    fn validate(&self, node: &FlowNode, doc: Option<&FlowDocument>) -> ValidationReport {
        let mut report = ValidationReport::new();
        if node.id.trim().is_empty() {
            report.error(&node.id, "node id must not be empty");
        }
        if node.kind.trim().is_empty() {
            report.error(&node.id, "node kind must not be empty");
        } else if node.kind != self.kind() {
            report.error(
                &node.id,
                format!(
                    "node kind '{}' does not match executor kind '{}'",
                    node.kind,
                    self.kind()
                ),
            );
        }
        if let Some(doc) = doc {
            rules::check_relationships(node, doc, &mut report);
        }
        self.validate_kind(node, &mut report);
        report
    }

    /// Kind-specific validation hook (e.g. "loop requires an items input")
    fn validate_kind(&self, _node: &FlowNode, _report: &mut ValidationReport) {}
}
