use crate::{NodeRegistry, Walker};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use trelliscore::{
    kind, ErrorPolicy, ExecutionContext, ExecutionId, ExecutionLog, ExecutionStatus, FlowDocument,
    FlowNode, LogLevel, NodeExecutionResult, ValidationReport, Value,
};

/// Orchestrates one document: validation, start-node discovery, and the
/// sequential depth-first walk.
pub struct FlowEngine {
    registry: Arc<NodeRegistry>,
    config: EngineConfig,
}

impl FlowEngine {
    pub fn new(registry: Arc<NodeRegistry>) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    pub fn with_config(registry: Arc<NodeRegistry>, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    /// Execute a document with the given input variables. Inputs win over
    /// the document's initial variables on conflicting keys. Failures
    /// never surface as Err: the returned result carries the success
    /// flag, error message and full log trail.
    pub async fn execute_flow(
        &self,
        doc: &FlowDocument,
        inputs: HashMap<String, Value>,
    ) -> FlowExecutionResult {
        self.execute_flow_with_cancel(doc, inputs, CancellationToken::new())
            .await
    }

    pub async fn execute_flow_with_cancel(
        &self,
        doc: &FlowDocument,
        inputs: HashMap<String, Value>,
        cancel: CancellationToken,
    ) -> FlowExecutionResult {
        let started = Instant::now();
        let mut variables = doc.variables.clone();
        variables.extend(inputs);

        let mut ctx = ExecutionContext::new(variables);
        let mut log = ExecutionLog::new();
        let execution_id = ctx.execution_id;
        tracing::info!(%execution_id, flow = %doc.name, "starting flow execution");

        let deadline = self.config.timeout.map(|t| started + t);
        let walker = Walker::new(self.registry.clone(), cancel, deadline);

        let start_nodes: Vec<&FlowNode> = doc
            .nodes
            .iter()
            .filter(|n| n.kind == kind::START)
            .collect();
        if start_nodes.is_empty() {
            log.push(
                LogLevel::Warn,
                None,
                "document has no start nodes, nothing to execute",
            );
        }

        let mut error: Option<String> = None;
        for root in start_nodes {
            if let Err(e) = walker.visit(root, &mut ctx, &mut log).await {
                if error.is_none() {
                    error = Some(e.to_string());
                }
                match doc.settings.on_error {
                    ErrorPolicy::ContinueOnError => {
                        log.warn(&root.id, "root failed, continuing with next start node");
                    }
                    ErrorPolicy::StopFlow => break,
                }
            }
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        let success = error.is_none();
        ctx.status = if success {
            ExecutionStatus::Completed
        } else {
            ExecutionStatus::Failed
        };
        tracing::info!(%execution_id, success, duration_ms, "flow execution finished");

        FlowExecutionResult {
            success,
            execution_id,
            duration_ms,
            results: ctx.results,
            final_variables: ctx.variables,
            error,
            logs: log.into_entries(),
        }
    }

    /// Whole-document structural validation: non-empty, unique ids, every
    /// node's executor self-check with the full document for relationship
    /// rules. Runs nothing and is pure.
    pub fn validate_document(&self, doc: &FlowDocument) -> ValidationReport {
        let mut report = ValidationReport::new();
        if doc.nodes.is_empty() {
            report.error("", "document contains no nodes");
        }

        let all = doc.all_nodes();
        let mut seen: HashSet<&str> = HashSet::new();
        for node in &all {
            if !seen.insert(node.id.as_str()) {
                report.error(&node.id, "duplicate node id");
            }
        }

        for node in &all {
            match self.registry.get(&node.kind) {
                Some(executor) => report.merge(executor.validate(node, Some(doc))),
                None => report.error(
                    &node.id,
                    format!("no executor registered for kind '{}'", node.kind),
                ),
            }
        }
        report
    }
}

/// Engine-level configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Wall-clock budget for one execute_flow call, checked before every
    /// node visit and loop iteration
    pub timeout: Option<Duration>,
}

/// Aggregated outcome of one execute_flow call
#[derive(Debug, Clone, Serialize)]
pub struct FlowExecutionResult {
    pub success: bool,
    pub execution_id: ExecutionId,
    pub duration_ms: u64,
    pub results: HashMap<String, NodeExecutionResult>,
    pub final_variables: HashMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub logs: Vec<trelliscore::LogEntry>,
}

impl FlowExecutionResult {
    pub fn result_for(&self, node_id: &str) -> Option<&NodeExecutionResult> {
        self.results.get(node_id)
    }
}
