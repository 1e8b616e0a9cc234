use crate::{InputValue, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

pub type ExecutionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
}

/// Mutable state owned by one execute_flow call. The variable mapping is
/// shared across the whole recursive walk so later siblings and
/// descendants can read what earlier nodes wrote.
#[derive(Debug)]
pub struct ExecutionContext {
    pub execution_id: ExecutionId,
    pub variables: HashMap<String, Value>,
    pub results: HashMap<String, NodeExecutionResult>,
    pub current_node: Option<String>,
    pub status: ExecutionStatus,
    pub loop_stack: Vec<LoopContext>,
    pub condition_stack: Vec<ConditionContext>,
}

impl ExecutionContext {
    pub fn new(variables: HashMap<String, Value>) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            variables,
            results: HashMap::new(),
            current_node: None,
            status: ExecutionStatus::Running,
            loop_stack: Vec::new(),
            condition_stack: Vec::new(),
        }
    }

    /// Resolve an input against the current variables and prior results.
    pub fn resolve(&self, input: &InputValue) -> Value {
        resolve_input(input, &self.variables, &self.results)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Innermost loop frame, if the walk is currently inside a loop body.
    pub fn current_loop_mut(&mut self) -> Option<&mut LoopContext> {
        self.loop_stack.last_mut()
    }
}

/// Pure input resolution, usable against a transient variable view
/// (try-catch guards evaluate against one).
pub fn resolve_input(
    input: &InputValue,
    variables: &HashMap<String, Value>,
    results: &HashMap<String, NodeExecutionResult>,
) -> Value {
    match input {
        InputValue::Constant { value } => value.clone(),
        InputValue::Variable { name } => variables
            .get(name)
            .cloned()
            .unwrap_or_else(|| Value::String(name.clone())),
        InputValue::Reference { node_id, path } => results
            .get(node_id)
            .and_then(|r| r.data.as_ref())
            .and_then(|data| {
                if path.is_empty() {
                    Some(data)
                } else {
                    data.get_path(path)
                }
            })
            .cloned()
            .unwrap_or(Value::Null),
    }
}

/// Outcome of one visited node, keyed by node id in the results map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeExecutionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
    pub kind: String,
}

impl NodeExecutionResult {
    pub fn success(kind: &str, data: Value, duration_ms: u64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            duration_ms,
            timestamp: Utc::now(),
            kind: kind.to_string(),
        }
    }

    pub fn failure(kind: &str, error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            duration_ms,
            timestamp: Utc::now(),
            kind: kind.to_string(),
        }
    }
}

/// Per-loop bookkeeping frame. Pushed entering a loop node, popped on the
/// way out regardless of success or failure. The break flag is set by the
/// break node and checked between iterations.
#[derive(Debug, Clone)]
pub struct LoopContext {
    pub node_id: String,
    pub items: Vec<Value>,
    pub index: usize,
    pub current_item: Value,
    pub break_requested: bool,
}

impl LoopContext {
    pub fn new(node_id: impl Into<String>, items: Vec<Value>) -> Self {
        Self {
            node_id: node_id.into(),
            items,
            index: 0,
            current_item: Value::Null,
            break_requested: false,
        }
    }
}

/// Branch bookkeeping pushed by switch/if around the chosen subtree
#[derive(Debug, Clone)]
pub struct ConditionContext {
    pub node_id: String,
    /// Id of the branch child that was selected, None when nothing ran
    pub branch: Option<String>,
}

/// Reserved, engine-managed variable names with scope-bound lifetimes
pub mod reserved {
    /// Zero-based index of the current loop iteration
    pub const LOOP_INDEX: &str = "loop.index";
    /// Item of the current loop iteration
    pub const LOOP_ITEM: &str = "loop.item";
    /// Name of the agent component phase currently running
    pub const AGENT_PHASE: &str = "agent.phase";
    /// Error descriptor offered to catch-block guards
    pub const ERROR: &str = "error";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InputValue;

    #[test]
    fn constant_resolves_verbatim() {
        let ctx = ExecutionContext::new(HashMap::new());
        let v = ctx.resolve(&InputValue::constant(7i64));
        assert_eq!(v, Value::Number(7.0));
    }

    #[test]
    fn variable_falls_back_to_raw_name() {
        let mut vars = HashMap::new();
        vars.insert("known".to_string(), Value::Bool(true));
        let ctx = ExecutionContext::new(vars);

        assert_eq!(ctx.resolve(&InputValue::variable("known")), Value::Bool(true));
        assert_eq!(
            ctx.resolve(&InputValue::variable("unknown")),
            Value::String("unknown".to_string())
        );
    }

    #[test]
    fn reference_traverses_dotted_path() {
        let mut ctx = ExecutionContext::new(HashMap::new());
        let data = Value::Object(HashMap::from([(
            "user".to_string(),
            Value::Object(HashMap::from([(
                "name".to_string(),
                Value::String("ada".to_string()),
            )])),
        )]));
        ctx.results.insert(
            "n1".to_string(),
            NodeExecutionResult::success("template", data, 1),
        );

        assert_eq!(
            ctx.resolve(&InputValue::reference("n1", "user.name")),
            Value::String("ada".to_string())
        );
        assert_eq!(ctx.resolve(&InputValue::reference("n1", "user.age")), Value::Null);
        assert_eq!(ctx.resolve(&InputValue::reference("missing", "x")), Value::Null);
    }
}
