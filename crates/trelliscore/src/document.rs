use crate::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete flow document: a forest of node trees plus initial variables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowDocument {
    #[serde(default)]
    pub name: String,
    pub nodes: Vec<FlowNode>,
    #[serde(default)]
    pub variables: HashMap<String, Value>,
    #[serde(default)]
    pub settings: FlowSettings,
}

impl FlowDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_node(&mut self, node: FlowNode) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Depth-first flattening of the whole forest, parents before children.
    pub fn all_nodes(&self) -> Vec<&FlowNode> {
        let mut out = Vec::new();
        for node in &self.nodes {
            node.collect(&mut out);
        }
        out
    }

    pub fn find_node(&self, id: &str) -> Option<&FlowNode> {
        self.all_nodes().into_iter().find(|n| n.id == id)
    }

    /// Parent of the node with the given id, None for top-level nodes.
    pub fn find_parent(&self, id: &str) -> Option<&FlowNode> {
        self.all_nodes()
            .into_iter()
            .find(|n| n.children.iter().any(|c| c.id == id))
    }
}

/// One node in the tree: a kind, its data, and nested children
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    pub kind: String,
    #[serde(default)]
    pub data: NodeData,
    #[serde(default)]
    pub children: Vec<FlowNode>,
}

impl FlowNode {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            data: NodeData::default(),
            children: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.data.title = Some(title.into());
        self
    }

    pub fn with_input(mut self, name: impl Into<String>, input: InputValue) -> Self {
        self.data.inputs.insert(name.into(), input);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_output(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.data.outputs.insert(name.into(), default.into());
        self
    }

    pub fn with_child(mut self, child: FlowNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.data.fields.get(name).and_then(|v| v.as_str())
    }

    pub fn children_of_kind(&self, kind: &str) -> Vec<&FlowNode> {
        self.children.iter().filter(|c| c.kind == kind).collect()
    }

    pub fn child_of_kind(&self, kind: &str) -> Option<&FlowNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a FlowNode>) {
        out.push(self);
        for child in &self.children {
            child.collect(out);
        }
    }
}

/// Kind-specific payload of a node
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Resolvable values (constants, variable lookups, result references)
    #[serde(default)]
    pub inputs: HashMap<String, InputValue>,
    /// Output schema; defaults merged into missing result keys
    #[serde(default)]
    pub outputs: HashMap<String, Value>,
    /// Plain kind-specific configuration (switch expression, case value, ...)
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

/// How a node input obtains its runtime value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InputValue {
    /// Literal payload, returned verbatim
    Constant { value: Value },
    /// Lookup by name in the variable mapping; the raw name string is the
    /// fallback when the variable is absent
    Variable { name: String },
    /// Dotted-path lookup into a previously produced node result
    Reference { node_id: String, path: String },
}

impl InputValue {
    pub fn constant(value: impl Into<Value>) -> Self {
        InputValue::Constant {
            value: value.into(),
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        InputValue::Variable { name: name.into() }
    }

    pub fn reference(node_id: impl Into<String>, path: impl Into<String>) -> Self {
        InputValue::Reference {
            node_id: node_id.into(),
            path: path.into(),
        }
    }
}

/// Global document settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowSettings {
    #[serde(default)]
    pub on_error: ErrorPolicy,
}

/// What to do when a start root fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop the whole flow on the first failed root (default)
    #[default]
    StopFlow,
    /// Record the failure and move on to the next start root
    ContinueOnError,
}

/// Well-known node kinds handled by the built-in executor library.
/// The registry is string-keyed, so callers may add kinds beyond these.
pub mod kind {
    pub const START: &str = "start";
    pub const END: &str = "end";
    pub const SET_VARIABLE: &str = "set-variable";
    pub const TEMPLATE: &str = "template";
    pub const ACTION: &str = "action";

    pub const SWITCH: &str = "switch";
    pub const CASE: &str = "case";
    pub const DEFAULT_CASE: &str = "default-case";

    pub const IF: &str = "if";
    pub const TRUE_BRANCH: &str = "true-branch";
    pub const FALSE_BRANCH: &str = "false-branch";

    pub const LOOP: &str = "loop";
    pub const BREAK: &str = "break";

    pub const TRY_CATCH: &str = "try-catch";
    pub const TRY_BLOCK: &str = "try-block";
    pub const CATCH_BLOCK: &str = "catch-block";

    pub const AGENT: &str = "agent";
    pub const LLM: &str = "llm";
    pub const MEMORY: &str = "memory";
    pub const TOOLS: &str = "tools";
}
