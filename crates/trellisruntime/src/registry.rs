use crate::NodeExecutor;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of executors keyed by node kind. Pre-populated by the caller
/// before the engine is built, so custom kinds can be added without
/// touching the engine.
#[derive(Default)]
pub struct NodeRegistry {
    executors: HashMap<String, Arc<dyn NodeExecutor>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an executor under its own kind. Re-registering a kind
    /// replaces the previous executor.
    pub fn register(&mut self, executor: Arc<dyn NodeExecutor>) {
        let kind = executor.kind().to_string();
        tracing::debug!("registering node kind: {}", kind);
        self.executors.insert(kind, executor);
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn NodeExecutor>> {
        self.executors.get(kind).cloned()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.executors.contains_key(kind)
    }

    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.executors.keys().cloned().collect();
        kinds.sort();
        kinds
    }
}
