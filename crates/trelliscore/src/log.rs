use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// One entry of the execution trail returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub message: String,
}

/// Leveled, timestamped log trail for one execution. Entries are kept for
/// the caller and mirrored to `tracing` for live observation; nothing is
/// persisted by the engine.
#[derive(Debug, Default)]
pub struct ExecutionLog {
    entries: Vec<LogEntry>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: LogLevel, node_id: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Debug => tracing::debug!(node = node_id, "{}", message),
            LogLevel::Info => tracing::info!(node = node_id, "{}", message),
            LogLevel::Warn => tracing::warn!(node = node_id, "{}", message),
            LogLevel::Error => tracing::error!(node = node_id, "{}", message),
        }
        self.entries.push(LogEntry {
            timestamp: Utc::now(),
            level,
            node_id: node_id.map(str::to_string),
            message,
        });
    }

    pub fn debug(&mut self, node_id: &str, message: impl Into<String>) {
        self.push(LogLevel::Debug, Some(node_id), message);
    }

    pub fn info(&mut self, node_id: &str, message: impl Into<String>) {
        self.push(LogLevel::Info, Some(node_id), message);
    }

    pub fn warn(&mut self, node_id: &str, message: impl Into<String>) {
        self.push(LogLevel::Warn, Some(node_id), message);
    }

    pub fn error(&mut self, node_id: &str, message: impl Into<String>) {
        self.push(LogLevel::Error, Some(node_id), message);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }
}
