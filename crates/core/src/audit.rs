//! Run audit trail — append-only observability records.
//!
//! Every delegation, sub-agent report, and termination can be recorded as an
//! [`AuditEntry`]. The trail is never consulted for control decisions; it
//! exists so a finished run can be inspected or serialized for debugging.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Success,
    Failed,
    Skipped,
}

/// One audited action in a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,

    /// Which agent performed the action ("orchestrator", "researcher", ...).
    pub agent: String,

    /// What happened ("delegated", "reported", "terminated", ...).
    pub action: String,

    /// The input that drove the action.
    pub input: serde_json::Value,

    /// The textual output, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    pub status: EntryStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditEntry {
    pub fn new(
        agent: impl Into<String>,
        action: impl Into<String>,
        input: serde_json::Value,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            agent: agent.into(),
            action: action.into(),
            input,
            output: None,
            status: EntryStatus::Success,
            error: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.status = EntryStatus::Failed;
        self.error = Some(error.into());
        self
    }

    pub fn skipped(mut self) -> Self {
        self.status = EntryStatus::Skipped;
        self
    }
}

/// The append-only audit trail for one workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunAudit {
    pub started_at: DateTime<Utc>,
    entries: Vec<AuditEntry>,
}

impl RunAudit {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, entry: AuditEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the whole trail as pretty JSON.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for RunAudit {
    fn default() -> Self {
        Self::new()
    }
}
