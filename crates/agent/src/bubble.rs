//! Sub-agent execution bubbles.
//!
//! A bubble gives one sub-agent an isolated, bounded-lifetime state for one
//! delegated task: a fresh log seeded with the formatted task, sharing no
//! structure with the parent conversation. Whatever happens inside — success,
//! tool failures, budget exhaustion, even a provider error — the bubble
//! reports back exactly one Tool message paired with the delegation's
//! originating call id. The orchestrator always receives a response; an
//! unpaired conversation is never produced.

use covey_core::message::{ConversationLog, Message};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::react::{SubAgentOutcome, SubAgentRunner};
use crate::router::Delegation;

/// Format delegation arguments into a single human-readable task string.
///
/// Keys are sorted so the serialization is stable regardless of how the
/// arguments were produced; JSON null renders as `None`.
pub fn format_task(arguments: &Map<String, Value>) -> String {
    let mut keys: Vec<&String> = arguments.keys().collect();
    keys.sort();

    keys.iter()
        .map(|k| format!("{k}=>'{}'", render_value(&arguments[k.as_str()])))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "None".into(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The report a bubble produces: the paired Tool message plus loop stats.
pub struct BubbleReport {
    /// The Tool message to append to the parent log — the bubble's sole
    /// externally visible effect.
    pub message: Message,
    /// Iterations the sub-agent used (0 if the loop never ran).
    pub iterations: usize,
    /// Whether the sub-agent finished without an internal error.
    pub success: bool,
}

/// Run one delegated task in an isolated bubble.
///
/// `task_override` carries a pre-built task message for the multimodal path;
/// otherwise the task is the formatted argument string. The parent log is
/// only consulted for the call id the report must pair with — the bubble
/// never reads or writes parent history.
pub async fn run(
    runner: &SubAgentRunner,
    delegation: &Delegation,
    parent: &ConversationLog,
    task_override: Option<Message>,
) -> BubbleReport {
    let task = task_override
        .unwrap_or_else(|| Message::human(format_task(&delegation.arguments)));

    info!(agent = %delegation.agent, call_id = %delegation.call_id, "Opening sub-agent bubble");

    // The call the orchestrator is waiting on. The delegation's own id is
    // the fallback if the parent log has moved in an unexpected way.
    let call_id = parent
        .last_tool_call_id()
        .unwrap_or(delegation.call_id.as_str())
        .to_string();

    match runner.run(task).await {
        Ok(SubAgentOutcome {
            result, iterations, ..
        }) => BubbleReport {
            message: Message::tool_result(call_id, result),
            iterations,
            success: true,
        },
        Err(e) => {
            warn!(agent = %delegation.agent, error = %e, "Sub-agent bubble failed");
            BubbleReport {
                message: Message::tool_result(
                    call_id,
                    format!("Error: sub-agent '{}' failed: {e}", delegation.agent),
                ),
                iterations: 0,
                success: false,
            }
        }
    }
}
