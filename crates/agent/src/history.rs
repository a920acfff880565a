//! History reduction — carving an agent-scoped view out of the shared log.
//!
//! Every agent turn starts from the full conversation log, but each agent
//! must only see its own scratchpad: its fixed instructions, its effective
//! task input, and its own thought/action/observation messages. Everything
//! else — other agents' private scratchpads, tool responses that answer
//! someone else's calls — is pruned.
//!
//! `reduce` is a pure function: identical logs always produce identical
//! views. The view is rebuilt fresh before every model call and discarded
//! immediately after; it is never written back to the log.

use std::collections::HashSet;
use std::sync::OnceLock;

use covey_core::message::{ConversationLog, Message, Role};
use regex_lite::Regex;
use tracing::warn;

/// The delegation-argument marker left in a model's textual scratchpad.
const ACTION_INPUT_PATTERN: &str = r"(?is)action input:\s*(.*)";

fn action_input_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ACTION_INPUT_PATTERN).expect("valid regex"))
}

/// An agent-scoped view of the conversation, plus the extracted task input.
#[derive(Debug, Clone)]
pub struct ReducedView {
    /// [System?, effective-input Human, kept scratchpad...]
    pub messages: Vec<Message>,
    /// The raw text of the effective input. Empty in the degraded case.
    pub effective_input: String,
}

/// Reduce the full log to the view `agent_name` should see.
///
/// Selection rules, applied in order:
///
/// 1. The first System message always heads the view — an agent's fixed
///    instructions are never pruned or reordered.
/// 2. The effective input is the payload of the most recent `Action Input:`
///    marker in an assistant message, re-wrapped as a synthetic Human
///    message; if no marker exists, the most recent Human message is used
///    as-is (preserving any image parts). Scratchpad scanning starts
///    strictly after whichever was found.
/// 3. From there to the end of the log, keep: messages attributed to
///    `agent_name`; un-attributed assistant messages (the agent's own raw
///    model output before attribution); and tool responses that answer a
///    kept assistant message's calls — dropping those would hand the
///    provider an unpaired view.
pub fn reduce(log: &ConversationLog, agent_name: &str) -> ReducedView {
    let messages = log.messages();

    let system_idx = messages.iter().position(|m| m.role == Role::System);

    // Most recent delegation marker wins over the most recent Human message.
    let mut marker: Option<(usize, String)> = None;
    for (i, m) in messages.iter().enumerate().rev() {
        if m.role == Role::Assistant
            && let Some(caps) = action_input_re().captures(&m.text())
        {
            marker = Some((i, caps[1].trim().to_string()));
            break;
        }
    }

    let (scan_start, effective_input, input_message) = match marker {
        Some((idx, payload)) => {
            let synthetic = Message::human(payload.clone());
            (idx + 1, payload, Some(synthetic))
        }
        None => match messages.iter().rposition(|m| m.role == Role::Human) {
            Some(idx) => (
                idx + 1,
                messages[idx].text(),
                Some(messages[idx].clone()),
            ),
            None => {
                warn!(
                    agent = agent_name,
                    log_len = messages.len(),
                    "No delegation marker or human message found; reducing from the log start with empty input"
                );
                (0, String::new(), None)
            }
        },
    };

    let mut view = Vec::new();
    if let Some(idx) = system_idx {
        view.push(messages[idx].clone());
    }
    if let Some(input) = input_message {
        view.push(input);
    }

    let mut kept_call_ids: HashSet<&str> = HashSet::new();
    for (i, m) in messages.iter().enumerate().skip(scan_start) {
        if Some(i) == system_idx {
            continue;
        }

        let name_matches = m.name.as_deref() == Some(agent_name);
        let keep = match m.role {
            Role::Assistant => name_matches || m.name.is_none(),
            Role::Tool => {
                let answers_kept_call = m
                    .tool_call_id
                    .as_deref()
                    .is_some_and(|id| kept_call_ids.contains(id));
                (name_matches || m.name.is_none()) && answers_kept_call
            }
            Role::Human | Role::System => name_matches,
        };

        if keep {
            for tc in &m.tool_calls {
                kept_call_ids.insert(tc.id.as_str());
            }
            view.push(m.clone());
        }
    }

    ReducedView {
        messages: view,
        effective_input,
    }
}
