//! Final-answer extraction — the workflow's terminal marker.
//!
//! A post-turn hook over the conversation log: if the supervisor's latest
//! output carries a `Final Answer:` marker, the run is over and everything
//! after the marker is the answer. Side-effect free and idempotent; the
//! matching strategy lives here so it can be swapped without touching the
//! state machine.

use std::sync::OnceLock;

use covey_core::message::{ConversationLog, Role};
use regex_lite::Regex;

const FINAL_ANSWER_PATTERN: &str = r"(?is)final answer:\s*(.*)";

fn final_answer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(FINAL_ANSWER_PATTERN).expect("valid regex"))
}

/// Inspect only the last message of the log. Returns the trimmed text after
/// the case-insensitive `final answer:` marker if the last message is an
/// assistant message carrying one, `None` otherwise.
pub fn extract(log: &ConversationLog) -> Option<String> {
    let last = log.last()?;
    if last.role != Role::Assistant {
        return None;
    }

    final_answer_re()
        .captures(&last.text())
        .map(|caps| caps[1].trim().to_string())
}
