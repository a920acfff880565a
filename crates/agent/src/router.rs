//! Delegation routing — extracting the supervisor's intent from its output.
//!
//! The supervisor expresses control flow through a reserved tool-call naming
//! convention: `delegate_to_<agent>` hands off to a sub-agent,
//! `provide_final_answer` terminates the run. The router turns the latest
//! assistant message into a closed [`RouteDecision`] so the state machine
//! never string-matches tool names itself.
//!
//! Models that fall back to the textual ReAct form (`Action:` /
//! `Action Input:`) are handled by [`normalize`], which synthesizes a
//! structured tool call from the text before the message enters the log —
//! downstream of that, only structured calls exist.

use std::sync::OnceLock;

use covey_core::message::{Message, MessageToolCall};
use regex_lite::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Tool-name prefix that signals delegation to a sub-agent.
pub const DELEGATE_PREFIX: &str = "delegate_to_";

/// Tool name that signals termination with an answer.
pub const FINAL_ANSWER_TOOL: &str = "provide_final_answer";

/// A delegation captured from the supervisor's tool call.
#[derive(Debug, Clone)]
pub struct Delegation {
    /// Target sub-agent name.
    pub agent: String,
    /// The call's arguments, verbatim — the sub-agent's task payload.
    pub arguments: Map<String, Value>,
    /// The originating call id, preserved for response pairing.
    pub call_id: String,
}

/// What the supervisor's latest turn asks the driver to do.
#[derive(Debug, Clone)]
pub enum RouteDecision {
    /// Hand control to a sub-agent bubble.
    Delegate(Delegation),
    /// Terminate with this answer.
    FinalAnswer(String),
    /// No agent designated; the driver decides whether to loop or stop.
    NoOp,
}

/// Routing failures. These are surfaced, never silently dropped, so
/// misconfigured prompts stay diagnosable.
#[derive(Debug, Clone, Error)]
pub enum RouteError {
    #[error("unrecognized tool call: {0}")]
    UnknownTool(String),

    #[error("multiple tool calls in one turn are not supported: {0:?}")]
    MultipleToolCalls(Vec<String>),

    #[error("malformed arguments for {name}: {reason}")]
    MalformedArguments { name: String, reason: String },
}

/// Decide the route from the latest assistant message.
pub fn route(last_assistant: &Message) -> Result<RouteDecision, RouteError> {
    if last_assistant.tool_calls.is_empty() {
        return Ok(RouteDecision::NoOp);
    }

    if last_assistant.tool_calls.len() > 1 {
        return Err(RouteError::MultipleToolCalls(
            last_assistant
                .tool_calls
                .iter()
                .map(|tc| tc.name.clone())
                .collect(),
        ));
    }

    let call = &last_assistant.tool_calls[0];
    let arguments = parse_arguments(&call.name, &call.arguments)?;

    if call.name == FINAL_ANSWER_TOOL {
        let answer = arguments
            .get("answer")
            .and_then(Value::as_str)
            .ok_or_else(|| RouteError::MalformedArguments {
                name: call.name.clone(),
                reason: "missing 'answer' argument".into(),
            })?;
        return Ok(RouteDecision::FinalAnswer(answer.to_string()));
    }

    if let Some(suffix) = call.name.strip_prefix(DELEGATE_PREFIX) {
        // Both delegate_to_researcher and delegate_to_researcher_agent
        // resolve to the same agent.
        let agent = suffix.strip_suffix("_agent").unwrap_or(suffix).to_string();
        debug!(agent = %agent, call_id = %call.id, "Routing delegation");
        return Ok(RouteDecision::Delegate(Delegation {
            agent,
            arguments,
            call_id: call.id.clone(),
        }));
    }

    Err(RouteError::UnknownTool(call.name.clone()))
}

fn parse_arguments(name: &str, raw: &str) -> Result<Map<String, Value>, RouteError> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(RouteError::MalformedArguments {
            name: name.into(),
            reason: format!("expected a JSON object, got: {other}"),
        }),
        Err(e) => Err(RouteError::MalformedArguments {
            name: name.into(),
            reason: e.to_string(),
        }),
    }
}

const TEXT_ACTION_PATTERN: &str = r"(?im)^action:\s*(\S+)\s*$";

fn text_action_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TEXT_ACTION_PATTERN).expect("valid regex"))
}

const TEXT_INPUT_PATTERN: &str = r"(?is)action input:\s*(.*)";

fn text_input_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TEXT_INPUT_PATTERN).expect("valid regex"))
}

/// Parse the textual ReAct form: `Action: <tool>` and `Action Input: <payload>`.
pub fn parse_text_action(content: &str) -> Option<(String, String)> {
    let action = text_action_re().captures(content)?[1].to_string();
    let input = text_input_re()
        .captures(content)
        .map(|caps| caps[1].trim().trim_matches('"').to_string())
        .unwrap_or_default();
    Some((action, input))
}

/// Normalize an assistant message before it enters the log: when the model
/// answered in the textual ReAct form instead of a structured tool call,
/// synthesize the equivalent call so pairing works uniformly downstream.
pub fn normalize(message: Message) -> Message {
    if !message.tool_calls.is_empty() {
        return message;
    }

    let Some((action, input)) = parse_text_action(&message.text()) else {
        return message;
    };

    if action != FINAL_ANSWER_TOOL && !action.starts_with(DELEGATE_PREFIX) {
        return message;
    }

    let key = if action == FINAL_ANSWER_TOOL {
        "answer"
    } else {
        "query"
    };
    let arguments = serde_json::json!({ key: input }).to_string();

    debug!(action = %action, "Synthesizing tool call from textual action");
    let call = MessageToolCall {
        id: format!("call_{}", Uuid::new_v4()),
        name: action,
        arguments,
    };
    message.with_tool_calls(vec![call])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assistant_with_call(name: &str, arguments: &str) -> Message {
        Message::assistant("delegating").with_tool_calls(vec![MessageToolCall {
            id: "call_1".into(),
            name: name.into(),
            arguments: arguments.into(),
        }])
    }

    #[test]
    fn no_tool_calls_is_noop() {
        let decision = route(&Message::assistant("just thinking")).unwrap();
        assert!(matches!(decision, RouteDecision::NoOp));
    }

    #[test]
    fn delegation_extracts_agent_and_arguments() {
        let msg = assistant_with_call("delegate_to_researcher", r#"{"query":"summarize arXiv:1234"}"#);
        match route(&msg).unwrap() {
            RouteDecision::Delegate(d) => {
                assert_eq!(d.agent, "researcher");
                assert_eq!(d.call_id, "call_1");
                assert_eq!(d.arguments["query"], "summarize arXiv:1234");
            }
            other => panic!("Expected Delegate, got {other:?}"),
        }
    }

    #[test]
    fn agent_suffix_is_stripped() {
        let msg = assistant_with_call("delegate_to_visual_agent", r#"{"query":"describe"}"#);
        match route(&msg).unwrap() {
            RouteDecision::Delegate(d) => assert_eq!(d.agent, "visual"),
            other => panic!("Expected Delegate, got {other:?}"),
        }
    }

    #[test]
    fn final_answer_extracts_text() {
        let msg = assistant_with_call(FINAL_ANSWER_TOOL, r#"{"answer":"Paris"}"#);
        match route(&msg).unwrap() {
            RouteDecision::FinalAnswer(text) => assert_eq!(text, "Paris"),
            other => panic!("Expected FinalAnswer, got {other:?}"),
        }
    }

    #[test]
    fn final_answer_without_answer_argument_errors() {
        let msg = assistant_with_call(FINAL_ANSWER_TOOL, r#"{"text":"Paris"}"#);
        assert!(matches!(
            route(&msg),
            Err(RouteError::MalformedArguments { .. })
        ));
    }

    #[test]
    fn unknown_tool_is_an_error() {
        let msg = assistant_with_call("summon_wizard", "{}");
        match route(&msg) {
            Err(RouteError::UnknownTool(name)) => assert_eq!(name, "summon_wizard"),
            other => panic!("Expected UnknownTool, got {other:?}"),
        }
    }

    #[test]
    fn multiple_tool_calls_rejected_loudly() {
        let msg = Message::assistant("two at once").with_tool_calls(vec![
            MessageToolCall {
                id: "c1".into(),
                name: "delegate_to_generic".into(),
                arguments: "{}".into(),
            },
            MessageToolCall {
                id: "c2".into(),
                name: "delegate_to_audio".into(),
                arguments: "{}".into(),
            },
        ]);
        match route(&msg) {
            Err(RouteError::MultipleToolCalls(names)) => assert_eq!(names.len(), 2),
            other => panic!("Expected MultipleToolCalls, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_arguments_error() {
        let msg = assistant_with_call("delegate_to_generic", "{not json");
        assert!(matches!(
            route(&msg),
            Err(RouteError::MalformedArguments { .. })
        ));
    }

    #[test]
    fn empty_arguments_accepted() {
        let msg = assistant_with_call("delegate_to_generic", "");
        match route(&msg).unwrap() {
            RouteDecision::Delegate(d) => assert!(d.arguments.is_empty()),
            other => panic!("Expected Delegate, got {other:?}"),
        }
    }

    #[test]
    fn text_action_parsed() {
        let (action, input) = parse_text_action(
            "Thought: I should search.\nAction: delegate_to_researcher\nAction Input: \"summarize arXiv:1234\"",
        )
        .unwrap();
        assert_eq!(action, "delegate_to_researcher");
        assert_eq!(input, "summarize arXiv:1234");
    }

    #[test]
    fn normalize_synthesizes_delegation_call() {
        let msg = Message::assistant(
            "Thought: ...\nAction: delegate_to_researcher\nAction Input: \"summarize arXiv:1234\"",
        );
        let normalized = normalize(msg);
        assert_eq!(normalized.tool_calls.len(), 1);

        match route(&normalized).unwrap() {
            RouteDecision::Delegate(d) => {
                assert_eq!(d.agent, "researcher");
                assert_eq!(d.arguments["query"], "summarize arXiv:1234");
                assert!(!d.call_id.is_empty());
            }
            other => panic!("Expected Delegate, got {other:?}"),
        }
    }

    #[test]
    fn normalize_leaves_structured_calls_alone() {
        let msg = assistant_with_call("delegate_to_generic", "{}");
        let normalized = normalize(msg.clone());
        assert_eq!(normalized.tool_calls[0].id, "call_1");
    }

    #[test]
    fn normalize_ignores_plain_text() {
        let msg = Message::assistant("no actions here");
        assert!(normalize(msg).tool_calls.is_empty());
    }

    #[test]
    fn normalize_ignores_unknown_text_actions() {
        let msg = Message::assistant("Action: web_search\nAction Input: rust");
        assert!(normalize(msg).tool_calls.is_empty());
    }
}
