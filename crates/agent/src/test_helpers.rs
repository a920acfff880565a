//! Shared test helpers for the workflow tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use covey_core::error::ProviderError;
use covey_core::event::EventBus;
use covey_core::message::{Message, MessageToolCall};
use covey_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use covey_core::tool::ToolRegistry;

use crate::react::SubAgentRunner;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue and
/// records the request for later inspection. Panics if more calls are made
/// than responses provided.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    call_count: Mutex<usize>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            call_count: Mutex::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that returns a single text response (no tool calls).
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![make_text_response(text)])
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// The requests received so far, in order.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);

        let mut count = self.call_count.lock().unwrap();
        let responses = self.responses.lock().unwrap();

        if *count >= responses.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                *count,
                responses.len()
            );
        }

        let response = responses[*count].clone();
        *count += 1;
        Ok(response)
    }
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Create a response with tool calls and optional thought content.
pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>, thought: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(thought).with_tool_calls(tool_calls),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Helper to create a tool call with a stable id.
pub fn make_tool_call(id: &str, name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: id.into(),
        name: name.into(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}

/// A delegation-shaped tool call.
pub fn make_delegation_call(id: &str, agent: &str, query: &str) -> MessageToolCall {
    make_tool_call(
        id,
        &format!("delegate_to_{agent}"),
        serde_json::json!({ "query": query }),
    )
}

/// A sub-agent runner wired to a scripted provider with the given responses.
pub fn make_runner(name: &str, responses: Vec<ProviderResponse>) -> SubAgentRunner {
    SubAgentRunner::new(
        Arc::new(SequentialMockProvider::new(responses)),
        "mock-model",
        0.3,
        Arc::new(ToolRegistry::new()),
        name,
        format!("You are the {name} agent."),
        Arc::new(EventBus::default()),
    )
}
