//! A sub-agent's internal think-act-observe loop.
//!
//! The loop runs entirely inside a bubble log: reduce the log to this
//! agent's view, call the model, execute any requested tools, append the
//! observations, repeat. It terminates when the model answers without tool
//! calls or when the iteration budget runs out — budget exhaustion is a
//! terminal textual result, never a fault that escapes the bubble.

use std::sync::Arc;

use covey_core::error::Error;
use covey_core::event::{DomainEvent, EventBus};
use covey_core::message::{ConversationLog, Message};
use covey_core::provider::{Provider, ProviderRequest};
use covey_core::tool::{ToolCall, ToolRegistry};
use tracing::{debug, info, warn};

use crate::history::reduce;

/// One specialist agent: a provider, a tool set, and an iteration budget.
pub struct SubAgentRunner {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    tools: Arc<ToolRegistry>,
    name: String,
    system_prompt: String,
    max_iterations: u32,
    event_bus: Arc<EventBus>,
}

/// The outcome of a completed internal loop.
pub struct SubAgentOutcome {
    /// The agent's final message text.
    pub result: String,
    /// Iterations used.
    pub iterations: usize,
    /// Total tool calls executed.
    pub tool_calls_made: usize,
}

impl SubAgentRunner {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            name: name.into(),
            system_prompt: system_prompt.into(),
            max_iterations: 6,
            event_bus,
        }
    }

    /// Set the iteration budget.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the default max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the loop to completion on the given task message.
    ///
    /// The bubble log is created here and dropped here; nothing the agent
    /// does inside it can touch the caller's conversation state.
    pub async fn run(&self, task: Message) -> Result<SubAgentOutcome, Error> {
        let mut log = ConversationLog::new();
        log.append(Message::system(self.system_prompt.clone()))?;
        log.append(task)?;

        let tool_defs = self.tools.definitions();
        let mut total_tool_calls = 0usize;

        info!(agent = %self.name, max_iter = self.max_iterations, "Sub-agent loop starting");

        for iteration in 1..=self.max_iterations {
            debug!(agent = %self.name, iteration, "Sub-agent iteration");

            let view = reduce(&log, &self.name);

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: view.messages,
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_defs.clone(),
                stop: vec![],
            };

            let response = self.provider.complete(request).await?;
            let message = response.message.with_name(&self.name);

            // No tool calls means the agent is done; its text is the result.
            if message.tool_calls.is_empty() {
                let result = message.text();
                log.append(message)?;

                info!(
                    agent = %self.name,
                    iterations = iteration,
                    tool_calls = total_tool_calls,
                    "Sub-agent loop completed"
                );

                return Ok(SubAgentOutcome {
                    result,
                    iterations: iteration as usize,
                    tool_calls_made: total_tool_calls,
                });
            }

            let tool_calls = message.tool_calls.clone();
            log.append(message)?;

            for tc in &tool_calls {
                total_tool_calls += 1;

                let call = ToolCall {
                    id: tc.id.clone(),
                    name: tc.name.clone(),
                    arguments: serde_json::from_str(&tc.arguments).unwrap_or_default(),
                };

                let start = std::time::Instant::now();
                let result = self.tools.execute(&call).await;
                let duration_ms = start.elapsed().as_millis() as u64;

                let (output, success) = match result {
                    Ok(tool_result) => (tool_result.output, tool_result.success),
                    Err(e) => (format!("Error: {e}"), false),
                };

                self.event_bus.publish(DomainEvent::ToolExecuted {
                    tool_name: tc.name.clone(),
                    success,
                    duration_ms,
                    timestamp: chrono::Utc::now(),
                });

                log.append(Message::tool_result(&tc.id, output).with_name(&self.name))?;
            }
        }

        // Budget exhausted: report a terminal textual result.
        warn!(agent = %self.name, "Sub-agent reached max iterations");
        Ok(SubAgentOutcome {
            result: format!(
                "STUCK - reached the maximum number of reasoning iterations ({}) without a \
                 final answer.",
                self.max_iterations
            ),
            iterations: self.max_iterations as usize,
            tool_calls_made: total_tool_calls,
        })
    }
}
