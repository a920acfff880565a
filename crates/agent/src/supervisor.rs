//! The workflow driver — a supervisor state machine over the shared log.
//!
//! One run moves through four states:
//!
//! ```text
//! Orchestrating ──► Routing ──► SubAgentRunning ──► Orchestrating
//!                      │
//!                      └──► Terminated (final answer, or budgets exhausted)
//! ```
//!
//! The driver owns the conversation log exclusively and is its only writer.
//! Every supervisor turn consumes one step from the budget; repeated turns
//! without a delegation and the step budget both force termination, so a
//! run can never hang. The user-visible result is always an answer or a
//! labeled "no answer produced" outcome, never a raw error from inside an
//! agent.

use std::path::Path;
use std::sync::Arc;

use covey_core::audit::{AuditEntry, RunAudit};
use covey_core::error::Error;
use covey_core::event::{DomainEvent, EventBus};
use covey_core::message::{ContentPart, ConversationLog, Message, MessageContent};
use covey_core::provider::{Provider, ProviderRequest};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::answer;
use crate::bubble;
use crate::history::reduce;
use crate::registry::{AgentRegistry, AgentSpec, default_supervisor_prompt};
use crate::router::{self, Delegation, RouteDecision};

/// The agent name the supervisor's own messages are attributed to.
pub const ORCHESTRATOR: &str = "orchestrator";

/// Driver states. `Terminated` is absorbing.
enum DriverState {
    Orchestrating,
    Routing,
    SubAgentRunning(Delegation),
    Terminated(RunOutcome),
}

/// How a run ended.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The supervisor produced an explicit final answer.
    Answered { answer: String, steps_used: u32 },
    /// Budgets forced termination before an answer appeared.
    Exhausted { steps_used: u32 },
}

impl RunOutcome {
    pub fn is_answered(&self) -> bool {
        matches!(self, RunOutcome::Answered { .. })
    }

    /// The user-visible result text.
    pub fn answer_text(&self) -> String {
        match self {
            RunOutcome::Answered { answer, .. } => answer.clone(),
            RunOutcome::Exhausted { steps_used } => format!(
                "No answer produced: the workflow terminated after {steps_used} supervisor \
                 turns without an explicit final answer."
            ),
        }
    }

    pub fn steps_used(&self) -> u32 {
        match self {
            RunOutcome::Answered { steps_used, .. } | RunOutcome::Exhausted { steps_used } => {
                *steps_used
            }
        }
    }
}

/// Everything a finished run leaves behind.
pub struct RunReport {
    pub outcome: RunOutcome,
    pub audit: RunAudit,
    pub log: ConversationLog,
}

/// The supervisor: an orchestrator model plus the sub-agent registry.
pub struct Supervisor {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    registry: AgentRegistry,
    max_steps: u32,
    max_noop_turns: u32,
    system_prompt: String,
    event_bus: Arc<EventBus>,
}

impl Supervisor {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        registry: AgentRegistry,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            registry,
            max_steps: 12,
            max_noop_turns: 2,
            system_prompt: default_supervisor_prompt(),
            event_bus,
        }
    }

    /// Set the supervisor step budget.
    pub fn with_max_steps(mut self, max: u32) -> Self {
        self.max_steps = max;
        self
    }

    /// Set how many consecutive no-delegation turns are tolerated.
    pub fn with_max_noop_turns(mut self, max: u32) -> Self {
        self.max_noop_turns = max.max(1);
        self
    }

    /// Set the default max tokens per supervisor response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Override the supervisor system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Answer one question, optionally with an attached file.
    pub async fn run(&self, question: &str, attachment: Option<&Path>) -> Result<RunReport, Error> {
        let mut log = ConversationLog::new();
        let mut audit = RunAudit::new();

        log.append(Message::system(self.system_prompt.clone()))?;

        let seeded_question = match attachment {
            Some(path) => format!("{question}\n[attached file: {}]", path.display()),
            None => question.to_string(),
        };
        log.append(Message::human(seeded_question))?;

        self.event_bus.publish(DomainEvent::QuestionReceived {
            question_preview: preview(question),
            timestamp: chrono::Utc::now(),
        });
        audit.record(AuditEntry::new(
            ORCHESTRATOR,
            "received",
            serde_json::json!({ "question": question }),
        ));

        let mut remaining = self.max_steps;
        let mut noop_turns = 0u32;
        let mut state = DriverState::Orchestrating;

        let outcome = loop {
            state = match state {
                DriverState::Orchestrating => {
                    if remaining == 0 {
                        warn!(max_steps = self.max_steps, "Supervisor step budget exhausted");
                        DriverState::Terminated(RunOutcome::Exhausted {
                            steps_used: self.max_steps,
                        })
                    } else {
                        remaining -= 1;
                        self.orchestrator_turn(&mut log).await?;
                        DriverState::Routing
                    }
                }

                DriverState::Routing => {
                    let steps_used = self.max_steps - remaining;
                    let Some(last) = log.last().cloned() else {
                        // Cannot happen after a turn, but never loop on it.
                        break RunOutcome::Exhausted { steps_used };
                    };

                    match router::route(&last) {
                        Ok(RouteDecision::FinalAnswer(text)) => {
                            info!(steps_used, "Supervisor provided a final answer");
                            audit.record(
                                AuditEntry::new(ORCHESTRATOR, "final_answer", Value::Null)
                                    .with_output(&text),
                            );
                            DriverState::Terminated(RunOutcome::Answered {
                                answer: text,
                                steps_used,
                            })
                        }

                        Ok(RouteDecision::NoOp) => {
                            // Post-turn hook: a textual marker also terminates.
                            if let Some(text) = answer::extract(&log) {
                                info!(steps_used, "Final answer extracted from supervisor text");
                                audit.record(
                                    AuditEntry::new(ORCHESTRATOR, "final_answer", Value::Null)
                                        .with_output(&text),
                                );
                                DriverState::Terminated(RunOutcome::Answered {
                                    answer: text,
                                    steps_used,
                                })
                            } else {
                                noop_turns += 1;
                                debug!(noop_turns, "No agent designated");
                                if noop_turns >= self.max_noop_turns {
                                    warn!(
                                        noop_turns,
                                        "Supervisor designated no agent repeatedly; terminating"
                                    );
                                    DriverState::Terminated(RunOutcome::Exhausted { steps_used })
                                } else {
                                    DriverState::Orchestrating
                                }
                            }
                        }

                        Ok(RouteDecision::Delegate(delegation)) => {
                            noop_turns = 0;
                            DriverState::SubAgentRunning(delegation)
                        }

                        Err(e) => {
                            // Malformed delegation: feed the error back through
                            // the pairing pathway so the supervisor can
                            // self-correct on its next turn.
                            warn!(error = %e, "Routing failed");
                            self.event_bus.publish(DomainEvent::ErrorOccurred {
                                context: "routing".into(),
                                error_message: e.to_string(),
                                timestamp: chrono::Utc::now(),
                            });
                            audit.record(
                                AuditEntry::new(ORCHESTRATOR, "route", Value::Null)
                                    .failed(e.to_string()),
                            );

                            let error_text = format!(
                                "Error: {e}. Available agents: {}.",
                                self.registry.names().join(", ")
                            );
                            for id in log.unanswered_call_ids() {
                                log.append(Message::tool_result(id, error_text.clone()))?;
                            }
                            DriverState::Orchestrating
                        }
                    }
                }

                DriverState::SubAgentRunning(delegation) => {
                    self.run_sub_agent(&mut log, &mut audit, delegation, attachment)
                        .await?;
                    DriverState::Orchestrating
                }

                DriverState::Terminated(outcome) => break outcome,
            };
        };

        self.event_bus.publish(DomainEvent::AnswerProduced {
            answered: outcome.is_answered(),
            steps_used: outcome.steps_used(),
            timestamp: chrono::Utc::now(),
        });
        audit.record(
            AuditEntry::new(ORCHESTRATOR, "terminated", Value::Null)
                .with_output(outcome.answer_text()),
        );

        Ok(RunReport {
            outcome,
            audit,
            log,
        })
    }

    /// One supervisor model call: reduce, complete, normalize, append.
    async fn orchestrator_turn(&self, log: &mut ConversationLog) -> Result<(), Error> {
        let view = reduce(log, ORCHESTRATOR);

        let request = ProviderRequest {
            model: self.model.clone(),
            messages: view.messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: self.registry.delegation_tool_definitions(),
            stop: vec![],
        };

        let response = self.provider.complete(request).await?;
        let message = router::normalize(response.message).with_name(ORCHESTRATOR);
        log.append(message)?;
        Ok(())
    }

    /// Dispatch one delegation into a bubble and append its paired report.
    async fn run_sub_agent(
        &self,
        log: &mut ConversationLog,
        audit: &mut RunAudit,
        delegation: Delegation,
        attachment: Option<&Path>,
    ) -> Result<(), Error> {
        let Some(spec) = self.registry.get(&delegation.agent) else {
            warn!(agent = %delegation.agent, "Delegation to unknown agent");
            audit.record(
                AuditEntry::new(ORCHESTRATOR, "delegated", Value::Object(delegation.arguments.clone()))
                    .failed(format!("unknown agent '{}'", delegation.agent)),
            );
            log.append(Message::tool_result(
                &delegation.call_id,
                format!(
                    "Error: unknown agent '{}'. Available agents: {}.",
                    delegation.agent,
                    self.registry.names().join(", ")
                ),
            ))?;
            return Ok(());
        };

        self.event_bus.publish(DomainEvent::Delegated {
            agent: delegation.agent.clone(),
            call_id: delegation.call_id.clone(),
            timestamp: chrono::Utc::now(),
        });
        audit.record(AuditEntry::new(
            ORCHESTRATOR,
            "delegated",
            Value::Object(delegation.arguments.clone()),
        ));

        let task_override = match self.attachment_task(spec, &delegation, attachment).await {
            Ok(task) => task,
            Err(error_text) => {
                audit.record(
                    AuditEntry::new(&delegation.agent, "attachment", Value::Null)
                        .failed(&error_text),
                );
                log.append(Message::tool_result(&delegation.call_id, error_text))?;
                return Ok(());
            }
        };

        let report = bubble::run(&spec.runner, &delegation, log, task_override).await;

        self.event_bus.publish(DomainEvent::SubAgentCompleted {
            agent: delegation.agent.clone(),
            iterations: report.iterations,
            success: report.success,
            timestamp: chrono::Utc::now(),
        });
        let entry = AuditEntry::new(
            &delegation.agent,
            "reported",
            Value::Object(delegation.arguments.clone()),
        )
        .with_output(report.message.text());
        audit.record(if report.success {
            entry
        } else {
            entry.failed("sub-agent internal failure")
        });

        log.append(report.message)?;
        Ok(())
    }

    /// Build a multimodal task message when the target agent accepts binary
    /// attachments and a file path is in play. Returns an error text (to be
    /// fed back through the pairing pathway) if the file cannot be loaded.
    async fn attachment_task(
        &self,
        spec: &AgentSpec,
        delegation: &Delegation,
        attachment: Option<&Path>,
    ) -> Result<Option<Message>, String> {
        if !spec.accepts_binary_attachments {
            return Ok(None);
        }

        let path = delegation
            .arguments
            .get("file_path")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty() && *s != "None" && *s != "null")
            .map(str::to_string)
            .or_else(|| attachment.map(|p| p.to_string_lossy().into_owned()));

        let Some(path) = path else {
            return Ok(None);
        };

        match covey_tools::load_image_part(&path).await {
            Ok(image) => {
                debug!(agent = %spec.name, path = %path, "Injecting image attachment into task");
                let text = bubble::format_task(&delegation.arguments);
                Ok(Some(Message::human(MessageContent::Parts(vec![
                    ContentPart::Text { text },
                    image,
                ]))))
            }
            Err(e) => Err(format!("Error: could not load attachment '{path}': {e}")),
        }
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 80;
    if text.len() <= MAX {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX).collect();
        format!("{cut}...")
    }
}
