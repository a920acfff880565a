//! Agent registry — the closed roster the supervisor can delegate to.
//!
//! Each entry pairs a sub-agent runner with its delegation metadata. The
//! registry also generates the supervisor's tool list, so the set of
//! `delegate_to_<name>` tools always matches the roster exactly — there is
//! no separate place for them to drift apart. Binary-attachment handling is
//! a capability flag on the entry, not a hardcoded agent-name check.

use std::collections::BTreeMap;

use covey_core::provider::ToolDefinition;

use crate::react::SubAgentRunner;
use crate::router::FINAL_ANSWER_TOOL;

/// One registered sub-agent.
pub struct AgentSpec {
    pub name: String,
    /// Shown to the supervisor in the delegation tool description.
    pub description: String,
    pub runner: SubAgentRunner,
    /// Whether the driver injects image attachments into this agent's task.
    pub accepts_binary_attachments: bool,
}

/// Name → sub-agent mapping. Iteration order is the sorted agent name order
/// so generated tool lists are deterministic.
#[derive(Default)]
pub struct AgentRegistry {
    agents: BTreeMap<String, AgentSpec>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: BTreeMap::new(),
        }
    }

    /// Register an agent. Replaces any existing agent with the same name.
    pub fn register(&mut self, spec: AgentSpec) {
        self.agents.insert(spec.name.clone(), spec);
    }

    pub fn get(&self, name: &str) -> Option<&AgentSpec> {
        self.agents.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.agents.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Build a registry from a configured roster, with a caller-supplied
    /// factory wiring each entry to its runner (provider, tools, budgets).
    pub fn from_roster<F>(roster: &[covey_config::AgentEntry], mut make_runner: F) -> Self
    where
        F: FnMut(&covey_config::AgentEntry) -> SubAgentRunner,
    {
        let mut registry = Self::new();
        for entry in roster {
            let runner = make_runner(entry);
            registry.register(AgentSpec {
                name: entry.name.clone(),
                description: entry.description.clone(),
                runner,
                accepts_binary_attachments: entry.accepts_binary_attachments,
            });
        }
        registry
    }

    /// The supervisor's tool list: one delegation tool per registered agent
    /// plus the final-answer tool.
    pub fn delegation_tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self
            .agents
            .values()
            .map(|spec| ToolDefinition {
                name: format!("delegate_to_{}", spec.name),
                description: format!(
                    "Delegate the task to the '{}' agent. {} The 'query' must be a clear, \
                     self-contained instruction.",
                    spec.name, spec.description
                ),
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "A clear, self-contained instruction for the agent"
                        },
                        "file_path": {
                            "type": "string",
                            "description": "Optional path to a file the task refers to"
                        }
                    },
                    "required": ["query"]
                }),
            })
            .collect();

        defs.push(ToolDefinition {
            name: FINAL_ANSWER_TOOL.into(),
            description: "Provide the final answer to the user's overall request. Use this \
                          once all necessary information has been gathered. This ends the \
                          workflow."
                .into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "answer": {
                        "type": "string",
                        "description": "The final answer text"
                    }
                },
                "required": ["answer"]
            }),
        });

        defs
    }
}

/// The default system prompt for a sub-agent's internal loop.
pub fn default_agent_prompt(name: &str, description: &str) -> String {
    format!(
        "You are the '{name}' agent, a specialist in this domain: {description}\n\
         You operate in an iterative Thought-Action-Observation loop using only the tools \
         provided.\n\
         When you have completed the task, respond with 'Final Answer: ' followed by a concise \
         summary of the steps taken and your exact result.\n\
         If you cannot make progress with your available tools, respond with \
         'Final Answer: STUCK - ' followed by a brief reason and what you would need."
    )
}

/// The default system prompt for the supervisor.
pub fn default_supervisor_prompt() -> String {
    "You are the orchestrator of a team of specialist agents. Analyze the user's request, \
     delegate sub-tasks to the appropriate agents using the delegate_to_* tools, and combine \
     their reports. Delegate one task at a time. When you have everything you need, call \
     provide_final_answer with the complete answer."
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::make_runner;

    #[test]
    fn register_and_lookup() {
        let mut registry = AgentRegistry::new();
        registry.register(AgentSpec {
            name: "generic".into(),
            description: "general lookup".into(),
            runner: make_runner("generic", vec![]),
            accepts_binary_attachments: false,
        });

        assert!(registry.get("generic").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.names(), vec!["generic"]);
    }

    #[test]
    fn tool_definitions_cover_roster_plus_final_answer() {
        let mut registry = AgentRegistry::new();
        for name in ["researcher", "audio"] {
            registry.register(AgentSpec {
                name: name.into(),
                description: "specialist".into(),
                runner: make_runner(name, vec![]),
                accepts_binary_attachments: false,
            });
        }

        let defs = registry.delegation_tool_definitions();
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        // BTreeMap iteration keeps this deterministic
        assert_eq!(
            names,
            vec![
                "delegate_to_audio",
                "delegate_to_researcher",
                "provide_final_answer"
            ]
        );
        assert_eq!(defs[0].parameters["required"], serde_json::json!(["query"]));
    }

    #[test]
    fn from_roster_carries_capability_flags() {
        let roster = covey_config::default_agents();
        let registry = AgentRegistry::from_roster(&roster, |entry| make_runner(&entry.name, vec![]));

        assert_eq!(registry.len(), roster.len());
        assert!(registry.get("visual").unwrap().accepts_binary_attachments);
        assert!(!registry.get("generic").unwrap().accepts_binary_attachments);
    }

    #[test]
    fn agent_prompt_mentions_stuck_convention() {
        let prompt = default_agent_prompt("audio", "transcription");
        assert!(prompt.contains("audio"));
        assert!(prompt.contains("STUCK"));
        assert!(prompt.contains("Final Answer:"));
    }
}
