//! `covey ask` — run one question through the multi-agent workflow.

use std::path::PathBuf;
use std::sync::Arc;

use covey_agent::{AgentRegistry, SubAgentRunner, Supervisor, default_agent_prompt};
use covey_config::AppConfig;
use covey_core::event::EventBus;
use tracing::info;

pub async fn run(
    question: String,
    file: Option<PathBuf>,
    audit_out: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    if !config.has_api_key() {
        eprintln!(
            "Warning: no API key configured (set COVEY_API_KEY or add api_key to {})",
            AppConfig::config_dir().join("config.toml").display()
        );
    }

    let provider = covey_providers::from_config(&config);
    let event_bus = Arc::new(EventBus::default());

    let roster = config.roster();
    let registry = AgentRegistry::from_roster(&roster, |entry| {
        SubAgentRunner::new(
            provider.clone(),
            entry
                .model
                .clone()
                .unwrap_or_else(|| config.default_model.clone()),
            config.default_temperature,
            Arc::new(covey_tools::registry_for(&entry.tools)),
            &entry.name,
            default_agent_prompt(&entry.name, &entry.description),
            event_bus.clone(),
        )
        .with_max_iterations(entry.max_iterations)
        .with_max_tokens(config.default_max_tokens)
    });

    let supervisor = Supervisor::new(
        provider,
        config.default_model.clone(),
        config.default_temperature,
        registry,
        event_bus,
    )
    .with_max_steps(config.max_steps)
    .with_max_noop_turns(config.max_noop_turns)
    .with_max_tokens(config.default_max_tokens);

    info!(agents = roster.len(), "Starting workflow");
    let report = supervisor.run(&question, file.as_deref()).await?;

    println!("{}", report.outcome.answer_text());

    if let Some(path) = audit_out {
        std::fs::write(&path, report.audit.to_json()?)?;
        info!(path = %path.display(), entries = report.audit.len(), "Audit trail written");
    }

    Ok(())
}
