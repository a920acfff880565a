//! `covey agents` — show the configured sub-agent roster.

use covey_config::AppConfig;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let roster = config.roster();

    println!("Configured agents ({}):\n", roster.len());
    for agent in &roster {
        let attachments = if agent.accepts_binary_attachments {
            " [accepts attachments]"
        } else {
            ""
        };
        println!("  {}{}", agent.name, attachments);
        println!("    {}", agent.description);
        println!(
            "    model: {}  max_iterations: {}",
            agent.model.as_deref().unwrap_or(&config.default_model),
            agent.max_iterations
        );
        if !agent.tools.is_empty() {
            println!("    tools: {}", agent.tools.join(", "));
        }
        println!();
    }

    Ok(())
}
