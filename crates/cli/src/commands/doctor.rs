//! `covey doctor` — diagnose configuration and provider health.

use covey_config::AppConfig;
use covey_core::Provider as _;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    println!("Covey doctor\n");

    // Config
    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  [ok] config file: {}", config_path.display());
    } else {
        println!(
            "  [--] no config file at {} (using defaults)",
            config_path.display()
        );
    }

    // API key
    if config.has_api_key() {
        println!("  [ok] API key configured");
    } else {
        println!("  [!!] no API key (set COVEY_API_KEY, OPENROUTER_API_KEY, or OPENAI_API_KEY)");
    }

    // Roster
    let roster = config.roster();
    println!("  [ok] {} agents registered", roster.len());

    // Provider chain
    let order = config.effective_provider_order();
    println!("  provider chain: {}", order.join(" -> "));
    let provider = covey_providers::from_config(&config);
    match provider.health_check().await {
        Ok(true) => println!("  [ok] provider reachable: {}", provider.name()),
        Ok(false) => println!("  [!!] provider unreachable: {}", provider.name()),
        Err(e) => println!("  [!!] provider check failed: {e}"),
    }

    Ok(())
}
