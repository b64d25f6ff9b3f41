//! `qaryz serve`: Start the HTTP API server.

use qaryz_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("⚖️  Qaryz Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Provider:  {} ({})", config.default_provider, config.default_model);
    println!("   Docs:      {}", config.knowledge.docs_path);
    println!("   Token:     {}", if config.gateway.api_token.is_some() { "required" } else { "none" });

    if !config.has_api_key() {
        eprintln!("   ⚠️  No API key configured; extraction falls back to patterns and answers will apologise.");
    }

    qaryz_gateway::start(config).await?;

    Ok(())
}
