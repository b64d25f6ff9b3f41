//! `qaryz doctor`: Diagnose configuration, API key and corpus.

use qaryz_config::AppConfig;
use qaryz_gateway::services::corpus_present;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Qaryz Doctor — System Diagnostics");
    println!("====================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file, using defaults — run `qaryz onboard`");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  Fix the configuration and re-run doctor.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else {
        println!("  ❌ No API key — set QARYZ_API_KEY or add api_key to config.toml");
        issues += 1;
    }

    println!("  ℹ️  Provider: {} ({})", config.default_provider, config.default_model);
    if !config.fallback_providers.is_empty() {
        println!("  ℹ️  Fallbacks: {}", config.fallback_providers.join(", "));
    }
    println!(
        "  ℹ️  Extraction: {}",
        if config.extraction.use_llm { config.extraction_model() } else { "patterns only" }
    );
    println!(
        "  ℹ️  Legal limit: {} МРП × {} = {} тенге",
        config.dialogue.out_of_court_mci_multiplier,
        config.dialogue.monthly_calculation_index,
        config
            .dialogue
            .out_of_court_mci_multiplier
            .saturating_mul(config.dialogue.monthly_calculation_index)
    );

    if corpus_present(&config.knowledge.docs_path) {
        println!("  ✅ Corpus found in {}", config.knowledge.docs_path);
    } else {
        println!(
            "  ❌ No *.txt corpus in {} — consultations will only apologise",
            config.knowledge.docs_path
        );
        issues += 1;
    }

    if config.gateway.api_token.is_none() {
        println!("  ⚠️  gateway.api_token not set — the HTTP API is open");
        issues += 1;
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
