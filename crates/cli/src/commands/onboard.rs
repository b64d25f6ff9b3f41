//! `qaryz onboard`: First-time setup.

use std::path::Path;

use qaryz_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("⚖️  Qaryz — First-Time Setup");
    println!("============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
    }

    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let docs_dir = Path::new(&config.knowledge.docs_path);
    if !docs_dir.exists() {
        std::fs::create_dir_all(docs_dir)?;
        println!("✅ Created docs directory: {}", docs_dir.display());
    } else {
        println!("  Docs directory exists: {}", docs_dir.display());
    }

    println!("\n📝 Next steps:");
    println!("   1. Add your API key to {} or set QARYZ_API_KEY", config_path.display());
    println!("   2. Put the consultation corpus (*.txt) into {}", docs_dir.display());
    println!("   3. Run: qaryz doctor");
    println!("   4. Run: qaryz chat   (or qaryz serve)\n");

    Ok(())
}
