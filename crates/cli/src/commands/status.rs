//! `cropsage status` — Show resolved backend capabilities.

use cropsage_config::{AppConfig, Capability};

fn describe(capability: &Capability) -> String {
    match capability {
        Capability::Enabled => "enabled".to_string(),
        Capability::Disabled { reason } => format!("disabled ({reason})"),
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let capabilities = config.capabilities();

    println!("🌾 CropSage Status");
    println!("==================");
    println!("  Config dir:      {}", AppConfig::config_dir().display());
    println!("  Gateway:         {}:{}", config.gateway.host, config.gateway.port);
    println!("  Session slots:   {}", config.session.capacity);
    println!("  Backend:         {}", config.generation.backend);
    println!("  Model:           {}", config.generation.model);
    println!();
    println!("  Classifier:      {}", describe(&capabilities.classifier));
    println!("  Knowledge index: {}", describe(&capabilities.knowledge_index));
    println!("  Generator:       {}", describe(&capabilities.generator));

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `cropsage init` first");
    }

    Ok(())
}
