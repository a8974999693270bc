//! `cropsage doctor` — Probe the configured backends.

use std::sync::Arc;

use cropsage_config::AppConfig;
use cropsage_orchestrator::{BackendProbe, Orchestrator};
use cropsage_retrieval::ContextRetriever;
use cropsage_session::SessionStore;

fn report(name: &str, probe: &BackendProbe) -> u32 {
    match probe {
        BackendProbe::Healthy { detail } => {
            println!("  ✅ {name}: {detail}");
            0
        }
        BackendProbe::Disabled => {
            println!("  ⚠️  {name}: disabled — see `cropsage status` for the reason");
            1
        }
        BackendProbe::Unhealthy { detail } => {
            println!("  ❌ {name}: {detail}");
            1
        }
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 CropSage Doctor — Backend Diagnostics");
    println!("========================================\n");

    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let classifier = cropsage_classifier::build_from_config(&config);
    let index = cropsage_retrieval::build_from_config(&config)?;
    let retriever = index.map(|index| ContextRetriever::new(index, config.retrieval.top_k));
    let generator = cropsage_generation::build_from_config(&config)?;

    let orchestrator = Orchestrator::new(
        Arc::new(SessionStore::new(config.session.capacity)),
        classifier,
        retriever,
        generator,
    );

    let diagnostics = orchestrator.doctor().await;
    let mut issues = 0;
    issues += report("Classifier", &diagnostics.classifier);
    issues += report("Knowledge index", &diagnostics.knowledge_index);
    issues += report("Generator", &diagnostics.generator);

    println!();
    if issues == 0 {
        println!("  🎉 All backends healthy!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
