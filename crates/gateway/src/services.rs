//! Builds the collaborators a running bot needs from configuration.
//!
//! Everything here is constructed once per process and shared by every
//! request afterwards.

use std::path::Path;
use std::sync::Arc;

use qaryz_config::AppConfig;
use qaryz_core::{Error, Result};
use qaryz_dialogue::{DialogueController, LlmExtractor, LlmPhraser};
use qaryz_knowledge::{KnowledgeIndex, RagAnswerer, build_index};
use qaryz_providers::router::build_from_config;
use serde::Serialize;
use tracing::{info, warn};

/// What the bot is running with, reported by `/health` and `qaryz doctor`.
#[derive(Debug, Clone, Serialize)]
pub struct Components {
    pub provider: String,
    pub extractor: String,
    pub phrasing: &'static str,
    pub knowledge_chunks: usize,
    pub embeddings: bool,
}

pub struct Services {
    pub controller: Arc<DialogueController>,
    pub components: Components,
}

/// Build the provider chain, the knowledge index and the dialogue controller.
///
/// A missing or empty corpus is not fatal: the bot still collects facts,
/// and consultations fall back to the apology text.
pub async fn build_services(config: &AppConfig) -> Result<Services> {
    let router = build_from_config(config);
    let provider = router
        .chain(&config.fallback_providers)
        .ok_or_else(|| Error::Config {
            message: format!("provider '{}' is not configured", config.default_provider),
        })?;

    let index = match build_index(&config.knowledge, provider.as_ref()).await {
        Ok(index) => {
            info!(
                docs = %config.knowledge.docs_path,
                chunks = index.len(),
                embeddings = index.has_embeddings(),
                "Knowledge index ready"
            );
            index
        }
        Err(e) => {
            warn!(error = %e, docs = %config.knowledge.docs_path, "Knowledge base unavailable");
            KnowledgeIndex::default()
        }
    };
    let knowledge_chunks = index.len();
    let embeddings = index.has_embeddings();

    let answers = RagAnswerer::from_config(Arc::new(index), provider.clone(), config);
    let mut controller = DialogueController::from_config(config, Arc::new(answers));

    if config.extraction.use_llm {
        let extractor = LlmExtractor::new(provider.clone(), config.extraction_model())
            .with_temperature(config.extraction.temperature);
        controller = controller.with_extractor(Arc::new(extractor));
    }

    let phrasing = if config.dialogue.llm_phrasing {
        controller = controller.with_phraser(Arc::new(LlmPhraser::new(
            provider.clone(),
            config.answer_model(),
        )));
        "llm"
    } else {
        "template"
    };

    let components = Components {
        provider: provider.name().to_string(),
        extractor: controller.extractor_name().to_string(),
        phrasing,
        knowledge_chunks,
        embeddings,
    };

    Ok(Services {
        controller: Arc::new(controller),
        components,
    })
}

/// Whether the configured corpus directory exists and holds any `*.txt` file.
pub fn corpus_present(docs_path: &str) -> bool {
    let Ok(entries) = std::fs::read_dir(Path::new(docs_path)) else {
        return false;
    };
    entries
        .filter_map(|entry| entry.ok())
        .any(|entry| entry.path().extension().is_some_and(|ext| ext == "txt"))
}
