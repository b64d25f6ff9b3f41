//! Consultation knowledge base for Qaryz.
//!
//! Loads the local `*.txt` corpus, splits it into overlapping chunks,
//! indexes them for hybrid keyword/vector retrieval and answers structured
//! consultation queries through a language model.

pub mod chunker;
pub mod document;
pub mod index;
pub mod rag;
pub mod vector;

pub use chunker::{Chunk, Chunker};
pub use document::{Document, load_documents};
pub use index::{KnowledgeIndex, ScoredChunk, SearchWeights};
pub use rag::RagAnswerer;

use std::path::Path;

use qaryz_config::KnowledgeConfig;
use qaryz_core::error::KnowledgeError;
use qaryz_core::provider::Provider;

/// Load, chunk and index the corpus described by `config`.
///
/// A missing corpus directory is an error; embedding failures only degrade
/// retrieval to keywords.
pub async fn build_index(
    config: &KnowledgeConfig,
    provider: &dyn Provider,
) -> Result<KnowledgeIndex, KnowledgeError> {
    let documents = load_documents(Path::new(&config.docs_path))?;
    let chunks = Chunker::new(config.chunk_size, config.chunk_overlap).chunk_documents(&documents);
    Ok(KnowledgeIndex::build(chunks, provider, &config.embedding_model, config.embed_batch_size).await)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubProvider;

    #[tokio::test]
    async fn build_index_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("procedure.txt"),
            "Внесудебное банкротство.\n\nСудебное банкротство.",
        )
        .unwrap();

        let config = KnowledgeConfig {
            docs_path: dir.path().display().to_string(),
            chunk_size: 30,
            chunk_overlap: 5,
            ..KnowledgeConfig::default()
        };
        let index = build_index(&config, &StubProvider::working()).await.unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.has_embeddings());
    }

    #[tokio::test]
    async fn build_index_missing_directory() {
        let config = KnowledgeConfig {
            docs_path: "/nonexistent/qaryz".into(),
            ..KnowledgeConfig::default()
        };
        let err = build_index(&config, &StubProvider::working()).await.unwrap_err();
        assert!(matches!(err, KnowledgeError::CorpusUnavailable { .. }));
    }
}
