//! In-memory retrieval index over document chunks.
//!
//! Built once at startup. When the provider can embed, search fuses a
//! vector ranking with a keyword ranking; otherwise it is keyword-only.

use futures::stream::{self, StreamExt, TryStreamExt};
use qaryz_core::error::KnowledgeError;
use qaryz_core::provider::{EmbeddingRequest, Provider};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::chunker::Chunk;
use crate::vector::{cosine_similarity, keyword_score, rank, reciprocal_rank_fusion, tokenize};

/// Embedding batches in flight at once.
const EMBED_CONCURRENCY: usize = 4;

const RRF_K: u32 = 60;

/// Relative weight of each ranking in hybrid search.
#[derive(Debug, Clone, Copy)]
pub struct SearchWeights {
    pub vector: f32,
    pub keyword: f32,
}

impl Default for SearchWeights {
    fn default() -> Self {
        Self { vector: 0.7, keyword: 0.3 }
    }
}

/// A search hit.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

#[derive(Debug, Default)]
pub struct KnowledgeIndex {
    chunks: Vec<Chunk>,
    /// One vector per chunk, aligned by position.
    embeddings: Option<Vec<Vec<f32>>>,
}

impl KnowledgeIndex {
    /// A keyword-only index.
    pub fn keyword_only(chunks: Vec<Chunk>) -> Self {
        Self { chunks, embeddings: None }
    }

    /// Embed every chunk through `provider`. Any embedding failure degrades
    /// the index to keyword-only instead of failing startup.
    pub async fn build(
        chunks: Vec<Chunk>,
        provider: &dyn Provider,
        model: &str,
        batch_size: usize,
    ) -> Self {
        if chunks.is_empty() {
            return Self::keyword_only(chunks);
        }

        match embed_chunks(&chunks, provider, model, batch_size.max(1)).await {
            Ok(embeddings) => {
                info!(chunks = chunks.len(), model = %model, "Built hybrid knowledge index");
                Self { chunks, embeddings: Some(embeddings) }
            }
            Err(e) => {
                warn!(error = %e, "Embedding unavailable, using keyword-only retrieval");
                Self::keyword_only(chunks)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn has_embeddings(&self) -> bool {
        self.embeddings.is_some()
    }

    /// Top `top_k` chunks for `query`.
    ///
    /// `query_embedding` is used only when the index itself has embeddings.
    pub fn search(
        &self,
        query: &str,
        query_embedding: Option<&[f32]>,
        top_k: usize,
        weights: SearchWeights,
    ) -> Vec<ScoredChunk> {
        let stems = tokenize(query);
        let keyword_ranking = rank(
            self.chunks
                .iter()
                .enumerate()
                .map(|(i, chunk)| (i, keyword_score(&stems, &chunk.content))),
        );

        let vector_ranking = match (&self.embeddings, query_embedding) {
            (Some(embeddings), Some(query_vec)) => rank(
                embeddings
                    .iter()
                    .enumerate()
                    .map(|(i, emb)| (i, cosine_similarity(emb, query_vec))),
            ),
            _ => Vec::new(),
        };

        debug!(
            keyword_hits = keyword_ranking.len(),
            vector_hits = vector_ranking.len(),
            "Knowledge search"
        );

        let fused = if vector_ranking.is_empty() {
            reciprocal_rank_fusion(&[(keyword_ranking.as_slice(), 1.0)], RRF_K, top_k)
        } else {
            reciprocal_rank_fusion(
                &[
                    (vector_ranking.as_slice(), weights.vector),
                    (keyword_ranking.as_slice(), weights.keyword),
                ],
                RRF_K,
                top_k,
            )
        };

        fused
            .into_iter()
            .filter_map(|(i, score)| {
                self.chunks.get(i).map(|chunk| ScoredChunk { chunk: chunk.clone(), score })
            })
            .collect()
    }
}

async fn embed_chunks(
    chunks: &[Chunk],
    provider: &dyn Provider,
    model: &str,
    batch_size: usize,
) -> Result<Vec<Vec<f32>>, KnowledgeError> {
    let batches: Vec<Vec<String>> = chunks
        .chunks(batch_size)
        .map(|batch| batch.iter().map(|c| c.content.clone()).collect())
        .collect();

    let responses: Vec<Vec<Vec<f32>>> = stream::iter(batches)
        .map(|inputs| {
            let expected = inputs.len();
            async move {
                let response = provider
                    .embed(EmbeddingRequest { model: model.to_string(), inputs })
                    .await
                    .map_err(|e| KnowledgeError::EmbeddingFailed(e.to_string()))?;
                if response.embeddings.len() != expected {
                    return Err(KnowledgeError::EmbeddingFailed(format!(
                        "expected {expected} vectors, got {}",
                        response.embeddings.len()
                    )));
                }
                Ok::<_, KnowledgeError>(response.embeddings)
            }
        })
        .buffered(EMBED_CONCURRENCY)
        .try_collect()
        .await?;

    Ok(responses.into_iter().flatten().collect())
}
