//! Retrieval-augmented answer generation.
//!
//! Two model calls per answer: a grounded answer over the retrieved chunks,
//! then a synthesis pass that rewrites it as a consultation and pins the
//! referral wording.

use std::sync::Arc;

use async_trait::async_trait;
use qaryz_config::AppConfig;
use qaryz_core::collaborator::AnswerGenerator;
use qaryz_core::error::{Error, KnowledgeError, Result};
use qaryz_core::message::Message;
use qaryz_core::provider::{EmbeddingRequest, Provider, ProviderRequest};
use tracing::{debug, info, warn};

use crate::index::{KnowledgeIndex, ScoredChunk, SearchWeights};

/// Answers structured consultation queries from the document corpus.
pub struct RagAnswerer {
    index: Arc<KnowledgeIndex>,
    provider: Arc<dyn Provider>,
    model: String,
    embedding_model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    top_k: usize,
    weights: SearchWeights,
    referral_contact: String,
}

impl RagAnswerer {
    pub fn new(index: Arc<KnowledgeIndex>, provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            index,
            provider,
            model: model.into(),
            embedding_model: "text-embedding-3-small".into(),
            temperature: 0.7,
            max_tokens: None,
            top_k: 4,
            weights: SearchWeights::default(),
            referral_contact: "адвокату Мухтарову Торехану".into(),
        }
    }

    /// Wire every knob from configuration.
    pub fn from_config(index: Arc<KnowledgeIndex>, provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        Self::new(index, provider, config.answer_model())
            .with_embedding_model(&config.knowledge.embedding_model)
            .with_temperature(config.default_temperature)
            .with_max_tokens(Some(config.default_max_tokens))
            .with_top_k(config.knowledge.top_k)
            .with_weights(SearchWeights {
                vector: config.knowledge.vector_weight,
                keyword: config.knowledge.keyword_weight,
            })
            .with_referral_contact(&config.dialogue.referral_contact)
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn with_weights(mut self, weights: SearchWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_referral_contact(mut self, contact: impl Into<String>) -> Self {
        self.referral_contact = contact.into();
        self
    }

    /// Chunks that would back an answer to `query`.
    pub async fn retrieve(&self, query: &str) -> Vec<ScoredChunk> {
        let query_embedding = if self.index.has_embeddings() {
            self.embed_query(query).await
        } else {
            None
        };
        self.index
            .search(query, query_embedding.as_deref(), self.top_k, self.weights)
    }

    async fn embed_query(&self, query: &str) -> Option<Vec<f32>> {
        let request = EmbeddingRequest {
            model: self.embedding_model.clone(),
            inputs: vec![query.to_string()],
        };
        match self.provider.embed(request).await {
            Ok(response) => response.embeddings.into_iter().next(),
            Err(e) => {
                warn!(error = %e, "Query embedding failed, searching by keywords");
                None
            }
        }
    }

    async fn ask(&self, prompt: String) -> Result<String> {
        let request = ProviderRequest::new(&self.model, vec![Message::user(prompt)])
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        let response = self.provider.complete(request).await?;
        let text = response.message.content.trim().to_string();
        if text.is_empty() {
            return Err(Error::Knowledge(KnowledgeError::GenerationFailed(
                "model returned an empty answer".into(),
            )));
        }
        Ok(text)
    }

    fn grounded_prompt(&self, question: &str, hits: &[ScoredChunk]) -> String {
        let context = hits
            .iter()
            .map(|hit| hit.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "Ты эксперт-консультант по банкротству в Казахстане. Используй предоставленный контекст \
             для ответа на вопрос пользователя. Если не знаешь ответ, просто скажи, что не знаешь. \
             Отвечай на русском языке четко и по делу.\n\n\
             ВАЖНО: Вместо фраз \"обратитесь к специалисту\" или \"обратитесь к юристу\" всегда \
             рекомендуй \"обратиться к {contact}\".\n\n\
             Вопрос: {question}\n\n\
             Контекст: {context}\n\n\
             Ответ:",
            contact = self.referral_contact,
        )
    }

    fn synthesis_prompt(&self, question: &str, draft: &str) -> String {
        format!(
            "Используй следующие пары вопрос-ответ для создания итогового ответа на русском языке:\n\n\
             Вопрос 1: {question}\nОтвет 1: {draft}\n\n\
             На основе этой информации ответь на вопрос: {question}\n\n\
             Отвечай как эксперт по банкротству в Казахстане на русском языке.\n\n\
             ВАЖНО: Вместо общих фраз \"обратитесь к специалисту\" или \"обратитесь к юристу\" \
             ВСЕГДА рекомендуй конкретно: \"Рекомендую обратиться к {contact} для профессиональной \
             консультации по вашей ситуации\".",
            contact = self.referral_contact,
        )
    }
}

#[async_trait]
impl AnswerGenerator for RagAnswerer {
    async fn generate_answer(&self, structured_query: &str) -> Result<String> {
        if self.index.is_empty() {
            return Err(Error::Knowledge(KnowledgeError::EmptyIndex));
        }

        let hits = self.retrieve(structured_query).await;
        debug!(
            hits = hits.len(),
            sources = ?hits.iter().map(|h| h.chunk.id.as_str()).collect::<Vec<_>>(),
            "Retrieved context"
        );

        let draft = self.ask(self.grounded_prompt(structured_query, &hits)).await?;
        let answer = self.ask(self.synthesis_prompt(structured_query, &draft)).await?;

        info!(chars = answer.chars().count(), "Generated answer");
        Ok(answer)
    }
}
