//! Collaborators the dialogue engine delegates to.
//!
//! The engine depends only on these traits. Concrete implementations
//! (retrieval over a document corpus, model-backed phrasing) are built once
//! at process start and shared behind `Arc`.

use async_trait::async_trait;

use crate::error::Result;
use crate::facts::{FactValue, Field};

/// Produces the narrative part of a final answer from a structured query.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate_answer(&self, structured_query: &str) -> Result<String>;
}

/// What the phraser knows about the turn it is wrapping a question for.
#[derive(Debug, Clone)]
pub struct PhraseRequest<'a> {
    /// The raw question text.
    pub question: &'a str,
    /// The message the user just sent.
    pub user_message: &'a str,
    /// True for the very first question of a conversation.
    pub first_contact: bool,
    /// Facts learned from the user's message this turn.
    pub acknowledged: Vec<(Field, FactValue)>,
}

/// Turns a bare question into a friendlier message.
#[async_trait]
pub trait QuestionPhraser: Send + Sync {
    async fn phrase(&self, request: &PhraseRequest<'_>) -> Result<String>;
}
