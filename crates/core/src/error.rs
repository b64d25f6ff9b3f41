//! Error types for the Qaryz domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Qaryz operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Extraction errors ---
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    // --- Knowledge base errors ---
    #[error("Knowledge error: {0}")]
    Knowledge(#[from] KnowledgeError),

    // --- Inbound conversation snapshot ---
    #[error("Invalid conversation context: {0}")]
    InvalidContext(String),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Extractor unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed extractor output: {0}")]
    Malformed(String),

    #[error("Extractor call failed: {0}")]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("Document corpus unavailable at {path}: {reason}")]
    CorpusUnavailable { path: String, reason: String },

    #[error("No documents indexed")]
    EmptyIndex,

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Answer generation failed: {0}")]
    GenerationFailed(String),
}
