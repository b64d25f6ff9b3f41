//! Shared stubs for dialogue tests.

use async_trait::async_trait;
use qaryz_core::error::{Error, ExtractionError, ProviderError, Result};
use qaryz_core::message::Message;
use qaryz_core::provider::{Provider, ProviderRequest, ProviderResponse};
use qaryz_core::{AnswerGenerator, Context, ExtractionResult, FieldExtractor};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A provider that replies with scripted texts in order, or always fails.
///
/// Once the script runs out every call answers `"ok"`.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    error: Option<ProviderError>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(String::from).collect()),
            error: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            error: Some(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> std::result::Result<ProviderResponse, ProviderError> {
        let model = request.model.clone();
        self.requests.lock().unwrap().push(request);
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        let text = self.replies.lock().unwrap().pop_front().unwrap_or_else(|| "ok".into());
        Ok(ProviderResponse {
            message: Message::assistant(text),
            usage: None,
            model,
        })
    }
}

/// An extractor that always fails with the error its function builds.
pub struct FailingExtractor(pub fn() -> ExtractionError);

#[async_trait]
impl FieldExtractor for FailingExtractor {
    fn name(&self) -> &str {
        "failing"
    }

    async fn extract(&self, _message: &str, _prior: &Context) -> std::result::Result<ExtractionResult, ExtractionError> {
        Err((self.0)())
    }
}

/// An extractor that returns a fixed result for every message.
pub struct FixedExtractor(pub ExtractionResult);

#[async_trait]
impl FieldExtractor for FixedExtractor {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn extract(&self, _message: &str, _prior: &Context) -> std::result::Result<ExtractionResult, ExtractionError> {
        Ok(self.0.clone())
    }
}

/// An extractor that panics, for exercising the turn boundary.
pub struct PanickingExtractor;

#[async_trait]
impl FieldExtractor for PanickingExtractor {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn extract(&self, _message: &str, _prior: &Context) -> std::result::Result<ExtractionResult, ExtractionError> {
        panic!("extractor exploded");
    }
}

/// Answers every query with the same text and remembers the queries.
pub struct RecordingAnswers {
    text: String,
    queries: Mutex<Vec<String>>,
}

impl RecordingAnswers {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn last_query(&self) -> Option<String> {
        self.queries.lock().unwrap().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl AnswerGenerator for RecordingAnswers {
    async fn generate_answer(&self, structured_query: &str) -> Result<String> {
        self.queries.lock().unwrap().push(structured_query.to_string());
        Ok(self.text.clone())
    }
}

pub struct FailingAnswers;

#[async_trait]
impl AnswerGenerator for FailingAnswers {
    async fn generate_answer(&self, _structured_query: &str) -> Result<String> {
        Err(Error::Internal("generator offline".into()))
    }
}
