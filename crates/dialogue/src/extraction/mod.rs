//! Extraction adapter: an external extractor with a pattern-based safety net.

pub mod fallback;
pub mod llm;

use std::sync::Arc;

use qaryz_core::{Context, ExtractionResult, FieldExtractor};
use tracing::{debug, warn};

pub use fallback::{PatternExtractor, fallback_extract, parse_amount};
pub use llm::{LlmExtractor, parse_extraction};

/// Never fails: any extractor error is replaced by the pattern fallback.
#[derive(Clone)]
pub struct ExtractionAdapter {
    extractor: Arc<dyn FieldExtractor>,
}

impl ExtractionAdapter {
    pub fn new(extractor: Arc<dyn FieldExtractor>) -> Self {
        Self { extractor }
    }

    /// An adapter that only runs the pattern rules.
    pub fn fallback_only() -> Self {
        Self::new(Arc::new(PatternExtractor))
    }

    pub fn extractor_name(&self) -> &str {
        self.extractor.name()
    }

    pub async fn extract_fields(&self, message: &str, prior: &Context) -> ExtractionResult {
        match self.extractor.extract(message, prior).await {
            Ok(result) => {
                debug!(
                    extractor = self.extractor.name(),
                    fields = result.fields.known_fields().len(),
                    "Extracted"
                );
                result
            }
            Err(e) => {
                warn!(extractor = self.extractor.name(), error = %e, "Extractor failed, using pattern fallback");
                fallback_extract(message, prior)
            }
        }
    }
}

impl std::fmt::Debug for ExtractionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionAdapter")
            .field("extractor", &self.extractor_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FailingExtractor, ScriptedProvider};
    use qaryz_core::error::{ExtractionError, ProviderError};
    use qaryz_core::{ExtractionSource, Field, Intent};

    #[tokio::test]
    async fn extractor_errors_fall_back() {
        let adapter = ExtractionAdapter::new(Arc::new(FailingExtractor(|| {
            ExtractionError::Provider(ProviderError::Network("offline".into()))
        })));
        let result = adapter.extract_fields("долг 5 млн", &Context::default()).await;
        assert_eq!(result.source, ExtractionSource::Fallback);
        assert_eq!(result.fields.debt_amount, Some(5_000_000));
        assert_eq!(result.intent, Intent::EligibilityCheck);
    }

    #[tokio::test]
    async fn malformed_model_output_falls_back() {
        let provider = Arc::new(ScriptedProvider::new(vec!["Извините, я не могу помочь"]));
        let adapter = ExtractionAdapter::new(Arc::new(LlmExtractor::new(provider, "m")));
        let result = adapter.extract_fields("200к", &Context::default()).await;
        assert_eq!(result.source, ExtractionSource::Fallback);
        assert_eq!(result.fields.debt_amount, Some(200_000));
        assert_eq!(result.confidence[&Field::DebtAmount], 0.3);
    }

    #[tokio::test]
    async fn model_result_passes_through() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            r#"{"extracted_data": {"hasProperty": false}, "intent": "consequences"}"#,
        ]));
        let adapter = ExtractionAdapter::new(Arc::new(LlmExtractor::new(provider, "m")));
        let result = adapter.extract_fields("квартиры нет", &Context::default()).await;
        assert_eq!(result.source, ExtractionSource::Llm);
        assert_eq!(result.fields.has_property, Some(false));
        assert_eq!(result.intent, Intent::Consequences);
    }

    #[tokio::test]
    async fn fallback_only_adapter() {
        let adapter = ExtractionAdapter::fallback_only();
        assert_eq!(adapter.extractor_name(), "pattern");
        let result = adapter.extract_fields("ничего полезного", &Context::default()).await;
        assert!(result.is_empty());

        let result = adapter.extract_fields("долг 6 780 000 тенге", &Context::default()).await;
        assert_eq!(result.source, ExtractionSource::Fallback);
        assert_eq!(result.fields.debt_amount, Some(6_780_000));
    }
}
