//! Facts read out of a single user message.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::context::Context;
use crate::error::ExtractionError;
use crate::facts::{Facts, Field};
use crate::intent::Intent;

/// Which extractor produced a result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    #[default]
    Llm,
    Fallback,
}

/// Typed facts and per-fact confidence interpreted from one message.
///
/// Produced and consumed within a single turn; only ever merged into a
/// [`Context`], never stored directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub fields: Facts,

    /// Score in `[0, 1]` per extracted field. A field with a value but no
    /// score takes the merge policy's default confidence.
    #[serde(default)]
    pub confidence: BTreeMap<Field, f64>,

    #[serde(default)]
    pub intent: Intent,

    /// Fields the user explicitly corrected in this message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub corrections: Vec<Field>,

    /// Short free-text summary of the user's situation, when the extractor gives one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub situation: Option<String>,

    #[serde(default)]
    pub source: ExtractionSource,
}

impl ExtractionResult {
    /// A result with no facts, only an intent.
    pub fn empty(intent: Intent, source: ExtractionSource) -> Self {
        Self {
            intent,
            source,
            ..Default::default()
        }
    }

    pub fn confidence_for(&self, field: Field, default: f64) -> f64 {
        self.confidence
            .get(&field)
            .copied()
            .unwrap_or(default)
            .clamp(0.0, 1.0)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// An external extractor that turns free text into facts.
///
/// Implementations may fail on transport errors or malformed model output;
/// the dialogue layer recovers from every failure.
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    fn name(&self) -> &str;

    async fn extract(
        &self,
        message: &str,
        prior: &Context,
    ) -> std::result::Result<ExtractionResult, ExtractionError>;
}
