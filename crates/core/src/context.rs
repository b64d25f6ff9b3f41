//! Context: the per-conversation fact store.
//!
//! The caller owns the context between turns and passes the full snapshot in
//! with every message. A turn merges one [`ExtractionResult`] into it and
//! hands back a new value; nothing here is mutated in place across turns.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

use crate::error::{Error, Result};
use crate::extraction::ExtractionResult;
use crate::facts::{Facts, Field};
use crate::intent::{Intent, deserialize_lenient_intent};

/// Thresholds applied when merging extracted facts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergePolicy {
    /// A known fact is only replaced by a value scored above this.
    pub threshold: f64,
    /// Confidence assumed for an extracted value that came without a score.
    pub default_confidence: f64,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            default_confidence: 0.8,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    #[serde(flatten)]
    pub facts: Facts,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_lenient_intent"
    )]
    pub user_intent: Option<Intent>,

    /// Questions already asked, oldest first. A field may repeat when it was re-asked.
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "deserialize_field_list")]
    pub questions_asked: Vec<Field>,

    /// Confidence each known fact was accepted with.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "deserialize_ledger")]
    pub answers_received: BTreeMap<Field, f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<u32>,
}

impl Context {
    /// Read the snapshot a client sent with its request. `null` is an empty context.
    pub fn from_snapshot(snapshot: &serde_json::Value) -> Result<Self> {
        match snapshot {
            serde_json::Value::Null => Ok(Self::default()),
            serde_json::Value::Object(_) => serde_json::from_value(snapshot.clone())
                .map_err(|e| Error::InvalidContext(e.to_string())),
            other => Err(Error::InvalidContext(format!(
                "expected an object, got {}",
                json_kind(other)
            ))),
        }
    }

    pub fn to_snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::Value::Object(Default::default()))
    }

    /// The state a greeting resets a conversation to.
    pub fn fresh_start() -> Self {
        Self {
            step: Some(1),
            ..Default::default()
        }
    }

    pub fn is_known(&self, field: Field) -> bool {
        self.facts.is_known(field)
    }

    /// How many times a question about `field` has been asked so far.
    pub fn times_asked(&self, field: Field) -> usize {
        self.questions_asked.iter().filter(|f| **f == field).count()
    }

    pub fn record_question(&mut self, field: Field) {
        self.questions_asked.push(field);
    }

    pub fn advance_step(&mut self) {
        self.step = Some(self.step.unwrap_or(0).saturating_add(1));
    }

    /// Merge one turn's extraction into a copy of this context.
    ///
    /// A value is accepted when the field is unknown here, or when its
    /// confidence is above `policy.threshold` and at least the confidence the
    /// current value was accepted with. Fields listed in
    /// `incoming.corrections` skip the second comparison. Null incoming
    /// values never touch the result.
    pub fn merge(&self, incoming: &ExtractionResult, policy: &MergePolicy) -> Context {
        let mut merged = self.clone();

        for field in Field::ALL {
            if !incoming.fields.is_known(field) {
                continue;
            }

            let confidence = incoming.confidence_for(field, policy.default_confidence);
            let accept = if !self.facts.is_known(field) {
                true
            } else {
                let recorded = self.answers_received.get(&field).copied().unwrap_or(0.0);
                let corrected = incoming.corrections.contains(&field);
                confidence > policy.threshold && (confidence >= recorded || corrected)
            };

            if accept {
                merged.facts.copy_field(&incoming.fields, field);
                merged.answers_received.insert(field, confidence);
            } else {
                trace!(field = %field, confidence, "Kept existing value");
            }
        }

        merged
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Question ids from older clients may include names outside the vocabulary; drop them.
fn deserialize_field_list<'de, D>(deserializer: D) -> std::result::Result<Vec<Field>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .iter()
        .filter_map(|v| v.as_str().and_then(|s| s.parse().ok()))
        .collect())
}

/// The ledger keeps numeric confidences only; other entries are dropped.
fn deserialize_ledger<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<Field, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Map<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .iter()
        .filter_map(|(key, value)| {
            let field = key.parse::<Field>().ok()?;
            let confidence = value.as_f64()?;
            Some((field, confidence.clamp(0.0, 1.0)))
        })
        .collect())
}
