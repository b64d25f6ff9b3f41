//! Deterministic extraction used when the model-backed extractor fails.
//!
//! Recognises one debt amount with the informal magnitude suffixes people
//! use in chat (`5 млн`, `200к`, `300 тысяч`) and the intent keyword table.

use std::sync::LazyLock;

use async_trait::async_trait;
use qaryz_core::error::ExtractionError;
use qaryz_core::{Context, ExtractionResult, ExtractionSource, Field, FieldExtractor, Intent};
use regex_lite::Regex;

use crate::keywords::{CORRECTION, intent_from_keywords};

/// Confidence attached to amounts found by pattern matching.
pub const FALLBACK_CONFIDENCE: f64 = 0.3;

static MILLIONS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)\s*(?:млн|миллион)").ok());

// `к` must not run into a word, so "5 кредитов" is not 5 000.
static THOUSANDS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)\s*(?:тыс[а-яё]*\.?|к)(?:[^а-яёa-z]|$)").ok());

// Groups: digits, currency suffix, year marker.
static PLAIN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(\d{1,3}(?:[ \x{a0}]\d{3})+|\d{4,})(\s*(?:тенге|тг))?(\s*г(?:од[а-яё]*|\.))?").ok()
});

/// Ungrouped numbers this long without a currency are phone numbers or IDs.
const MAX_BARE_DIGITS: usize = 10;

/// Debt amount in tenge named in `message`, if any.
///
/// Millions are tried first, then thousands; the first that matches
/// decides. Plain numbers come last and are filtered: years, bare
/// four-digit numbers without a currency and phone-length digit runs are
/// skipped. Among the rest a grouped or currency-marked number wins, then
/// the largest.
pub fn parse_amount(message: &str) -> Option<u64> {
    let lower = message.to_lowercase();
    let scaled = [(&MILLIONS, 1_000_000.0), (&THOUSANDS, 1_000.0)];

    scaled
        .into_iter()
        .find_map(|(pattern, multiplier)| {
            let re = pattern.as_ref()?;
            let number = parse_number(re.captures(&lower)?.get(1)?.as_str())?;
            to_amount(number * multiplier)
        })
        .or_else(|| plain_amount(&lower))
}

fn plain_amount(lower: &str) -> Option<u64> {
    let re = PLAIN.as_ref()?;

    re.captures_iter(lower)
        .filter_map(|caps| {
            let digits = caps.get(1)?.as_str();
            let has_currency = caps.get(2).is_some();
            if caps.get(3).is_some() {
                return None;
            }

            let grouped = digits.chars().any(char::is_whitespace);
            if !grouped && !has_currency {
                let len = digits.len();
                if len == 4 || len > MAX_BARE_DIGITS {
                    return None;
                }
            }

            let amount = to_amount(parse_number(digits)?)?;
            Some((grouped || has_currency, amount))
        })
        .max()
        .map(|(_, amount)| amount)
}

fn parse_number(digits: &str) -> Option<f64> {
    digits
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect::<String>()
        .parse()
        .ok()
}

fn to_amount(value: f64) -> Option<u64> {
    let amount = value.round();
    (amount > 0.0 && amount < u64::MAX as f64).then_some(amount as u64)
}

/// Intent from keywords, else the conversation's current intent, else the
/// eligibility check.
pub fn fallback_intent(message: &str, prior: &Context) -> Intent {
    intent_from_keywords(message)
        .or(prior.user_intent)
        .unwrap_or_default()
}

pub fn fallback_extract(message: &str, prior: &Context) -> ExtractionResult {
    let mut result =
        ExtractionResult::empty(fallback_intent(message, prior), ExtractionSource::Fallback);

    if let Some(amount) = parse_amount(message) {
        result.fields.debt_amount = Some(amount);
        result.confidence.insert(Field::DebtAmount, FALLBACK_CONFIDENCE);
        if CORRECTION.matches(message) {
            result.corrections.push(Field::DebtAmount);
        }
    }

    result
}

/// The fallback rules as a [`FieldExtractor`], for running without a model.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternExtractor;

#[async_trait]
impl FieldExtractor for PatternExtractor {
    fn name(&self) -> &str {
        "pattern"
    }

    async fn extract(&self, message: &str, prior: &Context) -> Result<ExtractionResult, ExtractionError> {
        Ok(fallback_extract(message, prior))
    }
}
