//! What the user wants from the consultation, and where the session stands.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::facts::UnknownName;

/// Classification of the user's request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    #[default]
    EligibilityCheck,
    HowToStart,
    Documentation,
    Consequences,
    SpecificProblem,
}

impl Intent {
    pub const ALL: [Intent; 5] = [
        Intent::EligibilityCheck,
        Intent::HowToStart,
        Intent::Documentation,
        Intent::Consequences,
        Intent::SpecificProblem,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::EligibilityCheck => "eligibility_check",
            Intent::HowToStart => "how_to_start",
            Intent::Documentation => "documentation",
            Intent::Consequences => "consequences",
            Intent::SpecificProblem => "specific_problem",
        }
    }

    /// Russian description used when briefing the answer generator.
    pub fn description(self) -> &'static str {
        match self {
            Intent::EligibilityCheck => "подходит ли клиент под процедуру банкротства",
            Intent::HowToStart => "с чего начать процедуру банкротства",
            Intent::Documentation => "какие документы нужны для банкротства",
            Intent::Consequences => "какие последствия у банкротства",
            Intent::SpecificProblem => "конкретная проблема клиента с долгами",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == s)
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

/// Accepts any string for an optional intent; unrecognised tags read as unknown.
pub fn deserialize_lenient_intent<'de, D>(deserializer: D) -> Result<Option<Intent>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

/// Where a conversation stands after a turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Initial,
    CollectingInfo,
    Answered,
    OfferingProduct,
    Error,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Initial => "initial",
            SessionState::CollectingInfo => "collecting_info",
            SessionState::Answered => "answered",
            SessionState::OfferingProduct => "offering_product",
            SessionState::Error => "error",
        }
    }

    /// Read a tag sent by a client. Anything unrecognised is `Initial`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "collecting_info" => SessionState::CollectingInfo,
            "answered" => SessionState::Answered,
            "offering_product" => SessionState::OfferingProduct,
            "error" => SessionState::Error,
            _ => SessionState::Initial,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SessionState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag: Option<String> = Option::deserialize(deserializer)?;
        Ok(tag.as_deref().map(SessionState::from_tag).unwrap_or_default())
    }
}
