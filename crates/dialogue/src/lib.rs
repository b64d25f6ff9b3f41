//! # Qaryz Dialogue
//!
//! The consultation engine: decides, turn by turn, whether enough is known
//! about the user's debt situation to answer, and if not, what to ask next.
//!
//! A turn flows through:
//! - [`extraction`] reads facts out of the message (model first, patterns as a fallback)
//! - [`Context::merge`](qaryz_core::Context::merge) folds them into the caller's snapshot
//! - [`requirements`] checks the intent's required fields
//! - [`prioritizer`] picks the next question from the [`catalog`]
//! - [`composer`] assembles the final consultation
//!
//! [`controller::DialogueController`] drives the whole sequence.

pub mod catalog;
pub mod composer;
pub mod controller;
pub mod extraction;
pub mod followup;
pub mod keywords;
pub mod phrasing;
pub mod prioritizer;
pub mod requirements;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use catalog::{CATALOG, Question, QuestionDescriptor};
pub use composer::{AnswerComposer, GENERATION_APOLOGY};
pub use controller::{DialogueController, TurnInput, TurnResponse};
pub use extraction::{ExtractionAdapter, LlmExtractor, PatternExtractor};
pub use phrasing::{LlmPhraser, TemplatePhraser};
pub use prioritizer::QuestionPrioritizer;
pub use requirements::{CompletionStatus, Phase, Procedure, RequirementSet};
