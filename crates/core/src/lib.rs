//! # Qaryz Core
//!
//! Domain types, collaborator traits, and error definitions for the Qaryz
//! bankruptcy consultation bot. This crate has **zero framework dependencies**;
//! it defines the model every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (language model, fact extractor, answer
//! generator, phraser) is a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with scripted stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod provider;
pub mod facts;
pub mod intent;
pub mod context;
pub mod extraction;
pub mod collaborator;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use facts::{CollateralType, EmploymentType, FactValue, Facts, Field, IncomeStability};
pub use intent::{Intent, SessionState};
pub use context::{Context, MergePolicy};
pub use extraction::{ExtractionResult, ExtractionSource, FieldExtractor};
pub use collaborator::{AnswerGenerator, PhraseRequest, QuestionPhraser};
