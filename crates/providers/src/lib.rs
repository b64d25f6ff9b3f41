//! LLM Provider implementations for Qaryz.
//!
//! All providers implement the `qaryz_core::Provider` trait.
//! The router builds them from configuration and assembles the fallback chain.

pub mod fallback;
pub mod openai_compat;
pub mod router;

pub use fallback::FallbackProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config};
