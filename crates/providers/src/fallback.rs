//! Provider fallback: ordered retry chain with per-provider timeouts.
//!
//! When a provider fails (timeout, rate limit, error), the next provider in
//! the configured chain is tried. Completions and embeddings both fall back.

use async_trait::async_trait;
use qaryz_core::error::ProviderError;
use qaryz_core::provider::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A provider that wraps an ordered list of providers and falls back on failure.
pub struct FallbackProvider {
    name: String,
    chain: Vec<FallbackEntry>,
}

/// A single entry in the fallback chain.
struct FallbackEntry {
    provider: Arc<dyn Provider>,
    timeout: Duration,
}

impl FallbackEntry {
    fn timed_out(&self, what: &str) -> ProviderError {
        warn!(
            provider = %self.provider.name(),
            timeout_secs = self.timeout.as_secs(),
            "Fallback: {what} timed out, trying next"
        );
        ProviderError::Timeout(format!(
            "Provider '{}' {what} timed out after {}s",
            self.provider.name(),
            self.timeout.as_secs()
        ))
    }
}

impl FallbackProvider {
    /// Create a new fallback provider with no entries.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chain: Vec::new(),
        }
    }

    /// Add a provider to the fallback chain with a custom timeout.
    pub fn add(mut self, provider: Arc<dyn Provider>, timeout: Duration) -> Self {
        self.chain.push(FallbackEntry { provider, timeout });
        self
    }

    /// Add a provider with the default timeout (60s).
    pub fn add_default(self, provider: Arc<dyn Provider>) -> Self {
        self.add(provider, Duration::from_secs(60))
    }

    /// Number of providers in the chain.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    fn empty_chain_error() -> ProviderError {
        ProviderError::NotConfigured("No providers in fallback chain".into())
    }
}

#[async_trait]
impl Provider for FallbackProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let mut last_error = Self::empty_chain_error();

        for (i, entry) in self.chain.iter().enumerate() {
            debug!(
                provider = %entry.provider.name(),
                attempt = i + 1,
                total = self.chain.len(),
                "Fallback: trying provider"
            );

            match tokio::time::timeout(entry.timeout, entry.provider.complete(request.clone())).await {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(e)) => {
                    warn!(provider = %entry.provider.name(), error = %e, "Fallback: completion failed, trying next");
                    last_error = e;
                }
                Err(_) => last_error = entry.timed_out("completion"),
            }
        }

        Err(last_error)
    }

    async fn embed(
        &self,
        request: EmbeddingRequest,
    ) -> std::result::Result<EmbeddingResponse, ProviderError> {
        let mut last_error = Self::empty_chain_error();

        for entry in &self.chain {
            match tokio::time::timeout(entry.timeout, entry.provider.embed(request.clone())).await {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(e)) => {
                    warn!(provider = %entry.provider.name(), error = %e, "Fallback: embedding failed, trying next");
                    last_error = e;
                }
                Err(_) => last_error = entry.timed_out("embedding"),
            }
        }

        Err(last_error)
    }

    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        let mut all_models = Vec::new();
        for entry in &self.chain {
            if let Ok(models) = entry.provider.list_models().await {
                all_models.extend(models);
            }
        }
        Ok(all_models)
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        for entry in &self.chain {
            if let Ok(true) = entry.provider.health_check().await {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
