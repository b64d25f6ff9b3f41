//! Configuration loading, validation, and management for Qaryz.
//!
//! Loads configuration from `~/.qaryz/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use qaryz_core::{Field, Intent, MergePolicy};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.qaryz/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default chat model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Providers tried in order after the default one fails
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback_providers: Vec<String>,

    /// HTTP gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Field extraction configuration
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Dialogue rules: thresholds, legal constants, required fields
    #[serde(default)]
    pub dialogue: DialogueConfig,

    /// Document corpus and retrieval configuration
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_true() -> bool {
    true
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("fallback_providers", &self.fallback_providers)
            .field("gateway", &self.gateway)
            .field("extraction", &self.extraction)
            .field("dialogue", &self.dialogue)
            .field("knowledge", &self.knowledge)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_token", &redact(&self.api_token))
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("conversation_rate_limit_per_minute", &self.conversation_rate_limit_per_minute)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("max_tracked_conversations", &self.max_tracked_conversations)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Static bearer token the WhatsApp integration sends. No token = open API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Requests per minute per bearer token. The WhatsApp integration sends
    /// one token for every user, so this caps the integration as a whole.
    /// 0 disables limiting.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,

    /// `/chat` turns per minute for a single `whatsapp_id`. 0 disables limiting.
    #[serde(default = "default_conversation_rate_limit")]
    pub conversation_rate_limit_per_minute: u32,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Per-conversation turn locks kept before idle ones are evicted.
    #[serde(default = "default_max_tracked_conversations")]
    pub max_tracked_conversations: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8000
}
fn default_rate_limit() -> u32 {
    600
}
fn default_conversation_rate_limit() -> u32 {
    30
}
fn default_max_body_bytes() -> usize {
    64 * 1024
}
fn default_max_tracked_conversations() -> usize {
    10_000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_token: None,
            rate_limit_per_minute: default_rate_limit(),
            conversation_rate_limit_per_minute: default_conversation_rate_limit(),
            max_body_bytes: default_max_body_bytes(),
            max_tracked_conversations: default_max_tracked_conversations(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Use the language model for extraction. When false only the
    /// keyword/regex extractor runs.
    #[serde(default = "default_true")]
    pub use_llm: bool,

    /// Model for extraction; the default model when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default = "default_extraction_temperature")]
    pub temperature: f32,

    /// Confidence assumed for an extracted value reported without a score.
    #[serde(default = "default_confidence")]
    pub default_confidence: f64,
}

fn default_extraction_temperature() -> f32 {
    0.0
}
fn default_confidence() -> f64 {
    0.8
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            use_llm: true,
            model: None,
            temperature: default_extraction_temperature(),
            default_confidence: default_confidence(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// A known fact is only replaced by a value scored above this.
    #[serde(default = "default_merge_threshold")]
    pub merge_confidence_threshold: f64,

    /// Debt above which an eligibility check also asks about property.
    #[serde(default = "default_large_debt_threshold")]
    pub large_debt_threshold: u64,

    /// Debt above which the follow-up offer takes an urgent tone.
    #[serde(default = "default_followup_escalation_threshold")]
    pub followup_escalation_threshold: u64,

    /// Monthly calculation index (МРП), tenge.
    #[serde(default = "default_mci")]
    pub monthly_calculation_index: u64,

    /// Out-of-court procedure limit in MCI units.
    #[serde(default = "default_out_of_court_multiplier")]
    pub out_of_court_mci_multiplier: u64,

    /// Who registered entrepreneurs are referred to, in the dative case.
    #[serde(default = "default_referral_contact")]
    pub referral_contact: String,

    /// Let the language model wrap questions into friendlier messages.
    #[serde(default)]
    pub llm_phrasing: bool,

    /// Intent tag → ordered list of required fields.
    #[serde(default = "default_requirements")]
    pub requirements: BTreeMap<String, Vec<Field>>,
}

fn default_merge_threshold() -> f64 {
    0.5
}
fn default_large_debt_threshold() -> u64 {
    10_000_000
}
fn default_followup_escalation_threshold() -> u64 {
    1_000_000
}
fn default_mci() -> u64 {
    3692
}
fn default_out_of_court_multiplier() -> u64 {
    1600
}
fn default_referral_contact() -> String {
    "адвокату Мухтарову Торехану".into()
}

pub fn default_requirements() -> BTreeMap<String, Vec<Field>> {
    BTreeMap::from([
        (
            Intent::EligibilityCheck.as_str().to_string(),
            vec![
                Field::DebtAmount,
                Field::HasOverdue12Months,
                Field::MonthlyIncome,
                Field::EmploymentType,
            ],
        ),
        (
            Intent::HowToStart.as_str().to_string(),
            vec![
                Field::DebtAmount,
                Field::HasOverdue12Months,
                Field::EmploymentType,
                Field::HasProperty,
            ],
        ),
        (
            Intent::Documentation.as_str().to_string(),
            vec![Field::EmploymentType],
        ),
        (
            Intent::Consequences.as_str().to_string(),
            vec![Field::HasProperty, Field::HasCar],
        ),
        (Intent::SpecificProblem.as_str().to_string(), vec![]),
    ])
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            merge_confidence_threshold: default_merge_threshold(),
            large_debt_threshold: default_large_debt_threshold(),
            followup_escalation_threshold: default_followup_escalation_threshold(),
            monthly_calculation_index: default_mci(),
            out_of_court_mci_multiplier: default_out_of_court_multiplier(),
            referral_contact: default_referral_contact(),
            llm_phrasing: false,
            requirements: default_requirements(),
        }
    }
}

impl DialogueConfig {
    /// Requirement table keyed by parsed intent. Unknown intent keys are
    /// rejected by [`AppConfig::validate`], so they are skipped here.
    pub fn requirement_table(&self) -> BTreeMap<Intent, Vec<Field>> {
        self.requirements
            .iter()
            .filter_map(|(key, fields)| key.parse::<Intent>().ok().map(|i| (i, fields.clone())))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Directory holding the `*.txt` consultation corpus.
    #[serde(default = "default_docs_path")]
    pub docs_path: String,

    /// Chunk size in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Chunks handed to the model per answer.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,

    #[serde(default = "default_vector_weight")]
    pub vector_weight: f32,

    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f32,

    /// Model for the final answer; the default model when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_model: Option<String>,
}

fn default_docs_path() -> String {
    "docs".into()
}
fn default_chunk_size() -> usize {
    300
}
fn default_chunk_overlap() -> usize {
    50
}
fn default_top_k() -> usize {
    4
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_embed_batch_size() -> usize {
    64
}
fn default_vector_weight() -> f32 {
    0.7
}
fn default_keyword_weight() -> f32 {
    0.3
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            docs_path: default_docs_path(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            embedding_model: default_embedding_model(),
            embed_batch_size: default_embed_batch_size(),
            vector_weight: default_vector_weight(),
            keyword_weight: default_keyword_weight(),
            answer_model: None,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.qaryz/config.toml).
    ///
    /// Also checks environment variables:
    /// - `QARYZ_API_KEY` (highest priority), `OPENAI_API_KEY`, `OPENROUTER_API_KEY`
    /// - `QARYZ_PROVIDER`, `QARYZ_MODEL`, `QARYZ_DOCS_PATH`, `QARYZ_PORT`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides through a lookup function.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api_key.is_none() {
            self.api_key = lookup("QARYZ_API_KEY")
                .or_else(|| lookup("OPENAI_API_KEY"))
                .or_else(|| lookup("OPENROUTER_API_KEY"));
        }

        if let Some(provider) = lookup("QARYZ_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("QARYZ_MODEL") {
            self.default_model = model;
        }

        if let Some(path) = lookup("QARYZ_DOCS_PATH") {
            self.knowledge.docs_path = path;
        }

        if let Some(port) = lookup("QARYZ_PORT") {
            self.gateway.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!("QARYZ_PORT is not a port number: {port}"))
            })?;
        }

        Ok(())
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".qaryz")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if !(0.0..=2.0).contains(&self.extraction.temperature) {
            return Err(ConfigError::ValidationError(
                "extraction.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.extraction.default_confidence) {
            return Err(ConfigError::ValidationError(
                "extraction.default_confidence must be between 0.0 and 1.0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.dialogue.merge_confidence_threshold) {
            return Err(ConfigError::ValidationError(
                "dialogue.merge_confidence_threshold must be between 0.0 and 1.0".into(),
            ));
        }

        if self.dialogue.monthly_calculation_index == 0 {
            return Err(ConfigError::ValidationError(
                "dialogue.monthly_calculation_index must be > 0".into(),
            ));
        }

        for intent in self.dialogue.requirements.keys() {
            if intent.parse::<Intent>().is_err() {
                return Err(ConfigError::ValidationError(format!(
                    "dialogue.requirements: unknown intent '{intent}'"
                )));
            }
        }

        if self.knowledge.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "knowledge.chunk_size must be > 0".into(),
            ));
        }

        if self.knowledge.chunk_overlap >= self.knowledge.chunk_size {
            return Err(ConfigError::ValidationError(
                "knowledge.chunk_overlap must be smaller than chunk_size".into(),
            ));
        }

        if self.knowledge.top_k == 0 || self.knowledge.embed_batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "knowledge.top_k and knowledge.embed_batch_size must be > 0".into(),
            ));
        }

        if self.knowledge.vector_weight + self.knowledge.keyword_weight <= 0.0 {
            return Err(ConfigError::ValidationError(
                "vector_weight + keyword_weight must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn merge_policy(&self) -> MergePolicy {
        MergePolicy {
            threshold: self.dialogue.merge_confidence_threshold,
            default_confidence: self.extraction.default_confidence,
        }
    }

    pub fn extraction_model(&self) -> &str {
        self.extraction.model.as_deref().unwrap_or(&self.default_model)
    }

    pub fn answer_model(&self) -> &str {
        self.knowledge.answer_model.as_deref().unwrap_or(&self.default_model)
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            fallback_providers: vec![],
            gateway: GatewayConfig::default(),
            extraction: ExtractionConfig::default(),
            dialogue: DialogueConfig::default(),
            knowledge: KnowledgeConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.gateway.port, 8000);
        assert_eq!(config.dialogue.monthly_calculation_index, 3692);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(parsed.dialogue.requirements, config.dialogue.requirements);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk() {
        let mut config = AppConfig::default();
        config.knowledge.chunk_overlap = config.knowledge.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_intent_in_requirements_rejected() {
        let toml_str = r#"
[dialogue.requirements]
eligibility_check = ["debtAmount"]
smalltalk = ["hasCar"]
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("smalltalk"));
    }

    #[test]
    fn gateway_limits_are_separate() {
        let toml_str = r#"
[gateway]
rate_limit_per_minute = 1200
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gateway.rate_limit_per_minute, 1200);
        assert_eq!(config.gateway.conversation_rate_limit_per_minute, 30);
    }

    #[test]
    fn unknown_field_in_requirements_fails_to_parse() {
        let toml_str = r#"
[dialogue.requirements]
eligibility_check = ["salary"]
"#;
        assert!(toml::from_str::<AppConfig>(toml_str).is_err());
    }

    #[test]
    fn requirements_are_deployment_configurable() {
        let toml_str = r#"
[dialogue.requirements]
eligibility_check = ["debtAmount", "hasOverdue12Months", "hasProperty", "hasCar", "hasCollateral"]
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        let table = config.dialogue.requirement_table();
        assert_eq!(table.len(), 1);
        assert_eq!(table[&Intent::EligibilityCheck].len(), 5);
    }

    #[test]
    fn default_requirements_cover_every_intent() {
        let table = DialogueConfig::default().requirement_table();
        for intent in Intent::ALL {
            assert!(table.contains_key(&intent), "missing {intent}");
        }
        assert_eq!(
            table[&Intent::EligibilityCheck],
            vec![
                Field::DebtAmount,
                Field::HasOverdue12Months,
                Field::MonthlyIncome,
                Field::EmploymentType
            ]
        );
        assert!(table[&Intent::SpecificProblem].is_empty());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().default_model, "gpt-3.5-turbo");
    }

    #[test]
    fn load_from_file_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[knowledge]\nchunk_size = 0\n").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));

        std::fs::write(&path, "default_model = [").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides_apply_in_priority_order() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("OPENAI_API_KEY", "sk-openai"),
            ("QARYZ_API_KEY", "sk-qaryz"),
            ("QARYZ_MODEL", "gpt-4o-mini"),
            ("QARYZ_DOCS_PATH", "/srv/docs"),
            ("QARYZ_PORT", "9090"),
        ]);
        let mut config = AppConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-qaryz"));
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert_eq!(config.knowledge.docs_path, "/srv/docs");
        assert_eq!(config.gateway.port, 9090);
    }

    #[test]
    fn bad_port_override_is_an_error() {
        let mut config = AppConfig::default();
        let result = config.apply_env(|key| (key == "QARYZ_PORT").then(|| "eighty".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        config.gateway.api_token = Some("wa-token".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(!debug.contains("wa-token"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn model_fallbacks_use_default_model() {
        let mut config = AppConfig::default();
        assert_eq!(config.extraction_model(), "gpt-3.5-turbo");
        config.extraction.model = Some("gpt-4o-mini".into());
        assert_eq!(config.extraction_model(), "gpt-4o-mini");
        assert_eq!(config.answer_model(), "gpt-3.5-turbo");
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-3.5-turbo"));
        assert!(toml_str.contains("8000"));
        assert!(toml_str.contains("eligibility_check"));
    }
}
