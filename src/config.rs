use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, anyhow};
use jsonschema::{JSONSchema, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    motion::{AnimationSettings, MotionVariant, VariantDictionary},
    profile::{
        credentials::CredentialRef,
        source::{DEFAULT_API_BASE_URL, DEFAULT_USER_AGENT},
    },
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub profile: ProfileConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_cache_ttl_ms() -> u64 {
    5 * 60 * 1_000
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("./state/profile-cache.json")
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_enabled_true() -> bool {
    true
}

fn default_stagger_unit_ms() -> u64 {
    100
}

fn default_logging_dir() -> PathBuf {
    PathBuf::from("./logs")
}

fn default_logging_filter() -> String {
    "info".to_string()
}

fn default_logging_rotation() -> LoggingRotation {
    LoggingRotation::Daily
}

fn default_logging_retention_days() -> usize {
    14
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub username: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
    #[serde(default)]
    pub credential: CredentialRef,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl ProfileConfig {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_base_url: default_api_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            cache_ttl_ms: default_cache_ttl_ms(),
            cache_path: default_cache_path(),
            credential: CredentialRef::default(),
            user_agent: default_user_agent(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_enabled_true")]
    pub enabled: bool,
    /// Overrides the platform reduced-motion signal when set.
    #[serde(default)]
    pub prefers_reduced_motion: Option<bool>,
    #[serde(default = "default_stagger_unit_ms")]
    pub stagger_unit_ms: u64,
    #[serde(default)]
    pub variants: BTreeMap<String, MotionVariant>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prefers_reduced_motion: None,
            stagger_unit_ms: default_stagger_unit_ms(),
            variants: BTreeMap::new(),
        }
    }
}

impl AnimationConfig {
    pub fn settings(&self) -> AnimationSettings {
        let mut variants = VariantDictionary::default().merge(self.variants.clone());
        variants.set_stagger_unit_ms(self.stagger_unit_ms);
        AnimationSettings {
            animation_enabled: self.enabled,
            variants,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LoggingRotation {
    Daily,
    Hourly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_logging_filter")]
    pub filter: String,
    #[serde(default = "default_logging_rotation")]
    pub rotation: LoggingRotation,
    #[serde(default = "default_logging_retention_days")]
    pub retention_days: usize,
    #[serde(default = "default_enabled_true")]
    pub stderr_warn_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_logging_dir(),
            filter: default_logging_filter(),
            rotation: default_logging_rotation(),
            retention_days: default_logging_retention_days(),
            stderr_warn_enabled: true,
        }
    }
}

impl Config {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config_value: Value = json5::from_str(&config_content)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        let config_base = config_path.parent().unwrap_or_else(|| Path::new("."));
        let schema_path = resolve_schema_path(config_base, &config_value)?;
        validate_against_schema(&config_value, &schema_path)?;

        let mut config: Config =
            serde_json::from_value(config_value).context("failed to deserialize config")?;

        if !config.profile.cache_path.is_absolute() {
            config.profile.cache_path = config_base.join(&config.profile.cache_path);
        }

        Ok(config)
    }
}

fn resolve_schema_path(config_base: &Path, config_value: &Value) -> Result<PathBuf> {
    if let Some(path_text) = config_value.get("$schema").and_then(|value| value.as_str()) {
        let configured = PathBuf::from(path_text);
        if configured.is_absolute() {
            return Ok(configured);
        }
        return Ok(config_base.join(&configured));
    }

    let local_default = config_base.join("folio.schema.json");
    if local_default.exists() {
        return Ok(local_default);
    }

    Err(anyhow!(
        "unable to resolve schema path: expected $schema in config or folio.schema.json next to it"
    ))
}

fn validate_against_schema(config_value: &Value, schema_path: &Path) -> Result<()> {
    let schema_content = fs::read_to_string(schema_path)
        .with_context(|| format!("failed to read schema {}", schema_path.display()))?;
    let schema: Value = serde_json::from_str(&schema_content)
        .with_context(|| format!("failed to parse schema {}", schema_path.display()))?;

    let compiled =
        JSONSchema::compile(&schema).map_err(|e| anyhow!("failed to compile schema: {e}"))?;

    match compiled.validate(config_value) {
        Ok(()) => Ok(()),
        Err(errors_iter) => {
            let validation_errors: Vec<ValidationError> = errors_iter.collect();
            let messages: Vec<String> = validation_errors
                .into_iter()
                .map(|error| error.to_string())
                .collect();
            Err(anyhow!("config validation failed: {}", messages.join("; ")))
        }
    }
}
