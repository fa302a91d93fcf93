// 📚 Registry - template banks and the local clock, as one explicit value
// Built once by the caller, then handed to the router and never mutated

use anyhow::{Context, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::context::DEFAULT_UTC_OFFSET_MINUTES;
use crate::error::ConfigError;
use crate::extractors::BankType;
use crate::template::{self, ExtractorConfig, TimePolicy, DEFAULT_TIME_FORMAT};

// ============================================================================
// FILE FORMAT
// ============================================================================

/// RegistryConfig - what `config/templates.json` deserializes into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_offset_minutes")]
    pub utc_offset_minutes: i32,

    #[serde(default)]
    pub templates: Vec<TemplateConfig>,
}

/// One template-path bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub bank_type: String,
    pub pay_time_pattern: String,
    pub pay_coin_pattern: String,

    #[serde(default = "default_time_format")]
    pub time_format: String,

    /// Falls back to the registry-wide offset
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,

    #[serde(default)]
    pub require_time: bool,
}

fn default_offset_minutes() -> i32 {
    DEFAULT_UTC_OFFSET_MINUTES
}

fn default_time_format() -> String {
    DEFAULT_TIME_FORMAT.to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            templates: Vec::new(),
        }
    }
}

fn offset(minutes: i32) -> std::result::Result<FixedOffset, ConfigError> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or(ConfigError::InvalidOffset(minutes))
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Registry - template-path extractors keyed by tag, plus the banks' local offset
///
/// Built-in tags live in [`BankType`]; a template may not reuse one.
#[derive(Debug, Clone)]
pub struct Registry {
    templates: HashMap<String, ExtractorConfig>,
    local_offset: FixedOffset,
}

impl Registry {
    /// Empty registry on Bangkok time (+07:00)
    pub fn new() -> Self {
        Registry {
            templates: HashMap::new(),
            local_offset: template::default_offset(),
        }
    }

    /// Builder pattern: offset applied to built-in extractors
    pub fn with_local_offset(mut self, offset: FixedOffset) -> Self {
        self.local_offset = offset;
        self
    }

    /// Builder pattern: register a template bank
    pub fn with_template(mut self, config: ExtractorConfig) -> std::result::Result<Self, ConfigError> {
        let tag = config.bank_type().to_string();

        if BankType::from_tag(&tag).is_some() {
            return Err(ConfigError::ShadowsBuiltin(tag));
        }
        if self.templates.contains_key(&tag) {
            return Err(ConfigError::DuplicateTemplate(tag));
        }

        self.templates.insert(tag, config);
        Ok(self)
    }

    /// Validate and compile a deserialized config.
    pub fn from_config(config: RegistryConfig) -> std::result::Result<Self, ConfigError> {
        let local_offset = offset(config.utc_offset_minutes)?;
        let mut registry = Registry::new().with_local_offset(local_offset);

        for t in config.templates {
            let template_offset = match t.utc_offset_minutes {
                Some(minutes) => offset(minutes)?,
                None => local_offset,
            };
            let policy = if t.require_time {
                TimePolicy::Required
            } else {
                TimePolicy::FallbackToReceived
            };

            let extractor = ExtractorConfig::new(&t.bank_type, &t.pay_time_pattern, &t.pay_coin_pattern)?
                .with_time_format(&t.time_format)
                .with_offset(template_offset)
                .with_time_policy(policy);
            registry = registry.with_template(extractor)?;
        }

        Ok(registry)
    }

    /// Load registry from a JSON file
    ///
    /// # Examples:
    /// ```no_run
    /// use bank_wash::Registry;
    ///
    /// let registry = Registry::from_file("config/templates.json").unwrap();
    /// assert!(registry.template("BRI").is_some());
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read registry file: {:?}", path.as_ref()))?;

        let config: RegistryConfig = serde_json::from_str(&content)
            .context("Failed to parse registry JSON")?;

        Registry::from_config(config)
            .with_context(|| format!("Invalid registry file: {:?}", path.as_ref()))
    }

    pub fn template(&self, tag: &str) -> Option<&ExtractorConfig> {
        self.templates.get(tag)
    }

    /// Registered template tags, sorted
    pub fn template_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.templates.keys().map(|k| k.as_str()).collect();
        tags.sort_unstable();
        tags
    }

    pub fn local_offset(&self) -> FixedOffset {
        self.local_offset
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
