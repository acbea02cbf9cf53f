//! Configuration loading and merging.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::shell::{
    CharSet, EscapeOptions, NewlinePolicy, NullBytePolicy, OptionSpec, SplitOptions,
    SplitOptionsError,
};

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid [split] settings: {0}")]
    Split(#[from] SplitOptionsError),
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Defaults for splitting.
    pub split: SplitSettings,

    /// Defaults for escaping.
    pub escape: EscapeSettings,

    /// Default option table for normalization.
    pub options: OptionSettings,

    /// Audit logging settings.
    pub audit: AuditConfig,
}

/// Partial split options. Unset fields fall through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SplitSettings {
    pub delimiters: Option<String>,
    pub quote_chars: Option<String>,
    pub escape_chars: Option<String>,
    pub keep_quotes: Option<bool>,
    pub keep_escapes: Option<bool>,
}

/// Partial escape options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EscapeSettings {
    pub quoted: Option<bool>,
    pub is_path: Option<bool>,
    pub null_bytes: Option<NullBytePolicy>,
    pub newlines: Option<NewlinePolicy>,
    pub include: Option<String>,
    pub exclude: Option<String>,
}

/// Partial option table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OptionSettings {
    /// Short flags that never take a value.
    pub niladic: Option<String>,
    /// Short flags that take exactly one value.
    pub monadic: Option<String>,
    /// Long names, `|` separating aliases.
    pub long: Option<Vec<String>>,
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AuditConfig {
    /// Enable audit logging.
    pub enabled: bool,
    /// Path to audit log file.
    pub path: Option<String>,
}

impl SplitSettings {
    /// Overlay `over` on top of `self`; set fields in `over` win.
    pub fn layer(self, over: Self) -> Self {
        Self {
            delimiters: over.delimiters.or(self.delimiters),
            quote_chars: over.quote_chars.or(self.quote_chars),
            escape_chars: over.escape_chars.or(self.escape_chars),
            keep_quotes: over.keep_quotes.or(self.keep_quotes),
            keep_escapes: over.keep_escapes.or(self.keep_escapes),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build validated options, using defaults for unset fields.
    pub fn resolve(&self) -> Result<SplitOptions, SplitOptionsError> {
        let mut builder = SplitOptions::builder();
        if let Some(d) = &self.delimiters {
            builder = builder.delimiters(d.as_str());
        }
        if let Some(q) = &self.quote_chars {
            builder = builder.quote_chars(q.as_str());
        }
        if let Some(e) = &self.escape_chars {
            builder = builder.escape_chars(e.as_str());
        }
        builder
            .keep_quotes(self.keep_quotes.unwrap_or(false))
            .keep_escapes(self.keep_escapes.unwrap_or(false))
            .build()
    }
}

impl EscapeSettings {
    pub fn layer(self, over: Self) -> Self {
        Self {
            quoted: over.quoted.or(self.quoted),
            is_path: over.is_path.or(self.is_path),
            null_bytes: over.null_bytes.or(self.null_bytes),
            newlines: over.newlines.or(self.newlines),
            include: over.include.or(self.include),
            exclude: over.exclude.or(self.exclude),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn resolve(&self) -> EscapeOptions {
        EscapeOptions {
            quoted: self.quoted.unwrap_or(false),
            is_path: self.is_path.unwrap_or(false),
            null_bytes: self.null_bytes.unwrap_or_default(),
            newlines: self.newlines.unwrap_or_default(),
            include: self.include.as_deref().map(CharSet::from).unwrap_or_default(),
            exclude: self.exclude.as_deref().map(CharSet::from).unwrap_or_default(),
        }
    }
}

impl OptionSettings {
    pub fn layer(self, over: Self) -> Self {
        Self {
            niladic: over.niladic.or(self.niladic),
            monadic: over.monadic.or(self.monadic),
            long: over.long.or(self.long),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn resolve(&self) -> OptionSpec {
        OptionSpec::new(
            self.niladic.as_deref().unwrap_or(""),
            self.monadic.as_deref().unwrap_or(""),
            self.long.as_deref().unwrap_or(&[]),
        )
    }
}

/// Configuration with validated defaults.
pub struct CompiledConfig {
    /// The raw config.
    pub raw: Config,
    /// Resolved split defaults.
    pub split: SplitOptions,
    /// Resolved escape defaults.
    pub escape: EscapeOptions,
    /// Resolved option table.
    pub options: OptionSpec,
}

impl Config {
    /// Load configuration, merging user and project configs.
    pub fn load(cwd: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config()? {
            config = user_config;
        }

        if let Some(cwd) = cwd {
            if let Some(project_config) = Self::load_project_config(cwd)? {
                config.merge(project_config);
            }
        }

        Ok(config)
    }

    /// Parse a config from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn load_user_config() -> Result<Option<Self>, ConfigError> {
        if let Some(path) = Self::user_config_path() {
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                return Ok(Some(Self::parse(&content)?));
            }
        }
        Ok(None)
    }

    /// Load project-level config from .shell-argv.toml
    fn load_project_config(cwd: &Path) -> Result<Option<Self>, ConfigError> {
        let path = cwd.join(".shell-argv.toml");
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            return Ok(Some(Self::parse(&content)?));
        }
        Ok(None)
    }

    /// Get user config path.
    /// Respects SHELL_ARGV_CONFIG env var for testing.
    fn user_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("SHELL_ARGV_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|d| d.join("shell-argv/config.toml"))
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        self.split = std::mem::take(&mut self.split).layer(other.split);
        self.escape = std::mem::take(&mut self.escape).layer(other.escape);
        self.options = std::mem::take(&mut self.options).layer(other.options);

        if other.audit.enabled {
            self.audit.enabled = true;
            if other.audit.path.is_some() {
                self.audit.path = other.audit.path;
            }
        }
    }

    /// Resolve and validate the defaults once.
    pub fn compile(self) -> Result<CompiledConfig, ConfigError> {
        let split = self.split.resolve()?;
        let escape = self.escape.resolve();
        let options = self.options.resolve();
        Ok(CompiledConfig {
            raw: self,
            split,
            escape,
            options,
        })
    }
}

impl CompiledConfig {
    /// Split options with per-request overrides applied.
    pub fn split_options(&self, over: &SplitSettings) -> Result<SplitOptions, SplitOptionsError> {
        if over.is_empty() {
            return Ok(self.split.clone());
        }
        self.raw.split.clone().layer(over.clone()).resolve()
    }

    pub fn escape_options(&self, over: &EscapeSettings) -> EscapeOptions {
        if over.is_empty() {
            return self.escape.clone();
        }
        self.raw.escape.clone().layer(over.clone()).resolve()
    }

    pub fn option_spec(&self, over: &OptionSettings) -> OptionSpec {
        if over.is_empty() {
            return self.options.clone();
        }
        self.raw.options.clone().layer(over.clone()).resolve()
    }
}
