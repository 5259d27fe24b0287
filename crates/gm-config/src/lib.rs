//! Configuration management for the block media rewriter.
//!
//! Parses `gm.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! Caller-supplied settings can be applied during load via [`Overrides`].
//!
//! ```toml
//! [grammar]
//! namespace = "wp"
//!
//! [rewrite]
//! max_depth = 32
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct Overrides {
    /// Override the block comment namespace.
    pub namespace: Option<String>,
    /// Override the nested block recursion limit.
    pub max_depth: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "gm.toml";

/// Upper bound accepted for `rewrite.max_depth`.
const MAX_DEPTH_LIMIT: usize = 256;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Block grammar configuration.
    pub grammar: GrammarConfig,
    /// Rewrite engine configuration.
    pub rewrite: RewriteConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Block grammar configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GrammarConfig {
    /// Namespace of block comment delimiters (`<!-- wp:image -->`).
    pub namespace: String,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            namespace: "wp".to_owned(),
        }
    }
}

/// Rewrite engine configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Maximum nesting depth followed into container blocks.
    pub max_depth: usize,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self { max_depth: 32 }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Whether `namespace` is shaped like a block name segment: `[a-z][a-z0-9_-]*`.
#[must_use]
pub fn is_valid_namespace(namespace: &str) -> bool {
    let mut chars = namespace.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// Require a valid block namespace.
fn require_namespace(value: &str, field: &str) -> Result<(), ConfigError> {
    if !is_valid_namespace(value) {
        return Err(ConfigError::Validation(format!(
            "{field} must match [a-z][a-z0-9_-]*, got {value:?}"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional overrides.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `gm.toml` in current directory and parents.
    ///
    /// Overrides are applied after loading, so they take precedence over
    /// config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        overrides: Option<&Overrides>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(overrides) = overrides {
            config.apply_overrides(overrides);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply overrides to the configuration.
    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(namespace) = &overrides.namespace {
            self.grammar.namespace.clone_from(namespace);
        }
        if let Some(max_depth) = overrides.max_depth {
            self.rewrite.max_depth = max_depth;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(&current)
    }

    /// Search for config file starting at `start` and walking up.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_grammar()?;
        self.validate_rewrite()?;
        Ok(())
    }

    fn validate_grammar(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.grammar.namespace, "grammar.namespace")?;
        require_namespace(&self.grammar.namespace, "grammar.namespace")?;
        Ok(())
    }

    fn validate_rewrite(&self) -> Result<(), ConfigError> {
        let depth = self.rewrite.max_depth;
        if depth == 0 {
            return Err(ConfigError::Validation(
                "rewrite.max_depth must be greater than 0".to_owned(),
            ));
        }
        if depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::Validation(format!(
                "rewrite.max_depth cannot exceed {MAX_DEPTH_LIMIT}"
            )));
        }
        Ok(())
    }
}
