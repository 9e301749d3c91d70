//! CLI configuration.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use turbo_cart::{BackoffStrategy, CartConfig, RetryPolicy, DEFAULT_SNAPSHOT_KEY};

/// File names searched for when no `--config` is given.
pub const CONFIG_NAMES: [&str; 3] = ["cart.toml", ".cart.toml", "cart.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Where the cart snapshot lives.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Snapshot write retries.
    #[serde(default)]
    pub persist: PersistConfig,

    /// Log output.
    #[serde(default)]
    pub log: LogConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Settings for the cart store.
    pub fn cart_config(&self) -> CartConfig {
        CartConfig::default()
            .with_snapshot_key(self.storage.key.clone())
            .with_retry(self.persist.retry_policy())
    }

    /// Collect problems that would make the config unusable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.storage.dir.trim().is_empty() {
            errors.push("storage.dir must not be empty".to_string());
        }
        if self.storage.key.is_empty() {
            errors.push("storage.key must not be empty".to_string());
        }
        if self.persist.backoff == BackoffKind::Exponential && self.persist.base_ms > self.persist.max_ms {
            errors.push("persist.base_ms must not exceed persist.max_ms".to_string());
        }
        if tracing_subscriber::EnvFilter::try_new(&self.log.level).is_err() {
            errors.push(format!("log.level '{}' is not a valid filter", self.log.level));
        }

        errors
    }
}

/// Snapshot storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the file store, relative to the working directory.
    #[serde(default = "default_dir")]
    pub dir: String,

    /// Key holding the cart snapshot.
    #[serde(default = "default_key")]
    pub key: String,
}

fn default_dir() -> String {
    ".cart".to_string()
}

fn default_key() -> String {
    DEFAULT_SNAPSHOT_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            key: default_key(),
        }
    }
}

/// Backoff between snapshot write retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    None,
    Fixed,
    #[default]
    Exponential,
}

/// Snapshot write retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistConfig {
    /// Retries after a failed write.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff strategy.
    #[serde(default)]
    pub backoff: BackoffKind,

    /// Fixed delay, or first delay for exponential backoff.
    #[serde(default = "default_base_ms")]
    pub base_ms: u64,

    /// Upper bound for exponential backoff.
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

fn default_max_attempts() -> u32 {
    2
}

fn default_base_ms() -> u64 {
    50
}

fn default_max_ms() -> u64 {
    500
}

impl PersistConfig {
    /// Translate into the store's retry policy.
    pub fn retry_policy(&self) -> RetryPolicy {
        let backoff = match self.backoff {
            BackoffKind::None => BackoffStrategy::None,
            BackoffKind::Fixed => BackoffStrategy::Fixed(Duration::from_millis(self.base_ms)),
            BackoffKind::Exponential => BackoffStrategy::Exponential {
                base: Duration::from_millis(self.base_ms),
                max: Duration::from_millis(self.max_ms),
            },
        };
        RetryPolicy::new(self.max_attempts).with_backoff(backoff)
    }
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff: BackoffKind::default(),
            base_ms: default_base_ms(),
            max_ms: default_max_ms(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is not set.
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

/// Generate a default cart.toml config file.
pub fn generate_default_config() -> String {
    format!(
        r#"# Cart configuration

[storage]
dir = "{dir}"
key = "{key}"

[persist]
# Retries after a failed snapshot write
max_attempts = {max_attempts}
# none | fixed | exponential
backoff = "exponential"
base_ms = {base_ms}
max_ms = {max_ms}

[log]
# Used when RUST_LOG is not set
level = "{level}"
# human | json
format = "human"
"#,
        dir = default_dir(),
        key = default_key(),
        max_attempts = default_max_attempts(),
        base_ms = default_base_ms(),
        max_ms = default_max_ms(),
        level = default_level(),
    )
}
