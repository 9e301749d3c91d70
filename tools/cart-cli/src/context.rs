//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use turbo_cache::FileStore;
use turbo_cart::{CartStore, LoadOutcome};

use crate::config::{CliConfig, CONFIG_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Config file the settings came from, if any.
    pub config_path: Option<PathBuf>,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        Self::load_in(cwd, config_path, output)
    }

    /// Load context as if invoked from `cwd`.
    fn load_in(cwd: PathBuf, config_path: Option<&str>, output: Output) -> Result<Self> {
        let (config, config_path) = if let Some(path) = config_path {
            (CliConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            // Try to find config in current directory or parent directories
            match Self::find_config(&cwd)? {
                Some((config, path)) => (config, Some(path)),
                None => (CliConfig::default(), None),
            }
        };

        Ok(Self {
            config,
            output,
            cwd,
            config_path,
        })
    }

    /// Find config file in directory tree.
    ///
    /// The nearest config file wins; if it exists but cannot be read or
    /// parsed, that is an error rather than a reason to keep searching.
    fn find_config(start: &Path) -> Result<Option<(CliConfig, PathBuf)>> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    let path = config_path.to_str().with_context(|| {
                        format!("Config path is not valid UTF-8: {}", config_path.display())
                    })?;
                    let config = CliConfig::load(path)?;
                    return Ok(Some((config, config_path)));
                }
            }

            if !current.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Directory of the file store.
    ///
    /// Relative paths are resolved against the directory holding the
    /// config file, or the working directory when there is none.
    pub fn storage_dir(&self) -> PathBuf {
        let base = self
            .config_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.cwd.clone());
        resolve_path(&base, &self.config.storage.dir)
    }

    /// Open the file store and load the cart.
    pub async fn open_store(&self) -> Result<CartStore> {
        let dir = self.storage_dir();
        self.output.debug(&format!("Storage: {}", dir.display()));
        tracing::debug!(dir = %dir.display(), key = %self.config.storage.key, "opening cart storage");

        let backend = FileStore::open(&dir)
            .await
            .with_context(|| format!("Failed to open cart storage: {}", dir.display()))?;

        let store = CartStore::new(Arc::new(backend), self.config.cart_config());
        match store.load().await? {
            LoadOutcome::Empty => self.output.debug("No saved cart, starting empty"),
            LoadOutcome::Restored { items } => {
                self.output.debug(&format!("Restored {} item(s)", items))
            }
            LoadOutcome::Recovered(e) => {
                self.output.warn(&format!("Saved cart ignored: {}", e))
            }
        }
        Ok(store)
    }
}

/// Resolve a path relative to `base`.
fn resolve_path(base: &Path, path: &str) -> PathBuf {
    if PathBuf::from(path).is_absolute() {
        PathBuf::from(path)
    } else {
        base.join(path)
    }
}
