//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config PATH`, or `config.toml` in the platform config dir)
//! 3. `DUPFUNNEL_*` environment variables (e.g. `DUPFUNNEL_IO_THREADS=8`)
//! 4. Command-line flags, applied by [`Config::apply_cli`]
//!
//! ```toml
//! hash = "blake3"
//! io_threads = 8
//! skip_hidden = true
//! min_size = 4096
//! ```

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::duplicates::DEFAULT_IO_THREADS;
use crate::scanner::{HashKind, WalkerConfig};

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "DUPFUNNEL_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hash algorithm for content comparison.
    pub hash: HashKind,
    /// Number of hashing threads.
    pub io_threads: usize,
    /// Follow symbolic links during the walk.
    pub follow_symlinks: bool,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Skip zero-byte files.
    pub skip_empty: bool,
    /// Minimum file size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u64>,
    /// Maximum file size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hash: HashKind::default(),
            io_threads: DEFAULT_IO_THREADS,
            follow_symlinks: false,
            skip_hidden: false,
            skip_empty: false,
            min_size: None,
            max_size: None,
        }
    }
}

impl Config {
    /// Load defaults, the config file and the environment.
    ///
    /// With `path` set the file must exist. Without it the platform default
    /// is used if present.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit config file is missing or if any
    /// layer contains invalid values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => {
                if !path.is_file() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => Self::default_path().filter(|p| p.is_file()),
        };

        if let Some(ref file) = file {
            log::debug!("Loading config from {}", file.display());
        }

        Self::figment(file.as_deref())
            .extract()
            .context("Invalid configuration")
    }

    /// The figment stack behind [`Config::load`].
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupfunnel").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Override settings with flags given on the command line.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(hash) = cli.hash {
            self.hash = hash;
        }
        if let Some(threads) = cli.io_threads {
            self.io_threads = threads;
        }
        if cli.min_size.is_some() {
            self.min_size = cli.min_size;
        }
        if cli.max_size.is_some() {
            self.max_size = cli.max_size;
        }
        self.follow_symlinks |= cli.follow_symlinks;
        self.skip_hidden |= cli.skip_hidden;
        self.skip_empty |= cli.skip_empty;
    }

    /// Walker settings derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            follow_symlinks: self.follow_symlinks,
            skip_hidden: self.skip_hidden,
            skip_empty: self.skip_empty,
            min_size: self.min_size,
            max_size: self.max_size,
        }
    }

    /// Render the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}
