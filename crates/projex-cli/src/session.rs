//! Per-invocation state: effective config plus the bootstrapped filter
//! pipeline. Database connections are opened on demand by the commands
//! that need one.

use anyhow::{Context as _, Result};
use projex_core::config::{self, Config};
use projex_core::db;
use projex_core::hooks::{FilterPipeline, HookRegistry, defaults};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug)]
pub struct Session {
    pub config: Config,
    /// The file the config was read from; `None` when built-in defaults apply.
    pub config_path: Option<PathBuf>,
    pub filters: FilterPipeline,
}

impl Session {
    /// Load the config (`--config` wins over discovery) and register the
    /// default filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn load(config_override: Option<&Path>, cwd: &Path) -> Result<Self> {
        let (config, config_path) = match config_override {
            Some(path) => (config::load_config(path)?, Some(path.to_path_buf())),
            None => config::discover_config(cwd)?,
        };
        debug!(
            config = ?config_path,
            database = %config.database.path.display(),
            "configuration loaded"
        );

        let mut registry = HookRegistry::new();
        defaults::register_defaults(&mut registry, &config)
            .context("register default filters")?;

        Ok(Self {
            config,
            config_path,
            filters: FilterPipeline::new(registry),
        })
    }

    /// Open the configured database. It must already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is missing or cannot be opened.
    pub fn connect(&self) -> Result<Connection> {
        db::open_existing(&self.config.database.path)
    }
}
