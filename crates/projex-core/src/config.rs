use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "projex.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub filesystem: FilesystemConfig,
    /// Preferred output mode: `pretty`, `text` or `json`.
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Name shown to users for this database.
    #[serde(default = "default_friendly_name")]
    pub friendly_name: String,
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
    /// Row cap for list queries; searches are not capped.
    #[serde(default = "default_max_select")]
    pub max_select: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            friendly_name: default_friendly_name(),
            path: default_database_path(),
            max_select: default_max_select(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesystemConfig {
    /// Roots that hold project folders. One path component may be `*`.
    #[serde(default)]
    pub lookup_paths: Vec<PathBuf>,
    /// File names hidden from folder listings.
    #[serde(default = "default_ignore_files")]
    pub ignore_files: Vec<String>,
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            lookup_paths: Vec::new(),
            ignore_files: default_ignore_files(),
        }
    }
}

impl FilesystemConfig {
    /// Whether `file_name` should be hidden from listings.
    #[must_use]
    pub fn is_ignored(&self, file_name: &str) -> bool {
        self.ignore_files
            .iter()
            .any(|ignored| ignored.eq_ignore_ascii_case(file_name))
    }
}

/// Parse the config file at `path`, resolving relative paths against the
/// file's directory.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut config = toml::from_str::<Config>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    if let Some(base) = path.parent() {
        config.resolve_relative_to(base);
    }
    Ok(config)
}

/// Locate and load the effective config.
///
/// Lookup order: `<cwd>/projex.toml`, then `<config_dir>/projex/config.toml`,
/// then built-in defaults. Returns the file that was used, if any.
pub fn discover_config(cwd: &Path) -> Result<(Config, Option<PathBuf>)> {
    let mut candidates = vec![cwd.join(LOCAL_CONFIG_FILE)];
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("projex/config.toml"));
    }

    for candidate in candidates {
        if candidate.is_file() {
            let config = load_config(&candidate)?;
            return Ok((config, Some(candidate)));
        }
    }

    let mut config = Config::default();
    config.resolve_relative_to(cwd);
    Ok((config, None))
}

impl Config {
    fn resolve_relative_to(&mut self, base: &Path) {
        if self.database.path.is_relative() {
            self.database.path = base.join(&self.database.path);
        }
        for lookup in &mut self.filesystem.lookup_paths {
            if lookup.is_relative() {
                *lookup = base.join(&*lookup);
            }
        }
    }
}

fn default_friendly_name() -> String {
    "projex".to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("projex.sqlite3")
}

const fn default_max_select() -> u32 {
    200
}

fn default_ignore_files() -> Vec<String> {
    ["desktop.ini", "thumbs.db", ".DS_Store"]
        .into_iter()
        .map(String::from)
        .collect()
}
