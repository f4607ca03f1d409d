// Configuration loading and parsing (league.toml).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::draft::engine::{DraftRules, SkipPolicy};
use crate::pool::{ColumnOverrides, CsvPoolSource};
use crate::session::default_participant_names;

pub const MIN_PARTICIPANTS: usize = 2;
pub const MAX_PARTICIPANTS: usize = 10;
/// Largest starting budget; the whole league's money must fit in one balance.
pub const MAX_STARTING_BUDGET: u32 = u32::MAX / MAX_PARTICIPANTS as u32;
/// League size used when `participants` is omitted.
pub const DEFAULT_PARTICIPANTS: usize = 4;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub league: LeagueConfig,
    pub draft: DraftConfig,
    pub pool: PoolConfig,
    /// Directory the config was loaded relative to. Relative pool paths
    /// resolve against it.
    pub base_dir: PathBuf,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire league.toml file.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
    #[serde(default)]
    draft: DraftConfig,
    #[serde(default)]
    pool: PoolConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    /// Display names, in turn order. Empty means `Player 1` .. `Player 4`.
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default = "default_starting_budget")]
    pub starting_budget: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DraftConfig {
    /// Skips per participant for the whole session. Absent means unlimited.
    #[serde(default)]
    pub skip_limit: Option<u32>,
    #[serde(default)]
    pub skip_removes_nominee: bool,
    #[serde(default = "default_bid")]
    pub default_bid: u32,
    /// Fixed RNG seed for reproducible nominee draws.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for DraftConfig {
    fn default() -> Self {
        DraftConfig {
            skip_limit: None,
            skip_removes_nominee: false,
            default_bid: default_bid(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Explicit CSV file. When unset the first `.csv` in `data_dir` is used.
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub columns: ColumnOverrides,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            data_dir: default_data_dir(),
            file: None,
            columns: ColumnOverrides::default(),
        }
    }
}

fn default_starting_budget() -> u32 {
    1000
}

fn default_bid() -> u32 {
    100
}

fn default_data_dir() -> String {
    "data".to_string()
}

impl Config {
    /// Draft rules derived from `[league]` and `[draft]`.
    pub fn rules(&self) -> DraftRules {
        DraftRules {
            starting_budget: self.league.starting_budget,
            skip_policy: match self.draft.skip_limit {
                Some(n) => SkipPolicy::Limited(n),
                None => SkipPolicy::Unlimited,
            },
            skip_removes_nominee: self.draft.skip_removes_nominee,
            default_bid: self.draft.default_bid,
        }
    }

    /// The CSV pool source described by `[pool]`, with relative paths
    /// resolved against `base_dir`.
    pub fn pool_source(&self) -> CsvPoolSource {
        CsvPoolSource {
            file: self.pool.file.as_ref().map(|f| self.base_dir.join(f)),
            data_dir: self.base_dir.join(&self.pool.data_dir),
            columns: self.pool.columns.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` relative to
/// `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let league_path = base_dir.join("config").join("league.toml");
    let league_text = read_file(&league_path)?;
    let mut file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    if file.league.participants.is_empty() {
        file.league.participants = default_participant_names(DEFAULT_PARTICIPANTS);
    }
    for name in file.league.participants.iter_mut() {
        *name = name.trim().to_string();
    }

    let config = Config {
        league: file.league,
        draft: file.draft,
        pool: file.pool,
        base_dir: base_dir.to_path_buf(),
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                // Operator's own copy wins.
            }
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let participants = &config.league.participants;
    if !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&participants.len()) {
        return Err(ConfigError::ValidationError {
            field: "league.participants".into(),
            message: format!(
                "must list between {MIN_PARTICIPANTS} and {MAX_PARTICIPANTS} names, got {}",
                participants.len()
            ),
        });
    }

    let mut seen = HashSet::new();
    for name in participants {
        if name.is_empty() {
            return Err(ConfigError::ValidationError {
                field: "league.participants".into(),
                message: "names must not be blank".into(),
            });
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::ValidationError {
                field: "league.participants".into(),
                message: format!("duplicate name `{name}`"),
            });
        }
    }

    if config.league.starting_budget == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.starting_budget".into(),
            message: "must be greater than 0".into(),
        });
    }
    if config.league.starting_budget > MAX_STARTING_BUDGET {
        return Err(ConfigError::ValidationError {
            field: "league.starting_budget".into(),
            message: format!("must be at most {MAX_STARTING_BUDGET}"),
        });
    }

    if config.pool.data_dir.trim().is_empty() && config.pool.file.is_none() {
        return Err(ConfigError::ValidationError {
            field: "pool.data_dir".into(),
            message: "must not be blank when pool.file is unset".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
