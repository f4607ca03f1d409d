// Player pool loading and lookup.
//
// Reads a CSV export of per-player averages. Column names vary between
// exports, so the player/PPG/APG/RPG columns are detected from the header
// row by keyword unless the config pins them explicitly.

use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Per-game averages for one real-world player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub ppg: f64,
    pub apg: f64,
    pub rpg: f64,
}

/// Player name -> record. Ordered so that seeded nominee draws are
/// reproducible across runs.
pub type PlayerMap = BTreeMap<String, PlayerRecord>;

/// Explicit header names for the four columns the pool needs. Any column
/// left as `None` is auto-detected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ColumnOverrides {
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub ppg: Option<String>,
    #[serde(default)]
    pub apg: Option<String>,
    #[serde(default)]
    pub rpg: Option<String>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("no player data file found in {dir}")]
    NoSource { dir: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("could not find a {column} column in {path}")]
    MissingColumn { path: String, column: &'static str },

    #[error("no valid player rows found in {path}")]
    Empty { path: String },
}

// ---------------------------------------------------------------------------
// Pool supplier
// ---------------------------------------------------------------------------

/// Supplier of the static name -> stats mapping.
///
/// Injected at session start and invoked again on every explicit refresh.
/// Must either produce at least one record or fail.
pub trait PoolSource: Send + Sync {
    fn load(&self) -> Result<PlayerMap, DataSourceError>;

    /// Short human-readable description used in log lines.
    fn describe(&self) -> String;
}

/// CSV-backed pool supplier.
#[derive(Debug, Clone)]
pub struct CsvPoolSource {
    /// Explicit file to read. When `None`, the first `.csv` file in
    /// `data_dir` (by file name) is used.
    pub file: Option<PathBuf>,
    pub data_dir: PathBuf,
    pub columns: ColumnOverrides,
}

impl CsvPoolSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        CsvPoolSource {
            file: None,
            data_dir: data_dir.into(),
            columns: ColumnOverrides::default(),
        }
    }

    /// Work out which file this source will read.
    pub fn resolve_path(&self) -> Result<PathBuf, DataSourceError> {
        if let Some(file) = &self.file {
            return Ok(file.clone());
        }
        find_data_file(&self.data_dir)
    }
}

impl PoolSource for CsvPoolSource {
    fn load(&self) -> Result<PlayerMap, DataSourceError> {
        let path = self.resolve_path()?;
        let label = path.display().to_string();
        info!("Reading player pool from {}", label);
        let file = std::fs::File::open(&path).map_err(|e| DataSourceError::Io {
            path: label.clone(),
            source: e,
        })?;
        load_players_from_reader(file, &self.columns, &label)
    }

    fn describe(&self) -> String {
        match &self.file {
            Some(file) => file.display().to_string(),
            None => format!("first CSV in {}", self.data_dir.display()),
        }
    }
}

/// In-memory pool supplier, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticPoolSource {
    pub players: PlayerMap,
}

impl StaticPoolSource {
    /// Build from `(name, ppg, apg, rpg)` tuples.
    pub fn from_stats<'a>(rows: impl IntoIterator<Item = (&'a str, f64, f64, f64)>) -> Self {
        let players = rows
            .into_iter()
            .map(|(name, ppg, apg, rpg)| {
                let name = name.trim().to_string();
                (
                    name.clone(),
                    PlayerRecord {
                        name,
                        ppg,
                        apg,
                        rpg,
                    },
                )
            })
            .collect();
        StaticPoolSource { players }
    }
}

impl PoolSource for StaticPoolSource {
    fn load(&self) -> Result<PlayerMap, DataSourceError> {
        if self.players.is_empty() {
            return Err(DataSourceError::Empty {
                path: self.describe(),
            });
        }
        Ok(self.players.clone())
    }

    fn describe(&self) -> String {
        "in-memory pool".to_string()
    }
}

// ---------------------------------------------------------------------------
// PlayerPool
// ---------------------------------------------------------------------------

/// Immutable-after-load set of draftable players.
#[derive(Debug, Clone)]
pub struct PlayerPool {
    players: PlayerMap,
}

impl PlayerPool {
    /// Invoke the supplier and build a pool from its output.
    pub fn load(source: &dyn PoolSource) -> Result<Self, DataSourceError> {
        let players = source.load()?;
        Self::from_map(players, &source.describe())
    }

    /// Wrap an already-loaded mapping. Fails if it is empty.
    pub fn from_map(players: PlayerMap, label: &str) -> Result<Self, DataSourceError> {
        if players.is_empty() {
            return Err(DataSourceError::Empty {
                path: label.to_string(),
            });
        }
        Ok(PlayerPool { players })
    }

    /// Look up a player. Matching is case-sensitive on the trimmed name.
    pub fn get(&self, name: &str) -> Option<&PlayerRecord> {
        self.players.get(name.trim())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// All player names, in pool order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.players.keys().map(String::as_str)
    }

    /// Names that are not in `excluded`, in pool order.
    pub fn available<'a>(&'a self, excluded: &'a HashSet<String>) -> Vec<&'a str> {
        self.names().filter(|n| !excluded.contains(*n)).collect()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Return the first `.csv` file in `dir`, by file name.
fn find_data_file(dir: &Path) -> Result<PathBuf, DataSourceError> {
    let entries = std::fs::read_dir(dir).map_err(|_| DataSourceError::NoSource {
        dir: dir.display().to_string(),
    })?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    candidates.sort();

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| DataSourceError::NoSource {
            dir: dir.display().to_string(),
        })
}

/// Coerce a stat cell to a number. Blank, `nan`, non-finite, and
/// unparseable cells all become 0.0.
pub fn coerce_stat(cell: &str) -> f64 {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return 0.0;
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndices {
    player: usize,
    ppg: usize,
    apg: usize,
    rpg: usize,
}

const PLAYER_KEYWORDS: &[&str] = &["player", "name"];
const PPG_KEYWORDS: &[&str] = &["ppg", "points", "pts"];
const APG_KEYWORDS: &[&str] = &["apg", "assists", "ast"];
const RPG_KEYWORDS: &[&str] = &["rpg", "rebounds", "reb"];

fn detect_columns(
    headers: &csv::StringRecord,
    overrides: &ColumnOverrides,
    label: &str,
) -> Result<ColumnIndices, DataSourceError> {
    let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

    let find = |column: &'static str,
                explicit: &Option<String>,
                keywords: &[&str]|
     -> Result<usize, DataSourceError> {
        let found = match explicit {
            Some(name) => {
                let wanted = name.trim().to_lowercase();
                lowered.iter().position(|h| *h == wanted)
            }
            None => lowered
                .iter()
                .position(|h| keywords.iter().any(|k| h.contains(k))),
        };
        found.ok_or_else(|| DataSourceError::MissingColumn {
            path: label.to_string(),
            column,
        })
    };

    Ok(ColumnIndices {
        player: find("player name", &overrides.player, PLAYER_KEYWORDS)?,
        ppg: find("PPG", &overrides.ppg, PPG_KEYWORDS)?,
        apg: find("APG", &overrides.apg, APG_KEYWORDS)?,
        rpg: find("RPG", &overrides.rpg, RPG_KEYWORDS)?,
    })
}

// ---------------------------------------------------------------------------
// Reader-based loader (enables testing without temp files)
// ---------------------------------------------------------------------------

pub(crate) fn load_players_from_reader<R: Read>(
    rdr: R,
    overrides: &ColumnOverrides,
    label: &str,
) -> Result<PlayerMap, DataSourceError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers = reader
        .headers()
        .map_err(|e| DataSourceError::Csv {
            path: label.to_string(),
            source: e,
        })?
        .clone();
    let cols = detect_columns(&headers, overrides, label)?;
    debug!("Detected pool columns in {}: {:?}", label, cols);

    let mut players = PlayerMap::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping malformed row {} in {}: {}", row_idx + 1, label, e);
                continue;
            }
        };

        let name = record.get(cols.player).unwrap_or("").trim();
        if name.is_empty() || name.eq_ignore_ascii_case("nan") {
            warn!("skipping row {} in {}: blank player name", row_idx + 1, label);
            continue;
        }

        let stat = |idx: usize| coerce_stat(record.get(idx).unwrap_or(""));
        let player = PlayerRecord {
            name: name.to_string(),
            ppg: stat(cols.ppg),
            apg: stat(cols.apg),
            rpg: stat(cols.rpg),
        };

        if players.insert(player.name.clone(), player).is_some() {
            warn!("duplicate player row for '{}' in {}, using latest", name, label);
        }
    }

    if players.is_empty() {
        return Err(DataSourceError::Empty {
            path: label.to_string(),
        });
    }

    info!("Loaded {} players from {}", players.len(), label);
    Ok(players)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
