//! # Persistent State Store
//!
//! Durable user preferences and the bounded, newest-first print history.
//!
//! ## On-Disk Layout
//!
//! ```text
//! <config dir>/etiqueta/
//! ├── settings.json   {"printer": "...", "theme_mode": "light"|"dark"}
//! └── history.json    [{"barcode", "printer", "code_type", "timestamp"}, ...]
//! ```
//!
//! Every write goes to a temp file created in the same directory and is
//! atomically renamed over the target, so a crash mid-write can never leave
//! a torn file. Reads substitute defaults for missing or malformed files;
//! only *write* failures surface to the caller.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::EtiquetaError;
use crate::label::Symbology;

/// Maximum retained history entries; older ones are silently dropped.
pub const HISTORY_MAX_ENTRIES: usize = 100;

const SETTINGS_FILE: &str = "settings.json";
const HISTORY_FILE: &str = "history.json";

/// UI theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThemeMode {
    #[serde(rename = "light")]
    Light,
    #[serde(rename = "dark")]
    Dark,
}

impl Default for ThemeMode {
    fn default() -> Self {
        Self::Dark
    }
}

/// User preferences; a single record, last write wins, saved only on
/// explicit request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Preferred print destination, possibly stale
    #[serde(default)]
    pub printer: String,
    #[serde(default)]
    pub theme_mode: ThemeMode,
}

/// One past print, newest entries first in the durable file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub barcode: String,
    pub printer: String,
    /// Absent in files written before symbology selection existed
    #[serde(default)]
    pub code_type: Symbology,
    pub timestamp: String,
}

impl HistoryEntry {
    /// Stamp a new entry with the current local time (ISO-8601).
    pub fn new(
        barcode: impl Into<String>,
        printer: impl Into<String>,
        code_type: Symbology,
    ) -> Self {
        Self {
            barcode: barcode.into(),
            printer: printer.into(),
            code_type,
            timestamp: Local::now().to_rfc3339(),
        }
    }

    /// Timestamp formatted for display; falls back to the raw string when
    /// the stored value does not parse.
    pub fn formatted_time(&self) -> String {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|t| t.format("%m/%d/%Y %I:%M %p").to_string())
            .unwrap_or_else(|_| self.timestamp.clone())
    }
}

/// Atomic JSON persistence rooted at one directory.
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// Store under the per-user configuration location.
    pub fn open_default() -> Result<Self, EtiquetaError> {
        let base = dirs::config_dir().ok_or_else(|| {
            EtiquetaError::PersistenceWrite("no user configuration directory".to_string())
        })?;
        Ok(Self::at(base.join("etiqueta")))
    }

    /// Store rooted at an explicit directory (tests, portable installs).
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn load_settings(&self) -> Option<Settings> {
        self.read_json(&self.dir.join(SETTINGS_FILE))
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), EtiquetaError> {
        self.write_json(&self.dir.join(SETTINGS_FILE), settings)
    }

    /// All retained history, newest first.
    pub fn load_history(&self) -> Vec<HistoryEntry> {
        self.read_json(&self.dir.join(HISTORY_FILE)).unwrap_or_default()
    }

    /// Prepend `entry`, truncate to [`HISTORY_MAX_ENTRIES`], and write the
    /// whole sequence back.
    pub fn append_history(&self, entry: HistoryEntry) -> Result<(), EtiquetaError> {
        let mut history = self.load_history();
        history.insert(0, entry);
        history.truncate(HISTORY_MAX_ENTRIES);
        self.write_json(&self.dir.join(HISTORY_FILE), &history)
    }

    pub fn clear_history(&self) -> Result<(), EtiquetaError> {
        self.write_json(&self.dir.join(HISTORY_FILE), &Vec::<HistoryEntry>::new())
    }

    /// Read and parse a JSON file; any failure is recovered as `None`.
    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Option<T> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "durable file not readable");
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "durable file malformed, using defaults");
                None
            }
        }
    }

    /// Serialize to a temp file in the target directory, then atomically
    /// replace the target. The temp file is removed if any step before the
    /// replace fails.
    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), EtiquetaError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            EtiquetaError::PersistenceWrite(format!(
                "cannot create {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let mut tmp = NamedTempFile::new_in(&self.dir)
            .map_err(|e| EtiquetaError::PersistenceWrite(format!("temp file: {}", e)))?;

        let json = serde_json::to_string_pretty(value)
            .map_err(|e| EtiquetaError::PersistenceWrite(format!("serialize: {}", e)))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| EtiquetaError::PersistenceWrite(format!("write: {}", e)))?;

        tmp.persist(path).map_err(|e| {
            EtiquetaError::PersistenceWrite(format!("replace {}: {}", path.display(), e))
        })?;

        Ok(())
    }
}
