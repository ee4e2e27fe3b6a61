// 📜 History Store - append-only log of computations backed by CSV
// The file is the source of truth whenever memory is empty (load-if-empty)

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Column order of the history file
pub const HISTORY_HEADERS: [&str; 4] = ["ID", "Operation", "Operands", "Result"];

/// One recorded computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "ID")]
    pub id: u64,

    #[serde(rename = "Operation")]
    pub operation: String,

    /// Stored as a JSON array of exact numbers, e.g. `[8,2]`
    #[serde(rename = "Operands", with = "operand_list")]
    pub operands: Vec<Decimal>,

    #[serde(rename = "Result")]
    pub result: Decimal,
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operands: Vec<String> = self.operands.iter().map(|d| d.to_string()).collect();
        write!(
            f,
            "#{} {}({}) = {}",
            self.id,
            self.operation,
            operands.join(", "),
            self.result
        )
    }
}

// ============================================================================
// OPERAND SERIALIZATION
// ============================================================================

/// Operands <-> JSON array text
///
/// serde_json is built with `arbitrary_precision`, so numbers keep their
/// exact text and never pass through f64.
mod operand_list {
    use rust_decimal::Decimal;
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Number;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(operands: &[Decimal], serializer: S) -> Result<S::Ok, S::Error> {
        let numbers = operands
            .iter()
            .map(|d| Number::from_str(&d.to_string()))
            .collect::<Result<Vec<Number>, _>>()
            .map_err(S::Error::custom)?;
        let text = serde_json::to_string(&numbers).map_err(S::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Decimal>, D::Error> {
        let text = String::deserialize(deserializer)?;
        let numbers: Vec<Number> = serde_json::from_str(&text).map_err(D::Error::custom)?;
        numbers
            .iter()
            .map(|n| {
                let raw = n.to_string();
                Decimal::from_str(&raw)
                    .or_else(|_| Decimal::from_scientific(&raw))
                    .map_err(D::Error::custom)
            })
            .collect()
    }
}

// ============================================================================
// HISTORY STORE
// ============================================================================

/// HistoryStore - owns the ordered entries for the process lifetime
///
/// Every mutation rewrites the whole file before returning, so nothing is
/// ever left in flight.
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
    /// Highest id handed out since the last load or clear
    last_assigned: u64,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HistoryStore {
            path: path.into(),
            entries: Vec::new(),
            last_assigned: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a computation and persist the full set
    ///
    /// Returns the assigned id, or `None` when fewer than two operands were
    /// given (logged, not an error).
    pub fn add(&mut self, operation: &str, operands: &[Decimal], result: Decimal) -> Result<Option<u64>> {
        if operands.len() < 2 {
            warn!(operation, count = operands.len(), "history entry rejected: needs at least two operands");
            return Ok(None);
        }

        self.ensure_loaded();

        let id = self.next_id();
        let mut updated = self.entries.clone();
        updated.push(HistoryEntry {
            id,
            operation: operation.to_string(),
            operands: operands.to_vec(),
            result,
        });

        self.commit(updated)?;
        self.last_assigned = id;
        info!(id, operation, result = %result, "calculation saved");
        Ok(Some(id))
    }

    /// All entries, loading from disk first if memory is empty
    pub fn list(&mut self) -> &[HistoryEntry] {
        self.ensure_loaded();
        &self.entries
    }

    pub fn get(&mut self, id: u64) -> Option<&HistoryEntry> {
        self.ensure_loaded();
        self.entries.iter().find(|e| e.id == id)
    }

    /// Remove an entry by id
    ///
    /// A missing id is a logged no-op; returns whether anything was removed.
    pub fn remove(&mut self, id: u64) -> Result<bool> {
        self.ensure_loaded();

        if !self.entries.iter().any(|e| e.id == id) {
            warn!(id, "history entry not found, nothing removed");
            return Ok(false);
        }

        let updated = self.entries.iter().filter(|e| e.id != id).cloned().collect();
        self.commit(updated)?;
        info!(id, "history entry removed");
        Ok(true)
    }

    /// Drop every entry and persist a header-only file
    pub fn clear(&mut self) -> Result<()> {
        self.commit(Vec::new())?;
        self.last_assigned = 0;
        info!("history cleared");
        Ok(())
    }

    /// Discard memory and re-read the backing file
    ///
    /// The id counter survives, so an id removed earlier is not handed out
    /// again. Only `clear` resets it.
    pub fn reload(&mut self) -> &[HistoryEntry] {
        self.entries = load_history(&self.path);
        info!(count = self.entries.len(), "history reloaded");
        &self.entries
    }

    /// Number of entries; loads from disk first if memory is empty
    pub fn len(&mut self) -> usize {
        self.list().len()
    }

    /// Loads from disk first if memory is empty
    pub fn is_empty(&mut self) -> bool {
        self.list().is_empty()
    }

    fn ensure_loaded(&mut self) {
        if self.entries.is_empty() {
            self.entries = load_history(&self.path);
        }
    }

    fn next_id(&self) -> u64 {
        let max_existing = self.entries.iter().map(|e| e.id).max().unwrap_or(0);
        max_existing.max(self.last_assigned) + 1
    }

    /// Persist `updated` and only then swap it in; a failed write leaves
    /// memory untouched
    fn commit(&mut self, updated: Vec<HistoryEntry>) -> Result<()> {
        save_history(&self.path, &updated)?;
        self.entries = updated;
        Ok(())
    }
}

// ============================================================================
// PERSISTENCE
// ============================================================================

/// Read history from CSV
///
/// Missing, empty or unreadable files yield an empty history. Rows that do
/// not match the schema are dropped with a warning.
pub fn load_history(path: &Path) -> Vec<HistoryEntry> {
    if !path.exists() {
        return Vec::new();
    }

    let mut rdr = match csv::Reader::from_path(path) {
        Ok(rdr) => rdr,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "history file unreadable, starting empty");
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    let mut dropped = 0usize;

    for (line, result) in rdr.deserialize::<HistoryEntry>().enumerate() {
        match result {
            Ok(entry) => entries.push(entry),
            Err(err) if err.is_io_error() => {
                warn!(path = %path.display(), error = %err, "history file read failed, keeping rows read so far");
                break;
            }
            Err(err) => {
                dropped += 1;
                warn!(row = line + 1, error = %err, "dropping malformed history row");
            }
        }
    }

    if dropped > 0 {
        warn!(dropped, kept = entries.len(), "history loaded with dropped rows");
    }

    entries
}

/// Rewrite the whole file; the header is written even with zero rows
pub fn save_history(path: &Path, entries: &[HistoryEntry]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to open history file {}", path.display()))?;

    wtr.write_record(HISTORY_HEADERS)
        .context("Failed to write history header")?;

    for entry in entries {
        wtr.serialize(entry)
            .with_context(|| format!("Failed to write history entry {}", entry.id))?;
    }

    wtr.flush().context("Failed to flush history file")?;
    Ok(())
}

/// Parse a history id typed by the user
pub fn parse_entry_id(text: &str) -> Option<u64> {
    u64::from_str(text.trim()).ok().filter(|id| *id > 0)
}

// ============================================================================
// TESTS
// ============================================================================
