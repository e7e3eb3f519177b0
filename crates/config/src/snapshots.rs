//! Saved charts.
//!
//! Named snapshots of a chart, kept in a single JSON file. Entries are
//! listed most recently updated first. Entries that fail to parse are kept
//! as raw JSON and written back untouched; a file that cannot be read at
//! all is copied to `<file>.bak` before the first write replaces it.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use mandala_engine::grid::Grid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedMandala {
    pub id: String,
    pub name: String,
    pub data: Grid,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug)]
pub enum SnapshotError {
    /// Reading or writing the snapshot file failed.
    Io(String),
    /// The list could not be serialized.
    Serialize(String),
    /// No saved chart with this id.
    NotFound(String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "saved charts: {msg}"),
            Self::Serialize(msg) => write!(f, "saved charts: {msg}"),
            Self::NotFound(id) => write!(f, "no saved chart with id '{id}'"),
        }
    }
}

impl std::error::Error for SnapshotError {}

pub struct SnapshotStore {
    path: PathBuf,
    entries: Vec<SavedMandala>,
    /// Entries that did not parse, preserved verbatim.
    unparsed: Vec<serde_json::Value>,
    /// The file exists but could not be read as a list.
    damaged: bool,
}

impl SnapshotStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable one is treated as empty with a warning, and entries that
    /// fail to parse are hidden from the list but kept on disk.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let loaded = read_entries(&path);
        let mut store = Self {
            path,
            entries: loaded.entries,
            unparsed: loaded.unparsed,
            damaged: loaded.damaged,
        };
        store.sort();
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved charts, most recently updated first.
    pub fn list(&self) -> &[SavedMandala] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SavedMandala> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Number of entries in the file that could not be read.
    pub fn unparsed_len(&self) -> usize {
        self.unparsed.len()
    }

    /// Save a copy of `grid` under a new id.
    pub fn save(&mut self, grid: &Grid) -> Result<SavedMandala, SnapshotError> {
        self.save_at(grid, Utc::now().timestamp_millis())
    }

    /// Save with an explicit timestamp (milliseconds since the epoch).
    ///
    /// The name is the trimmed main goal, or `Mandala <date>` when the main
    /// goal is blank.
    pub fn save_at(&mut self, grid: &Grid, now_ms: i64) -> Result<SavedMandala, SnapshotError> {
        let goal = grid.main_goal().trim();
        let name = if goal.is_empty() {
            default_name(now_ms)
        } else {
            goal.to_string()
        };

        let entry = SavedMandala {
            id: self.unique_id(now_ms),
            name,
            data: grid.clone(),
            created_at: now_ms,
            updated_at: now_ms,
        };
        debug!("saving chart {} ({})", entry.id, entry.name);

        self.entries.insert(0, entry.clone());
        self.sort();
        self.persist()?;
        Ok(entry)
    }

    pub fn delete(&mut self, id: &str) -> Result<SavedMandala, SnapshotError> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| SnapshotError::NotFound(id.to_string()))?;
        let removed = self.entries.remove(pos);
        self.persist()?;
        Ok(removed)
    }

    /// Rename a saved chart. A blank name keeps the old one; the update
    /// time is bumped either way.
    pub fn rename(&mut self, id: &str, name: &str) -> Result<SavedMandala, SnapshotError> {
        self.rename_at(id, name, Utc::now().timestamp_millis())
    }

    pub fn rename_at(
        &mut self,
        id: &str,
        name: &str,
        now_ms: i64,
    ) -> Result<SavedMandala, SnapshotError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| SnapshotError::NotFound(id.to_string()))?;

        let trimmed = name.trim();
        if !trimmed.is_empty() {
            entry.name = trimmed.to_string();
        }
        entry.updated_at = now_ms;
        let renamed = entry.clone();

        self.sort();
        self.persist()?;
        Ok(renamed)
    }

    fn id_taken(&self, id: &str) -> bool {
        self.get(id).is_some()
            || self
                .unparsed
                .iter()
                .any(|raw| raw.get("id").and_then(|v| v.as_str()) == Some(id))
    }

    fn unique_id(&self, now_ms: i64) -> String {
        let base = format!("mandala_{now_ms}");
        if !self.id_taken(&base) {
            return base;
        }
        (2..)
            .map(|n| format!("{base}_{n}"))
            .find(|candidate| !self.id_taken(candidate))
            .unwrap_or(base)
    }

    fn sort(&mut self) {
        // Stable: equal timestamps keep insertion order
        self.entries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    }

    fn persist(&mut self) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| SnapshotError::Io(e.to_string()))?;
            }
        }

        if self.damaged {
            let backup = backup_path(&self.path);
            fs::copy(&self.path, &backup).map_err(|e| {
                SnapshotError::Io(format!(
                    "could not back up unreadable {}: {}",
                    self.path.display(),
                    e
                ))
            })?;
            warn!(
                "replacing unreadable {} (previous contents kept in {})",
                self.path.display(),
                backup.display()
            );
            self.damaged = false;
        }

        let mut values = self
            .entries
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SnapshotError::Serialize(e.to_string()))?;
        values.extend(self.unparsed.iter().cloned());

        let json = serde_json::to_string_pretty(&values)
            .map_err(|e| SnapshotError::Serialize(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| SnapshotError::Io(e.to_string()))
    }
}

#[derive(Default)]
struct Loaded {
    entries: Vec<SavedMandala>,
    unparsed: Vec<serde_json::Value>,
    damaged: bool,
}

fn read_entries(path: &Path) -> Loaded {
    if !path.exists() {
        return Loaded::default();
    }
    let damaged = Loaded {
        damaged: true,
        ..Loaded::default()
    };

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!("error reading {}: {}", path.display(), e);
            return damaged;
        }
    };

    let raw: Vec<serde_json::Value> = match serde_json::from_str(&contents) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("error parsing {}: {}", path.display(), e);
            return damaged;
        }
    };

    let mut loaded = Loaded::default();
    for (i, value) in raw.into_iter().enumerate() {
        match serde_json::from_value::<SavedMandala>(value.clone()) {
            Ok(entry) => loaded.entries.push(entry),
            Err(e) => {
                warn!("skipping saved chart #{} in {}: {}", i + 1, path.display(), e);
                loaded.unparsed.push(value);
            }
        }
    }
    loaded
}

/// `<path>.bak`, next to the original.
fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// `Mandala <YYYY-MM-DD>` in local time.
fn default_name(now_ms: i64) -> String {
    let date = DateTime::<Utc>::from_timestamp_millis(now_ms)
        .unwrap_or_default()
        .with_timezone(&Local);
    format!("Mandala {}", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mandala_engine::coords::{Cell, Region};
    use mandala_engine::store::MandalaStore;
    use tempfile::tempdir;

    fn chart(goal: &str) -> Grid {
        let mut store = MandalaStore::new();
        store.update_at(Region::Center, Cell::Center, goal);
        store.update_at(Region::Center, Cell::Top, "Theme");
        store.snapshot()
    }

    #[test]
    fn test_save_names_after_main_goal() {
        let dir = tempdir().unwrap();
        let mut store = SnapshotStore::open(dir.path().join("saved.json"));

        let saved = store.save_at(&chart("  Run a marathon  "), 1_700_000_000_000).unwrap();

        assert_eq!(saved.id, "mandala_1700000000000");
        assert_eq!(saved.name, "Run a marathon");
        assert_eq!(saved.created_at, saved.updated_at);
        assert_eq!(saved.data.at(Region::Top, Cell::Center), "Theme");
    }

    #[test]
    fn test_save_blank_goal_uses_date() {
        let dir = tempdir().unwrap();
        let mut store = SnapshotStore::open(dir.path().join("saved.json"));

        let saved = store.save_at(&chart(" "), 1_700_000_000_000).unwrap();

        assert_eq!(saved.name, default_name(1_700_000_000_000));
        assert!(saved.name.starts_with("Mandala 2023-11-1"));
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let dir = tempdir().unwrap();
        let mut store = SnapshotStore::open(dir.path().join("saved.json"));

        let a = store.save_at(&chart("A"), 42).unwrap();
        let b = store.save_at(&chart("B"), 42).unwrap();
        let c = store.save_at(&chart("C"), 42).unwrap();

        assert_eq!(a.id, "mandala_42");
        assert_eq!(b.id, "mandala_42_2");
        assert_eq!(c.id, "mandala_42_3");
    }

    #[test]
    fn test_list_newest_first_and_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("saved.json");
        let mut store = SnapshotStore::open(&path);

        store.save_at(&chart("old"), 1_000).unwrap();
        store.save_at(&chart("new"), 2_000).unwrap();

        let reopened = SnapshotStore::open(&path);
        let names: Vec<&str> = reopened.list().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["new", "old"]);
    }

    #[test]
    fn test_rename() {
        let dir = tempdir().unwrap();
        let mut store = SnapshotStore::open(dir.path().join("saved.json"));
        let old = store.save_at(&chart("old"), 1_000).unwrap();
        store.save_at(&chart("new"), 2_000).unwrap();

        let renamed = store.rename_at(&old.id, "  Renamed ", 3_000).unwrap();
        assert_eq!(renamed.name, "Renamed");
        assert_eq!(renamed.updated_at, 3_000);
        assert_eq!(renamed.created_at, 1_000);
        assert_eq!(store.list()[0].id, old.id);

        let kept = store.rename_at(&old.id, "   ", 4_000).unwrap();
        assert_eq!(kept.name, "Renamed");
        assert_eq!(kept.updated_at, 4_000);

        assert!(matches!(
            store.rename_at("nope", "x", 5_000),
            Err(SnapshotError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved.json");
        let mut store = SnapshotStore::open(&path);
        let saved = store.save_at(&chart("gone"), 1_000).unwrap();

        store.delete(&saved.id).unwrap();
        assert!(store.is_empty());
        assert!(SnapshotStore::open(&path).is_empty());
        assert!(matches!(store.delete(&saved.id), Err(SnapshotError::NotFound(_))));
    }

    #[test]
    fn test_corrupt_file_opens_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved.json");
        fs::write(&path, "not json at all").unwrap();

        assert!(SnapshotStore::open(&path).is_empty());
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved.json");
        let good = SavedMandala {
            id: "mandala_1".to_string(),
            name: "ok".to_string(),
            data: Grid::empty(),
            created_at: 1,
            updated_at: 1,
        };
        let bad = serde_json::json!({
            "id": "mandala_2",
            "name": "short",
            "data": ["a", "b"],
            "createdAt": 2,
            "updatedAt": 2
        });
        let list = serde_json::json!([serde_json::to_value(&good).unwrap(), bad]);
        fs::write(&path, list.to_string()).unwrap();

        let store = SnapshotStore::open(&path);
        assert_eq!(store.len(), 1);
        assert_eq!(store.unparsed_len(), 1);
        assert_eq!(store.get("mandala_1"), Some(&good));
    }

    #[test]
    fn test_bad_entries_survive_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved.json");
        let bad = serde_json::json!({
            "id": "mandala_5",
            "name": "hand-edited",
            "data": "not a grid",
            "createdAt": 5,
            "updatedAt": 5
        });
        fs::write(&path, serde_json::json!([bad.clone()]).to_string()).unwrap();

        let mut store = SnapshotStore::open(&path);
        assert!(store.is_empty());
        let saved = store.save_at(&chart("fresh"), 5).unwrap();
        assert_eq!(saved.id, "mandala_5_2");

        let raw: Vec<serde_json::Value> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.len(), 2);
        assert!(raw.contains(&bad));

        let reopened = SnapshotStore::open(&path);
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.unparsed_len(), 1);
    }

    #[test]
    fn test_corrupt_file_backed_up_before_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved.json");
        fs::write(&path, "[{\"id\": truncated").unwrap();

        let mut store = SnapshotStore::open(&path);
        store.save_at(&chart("new"), 1_000).unwrap();
        store.save_at(&chart("newer"), 2_000).unwrap();

        let backup = dir.path().join("saved.json.bak");
        assert_eq!(fs::read_to_string(&backup).unwrap(), "[{\"id\": truncated");
        assert_eq!(SnapshotStore::open(&path).len(), 2);
    }
}
