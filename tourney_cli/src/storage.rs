//! JSON snapshot of the competition store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use tourney::store::MemoryStore;

/// Load the store, starting empty when the snapshot does not exist yet
///
/// A snapshot that exists but cannot be read or parsed is an error, so a
/// later save never clobbers data that failed to load.
pub fn load(path: &Path) -> Result<MemoryStore> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No snapshot at {}, starting empty", path.display());
            return Ok(MemoryStore::new());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    let store: MemoryStore = serde_json::from_str(&raw)
        .with_context(|| format!("Corrupt snapshot in {}", path.display()))?;
    debug!(
        "Loaded {} competitions, {} teams, {} matches from {}",
        store.competitions.len(),
        store.teams.len(),
        store.matches.len(),
        path.display()
    );
    Ok(store)
}

fn scratch_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write the store next to `path` and move it into place
pub fn save(path: &Path, store: &MemoryStore) -> Result<()> {
    let json = serde_json::to_string_pretty(store).context("Failed to serialize store")?;

    let scratch = scratch_path(path);
    fs::write(&scratch, json)
        .with_context(|| format!("Failed to write {}", scratch.display()))?;
    fs::rename(&scratch, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    debug!("Saved snapshot to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourney::competition::{CompetitionFormat, CompetitionKind, manager};

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = load(&dir.path().join("data.json")).unwrap();
        assert_eq!(store, MemoryStore::new());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        let mut store = MemoryStore::new();
        let cup = manager::create_competition(
            &mut store,
            "Cup",
            CompetitionKind::Fut7,
            CompetitionFormat::GroupsKnockout,
        )
        .unwrap();
        manager::add_team(&mut store, cup, "Reds").unwrap();

        save(&path, &store).unwrap();
        assert!(!scratch_path(&path).exists());
        assert_eq!(load(&path).unwrap(), store);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("Corrupt snapshot"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }
}
