// Snapshot persistence for the listing corpus
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use comps_core::Listing;

const SNAPSHOT_FILE: &str = "corpus.snapshot";

/// On-disk image of the whole corpus.
#[derive(Debug, Serialize, Deserialize)]
pub struct CorpusSnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub listings: Vec<Listing>,
}

/// Writes and reads corpus snapshots under a data directory.
///
/// Snapshots are serialized as JSON and written through a temp file with an
/// atomic replace, so a crash mid-save never corrupts the previous snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotPersistence {
    path: PathBuf,
}

impl SnapshotPersistence {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            path: data_dir.as_ref().join(SNAPSHOT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the given listings as the current snapshot.
    pub fn save(&self, listings: Vec<Listing>) -> Result<()> {
        let snapshot = CorpusSnapshot {
            version: 1,
            saved_at: Utc::now(),
            listings,
        };
        let data = serde_json::to_vec(&snapshot)?;

        let file = AtomicFile::new(&self.path, OverwriteBehavior::AllowOverwrite);
        file.write(|f| f.write_all(&data))?;
        Ok(())
    }

    /// Load the current snapshot, or `None` when none has been written yet.
    pub fn load(&self) -> Result<Option<CorpusSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = std::fs::read(&self.path)?;
        let snapshot: CorpusSnapshot = serde_json::from_slice(&data)?;
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_without_snapshot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = SnapshotPersistence::new(dir.path());
        assert!(persistence.load().unwrap().is_none());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = SnapshotPersistence::new(dir.path());

        let listings = vec![
            Listing::new("a1").with_price(90_000).with_area(55.0).with_city("Riverton"),
            Listing::new("a2").with_price(120_000).with_area(70.0).with_city("Riverton"),
        ];
        persistence.save(listings.clone()).unwrap();

        let snapshot = persistence.load().unwrap().unwrap();
        assert_eq!(snapshot.version, 1);
        assert_eq!(snapshot.listings, listings);
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = SnapshotPersistence::new(dir.path());

        persistence
            .save(vec![Listing::new("old").with_price(1).with_area(1.0)])
            .unwrap();
        persistence
            .save(vec![Listing::new("new").with_price(2).with_area(2.0)])
            .unwrap();

        let snapshot = persistence.load().unwrap().unwrap();
        assert_eq!(snapshot.listings.len(), 1);
        assert_eq!(snapshot.listings[0].id.to_string(), "new");
    }
}
