use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use comps_core::{Error, Result};

use crate::memory::ListingCorpus;
use crate::persistence::SnapshotPersistence;

const DEFAULT_SAVE_INTERVAL: Duration = Duration::from_secs(300);

/// Owns the corpus and its persistence lifecycle: restores the last
/// snapshot on open and saves periodically in the background.
pub struct StoreManager {
    corpus: Arc<ListingCorpus>,
    persistence: SnapshotPersistence,
    #[allow(dead_code)]
    data_dir: PathBuf,
}

impl StoreManager {
    /// Open (or initialize) the store under `data_dir`, restoring any
    /// previous snapshot, with periodic background saves.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        Self::open_with_interval(data_dir, Some(DEFAULT_SAVE_INTERVAL))
    }

    /// Open without a background save thread; used by tests and callers
    /// that save explicitly.
    pub fn open_without_autosave<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        Self::open_with_interval(data_dir, None)
    }

    fn open_with_interval<P: AsRef<Path>>(
        data_dir: P,
        save_interval: Option<Duration>,
    ) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        let persistence = SnapshotPersistence::new(&data_dir);
        let corpus = Arc::new(ListingCorpus::new());

        if let Some(snapshot) = persistence
            .load()
            .map_err(|e| Error::Storage(e.to_string()))?
        {
            let total = snapshot.listings.len();
            for listing in snapshot.listings {
                let id = listing.id.to_string();
                if let Err(e) = corpus.upsert(listing) {
                    warn!("skipping listing {} from snapshot: {}", id, e);
                }
            }
            info!(
                "restored {} of {} listings from snapshot {:?}",
                corpus.count(),
                total,
                persistence.path()
            );
        }

        let manager = Self {
            corpus,
            persistence,
            data_dir,
        };

        if let Some(interval) = save_interval {
            manager.start_background_save(interval);
        }

        Ok(manager)
    }

    /// Start background save thread
    fn start_background_save(&self, interval: Duration) {
        let corpus = self.corpus.clone();
        let persistence = self.persistence.clone();

        std::thread::spawn(move || loop {
            std::thread::sleep(interval);
            if let Err(e) = persistence.save(corpus.iter()) {
                warn!("background save failed: {}", e);
            }
        });
    }

    pub fn corpus(&self) -> Arc<ListingCorpus> {
        self.corpus.clone()
    }

    pub fn count(&self) -> usize {
        self.corpus.count()
    }

    /// Synchronous save of the current corpus.
    pub fn save(&self) -> Result<()> {
        self.persistence
            .save(self.corpus.iter())
            .map_err(|e| Error::Storage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comps_core::Listing;

    #[test]
    fn test_open_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let manager = StoreManager::open_without_autosave(dir.path()).unwrap();
        assert_eq!(manager.count(), 0);
    }

    #[test]
    fn test_save_and_restore_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let manager = StoreManager::open_without_autosave(dir.path()).unwrap();
            manager
                .corpus()
                .upsert(Listing::new("a1").with_price(90_000).with_area(55.0))
                .unwrap();
            manager.save().unwrap();
        }

        let reopened = StoreManager::open_without_autosave(dir.path()).unwrap();
        assert_eq!(reopened.count(), 1);
        assert!(reopened.corpus().get_by_str("a1").is_some());
    }
}
