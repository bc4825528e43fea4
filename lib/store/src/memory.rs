use std::collections::BTreeMap;

use parking_lot::RwLock;

use comps_core::{CorpusFilter, Listing, ListingId, ListingStore, Result};

/// In-memory listing corpus, keyed by listing id.
///
/// The map is ordered by id so that `query` returns candidates in a
/// deterministic order; downstream ranking breaks score ties by retrieval
/// order, which therefore stays reproducible across runs.
pub struct ListingCorpus {
    listings: RwLock<BTreeMap<String, Listing>>,
}

impl ListingCorpus {
    pub fn new() -> Self {
        Self {
            listings: RwLock::new(BTreeMap::new()),
        }
    }

    /// Insert or update a listing. Derived attributes are filled in and
    /// listings with malformed numeric features are rejected.
    pub fn upsert(&self, listing: Listing) -> Result<()> {
        listing.validate()?;
        let listing = listing.with_derived_fields();
        self.listings
            .write()
            .insert(listing.id.to_string(), listing);
        Ok(())
    }

    /// Insert a batch of listings; returns how many were stored.
    pub fn batch_upsert(&self, listings: Vec<Listing>) -> Result<usize> {
        let mut stored = 0;
        for listing in listings {
            self.upsert(listing)?;
            stored += 1;
        }
        Ok(stored)
    }

    /// Get a listing by id.
    pub fn get(&self, id: &ListingId) -> Option<Listing> {
        self.get_by_str(&id.to_string())
    }

    /// Get a listing by the string form of its id.
    pub fn get_by_str(&self, id: &str) -> Option<Listing> {
        self.listings.read().get(id).cloned()
    }

    /// Delete a listing by the string form of its id.
    pub fn delete(&self, id: &str) -> bool {
        self.listings.write().remove(id).is_some()
    }

    pub fn count(&self) -> usize {
        self.listings.read().len()
    }

    /// Every stored listing, in id order.
    pub fn iter(&self) -> Vec<Listing> {
        self.listings.read().values().cloned().collect()
    }
}

impl Default for ListingCorpus {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingStore for ListingCorpus {
    fn query(&self, filter: &CorpusFilter) -> Result<Vec<Listing>> {
        let listings = self.listings.read();
        let mut out: Vec<Listing> = listings
            .values()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect();
        if let Some(cap) = filter.max_candidates {
            out.truncate(cap);
        }
        Ok(out)
    }
}
