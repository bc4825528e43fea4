//! Neighbor selection: retrieve, score, rank, truncate
//!
//! Pulls a coarse-filtered candidate set from the store, scores every
//! candidate against the target, and returns the top-K by similarity.

use std::sync::Arc;

use comps_core::{CorpusFilter, Listing, ListingStore, Result};

use crate::similarity::SimilarityEngine;

/// Default number of neighbors retained per valuation.
pub const DEFAULT_K: usize = 10;

/// Default upper bound on the candidate set pulled from the store, keeping
/// per-request scoring cost predictable as the corpus grows.
pub const DEFAULT_MAX_CANDIDATES: usize = 5_000;

/// A candidate listing paired with its similarity to a fixed target.
#[derive(Debug, Clone)]
pub struct Neighbor {
    pub listing: Listing,
    pub score: f64,
}

/// Tuning for neighbor selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorConfig {
    pub k: usize,
    pub max_candidates: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

/// Finds the listings most similar to a valuation target.
pub struct NeighborSelector {
    engine: SimilarityEngine,
    store: Arc<dyn ListingStore>,
    config: SelectorConfig,
}

impl NeighborSelector {
    pub fn new(engine: SimilarityEngine, store: Arc<dyn ListingStore>) -> Self {
        Self::with_config(engine, store, SelectorConfig::default())
    }

    pub fn with_config(
        engine: SimilarityEngine,
        store: Arc<dyn ListingStore>,
        config: SelectorConfig,
    ) -> Self {
        Self { engine, store, config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn engine(&self) -> &SimilarityEngine {
        &self.engine
    }

    /// Top neighbors for `target`, sorted by similarity descending and
    /// truncated to `limit` (the configured K when `None`).
    ///
    /// Candidates sharing the target's id are excluded so a listing already
    /// present in the corpus never matches itself. An empty candidate set
    /// yields an empty list, not an error; the caller decides what emptiness
    /// means.
    pub fn find(&self, target: &Listing, limit: Option<usize>) -> Result<Vec<Neighbor>> {
        let limit = limit.unwrap_or(self.config.k);
        let filter =
            CorpusFilter::for_target(target).with_max_candidates(self.config.max_candidates);

        let candidates = self.store.query(&filter)?;

        let mut neighbors: Vec<Neighbor> = candidates
            .into_iter()
            .filter(|candidate| candidate.id != target.id)
            .map(|listing| {
                let score = self.engine.score(target, &listing);
                Neighbor { listing, score }
            })
            .collect();

        // Stable sort: equal scores keep their retrieval order.
        neighbors.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        neighbors.truncate(limit);

        Ok(neighbors)
    }
}
