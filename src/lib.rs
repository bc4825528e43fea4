//! # comps
//!
//! A comparable-sales valuation engine for residential listings.
//!
//! comps estimates the market value of a unit by scoring it against a
//! corpus of prior listings with a weighted similarity metric, then
//! aggregating the prices of its closest matches into a weighted estimate
//! with a confidence value and a trimmed price range.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! cargo install comps
//! comps --data-dir ./data --http-port 8080
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use std::sync::Arc;
//! use comps::prelude::*;
//!
//! // Build a small corpus
//! let corpus = Arc::new(ListingCorpus::new());
//! for (id, price, area) in [("a", 98_000, 58.0), ("b", 104_000, 61.0), ("c", 99_500, 59.0)] {
//!     let listing = Listing::new(id)
//!         .with_city("Riverton")
//!         .with_area(area)
//!         .with_price(price);
//!     corpus.upsert(listing).unwrap();
//! }
//!
//! // Wire the engine and value a target
//! let selector = NeighborSelector::new(SimilarityEngine::default(), corpus);
//! let valuator = Valuator::new(selector, PriceEstimator::default());
//!
//! let target = Listing::new("target").with_city("Riverton").with_area(60.0);
//! let estimate = valuator.value(&target).unwrap();
//! assert!(estimate.estimated_price > 0);
//! assert!(estimate.confidence <= 0.95);
//! ```
//!
//! ## Crate Structure
//!
//! comps is composed of several crates:
//!
//! - [`comps-core`](https://docs.rs/comps-core) - Domain model (Listing, filters, store capability)
//! - [`comps-engine`](https://docs.rs/comps-engine) - Similarity scoring, neighbor ranking, estimation, stats
//! - [`comps-store`](https://docs.rs/comps-store) - In-memory corpus with snapshot persistence
//! - [`comps-api`](https://docs.rs/comps-api) - REST API
//!
//! ## Features
//!
//! - **Weighted Similarity**: 17 feature comparisons renormalized over the
//!   jointly-available features of each pair
//! - **KNN Estimation**: Similarity-weighted price with capped confidence
//!   and percentile-trimmed range
//! - **Market Statistics**: Corpus-slice summaries for context
//! - **Baseline Fallback**: Rate-table model when comparables are thin
//! - **Snapshot Persistence**: Atomic JSON snapshots of the corpus

// Re-export core types
pub use comps_core::{
    planar_distance_km, BuildingType, Condition, CorpusFilter, Error, FloorCategory, Heating,
    Listing, ListingId, ListingStore, Result,
};

// Re-export the engine
pub use comps_engine::{
    BaselineModel, ComparableSummary, DistanceScales, Estimate, EstimatorConfig, FeatureWeights,
    MarketStats, MarketStatsAggregator, Neighbor, NeighborSelector, Prediction, PriceEstimator,
    PriceModel, PriceRange, SelectorConfig, SimilarityEngine, Valuator,
};

// Re-export storage
pub use comps_store::{ListingCorpus, StoreManager};

// Re-export API
pub use comps_api::{ApiState, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BaselineModel, BuildingType, Condition, CorpusFilter, DistanceScales, Error, Estimate,
        EstimatorConfig, FeatureWeights, FloorCategory, Heating, Listing, ListingCorpus,
        ListingId, ListingStore, MarketStats, MarketStatsAggregator, Neighbor, NeighborSelector,
        PriceEstimator, PriceModel, PriceRange, Result, SelectorConfig, SimilarityEngine,
        StoreManager, Valuator,
    };
}
