//! # comps Engine
//!
//! The comparables-based valuation engine: weighted pairwise similarity,
//! neighbor ranking, KNN price estimation, and market statistics.
//!
//! ## Features
//!
//! - **Feature Weights**: Static per-feature weight table, validated once
//!   at startup and immutable afterwards
//! - **Similarity Scoring**: Normalized `[0, 1]` score over the jointly
//!   available features of two listings
//! - **Neighbor Selection**: Coarse store-side filtering, full scoring,
//!   stable top-K ranking
//! - **Price Estimation**: Similarity-weighted average with confidence and
//!   an outlier-trimmed price range
//! - **Market Statistics**: Descriptive stats over any corpus slice
//! - **Baseline Fallback**: Rate-table model for thin-evidence targets
//!
//! ## Example
//!
//! ```rust
//! use comps_engine::SimilarityEngine;
//! use comps_core::Listing;
//!
//! let engine = SimilarityEngine::default();
//!
//! let a = Listing::new("a").with_city("Riverton").with_area(60.0);
//! let b = Listing::new("b").with_city("Riverton").with_area(70.0);
//!
//! let score = engine.score(&a, &b);
//! assert!(score > 0.0 && score <= 1.0);
//! assert_eq!(score, engine.score(&b, &a));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐     ┌──────────────────┐     ┌────────────────┐
//! │ FeatureWeights│────>│ SimilarityEngine │────>│NeighborSelector│
//! │ (static table)│     │   (pair score)   │     │ (rank & top-K) │
//! └───────────────┘     └──────────────────┘     └───────┬────────┘
//!                                                        │
//!                       ┌──────────────────┐     ┌───────▼────────┐
//!                       │  BaselineModel   │<- - │ PriceEstimator │
//!                       │ (thin evidence)  │     │ (estimate)     │
//!                       └──────────────────┘     └────────────────┘
//! ```
//!
//! The caller (API layer) decides when to consult the baseline model; the
//! estimator only reports insufficiency as a structured error value.

pub mod baseline;
pub mod estimate;
pub mod neighbors;
pub mod similarity;
pub mod stats;
pub mod weights;

// Re-export main types for convenience
pub use baseline::{BaselineModel, Prediction, PriceModel, BASELINE_CONFIDENCE};
pub use estimate::{
    ComparableSummary, Estimate, EstimatorConfig, PriceEstimator, PriceRange, Valuator,
    CONFIDENCE_CAP, DEFAULT_MAX_COMPARABLES, DEFAULT_MIN_SIMILARITY,
};
pub use neighbors::{
    Neighbor, NeighborSelector, SelectorConfig, DEFAULT_K, DEFAULT_MAX_CANDIDATES,
};
pub use similarity::SimilarityEngine;
pub use stats::{MarketStats, MarketStatsAggregator};
pub use weights::{DistanceScales, FeatureWeights, WeightsError};
