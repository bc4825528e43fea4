//! KNN price estimation over ranked neighbors
//!
//! Turns a ranked neighbor list into a similarity-weighted price estimate
//! with a confidence value and a trimmed price range. Insufficient evidence
//! is reported as a structured error value so the caller can branch to a
//! fallback model instead of handling a panic or a silent zero.

use serde::{Deserialize, Serialize};

use comps_core::{BuildingType, Error, Listing, ListingId, Result};

use crate::neighbors::{Neighbor, NeighborSelector, DEFAULT_K};

/// Minimum similarity a neighbor must exceed to influence the estimate.
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.1;

/// Comparable summaries attached to an estimate are capped to this many.
pub const DEFAULT_MAX_COMPARABLES: usize = 5;

/// A KNN estimate is never reported as fully certain.
pub const CONFIDENCE_CAP: f64 = 0.95;

/// Tuning for price estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Neighbor count the confidence heuristic treats as full evidence.
    pub k: usize,
    /// Qualification threshold; neighbors must score strictly above it.
    pub min_similarity: f64,
    /// Maximum comparable summaries returned for display.
    pub max_comparables: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            min_similarity: DEFAULT_MIN_SIMILARITY,
            max_comparables: DEFAULT_MAX_COMPARABLES,
        }
    }
}

/// Price range of the qualifying comparables, outlier-trimmed when the
/// sample is large enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: i64,
    pub max: i64,
}

/// Display summary of one qualifying comparable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparableSummary {
    pub id: ListingId,
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub similarity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_type: Option<BuildingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i32>,
}

impl ComparableSummary {
    fn from_neighbor(neighbor: &Neighbor) -> Self {
        let l = &neighbor.listing;
        Self {
            id: l.id.clone(),
            price: l.price.unwrap_or_default(),
            area_total: l.area_total,
            rooms: l.rooms,
            address: l.address.clone(),
            similarity: neighbor.score,
            city: l.city.clone(),
            district: l.district.clone(),
            building_type: l.building_type,
            year_built: l.year_built,
        }
    }
}

/// Result of a successful valuation.
///
/// Field names double as the wire shape returned by the API layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub estimated_price: i64,
    pub confidence: f64,
    pub price_range: PriceRange,
    pub similar_properties_count: usize,
    pub avg_similarity: f64,
    pub similar_properties: Vec<ComparableSummary>,
    pub method: String,
}

/// Computes weighted price estimates from ranked neighbor lists.
#[derive(Debug, Clone, Default)]
pub struct PriceEstimator {
    config: EstimatorConfig,
}

impl PriceEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimate a price from ranked neighbors.
    ///
    /// Errors:
    /// - [`Error::NoComparables`] when `neighbors` is empty;
    /// - [`Error::InsufficientEvidence`] when no neighbor clears the
    ///   similarity threshold, carrying the raw candidate count.
    pub fn estimate(&self, neighbors: &[Neighbor]) -> Result<Estimate> {
        if neighbors.is_empty() {
            return Err(Error::NoComparables);
        }

        let mut qualifying: Vec<&Neighbor> = neighbors
            .iter()
            .filter(|n| n.score > self.config.min_similarity && n.listing.price.is_some())
            .collect();
        if qualifying.is_empty() {
            return Err(Error::InsufficientEvidence {
                candidates: neighbors.len(),
            });
        }
        // Callers normally pass an already-ranked list; re-sorting here is a
        // stable no-op in that case and an ordering guarantee otherwise.
        qualifying.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let prices: Vec<i64> = qualifying
            .iter()
            .map(|n| n.listing.price.unwrap_or_default())
            .collect();
        let scores: Vec<f64> = qualifying.iter().map(|n| n.score).collect();

        let total_weight: f64 = scores.iter().sum();
        let estimated = if total_weight > 0.0 {
            prices
                .iter()
                .zip(&scores)
                .map(|(p, s)| *p as f64 * s)
                .sum::<f64>()
                / total_weight
        } else {
            // Every qualifying score sat exactly at the threshold boundary;
            // fall back to the unweighted mean.
            prices.iter().sum::<i64>() as f64 / prices.len() as f64
        };

        let avg_similarity = total_weight / scores.len() as f64;
        let coverage = qualifying.len() as f64 / self.config.k as f64;
        let confidence = (avg_similarity * coverage).min(CONFIDENCE_CAP);

        let similar_properties: Vec<ComparableSummary> = qualifying
            .iter()
            .take(self.config.max_comparables)
            .map(|n| ComparableSummary::from_neighbor(n))
            .collect();

        Ok(Estimate {
            estimated_price: estimated as i64,
            confidence: round2(confidence),
            price_range: price_range(&prices),
            similar_properties_count: qualifying.len(),
            avg_similarity: round2(avg_similarity),
            similar_properties,
            method: "knn_weighted_average".to_string(),
        })
    }
}

/// Range of the qualifying prices. With three or more samples the 10th and
/// 90th percentiles (nearest-rank, floor indexing) trim outlier comparables;
/// below that the raw min/max is the only defensible answer.
fn price_range(prices: &[i64]) -> PriceRange {
    let mut sorted = prices.to_vec();
    sorted.sort_unstable();

    if sorted.len() >= 3 {
        let lo = (sorted.len() as f64 * 0.1) as usize;
        let hi = (sorted.len() as f64 * 0.9) as usize;
        PriceRange {
            min: sorted[lo],
            max: sorted[hi],
        }
    } else {
        PriceRange {
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// End-to-end valuation facade: select neighbors, then estimate.
pub struct Valuator {
    selector: NeighborSelector,
    estimator: PriceEstimator,
}

impl Valuator {
    pub fn new(selector: NeighborSelector, estimator: PriceEstimator) -> Self {
        Self { selector, estimator }
    }

    /// Value a target listing against the corpus.
    pub fn value(&self, target: &Listing) -> Result<Estimate> {
        let k = self.estimator.config().k;
        let neighbors = self.selector.find(target, Some(k))?;
        self.estimator.estimate(&neighbors)
    }
}
