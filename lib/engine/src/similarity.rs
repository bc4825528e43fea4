//! Pairwise similarity scoring between listings
//!
//! Computes a normalized similarity score in `[0.0, 1.0]` between two
//! listings by walking a fixed list of feature comparisons. A feature absent
//! on either side is skipped entirely - it contributes neither to the
//! weighted sum nor to the total weight, so the score renormalizes over the
//! jointly-available features rather than a fixed feature count.
//!
//! The score is symmetric: every contribution formula is symmetric in its
//! two arguments, so `score(a, b) == score(b, a)` always holds.

use comps_core::{planar_distance_km, Listing};

use crate::weights::{DistanceScales, FeatureWeights, WeightsError};

/// Stateless scoring engine over a fixed, validated weight table.
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    weights: FeatureWeights,
    scales: DistanceScales,
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self {
            weights: FeatureWeights::default(),
            scales: DistanceScales::default(),
        }
    }
}

impl SimilarityEngine {
    /// Create an engine from a weight table and scale set, validating both.
    pub fn new(weights: FeatureWeights, scales: DistanceScales) -> Result<Self, WeightsError> {
        weights.validate()?;
        scales.validate()?;
        Ok(Self { weights, scales })
    }

    pub fn weights(&self) -> &FeatureWeights {
        &self.weights
    }

    pub fn scales(&self) -> &DistanceScales {
        &self.scales
    }

    /// Similarity between two listings, in `[0.0, 1.0]`.
    ///
    /// Returns `0.0` when the listings share no comparable feature. Never
    /// panics: missing fields are skipped and non-finite numbers are treated
    /// as missing.
    pub fn score(&self, a: &Listing, b: &Listing) -> f64 {
        let w = &self.weights;
        let s = &self.scales;
        let mut tally = Tally::default();

        tally.add_text(&a.city, &b.city, w.city_match);
        tally.add_text(&a.district, &b.district, w.district_match);

        // Coordinate pair: planar km distance clamped against the horizon.
        if let (Some(lat1), Some(lon1), Some(lat2), Some(lon2)) =
            (a.latitude, a.longitude, b.latitude, b.longitude)
        {
            if lat1.is_finite() && lon1.is_finite() && lat2.is_finite() && lon2.is_finite() {
                let km = planar_distance_km(lat1, lon1, lat2, lon2);
                tally.add(proximity(km, s.coordinate_km), w.location_distance);
            }
        }

        tally.add_numeric(
            a.distance_to_center,
            b.distance_to_center,
            s.center_distance_km,
            w.distance_to_center,
        );

        tally.add_numeric(a.area_total, b.area_total, s.area_sqm, w.area);
        tally.add_exact(&a.rooms, &b.rooms, w.rooms);
        tally.add_numeric(
            a.floor.map(f64::from),
            b.floor.map(f64::from),
            s.floors,
            w.floor,
        );
        tally.add_numeric(
            a.total_floors.map(f64::from),
            b.total_floors.map(f64::from),
            s.total_floors,
            w.total_floors,
        );
        tally.add_exact(&a.floor_category, &b.floor_category, w.floor_category);

        tally.add_exact(&a.building_type, &b.building_type, w.building_type);
        tally.add_numeric(
            a.year_built.map(f64::from),
            b.year_built.map(f64::from),
            s.year_built,
            w.year_built,
        );
        tally.add_exact(&a.condition, &b.condition, w.condition);
        tally.add_text(&a.developer, &b.developer, w.developer);
        tally.add_text(&a.building_series, &b.building_series, w.building_series);

        tally.add_exact(&a.has_balcony, &b.has_balcony, w.balcony);
        tally.add_exact(&a.has_elevator, &b.has_elevator, w.elevator);
        tally.add_exact(&a.heating, &b.heating, w.heating);

        tally.score()
    }
}

/// Running weighted sum over the comparable features of one listing pair.
#[derive(Debug, Default)]
struct Tally {
    weighted_sum: f64,
    total_weight: f64,
}

impl Tally {
    fn add(&mut self, contribution: f64, weight: f64) {
        self.weighted_sum += contribution * weight;
        self.total_weight += weight;
    }

    /// Exact-match comparison; skipped when either side is absent.
    fn add_exact<T: PartialEq>(&mut self, a: &Option<T>, b: &Option<T>, weight: f64) {
        if let (Some(x), Some(y)) = (a, b) {
            self.add(if x == y { 1.0 } else { 0.0 }, weight);
        }
    }

    /// Case-insensitive free-text match; skipped when either side is absent.
    fn add_text(&mut self, a: &Option<String>, b: &Option<String>, weight: f64) {
        if let (Some(x), Some(y)) = (a, b) {
            let equal = x.to_lowercase() == y.to_lowercase();
            self.add(if equal { 1.0 } else { 0.0 }, weight);
        }
    }

    /// Clamped numeric-distance comparison; skipped when either side is
    /// absent or not finite.
    fn add_numeric(&mut self, a: Option<f64>, b: Option<f64>, scale: f64, weight: f64) {
        if let (Some(x), Some(y)) = (a, b) {
            if x.is_finite() && y.is_finite() {
                self.add(proximity((x - y).abs(), scale), weight);
            }
        }
    }

    fn score(&self) -> f64 {
        if self.total_weight > 0.0 {
            self.weighted_sum / self.total_weight
        } else {
            0.0
        }
    }
}

/// Clamp formula shared by every numeric comparison: full credit at zero
/// difference, linearly decaying to zero at `scale`.
fn proximity(diff: f64, scale: f64) -> f64 {
    (1.0 - diff / scale).max(0.0)
}
