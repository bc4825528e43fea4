//! Feature weight table and distance scale constants
//!
//! The weight table decides how much each feature comparison contributes to
//! the overall similarity score. It is built once at startup, validated, and
//! never mutated afterwards; every request scores against the same table.

use serde::{Deserialize, Serialize};

/// Per-feature weights for similarity scoring. All weights must be positive;
/// a feature that should not be scored at all has no entry here by design,
/// so zero is rejected rather than treated as "off".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeights {
    // Location and geography
    pub city_match: f64,
    pub district_match: f64,
    pub location_distance: f64,
    pub distance_to_center: f64,

    // Physical characteristics
    pub area: f64,
    pub rooms: f64,
    pub floor: f64,
    pub total_floors: f64,
    pub floor_category: f64,

    // Building and quality
    pub building_type: f64,
    pub year_built: f64,
    pub condition: f64,
    pub developer: f64,
    pub building_series: f64,

    // Amenities
    pub balcony: f64,
    pub elevator: f64,
    pub heating: f64,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            city_match: 1.0,
            district_match: 0.9,
            location_distance: 0.8,
            distance_to_center: 0.6,
            area: 0.9,
            rooms: 0.8,
            floor: 0.7,
            total_floors: 0.6,
            floor_category: 0.5,
            building_type: 0.8,
            year_built: 0.7,
            condition: 0.6,
            developer: 0.5,
            building_series: 0.4,
            balcony: 0.3,
            elevator: 0.3,
            heating: 0.3,
        }
    }
}

impl FeatureWeights {
    /// Validate that every weight is a positive finite number.
    pub fn validate(&self) -> Result<(), WeightsError> {
        for (name, value) in self.entries() {
            if !value.is_finite() || value <= 0.0 {
                return Err(WeightsError::NonPositiveWeight(name));
            }
        }
        Ok(())
    }

    /// Named view over every weight, in scoring order.
    pub fn entries(&self) -> [(&'static str, f64); 17] {
        [
            ("city_match", self.city_match),
            ("district_match", self.district_match),
            ("location_distance", self.location_distance),
            ("distance_to_center", self.distance_to_center),
            ("area", self.area),
            ("rooms", self.rooms),
            ("floor", self.floor),
            ("total_floors", self.total_floors),
            ("floor_category", self.floor_category),
            ("building_type", self.building_type),
            ("year_built", self.year_built),
            ("condition", self.condition),
            ("developer", self.developer),
            ("building_series", self.building_series),
            ("balcony", self.balcony),
            ("elevator", self.elevator),
            ("heating", self.heating),
        ]
    }
}

/// Scale constants for numeric-distance comparisons. A difference equal to
/// the scale (or beyond) contributes zero; a zero difference contributes one.
///
/// The values are empirically chosen and carried over as-is; they are
/// configuration, not derived quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceScales {
    /// Horizon for the coordinate-pair distance, km.
    pub coordinate_km: f64,
    /// Horizon for the difference in distance-to-centre, km.
    pub center_distance_km: f64,
    /// Horizon for the total-area difference, m².
    pub area_sqm: f64,
    /// Horizon for the floor difference, floors.
    pub floors: f64,
    /// Horizon for the building-height difference, floors.
    pub total_floors: f64,
    /// Horizon for the construction-year difference, years.
    pub year_built: f64,
}

impl Default for DistanceScales {
    fn default() -> Self {
        Self {
            coordinate_km: 10.0,
            center_distance_km: 5.0,
            area_sqm: 100.0,
            floors: 20.0,
            total_floors: 30.0,
            year_built: 50.0,
        }
    }
}

impl DistanceScales {
    pub fn validate(&self) -> Result<(), WeightsError> {
        let entries = [
            ("coordinate_km", self.coordinate_km),
            ("center_distance_km", self.center_distance_km),
            ("area_sqm", self.area_sqm),
            ("floors", self.floors),
            ("total_floors", self.total_floors),
            ("year_built", self.year_built),
        ];
        for (name, value) in entries {
            if !value.is_finite() || value <= 0.0 {
                return Err(WeightsError::NonPositiveScale(name));
            }
        }
        Ok(())
    }
}

/// Errors raised while validating the weight configuration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WeightsError {
    #[error("weight '{0}' must be a positive finite number")]
    NonPositiveWeight(&'static str),

    #[error("distance scale '{0}' must be a positive finite number")]
    NonPositiveScale(&'static str),
}

impl From<WeightsError> for comps_core::Error {
    fn from(e: WeightsError) -> Self {
        comps_core::Error::InvalidConfig(e.to_string())
    }
}
