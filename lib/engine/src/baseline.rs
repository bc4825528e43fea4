//! Heuristic baseline price model
//!
//! The fallback consulted when KNN evidence is too thin: a per-city base
//! rate per m², adjusted by condition, building type, and room density.
//! Deliberately crude - its job is to always produce *some* defensible
//! number, at a fixed low confidence, when comparables cannot.

use ahash::AHashMap;
use serde::Serialize;

use comps_core::{BuildingType, Condition, Error, Listing, Result};

/// Confidence reported by the baseline model; constant because the formula
/// carries no evidence of its own.
pub const BASELINE_CONFIDENCE: f64 = 0.6;

const DEFAULT_RATE_PER_SQM: f64 = 1_200.0;

/// A price prediction from a secondary model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub price: i64,
    pub confidence: f64,
    pub model_name: String,
}

/// A secondary estimator consulted when the comparables-based estimate
/// reports insufficient evidence.
pub trait PriceModel: Send + Sync {
    fn name(&self) -> &'static str;

    fn predict(&self, target: &Listing) -> Result<Prediction>;
}

/// Rate-table baseline: `area × rate(city) × condition × building type`,
/// nudged by room density.
#[derive(Debug, Clone)]
pub struct BaselineModel {
    city_rates: AHashMap<String, f64>,
    default_rate: f64,
}

impl Default for BaselineModel {
    fn default() -> Self {
        Self {
            city_rates: AHashMap::new(),
            default_rate: DEFAULT_RATE_PER_SQM,
        }
    }
}

impl BaselineModel {
    pub fn new(default_rate: f64) -> Self {
        Self {
            city_rates: AHashMap::new(),
            default_rate,
        }
    }

    /// Register a per-city base rate (per m²). City names are matched
    /// case-insensitively.
    #[must_use]
    pub fn with_city_rate(mut self, city: impl Into<String>, rate: f64) -> Self {
        self.city_rates.insert(city.into().to_lowercase(), rate);
        self
    }

    fn rate_for(&self, city: Option<&str>) -> f64 {
        city.and_then(|c| self.city_rates.get(&c.to_lowercase()).copied())
            .unwrap_or(self.default_rate)
    }
}

impl PriceModel for BaselineModel {
    fn name(&self) -> &'static str {
        "sqm_baseline"
    }

    fn predict(&self, target: &Listing) -> Result<Prediction> {
        let area = match target.area_total {
            Some(a) if a.is_finite() && a > 0.0 => a,
            _ => {
                return Err(Error::DataQuality(
                    "baseline model requires a positive total area".to_string(),
                ))
            }
        };

        let condition_multiplier = match target.condition {
            Some(Condition::Excellent) => 1.3,
            Some(Condition::Good) => 1.1,
            Some(Condition::Fair) | None => 1.0,
            Some(Condition::Poor) => 0.8,
        };
        let building_multiplier = match target.building_type {
            Some(BuildingType::Brick) => 1.2,
            Some(BuildingType::Monolithic) => 1.1,
            Some(BuildingType::Panel) | None => 1.0,
            Some(BuildingType::Wood) => 0.9,
        };

        let mut price =
            area * self.rate_for(target.city.as_deref()) * condition_multiplier * building_multiplier;

        // Room-density adjustment: cramped layouts discount, generous ones
        // command a premium.
        if let Some(rooms) = target.rooms.filter(|r| *r > 0) {
            let density = area / rooms as f64;
            if density < 15.0 {
                price *= 0.9;
            } else if density > 25.0 {
                price *= 1.1;
            }
        }

        Ok(Prediction {
            price: price.max(0.0) as i64,
            confidence: BASELINE_CONFIDENCE,
            model_name: self.name().to_string(),
        })
    }
}
