//! Descriptive market statistics over a filtered corpus
//!
//! Independent of any valuation target: summarizes whatever slice of the
//! corpus the filter selects.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use comps_core::{CorpusFilter, Listing, ListingStore, Result};

/// Market summary for a corpus slice. All prices are whole currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketStats {
    pub total_listings: usize,
    pub avg_price: i64,
    /// Middle element by index after an ascending sort. For even counts this
    /// selects `sorted[n / 2]`, never an averaged pair; downstream snapshots
    /// depend on that exact choice.
    pub median_price: i64,
    /// Aggregate price per m²: total price over total area, not the mean of
    /// per-listing ratios.
    pub avg_price_per_sqm: i64,
    pub min_price: i64,
    pub max_price: i64,
    /// Population standard deviation of prices; zero for a single listing.
    pub price_std: i64,
}

/// Computes market statistics from the store.
pub struct MarketStatsAggregator {
    store: Arc<dyn ListingStore>,
}

impl MarketStatsAggregator {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self { store }
    }

    /// Statistics for the listings matching an optional city/district
    /// filter; `None` when nothing matches.
    pub fn aggregate(
        &self,
        city: Option<&str>,
        district: Option<&str>,
    ) -> Result<Option<MarketStats>> {
        let filter = CorpusFilter {
            city: city.map(str::to_string),
            district: district.map(str::to_string),
            max_candidates: None,
        };
        let listings = self.store.query(&filter)?;
        Ok(Self::compute(&listings))
    }

    /// Pure statistics over an already-fetched corpus slice.
    pub fn compute(listings: &[Listing]) -> Option<MarketStats> {
        let mut prices: Vec<i64> = Vec::with_capacity(listings.len());
        let mut total_area = 0.0f64;
        for listing in listings {
            match (listing.price, listing.area_total) {
                (Some(price), Some(area)) if price > 0 && area > 0.0 => {
                    prices.push(price);
                    total_area += area;
                }
                _ => continue,
            }
        }
        if prices.is_empty() {
            return None;
        }

        let count = prices.len();
        let total: i64 = prices.iter().sum();

        let mut sorted = prices.clone();
        sorted.sort_unstable();

        Some(MarketStats {
            total_listings: count,
            avg_price: (total as f64 / count as f64) as i64,
            median_price: sorted[count / 2],
            avg_price_per_sqm: (total as f64 / total_area) as i64,
            min_price: sorted[0],
            max_price: sorted[count - 1],
            price_std: population_std(&prices) as i64,
        })
    }
}

fn population_std(prices: &[i64]) -> f64 {
    if prices.len() < 2 {
        return 0.0;
    }
    let n = prices.len() as f64;
    let mean = prices.iter().sum::<i64>() as f64 / n;
    let variance = prices
        .iter()
        .map(|p| {
            let d = *p as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    variance.sqrt()
}
