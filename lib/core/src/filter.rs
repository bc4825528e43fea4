// Coarse-grain corpus filtering, applied store-side before any scoring.
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::listing::Listing;

/// Narrow retrieval capability over the listing store.
///
/// The valuation engine only ever needs this one operation; keeping the
/// trait this small lets the engine be tested against an in-memory fake.
pub trait ListingStore: Send + Sync {
    /// Fetch candidate listings matching the coarse filter, in a
    /// deterministic order.
    fn query(&self, filter: &CorpusFilter) -> Result<Vec<Listing>>;
}

/// Pre-filter for candidate retrieval.
///
/// This is a coarse reduction of the corpus, not part of the similarity
/// computation: it narrows by fuzzy city/district match and always
/// restricts to active listings with a positive price and area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    /// Upper bound on the number of candidates returned, to keep
    /// per-request scoring cost predictable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_candidates: Option<usize>,
}

impl CorpusFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter derived from a valuation target's location.
    pub fn for_target(target: &Listing) -> Self {
        Self {
            city: target.city.clone(),
            district: target.district.clone(),
            max_candidates: None,
        }
    }

    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    #[must_use]
    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district = Some(district.into());
        self
    }

    #[must_use]
    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = Some(max);
        self
    }

    /// Whether a listing passes the coarse filter.
    pub fn matches(&self, listing: &Listing) -> bool {
        if !listing.is_active {
            return false;
        }
        if listing.price.map_or(true, |p| p <= 0) {
            return false;
        }
        if listing.area_total.map_or(true, |a| a <= 0.0) {
            return false;
        }
        if !Self::location_matches(self.city.as_deref(), listing.city.as_deref()) {
            return false;
        }
        if !Self::location_matches(self.district.as_deref(), listing.district.as_deref()) {
            return false;
        }
        true
    }

    // Fuzzy location match: the candidate's name must contain the queried
    // name, case-insensitively. A listing without the attribute never
    // matches an explicit query for it.
    fn location_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
        match (wanted, actual) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(w), Some(a)) => a.to_lowercase().contains(&w.to_lowercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sellable(id: &str, city: &str) -> Listing {
        Listing::new(id).with_price(100_000).with_area(50.0).with_city(city)
    }

    #[test]
    fn test_requires_active_priced_positive_area() {
        let filter = CorpusFilter::new();

        assert!(filter.matches(&sellable("a", "Riverton")));

        let mut inactive = sellable("b", "Riverton");
        inactive.is_active = false;
        assert!(!filter.matches(&inactive));

        let unpriced = Listing::new("c").with_area(50.0).with_city("Riverton");
        assert!(!filter.matches(&unpriced));

        let zero_area = Listing::new("d").with_price(100_000).with_area(0.0);
        assert!(!filter.matches(&zero_area));
    }

    #[test]
    fn test_city_match_is_fuzzy_and_case_insensitive() {
        let filter = CorpusFilter::new().with_city("riverton");
        assert!(filter.matches(&sellable("a", "Riverton")));
        assert!(filter.matches(&sellable("b", "North Riverton")));
        assert!(!filter.matches(&sellable("c", "Lakewood")));
    }

    #[test]
    fn test_city_filter_excludes_listings_without_city() {
        let filter = CorpusFilter::new().with_city("Riverton");
        let nowhere = Listing::new("a").with_price(100_000).with_area(50.0);
        assert!(!filter.matches(&nowhere));
    }

    #[test]
    fn test_district_filter() {
        let filter = CorpusFilter::new().with_city("Riverton").with_district("old town");
        let mut listing = sellable("a", "Riverton");
        listing.district = Some("Old Town".to_string());
        assert!(filter.matches(&listing));

        listing.district = Some("Harbor".to_string());
        assert!(!filter.matches(&listing));
    }

    #[test]
    fn test_for_target_copies_location() {
        let mut target = Listing::new("t");
        target.city = Some("Riverton".to_string());
        target.district = Some("Harbor".to_string());

        let filter = CorpusFilter::for_target(&target);
        assert_eq!(filter.city.as_deref(), Some("Riverton"));
        assert_eq!(filter.district.as_deref(), Some("Harbor"));
        assert_eq!(filter.max_candidates, None);
    }
}
