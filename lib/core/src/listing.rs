use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Kilometres per degree of latitude. Longitude is treated the same way,
/// which is only valid at city scale; distances computed with this constant
/// are used for ranking, never for navigation.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Planar distance between two coordinate pairs, in kilometres.
pub fn planar_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    (dlat * dlat + dlon * dlon).sqrt() * KM_PER_DEGREE
}

/// Identifier of a listing. Scrapers emit string ids, some sources use
/// numeric ids, and internally generated records carry UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListingId {
    String(String),
    Uuid(Uuid),
    Integer(u64),
}

impl std::fmt::Display for ListingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingId::String(s) => write!(f, "{}", s),
            ListingId::Uuid(u) => write!(f, "{}", u),
            ListingId::Integer(i) => write!(f, "{}", i),
        }
    }
}

impl From<String> for ListingId {
    fn from(s: String) -> Self {
        ListingId::String(s)
    }
}

impl From<&str> for ListingId {
    fn from(s: &str) -> Self {
        ListingId::String(s.to_string())
    }
}

impl From<u64> for ListingId {
    fn from(i: u64) -> Self {
        ListingId::Integer(i)
    }
}

impl From<Uuid> for ListingId {
    fn from(u: Uuid) -> Self {
        ListingId::Uuid(u)
    }
}

/// Load-bearing structure of the building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingType {
    Brick,
    Panel,
    Monolithic,
    Wood,
}

/// Interior condition as reported by the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Excellent,
    Good,
    Fair,
    Poor,
}

/// Heating arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heating {
    Central,
    Individual,
    None,
}

/// Vertical position of the unit within its building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloorCategory {
    Low,
    Middle,
    High,
}

impl FloorCategory {
    /// Categorize a floor by its position in the building: the bottom third
    /// is `Low`, the middle third `Middle`, the rest `High`.
    pub fn from_position(floor: i32, total_floors: i32) -> Option<Self> {
        if floor < 1 || total_floors < 1 {
            return None;
        }
        let ratio = floor as f64 / total_floors as f64;
        if ratio <= 0.33 {
            Some(FloorCategory::Low)
        } else if ratio <= 0.67 {
            Some(FloorCategory::Middle)
        } else {
            Some(FloorCategory::High)
        }
    }
}

/// A residential listing: the unit of comparison for valuation.
///
/// Every attribute except the id is optional; the similarity engine skips
/// any feature that is absent on either side of a comparison, so partially
/// described listings degrade gracefully instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,

    /// Site the record was collected from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    // Location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Distance to the city centre, km.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_to_center: Option<f64>,

    // Physical parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_floors: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_category: Option<FloorCategory>,

    // Building
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_type: Option<BuildingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_series: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i32>,

    // Condition and amenities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_balcony: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_elevator: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heating: Option<Heating>,

    // Commercial
    /// Asking price in whole currency units. Absent on valuation targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_on_market: Option<u32>,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Listing {
    /// Create an empty listing with the given id.
    #[must_use]
    pub fn new(id: impl Into<ListingId>) -> Self {
        Self {
            id: id.into(),
            source: None,
            address: None,
            city: None,
            district: None,
            latitude: None,
            longitude: None,
            distance_to_center: None,
            area_total: None,
            rooms: None,
            floor: None,
            total_floors: None,
            floor_category: None,
            building_type: None,
            building_series: None,
            developer: None,
            year_built: None,
            condition: None,
            has_balcony: None,
            has_elevator: None,
            heating: None,
            price: None,
            days_on_market: None,
            is_active: true,
        }
    }

    #[must_use]
    pub fn with_price(mut self, price: i64) -> Self {
        self.price = Some(price);
        self
    }

    #[must_use]
    pub fn with_area(mut self, area_total: f64) -> Self {
        self.area_total = Some(area_total);
        self
    }

    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Price per square metre, when both price and a positive area are known.
    pub fn price_per_sqm(&self) -> Option<f64> {
        match (self.price, self.area_total) {
            (Some(price), Some(area)) if area > 0.0 => Some(price as f64 / area),
            _ => None,
        }
    }

    /// Fill attributes that can be derived from others, leaving explicitly
    /// provided values untouched. Currently derives the floor category from
    /// floor / total floors.
    #[must_use]
    pub fn with_derived_fields(mut self) -> Self {
        if self.floor_category.is_none() {
            if let (Some(floor), Some(total)) = (self.floor, self.total_floors) {
                self.floor_category = FloorCategory::from_position(floor, total);
            }
        }
        self
    }

    /// Reject listings carrying non-finite numeric features. Malformed
    /// numbers are refused at the ingest boundary so that scoring never
    /// sees them.
    pub fn validate(&self) -> Result<()> {
        let numeric = [
            ("latitude", self.latitude),
            ("longitude", self.longitude),
            ("distance_to_center", self.distance_to_center),
            ("area_total", self.area_total),
        ];
        for (name, value) in numeric {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(Error::DataQuality(format!(
                        "listing {}: field '{}' is not a finite number",
                        self.id, name
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_category_thirds() {
        assert_eq!(FloorCategory::from_position(1, 9), Some(FloorCategory::Low));
        assert_eq!(FloorCategory::from_position(3, 9), Some(FloorCategory::Low));
        assert_eq!(FloorCategory::from_position(5, 9), Some(FloorCategory::Middle));
        assert_eq!(FloorCategory::from_position(6, 9), Some(FloorCategory::Middle));
        assert_eq!(FloorCategory::from_position(9, 9), Some(FloorCategory::High));
        assert_eq!(FloorCategory::from_position(0, 9), None);
        assert_eq!(FloorCategory::from_position(2, 0), None);
    }

    #[test]
    fn test_price_per_sqm() {
        let listing = Listing::new("a1").with_price(120_000).with_area(60.0);
        assert_eq!(listing.price_per_sqm(), Some(2000.0));

        let no_area = Listing::new("a2").with_price(120_000);
        assert_eq!(no_area.price_per_sqm(), None);
    }

    #[test]
    fn test_derived_floor_category_preserves_explicit_value() {
        let mut listing = Listing::new("a1");
        listing.floor = Some(9);
        listing.total_floors = Some(9);
        listing.floor_category = Some(FloorCategory::Low);

        let derived = listing.with_derived_fields();
        assert_eq!(derived.floor_category, Some(FloorCategory::Low));
    }

    #[test]
    fn test_derived_floor_category_fills_missing() {
        let mut listing = Listing::new("a1");
        listing.floor = Some(8);
        listing.total_floors = Some(9);

        let derived = listing.with_derived_fields();
        assert_eq!(derived.floor_category, Some(FloorCategory::High));
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let mut listing = Listing::new("a1");
        listing.latitude = Some(f64::NAN);
        assert!(listing.validate().is_err());

        let mut listing = Listing::new("a2");
        listing.area_total = Some(f64::INFINITY);
        assert!(listing.validate().is_err());

        assert!(Listing::new("a3").validate().is_ok());
    }

    #[test]
    fn test_planar_distance() {
        assert_eq!(planar_distance_km(50.0, 30.0, 50.0, 30.0), 0.0);
        // One hundredth of a degree of latitude is 1.11 km.
        let d = planar_distance_km(50.0, 30.0, 50.01, 30.0);
        assert!((d - 1.11).abs() < 1e-9);
    }

    #[test]
    fn test_listing_id_display() {
        assert_eq!(ListingId::from("olx-42").to_string(), "olx-42");
        assert_eq!(ListingId::from(42u64).to_string(), "42");
        let uuid = Uuid::new_v4();
        assert_eq!(ListingId::from(uuid).to_string(), uuid.to_string());
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut listing = Listing::new("r1").with_price(95_000).with_area(52.5);
        listing.city = Some("Riverton".to_string());
        listing.building_type = Some(BuildingType::Panel);
        listing.heating = Some(Heating::Central);
        listing.has_balcony = Some(true);

        let json = serde_json::to_string(&listing).unwrap();
        let parsed: Listing = serde_json::from_str(&json).unwrap();
        assert_eq!(listing, parsed);
        // Enum values travel as lowercase strings.
        assert!(json.contains("\"panel\""));
        assert!(json.contains("\"central\""));
    }

    #[test]
    fn test_deserialize_defaults() {
        let listing: Listing = serde_json::from_str(r#"{"id": "x1"}"#).unwrap();
        assert!(listing.is_active);
        assert!(listing.price.is_none());
        assert!(listing.city.is_none());
    }
}
