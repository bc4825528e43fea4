//! # comps Core
//!
//! Core domain model for the comps valuation engine.
//!
//! This crate provides the fundamental types shared by every other crate:
//!
//! - [`Listing`] - A residential listing with typed optional features
//! - [`ListingId`] - String, UUID, or integer listing identifier
//! - [`CorpusFilter`] - Coarse store-side candidate filter
//! - [`ListingStore`] - Narrow retrieval capability over the corpus
//! - [`Error`] / [`Result`] - Crate-wide error taxonomy
//!
//! ## Example
//!
//! ```rust
//! use comps_core::{CorpusFilter, Listing};
//!
//! let listing = Listing::new("olx-1017")
//!     .with_city("Riverton")
//!     .with_area(54.0)
//!     .with_price(96_500);
//!
//! let filter = CorpusFilter::new().with_city("riverton");
//! assert!(filter.matches(&listing));
//! ```

pub mod error;
pub mod filter;
pub mod listing;

pub use error::{Error, Result};
pub use filter::{CorpusFilter, ListingStore};
pub use listing::{
    planar_distance_km, BuildingType, Condition, FloorCategory, Heating, Listing, ListingId,
    KM_PER_DEGREE,
};
