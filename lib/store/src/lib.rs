//! # comps Store
//!
//! Listing corpus storage: an in-memory store behind the
//! [`ListingStore`](comps_core::ListingStore) capability, with JSON
//! snapshot persistence and a managed save lifecycle.

pub mod manager;
pub mod memory;
pub mod persistence;

pub use manager::StoreManager;
pub use memory::ListingCorpus;
pub use persistence::{CorpusSnapshot, SnapshotPersistence};
