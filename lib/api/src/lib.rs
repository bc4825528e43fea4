//! # comps API
//!
//! REST surface for the comps valuation engine: listing ingest, valuation,
//! and market statistics endpoints. The engine stays a pure in-process
//! library; this crate is the only place requests and responses exist.

pub mod rest;

pub use rest::{ApiState, RestApi};
