//! Group search entry points.
//!
//! # Responsibility
//! - Translate textual search parameters into typed filters and SQL.
//! - Execute group searches with deterministic ordering.

pub mod params;
pub mod repository;
