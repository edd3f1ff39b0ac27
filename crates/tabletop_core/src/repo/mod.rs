//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQL details from service/business orchestration.
//!
//! # Invariants
//! - Repositories surface store failures unchanged: no retries, no swallowing.
//! - Absence is `None` on reads; only the import paths skip rows silently.

pub mod group_repo;
pub mod location_repo;
pub mod permission_repo;
pub mod restaurant_repo;
pub mod user_repo;
