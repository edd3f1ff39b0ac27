//! Domain model for community groups and their surrounding records.
//!
//! # Responsibility
//! - Define plain data records shared by repositories and services.
//! - Keep permission rules as pure functions independent of storage.
//!
//! # Invariants
//! - Store-assigned integer ids identify groups, users, locations and
//!   restaurants.
//! - A group `url` is a natural key and never shared by two groups.

pub mod group;
pub mod location;
pub mod permission;
pub mod restaurant;
pub mod user;
