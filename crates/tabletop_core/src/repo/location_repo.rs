//! Location repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Resolve free-text addresses and city names to location ids,
//!   creating rows on first sight.
//!
//! # Invariants
//! - Resolution is by all four address parts; equal parts always map to the
//!   same id.
//! - Unparseable input is rejected before any SQL runs.

use crate::model::location::{AddressParts, Location, LocationId};
use crate::repo::group_repo::{RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for location resolution.
pub trait LocationRepository {
    /// Resolves a full street address, inserting it when unseen.
    fn insert_location(&self, address: &str) -> RepoResult<LocationId>;
    /// Resolves a city (optionally `"City, ST"`), inserting it when unseen.
    fn location_id_for_city(&self, city: &str) -> RepoResult<LocationId>;
    fn get_location(&self, id: LocationId) -> RepoResult<Option<Location>>;
}

/// SQLite-backed location repository.
#[derive(Clone, Copy)]
pub struct SqliteLocationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLocationRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn resolve(&self, parts: &AddressParts) -> RepoResult<LocationId> {
        let inserted = self.conn.execute(
            "INSERT INTO locations (street_address, city, state, zip_code)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (street_address, city, state, zip_code) DO NOTHING;",
            params![
                parts.street_address,
                parts.city,
                parts.state,
                parts.zip_code
            ],
        )?;

        let id: LocationId = self.conn.query_row(
            "SELECT id
             FROM locations
             WHERE street_address = ?1
               AND city = ?2
               AND state = ?3
               AND zip_code = ?4;",
            params![
                parts.street_address,
                parts.city,
                parts.state,
                parts.zip_code
            ],
            |row| row.get(0),
        )?;

        debug!(
            "event=location_resolve module=repo status=ok location_id={} created={}",
            id,
            inserted > 0
        );
        Ok(id)
    }
}

impl LocationRepository for SqliteLocationRepository<'_> {
    fn insert_location(&self, address: &str) -> RepoResult<LocationId> {
        let parts = AddressParts::parse_full(address)
            .ok_or_else(|| RepoError::InvalidAddress(address.to_string()))?;
        self.resolve(&parts)
    }

    fn location_id_for_city(&self, city: &str) -> RepoResult<LocationId> {
        let parts = AddressParts::parse_city(city)
            .ok_or_else(|| RepoError::InvalidAddress(city.to_string()))?;
        self.resolve(&parts)
    }

    fn get_location(&self, id: LocationId) -> RepoResult<Option<Location>> {
        let location = self
            .conn
            .query_row(
                "SELECT id, street_address, city, state, zip_code
                 FROM locations
                 WHERE id = ?1;",
                [id],
                |row| {
                    Ok(Location {
                        id: row.get("id")?,
                        street_address: row.get("street_address")?,
                        city: row.get("city")?,
                        state: row.get("state")?,
                        zip_code: row.get("zip_code")?,
                    })
                },
            )
            .optional()?;
        Ok(location)
    }
}
