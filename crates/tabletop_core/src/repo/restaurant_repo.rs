//! Game restaurant repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Import restaurants from free-text addresses.
//! - Read restaurants back with a flattened display address.
//!
//! # Invariants
//! - A restaurant is identified by `(name, url, location_id)`; re-importing
//!   the same input inserts nothing.
//! - Listing is keyed and ordered by restaurant id.

use crate::model::location::{format_address, LocationId};
use crate::model::restaurant::{GameRestaurant, GameRestaurantId, NewGameRestaurant};
use crate::repo::group_repo::RepoResult;
use crate::repo::location_repo::{LocationRepository, SqliteLocationRepository};
use log::{debug, info};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;

/// Repository interface for game restaurants.
pub trait GameRestaurantRepository {
    fn get_game_restaurants(&self) -> RepoResult<BTreeMap<GameRestaurantId, GameRestaurant>>;
    /// Inserts restaurants not already present; returns how many were inserted.
    fn insert_game_restaurants(&self, restaurants: &[NewGameRestaurant]) -> RepoResult<usize>;
    fn has_game_restaurant(
        &self,
        restaurant: &NewGameRestaurant,
        location_id: LocationId,
    ) -> RepoResult<bool>;
}

/// SQLite-backed game restaurant repository.
pub struct SqliteGameRestaurantRepository<'conn, L = SqliteLocationRepository<'conn>> {
    conn: &'conn Connection,
    locations: L,
}

impl<'conn> SqliteGameRestaurantRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_locations(conn, SqliteLocationRepository::new(conn))
    }
}

impl<'conn, L: LocationRepository> SqliteGameRestaurantRepository<'conn, L> {
    pub fn with_locations(conn: &'conn Connection, locations: L) -> Self {
        Self { conn, locations }
    }
}

impl<L: LocationRepository> GameRestaurantRepository for SqliteGameRestaurantRepository<'_, L> {
    fn get_game_restaurants(&self) -> RepoResult<BTreeMap<GameRestaurantId, GameRestaurant>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                r.id AS id,
                r.name AS name,
                r.url AS url,
                l.street_address AS street_address,
                l.city AS city,
                l.state AS state,
                l.zip_code AS zip_code
             FROM game_restaurants r
             INNER JOIN locations l ON l.id = r.location_id
             ORDER BY r.id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut restaurants = BTreeMap::new();

        while let Some(row) = rows.next()? {
            let street: String = row.get("street_address")?;
            let city: String = row.get("city")?;
            let state: String = row.get("state")?;
            let zip: String = row.get("zip_code")?;
            let restaurant = GameRestaurant {
                id: row.get("id")?,
                name: row.get("name")?,
                url: row.get("url")?,
                address: format_address(&street, &city, &state, &zip),
            };
            restaurants.insert(restaurant.id, restaurant);
        }

        Ok(restaurants)
    }

    fn insert_game_restaurants(&self, restaurants: &[NewGameRestaurant]) -> RepoResult<usize> {
        let mut inserted = 0;

        for restaurant in restaurants {
            let location_id = self.locations.insert_location(&restaurant.address)?;
            if self.has_game_restaurant(restaurant, location_id)? {
                debug!(
                    "event=restaurant_import module=repo status=skip reason=exists location_id={}",
                    location_id
                );
                continue;
            }

            self.conn.execute(
                "INSERT INTO game_restaurants (url, name, location_id)
                 VALUES (?1, ?2, ?3);",
                params![restaurant.url, restaurant.name, location_id],
            )?;
            inserted += 1;
        }

        info!(
            "event=restaurant_import module=repo status=ok submitted={} inserted={}",
            restaurants.len(),
            inserted
        );
        Ok(inserted)
    }

    fn has_game_restaurant(
        &self,
        restaurant: &NewGameRestaurant,
        location_id: LocationId,
    ) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM game_restaurants
                WHERE name = ?1
                  AND url = ?2
                  AND location_id = ?3
            );",
            params![restaurant.name, restaurant.url, location_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}
