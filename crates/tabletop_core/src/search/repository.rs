//! Group search execution over SQLite.
//!
//! # Invariants
//! - Returned groups carry their linked cities.
//! - Row order is the order rendered by [`GroupSearchParams::to_query`].

use crate::model::group::Group;
use crate::repo::group_repo::{load_group_cities, parse_group_row, RepoError};
use crate::search::params::{GroupSearchParams, SearchError, SearchResult};
use log::debug;
use rusqlite::{params_from_iter, Connection};

/// Repository interface for group search.
pub trait SearchRepository {
    /// Returns every group matching all filters; zero matches is not an error.
    fn get_groups(&self, params: &GroupSearchParams) -> SearchResult<Vec<Group>>;
}

/// SQLite-backed group search.
#[derive(Clone, Copy)]
pub struct SqliteSearchRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSearchRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SearchRepository for SqliteSearchRepository<'_> {
    fn get_groups(&self, params: &GroupSearchParams) -> SearchResult<Vec<Group>> {
        let query = params.to_query();
        let mut stmt = self.conn.prepare(&query.sql)?;
        let mut rows = stmt.query(params_from_iter(query.bind_values))?;
        let mut groups = Vec::new();

        while let Some(row) = rows.next()? {
            groups.push(parse_group_row(row)?);
        }

        for group in &mut groups {
            group.cities = load_group_cities(self.conn, group.id).map_err(from_repo_error)?;
        }

        debug!(
            "event=group_search module=search status=ok filters={} matches={}",
            params.filters().len(),
            groups.len()
        );
        Ok(groups)
    }
}

fn from_repo_error(err: RepoError) -> SearchError {
    match err {
        RepoError::Db(err) => SearchError::Db(err),
        other => SearchError::InvalidData(other.to_string()),
    }
}
