//! Group repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `groups` and its city links in `location_group_map`.
//! - Record the creator as `group_admin` when a group is created.
//! - Bulk-import groups keyed by url.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations.
//! - Creating a group, its admin row and its city links commit together.
//! - Missing rows are `None` on reads and no-ops on update/delete; callers
//!   decide whether absence is an error.
//! - Bulk import is best effort: each group commits on its own.

use crate::db::migrations::latest_version;
use crate::db::{write_scope, DbError};
use crate::model::group::{Group, GroupDraft, GroupId, GroupValidationError};
use crate::model::permission::GroupRole;
use crate::model::user::User;
use crate::repo::location_repo::{LocationRepository, SqliteLocationRepository};
use log::{debug, error, info};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const GROUP_SELECT_SQL: &str = "SELECT
    id,
    name,
    url,
    summary
FROM groups";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by group, location, restaurant and user storage.
#[derive(Debug)]
pub enum RepoError {
    Validation(GroupValidationError),
    Db(DbError),
    /// The group insert returned no generated id.
    GroupInsert { url: String },
    /// Free-text address or city cannot be parsed into location parts.
    InvalidAddress(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::GroupInsert { url } => {
                write!(f, "failed to insert group `{url}`: no generated id returned")
            }
            Self::InvalidAddress(value) => write!(f, "cannot parse address `{value}`"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::GroupInsert { .. } => None,
            Self::InvalidAddress(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<GroupValidationError> for RepoError {
    fn from(value: GroupValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Checks that `conn` carries the schema this binary was built for.
pub fn ensure_schema_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

/// Repository interface for group CRUD operations.
pub trait GroupsRepository {
    /// Inserts one group and records `creator` as its `group_admin`.
    fn insert_group(&self, creator: &User, draft: &GroupDraft) -> RepoResult<Group>;
    /// Inserts every draft whose url is not stored yet; returns how many were inserted.
    fn insert_groups(&self, drafts: &[GroupDraft]) -> RepoResult<usize>;
    fn get_group(&self, id: GroupId) -> RepoResult<Option<Group>>;
    fn get_group_id_by_url(&self, url: &str) -> RepoResult<Option<GroupId>>;
    /// Returns every stored group url.
    fn urls_in_database(&self) -> RepoResult<HashSet<String>>;
    /// Overwrites name, url, summary and city links. No-op for unknown ids.
    fn update_group(&self, group: &Group) -> RepoResult<()>;
    /// Deletes one group and its role/city rows. No-op for unknown ids.
    fn delete_group(&self, id: GroupId) -> RepoResult<()>;
}

/// SQLite-backed group repository.
pub struct SqliteGroupsRepository<'conn, L = SqliteLocationRepository<'conn>> {
    conn: &'conn Connection,
    locations: L,
}

impl<'conn> SqliteGroupsRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_locations(conn, SqliteLocationRepository::new(conn))
    }
}

impl<'conn, L: LocationRepository> SqliteGroupsRepository<'conn, L> {
    /// Uses `locations` to resolve city names. It must share `conn` for city
    /// links to commit with their group.
    pub fn with_locations(conn: &'conn Connection, locations: L) -> Self {
        Self { conn, locations }
    }

    fn insert_group_row(&self, draft: &GroupDraft) -> RepoResult<GroupId> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO groups (name, url, summary)
             VALUES (?1, ?2, ?3)
             RETURNING id;",
        )?;
        let mut rows = stmt.query(params![draft.name, draft.url, draft.summary])?;
        match rows.next()? {
            Some(row) => Ok(row.get(0)?),
            None => Err(RepoError::GroupInsert {
                url: draft.url.clone(),
            }),
        }
    }

    fn link_cities(&self, group_id: GroupId, cities: &[String]) -> RepoResult<()> {
        for city in cities.iter().map(|city| city.trim()) {
            if city.is_empty() {
                continue;
            }
            let location_id = self.locations.location_id_for_city(city)?;
            self.conn.execute(
                "INSERT OR IGNORE INTO location_group_map (location_id, group_id)
                 VALUES (?1, ?2);",
                params![location_id, group_id],
            )?;
        }
        Ok(())
    }
}

impl<L: LocationRepository> GroupsRepository for SqliteGroupsRepository<'_, L> {
    fn insert_group(&self, creator: &User, draft: &GroupDraft) -> RepoResult<Group> {
        draft.validate()?;

        let group_id = write_scope(self.conn, || {
            let group_id = self.insert_group_row(draft)?;
            if let Err(err) = self.conn.execute(
                "INSERT INTO group_admin_data (user_id, group_id, group_admin_level)
                 VALUES (?1, ?2, ?3);",
                params![creator.id, group_id, GroupRole::Admin.as_str()],
            ) {
                error!(
                    "event=group_insert module=repo status=error error_code=admin_grant_failed group_id={} user_id={} error={}",
                    group_id, creator.id, err
                );
                return Err(RepoError::from(err));
            }
            self.link_cities(group_id, &draft.cities)?;
            Ok(group_id)
        })?;

        info!(
            "event=group_insert module=repo status=ok group_id={} url={} user_id={}",
            group_id, draft.url, creator.id
        );
        self.get_group(group_id)?.ok_or_else(|| RepoError::GroupInsert {
            url: draft.url.clone(),
        })
    }

    fn insert_groups(&self, drafts: &[GroupDraft]) -> RepoResult<usize> {
        let mut urls_in_db = self.urls_in_database()?;
        let mut inserted = 0;

        for draft in drafts {
            draft.validate()?;
            if urls_in_db.contains(&draft.url) {
                debug!(
                    "event=group_import module=repo status=skip reason=url_exists url={}",
                    draft.url
                );
                continue;
            }

            let group_id = write_scope(self.conn, || {
                let group_id = self.insert_group_row(draft)?;
                self.link_cities(group_id, &draft.cities)?;
                Ok::<_, RepoError>(group_id)
            })?;
            urls_in_db.insert(draft.url.clone());
            inserted += 1;
            debug!(
                "event=group_import module=repo status=ok group_id={} url={}",
                group_id, draft.url
            );
        }

        info!(
            "event=group_import module=repo status=ok submitted={} inserted={}",
            drafts.len(),
            inserted
        );
        Ok(inserted)
    }

    fn get_group(&self, id: GroupId) -> RepoResult<Option<Group>> {
        let group = self
            .conn
            .query_row(
                &format!("{GROUP_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_group_row,
            )
            .optional()?;

        match group {
            Some(mut group) => {
                group.cities = load_group_cities(self.conn, group.id)?;
                Ok(Some(group))
            }
            None => Ok(None),
        }
    }

    fn get_group_id_by_url(&self, url: &str) -> RepoResult<Option<GroupId>> {
        let id = self
            .conn
            .query_row("SELECT id FROM groups WHERE url = ?1;", [url], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(id)
    }

    fn urls_in_database(&self) -> RepoResult<HashSet<String>> {
        let mut stmt = self.conn.prepare("SELECT url FROM groups;")?;
        let mut rows = stmt.query([])?;
        let mut urls = HashSet::new();
        while let Some(row) = rows.next()? {
            urls.insert(row.get(0)?);
        }
        Ok(urls)
    }

    fn update_group(&self, group: &Group) -> RepoResult<()> {
        group.validate()?;

        let changed = write_scope(self.conn, || {
            let changed = self.conn.execute(
                "UPDATE groups
                 SET
                    name = ?1,
                    url = ?2,
                    summary = ?3
                 WHERE id = ?4;",
                params![group.name, group.url, group.summary, group.id],
            )?;
            if changed == 0 {
                return Ok::<_, RepoError>(0);
            }

            self.conn.execute(
                "DELETE FROM location_group_map WHERE group_id = ?1;",
                [group.id],
            )?;
            self.link_cities(group.id, &group.cities)?;
            Ok(changed)
        })?;

        if changed == 0 {
            debug!(
                "event=group_update module=repo status=skip reason=not_found group_id={}",
                group.id
            );
        } else {
            info!(
                "event=group_update module=repo status=ok group_id={}",
                group.id
            );
        }
        Ok(())
    }

    fn delete_group(&self, id: GroupId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM groups WHERE id = ?1;", [id])?;
        info!(
            "event=group_delete module=repo status={} group_id={}",
            if changed == 0 { "skip" } else { "ok" },
            id
        );
        Ok(())
    }
}

pub(crate) fn parse_group_row(row: &Row<'_>) -> rusqlite::Result<Group> {
    Ok(Group {
        id: row.get("id")?,
        name: row.get("name")?,
        url: row.get("url")?,
        summary: row.get("summary")?,
        cities: Vec::new(),
    })
}

/// Loads city names linked to one group, sorted case-insensitively.
pub(crate) fn load_group_cities(conn: &Connection, group_id: GroupId) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT l.city
         FROM location_group_map lgm
         INNER JOIN locations l ON l.id = lgm.location_id
         WHERE lgm.group_id = ?1
         ORDER BY l.city COLLATE NOCASE ASC;",
    )?;
    let mut rows = stmt.query([group_id])?;
    let mut cities = Vec::new();
    while let Some(row) = rows.next()? {
        cities.push(row.get(0)?);
    }
    Ok(cities)
}
