//! SQLite wiring for repositories and services.
//!
//! Every repository built here borrows the one connection handed out by the
//! [`ConnectionProvider`], so statements issued through different services
//! share its transaction state.

use crate::db::ConnectionProvider;
use crate::repo::group_repo::{ensure_schema_ready, RepoResult, SqliteGroupsRepository};
use crate::repo::permission_repo::SqliteGroupPermissionRepository;
use crate::repo::restaurant_repo::SqliteGameRestaurantRepository;
use crate::repo::user_repo::SqliteUserRepository;
use crate::search::repository::SqliteSearchRepository;
use crate::service::group_edit_service::GroupEditService;
use crate::service::import_service::ImportService;
use crate::service::permission_service::GroupPermissionService;
use crate::service::read_group_service::ReadGroupService;
use crate::service::search_service::SearchService;
use rusqlite::Connection;

pub type SqliteGroupPermissionService<'conn> =
    GroupPermissionService<SqliteGroupPermissionRepository<'conn>>;
pub type SqliteSearchService<'conn> = SearchService<SqliteSearchRepository<'conn>>;
pub type SqliteReadGroupService<'conn> = ReadGroupService<
    SqliteGroupsRepository<'conn>,
    SqliteSearchRepository<'conn>,
    SqliteGroupPermissionRepository<'conn>,
>;
pub type SqliteGroupEditService<'conn> =
    GroupEditService<SqliteGroupsRepository<'conn>, SqliteGroupPermissionRepository<'conn>>;
pub type SqliteImportService<'conn> =
    ImportService<SqliteGroupsRepository<'conn>, SqliteGameRestaurantRepository<'conn>>;

/// Builds SQLite-backed repositories and services over one connection.
#[derive(Clone, Copy)]
pub struct CommunityServices<'conn> {
    conn: &'conn Connection,
}

impl<'conn> CommunityServices<'conn> {
    /// Takes a connection from `provider` and checks its schema version.
    pub fn from_provider<P>(provider: &'conn P) -> RepoResult<Self>
    where
        P: ConnectionProvider + ?Sized,
    {
        let conn = provider.database_connection()?;
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }

    pub fn groups(&self) -> SqliteGroupsRepository<'conn> {
        SqliteGroupsRepository::new(self.conn)
    }

    pub fn users(&self) -> SqliteUserRepository<'conn> {
        SqliteUserRepository::new(self.conn)
    }

    pub fn game_restaurants(&self) -> SqliteGameRestaurantRepository<'conn> {
        SqliteGameRestaurantRepository::new(self.conn)
    }

    pub fn permissions(&self) -> SqliteGroupPermissionService<'conn> {
        GroupPermissionService::new(SqliteGroupPermissionRepository::new(self.conn))
    }

    pub fn search(&self) -> SqliteSearchService<'conn> {
        SearchService::new(SqliteSearchRepository::new(self.conn))
    }

    pub fn read_groups(&self) -> SqliteReadGroupService<'conn> {
        ReadGroupService::new(self.groups(), self.search(), self.permissions())
    }

    pub fn edit_groups(&self) -> SqliteGroupEditService<'conn> {
        GroupEditService::new(self.groups(), self.permissions())
    }

    pub fn import(&self) -> SqliteImportService<'conn> {
        ImportService::new(self.groups(), self.game_restaurants())
    }
}
