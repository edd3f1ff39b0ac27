//! User account storage.
//!
//! Accounts exist so role rows can reference them; authentication lives
//! outside core.

use crate::model::user::{SiteRole, User, UserId};
use crate::repo::group_repo::{RepoError, RepoResult};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Repository interface for user accounts.
pub trait UserRepository {
    /// Creates an account. Read-only is not a storable role.
    fn create_user(&self, email: &str, site_role: SiteRole) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
#[derive(Clone, Copy)]
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn find_one(&self, filter_sql: &str, value: &dyn rusqlite::ToSql) -> RepoResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT id, email, site_role FROM users WHERE {filter_sql};"),
                [value],
                read_user_columns,
            )
            .optional()?;

        row.map(|(id, email, role)| build_user(id, email, role))
            .transpose()
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, email: &str, site_role: SiteRole) -> RepoResult<User> {
        let email = email.trim();
        if email.is_empty() {
            return Err(RepoError::InvalidData("user email cannot be blank".to_string()));
        }
        if site_role == SiteRole::ReadOnly {
            return Err(RepoError::InvalidData(
                "read-only identity cannot be stored as a user".to_string(),
            ));
        }

        let id: UserId = self.conn.query_row(
            "INSERT INTO users (email, site_role)
             VALUES (?1, ?2)
             RETURNING id;",
            params![email, site_role.as_str()],
            |row| row.get(0),
        )?;
        info!(
            "event=user_create module=repo status=ok user_id={} site_role={}",
            id,
            site_role.as_str()
        );

        Ok(User {
            id,
            email: email.to_string(),
            site_role,
        })
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.find_one("id = ?1", &id)
    }

    fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.find_one("email = ?1", &email.trim())
    }
}

fn read_user_columns(row: &Row<'_>) -> rusqlite::Result<(UserId, String, String)> {
    Ok((row.get("id")?, row.get("email")?, row.get("site_role")?))
}

fn build_user(id: UserId, email: String, role: String) -> RepoResult<User> {
    let site_role = SiteRole::parse(&role).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid site role `{role}` in users.site_role"))
    })?;
    Ok(User {
        id,
        email,
        site_role,
    })
}
