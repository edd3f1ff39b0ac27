//! Group role storage.
//!
//! # Invariants
//! - At most one role row exists per (user, group).
//! - Granting never downgrades or replaces an existing row.

use crate::model::group::GroupId;
use crate::model::permission::GroupRole;
use crate::model::user::UserId;
use crate::repo::group_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for `group_admin_data`.
pub trait GroupPermissionRepository {
    /// Role `user_id` holds on `group_id`, if any.
    fn group_role(&self, user_id: UserId, group_id: GroupId) -> RepoResult<Option<GroupRole>>;
    /// Records `role`; returns `false` when the user already held a role.
    fn grant_group_role(
        &self,
        user_id: UserId,
        group_id: GroupId,
        role: GroupRole,
    ) -> RepoResult<bool>;
    fn group_exists(&self, group_id: GroupId) -> RepoResult<bool>;
}

/// SQLite-backed group role repository.
#[derive(Clone, Copy)]
pub struct SqliteGroupPermissionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGroupPermissionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl GroupPermissionRepository for SqliteGroupPermissionRepository<'_> {
    fn group_role(&self, user_id: UserId, group_id: GroupId) -> RepoResult<Option<GroupRole>> {
        let level: Option<String> = self
            .conn
            .query_row(
                "SELECT group_admin_level
                 FROM group_admin_data
                 WHERE user_id = ?1
                   AND group_id = ?2;",
                params![user_id, group_id],
                |row| row.get(0),
            )
            .optional()?;

        match level {
            Some(value) => GroupRole::parse(&value).map(Some).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid group role `{value}` in group_admin_data.group_admin_level"
                ))
            }),
            None => Ok(None),
        }
    }

    fn grant_group_role(
        &self,
        user_id: UserId,
        group_id: GroupId,
        role: GroupRole,
    ) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT INTO group_admin_data (user_id, group_id, group_admin_level)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (user_id, group_id) DO NOTHING;",
            params![user_id, group_id, role.as_str()],
        )?;
        Ok(inserted > 0)
    }

    fn group_exists(&self, group_id: GroupId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM groups WHERE id = ?1);",
            [group_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}
