//! Group write-path service.
//!
//! # Responsibility
//! - Create groups on behalf of signed-in users.
//! - Authorize, then apply, group edits and deletes.
//!
//! # Invariants
//! - Edit and delete check that the group exists before authorizing, so a
//!   missing target is reported as `GroupNotFound` for every caller.
//! - Moderators may edit; only group admins and site admins may delete.
//! - Failures are returned, never reduced to a log line.

use crate::model::group::{Group, GroupDraft, GroupId, GroupValidationError};
use crate::model::permission::GroupAction;
use crate::model::user::User;
use crate::repo::group_repo::{GroupsRepository, RepoError};
use crate::repo::permission_repo::GroupPermissionRepository;
use crate::service::permission_service::{AuthorizeError, GroupPermissionService, PermissionDenied};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum GroupEditError {
    /// Edit/delete target does not exist.
    GroupNotFound(GroupId),
    PermissionDenied(PermissionDenied),
    Validation(GroupValidationError),
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for GroupEditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GroupNotFound(group_id) => write!(f, "group not found: {group_id}"),
            Self::PermissionDenied(denied) => write!(f, "{denied}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent group state: {details}"),
        }
    }
}

impl Error for GroupEditError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::PermissionDenied(denied) => Some(denied),
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::GroupNotFound(_) | Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for GroupEditError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<AuthorizeError> for GroupEditError {
    fn from(value: AuthorizeError) -> Self {
        match value {
            AuthorizeError::Denied(denied) => Self::PermissionDenied(denied),
            AuthorizeError::Repo(err) => Self::from(err),
        }
    }
}

/// Write-path orchestration: authorize first, then mutate.
pub struct GroupEditService<G: GroupsRepository, P: GroupPermissionRepository> {
    groups: G,
    permissions: GroupPermissionService<P>,
}

impl<G: GroupsRepository, P: GroupPermissionRepository> GroupEditService<G, P> {
    pub fn new(groups: G, permissions: GroupPermissionService<P>) -> Self {
        Self {
            groups,
            permissions,
        }
    }

    /// Creates a group with `creator` as its group admin.
    pub fn create_group(&self, creator: &User, draft: &GroupDraft) -> Result<Group, GroupEditError> {
        if creator.is_read_only() {
            warn!(
                "event=group_create module=service status=denied user_id={}",
                creator.id
            );
            return Err(GroupEditError::PermissionDenied(PermissionDenied {
                user_id: creator.id,
                group_id: None,
                action: "create",
            }));
        }

        let group = self.groups.insert_group(creator, draft)?;
        info!(
            "event=group_create module=service status=ok group_id={} user_id={}",
            group.id, creator.id
        );
        Ok(group)
    }

    /// Overwrites `group` (matched by id) when `user` may edit it.
    pub fn edit_group(&self, user: &User, group: &Group) -> Result<Group, GroupEditError> {
        self.ensure_exists(group.id)?;
        self.permissions
            .authorize(user, group.id, GroupAction::Edit)?;

        self.groups.update_group(group)?;
        info!(
            "event=group_edit module=service status=ok group_id={} user_id={}",
            group.id, user.id
        );
        self.groups
            .get_group(group.id)?
            .ok_or(GroupEditError::InconsistentState(
                "edited group not found in read-back",
            ))
    }

    /// Deletes `group_id` when `user` is a group admin or site admin.
    pub fn delete_group(&self, user: &User, group_id: GroupId) -> Result<(), GroupEditError> {
        self.ensure_exists(group_id)?;
        self.permissions
            .authorize(user, group_id, GroupAction::Delete)?;

        self.groups.delete_group(group_id)?;
        info!(
            "event=group_delete module=service status=ok group_id={} user_id={}",
            group_id, user.id
        );
        Ok(())
    }

    fn ensure_exists(&self, group_id: GroupId) -> Result<(), GroupEditError> {
        match self.groups.get_group(group_id)? {
            Some(_) => Ok(()),
            None => Err(GroupEditError::GroupNotFound(group_id)),
        }
    }
}
