//! Group authorization service.
//!
//! # Responsibility
//! - Resolve a user's access to a group from site role plus stored group role.
//! - Gate group mutations and moderator grants.
//!
//! # Invariants
//! - Site admins and anonymous users are decided without a store lookup.
//! - Only site admins and group admins may grant moderator roles.
//! - Denials name the user, the action and the group.

use crate::model::group::GroupId;
use crate::model::permission::{GroupAccess, GroupAction, GroupRole};
use crate::model::user::{User, UserId};
use crate::repo::group_repo::{RepoError, RepoResult};
use crate::repo::permission_repo::GroupPermissionRepository;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// A user was refused an action on a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDenied {
    pub user_id: UserId,
    /// `None` for actions that do not target an existing group.
    pub group_id: Option<GroupId>,
    pub action: &'static str,
}

impl PermissionDenied {
    pub fn for_group(user_id: UserId, group_id: GroupId, action: GroupAction) -> Self {
        Self {
            user_id,
            group_id: Some(group_id),
            action: action.as_str(),
        }
    }
}

impl Display for PermissionDenied {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.group_id {
            Some(group_id) => write!(
                f,
                "user {} does not have permission to {} group {}",
                self.user_id, self.action, group_id
            ),
            None => write!(
                f,
                "user {} does not have permission to {} a group",
                self.user_id, self.action
            ),
        }
    }
}

impl Error for PermissionDenied {}

/// Failure of an authorization check.
#[derive(Debug)]
pub enum AuthorizeError {
    Denied(PermissionDenied),
    Repo(RepoError),
}

impl Display for AuthorizeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Denied(denied) => write!(f, "{denied}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthorizeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Denied(denied) => Some(denied),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for AuthorizeError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Failure of a moderator grant.
#[derive(Debug)]
pub enum GrantModeratorError {
    GroupNotFound(GroupId),
    /// Anonymous identities cannot hold group roles.
    InvalidGrantee(UserId),
    Denied(PermissionDenied),
    Repo(RepoError),
}

impl Display for GrantModeratorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GroupNotFound(group_id) => write!(f, "group not found: {group_id}"),
            Self::InvalidGrantee(user_id) => {
                write!(f, "user {user_id} cannot be granted a group role")
            }
            Self::Denied(denied) => write!(f, "{denied}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GrantModeratorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Denied(denied) => Some(denied),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for GrantModeratorError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<AuthorizeError> for GrantModeratorError {
    fn from(value: AuthorizeError) -> Self {
        match value {
            AuthorizeError::Denied(denied) => Self::Denied(denied),
            AuthorizeError::Repo(err) => Self::Repo(err),
        }
    }
}

/// Authorization facade over group role storage.
pub struct GroupPermissionService<P: GroupPermissionRepository> {
    repo: P,
}

impl<P: GroupPermissionRepository> GroupPermissionService<P> {
    pub fn new(repo: P) -> Self {
        Self { repo }
    }

    /// Effective access of `user` to `group_id`.
    pub fn access_level(&self, user: &User, group_id: GroupId) -> RepoResult<GroupAccess> {
        let group_role = if GroupAccess::needs_group_role(user.site_role) {
            self.repo.group_role(user.id, group_id)?
        } else {
            None
        };
        Ok(GroupAccess::resolve(user.site_role, group_role))
    }

    pub fn can_edit_group(&self, user: &User, group_id: GroupId) -> RepoResult<bool> {
        Ok(self.access_level(user, group_id)?.permits(GroupAction::Edit))
    }

    pub fn can_delete_group(&self, user: &User, group_id: GroupId) -> RepoResult<bool> {
        Ok(self
            .access_level(user, group_id)?
            .permits(GroupAction::Delete))
    }

    /// Fails with [`AuthorizeError::Denied`] unless `user` may perform `action`.
    pub fn authorize(
        &self,
        user: &User,
        group_id: GroupId,
        action: GroupAction,
    ) -> Result<GroupAccess, AuthorizeError> {
        let access = self.access_level(user, group_id)?;
        if access.permits(action) {
            return Ok(access);
        }

        warn!(
            "event=group_authorize module=service status=denied user_id={} group_id={} action={:?} access={:?}",
            user.id, group_id, action, access
        );
        Err(AuthorizeError::Denied(PermissionDenied::for_group(
            user.id, group_id, action,
        )))
    }

    /// Makes `moderator` a `group_moderator` of `group_id`.
    ///
    /// Returns `false` when `moderator` already held a role on the group; the
    /// existing role is kept.
    pub fn add_group_moderator(
        &self,
        acting_user: &User,
        moderator: &User,
        group_id: GroupId,
    ) -> Result<bool, GrantModeratorError> {
        if !self.repo.group_exists(group_id)? {
            return Err(GrantModeratorError::GroupNotFound(group_id));
        }
        self.authorize(acting_user, group_id, GroupAction::GrantModerator)?;
        if moderator.is_read_only() {
            return Err(GrantModeratorError::InvalidGrantee(moderator.id));
        }

        let granted = self
            .repo
            .grant_group_role(moderator.id, group_id, GroupRole::Moderator)?;
        info!(
            "event=moderator_grant module=service status={} group_id={} user_id={} granted_by={}",
            if granted { "ok" } else { "skip" },
            group_id,
            moderator.id,
            acting_user.id
        );
        Ok(granted)
    }
}
