//! Group authorization rules.
//!
//! # Responsibility
//! - Resolve a user's effective access to one group from their site role and
//!   their recorded group role.
//! - Decide which group actions each access level permits.
//!
//! # Invariants
//! - Rules are evaluated top to bottom and the first match wins:
//!   site admin, anonymous, group admin, group moderator, everyone else.
//! - Moderators may edit but never delete or grant moderator roles.
//! - Nothing here touches storage.

use crate::model::user::SiteRole;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Role recorded in `group_admin_data.group_admin_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupRole {
    #[serde(rename = "group_admin")]
    Admin,
    #[serde(rename = "group_moderator")]
    Moderator,
}

impl GroupRole {
    /// Stable storage value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "group_admin",
            Self::Moderator => "group_moderator",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "group_admin" => Some(Self::Admin),
            "group_moderator" => Some(Self::Moderator),
            _ => None,
        }
    }
}

/// Mutations gated by group authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupAction {
    Edit,
    Delete,
    GrantModerator,
}

impl GroupAction {
    /// Verb phrase used in denial messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::GrantModerator => "grant moderator on",
        }
    }
}

impl Display for GroupAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective access of one user to one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupAccess {
    SiteAdmin,
    GroupAdmin,
    GroupModerator,
    Denied,
}

impl GroupAccess {
    /// Applies the ordered access rules.
    pub fn resolve(site_role: SiteRole, group_role: Option<GroupRole>) -> Self {
        match (site_role, group_role) {
            (SiteRole::Admin, _) => Self::SiteAdmin,
            (SiteRole::ReadOnly, _) => Self::Denied,
            (_, Some(GroupRole::Admin)) => Self::GroupAdmin,
            (_, Some(GroupRole::Moderator)) => Self::GroupModerator,
            (_, None) => Self::Denied,
        }
    }

    /// Whether the group role must be loaded before [`Self::resolve`] can
    /// decide. Site admins and anonymous users are decided by site role alone.
    pub fn needs_group_role(site_role: SiteRole) -> bool {
        site_role == SiteRole::Standard
    }

    pub fn permits(self, action: GroupAction) -> bool {
        match (self, action) {
            (Self::SiteAdmin | Self::GroupAdmin, _) => true,
            (Self::GroupModerator, GroupAction::Edit) => true,
            (Self::GroupModerator, GroupAction::Delete | GroupAction::GrantModerator) => false,
            (Self::Denied, _) => false,
        }
    }
}
