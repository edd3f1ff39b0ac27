//! User identity as seen by permission checks.
//!
//! Users are authenticated elsewhere; core only needs the id and the
//! site-wide role.

use serde::{Deserialize, Serialize};

/// Store-assigned user identifier.
pub type UserId = i64;

/// Id carried by the anonymous identity. Never assigned by the store.
pub const READ_ONLY_USER_ID: UserId = 0;

/// Site-wide role level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteRole {
    /// Not logged in; may read but never mutate.
    ReadOnly,
    /// Regular account; rights on a group come from group roles.
    Standard,
    /// Site administrator; may edit and delete any group.
    Admin,
}

impl SiteRole {
    /// Stable storage value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadOnly => "read_only",
            Self::Standard => "standard",
            Self::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "read_only" => Some(Self::ReadOnly),
            "standard" => Some(Self::Standard),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub site_role: SiteRole,
}

impl User {
    /// Anonymous identity used for requests without a session.
    pub fn read_only() -> Self {
        Self {
            id: READ_ONLY_USER_ID,
            email: String::new(),
            site_role: SiteRole::ReadOnly,
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.site_role == SiteRole::ReadOnly
    }
}
