//! Core domain logic for tabletop gaming community groups.
//! This crate owns the group, permission and search invariants; hosts only
//! supply a connection and a current user.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use db::{
    open_db, open_db_in_memory, ConnectionProvider, DbError, DbResult, DbTarget,
    SqliteConnectionProvider,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::group::{Group, GroupDraft, GroupId, GroupValidationError};
pub use model::location::Location;
pub use model::permission::{GroupAccess, GroupAction, GroupRole};
pub use model::restaurant::{GameRestaurant, GameRestaurantId, NewGameRestaurant};
pub use model::user::{SiteRole, User, UserId};
pub use repo::group_repo::{GroupsRepository, RepoError, RepoResult, SqliteGroupsRepository};
pub use repo::restaurant_repo::{GameRestaurantRepository, SqliteGameRestaurantRepository};
pub use search::params::{GroupSearchParams, SearchError, SearchKey, SearchResult};
pub use search::repository::{SearchRepository, SqliteSearchRepository};
pub use service::group_edit_service::{GroupEditError, GroupEditService};
pub use service::import_service::{ImportBatch, ImportService, ImportSummary};
pub use service::permission_service::{GroupPermissionService, PermissionDenied};
pub use service::provider::CommunityServices;
pub use service::read_group_service::{GroupPageData, ReadGroupError, ReadGroupService};
pub use service::search_service::{SearchService, SearchServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
