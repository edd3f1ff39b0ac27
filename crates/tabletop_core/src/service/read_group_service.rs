//! Group read-path service.
//!
//! # Responsibility
//! - Fetch groups by id or by search parameters.
//! - Annotate the group page with whether the viewer may edit it.

use crate::model::group::{Group, GroupId};
use crate::model::user::User;
use crate::repo::group_repo::{GroupsRepository, RepoError, RepoResult};
use crate::repo::permission_repo::GroupPermissionRepository;
use crate::search::params::GroupSearchParams;
use crate::search::repository::SearchRepository;
use crate::service::permission_service::GroupPermissionService;
use crate::service::search_service::{SearchService, SearchServiceError};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Group plus viewer-specific flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupPageData {
    pub group: Group,
    pub user_can_edit: bool,
}

#[derive(Debug)]
pub enum ReadGroupError {
    Search(SearchServiceError),
    /// No group matched the page parameters.
    NoGroupFound(String),
    Repo(RepoError),
}

impl Display for ReadGroupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Search(err) => write!(f, "{err}"),
            Self::NoGroupFound(params) => write!(f, "no group found with parameters: [{params}]"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ReadGroupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Search(err) => Some(err),
            Self::NoGroupFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<SearchServiceError> for ReadGroupError {
    fn from(value: SearchServiceError) -> Self {
        Self::Search(value)
    }
}

impl From<RepoError> for ReadGroupError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Read-path orchestration over groups, search and permissions.
pub struct ReadGroupService<G, S, P>
where
    G: GroupsRepository,
    S: SearchRepository,
    P: GroupPermissionRepository,
{
    groups: G,
    search: SearchService<S>,
    permissions: GroupPermissionService<P>,
}

impl<G, S, P> ReadGroupService<G, S, P>
where
    G: GroupsRepository,
    S: SearchRepository,
    P: GroupPermissionRepository,
{
    pub fn new(
        groups: G,
        search: SearchService<S>,
        permissions: GroupPermissionService<P>,
    ) -> Self {
        Self {
            groups,
            search,
            permissions,
        }
    }

    pub fn get_group(&self, group_id: GroupId) -> RepoResult<Option<Group>> {
        self.groups.get_group(group_id)
    }

    /// Resolves exactly one group for `pairs` and flags whether
    /// `current_user` may edit it.
    pub fn get_group_page<I, K, V>(
        &self,
        current_user: &User,
        pairs: I,
    ) -> Result<GroupPageData, ReadGroupError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params = GroupSearchParams::parse(pairs).map_err(SearchServiceError::from)?;
        let group = self
            .search
            .single_group(&params)?
            .ok_or_else(|| ReadGroupError::NoGroupFound(params.to_string()))?;

        let user_can_edit = self.permissions.can_edit_group(current_user, group.id)?;
        Ok(GroupPageData {
            group,
            user_can_edit,
        })
    }
}
