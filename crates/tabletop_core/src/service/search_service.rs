//! Group search use-case service.
//!
//! # Invariants
//! - `get_groups` never fails for zero matches.
//! - `get_single_group` never picks one of several matches; more than one
//!   match is a data-integrity signal surfaced as `MultipleResults`.

use crate::model::group::Group;
use crate::search::params::{GroupSearchParams, SearchError};
use crate::search::repository::SearchRepository;
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum SearchServiceError {
    Search(SearchError),
    /// A single-group lookup matched more than one group.
    MultipleResults { params: String, count: usize },
}

impl Display for SearchServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Search(err) => write!(f, "{err}"),
            Self::MultipleResults { params, count } => {
                write!(f, "multiple groups were found for [{params}]: {count} matches")
            }
        }
    }
}

impl Error for SearchServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Search(err) => Some(err),
            Self::MultipleResults { .. } => None,
        }
    }
}

impl From<SearchError> for SearchServiceError {
    fn from(value: SearchError) -> Self {
        Self::Search(value)
    }
}

/// Search facade over a [`SearchRepository`].
pub struct SearchService<S: SearchRepository> {
    repo: S,
}

impl<S: SearchRepository> SearchService<S> {
    pub fn new(repo: S) -> Self {
        Self { repo }
    }

    /// Returns every group matching the textual parameters.
    pub fn get_groups<I, K, V>(&self, pairs: I) -> Result<Vec<Group>, SearchServiceError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params = GroupSearchParams::parse(pairs)?;
        Ok(self.repo.get_groups(&params)?)
    }

    /// Returns the only group matching the textual parameters, if any.
    pub fn get_single_group<I, K, V>(&self, pairs: I) -> Result<Option<Group>, SearchServiceError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params = GroupSearchParams::parse(pairs)?;
        self.single_group(&params)
    }

    /// Same as [`Self::get_single_group`] for already parsed parameters.
    pub fn single_group(
        &self,
        params: &GroupSearchParams,
    ) -> Result<Option<Group>, SearchServiceError> {
        let mut groups = self.repo.get_groups(params)?;
        if groups.len() > 1 {
            error!(
                "event=group_single_lookup module=service status=error error_code=multiple_results matches={}",
                groups.len()
            );
            return Err(SearchServiceError::MultipleResults {
                params: params.to_string(),
                count: groups.len(),
            });
        }
        Ok(groups.pop())
    }
}
