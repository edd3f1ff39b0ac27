//! Group records.
//!
//! # Invariants
//! - `url` is non-blank and contains no whitespace.
//! - `name` is non-blank.
//! - `cities` mirrors `location_group_map`; it is not stored on the group row.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned group identifier.
pub type GroupId = i64;

/// Persisted group with its associated city names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    /// Natural external key, unique across groups.
    pub url: String,
    pub summary: String,
    /// City names of associated locations, sorted case-insensitively.
    #[serde(default)]
    pub cities: Vec<String>,
}

/// Insert payload for a group that has no id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDraft {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub cities: Vec<String>,
}

impl GroupDraft {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            summary: summary.into(),
            cities: Vec::new(),
        }
    }

    /// Adds associated cities.
    pub fn with_cities<I, S>(mut self, cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cities = cities.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<(), GroupValidationError> {
        validate_fields(&self.name, &self.url)
    }
}

impl Group {
    pub fn validate(&self) -> Result<(), GroupValidationError> {
        validate_fields(&self.name, &self.url)
    }
}

/// Group field validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupValidationError {
    BlankName,
    BlankUrl,
    UrlContainsWhitespace(String),
}

impl Display for GroupValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "group name cannot be blank"),
            Self::BlankUrl => write!(f, "group url cannot be blank"),
            Self::UrlContainsWhitespace(url) => {
                write!(f, "group url `{url}` cannot contain whitespace")
            }
        }
    }
}

impl Error for GroupValidationError {}

fn validate_fields(name: &str, url: &str) -> Result<(), GroupValidationError> {
    if name.trim().is_empty() {
        return Err(GroupValidationError::BlankName);
    }
    if url.trim().is_empty() {
        return Err(GroupValidationError::BlankUrl);
    }
    if url.chars().any(char::is_whitespace) {
        return Err(GroupValidationError::UrlContainsWhitespace(url.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{GroupDraft, GroupValidationError};

    #[test]
    fn validate_rejects_blank_name_and_url() {
        let draft = GroupDraft::new("  ", "chess", "");
        assert_eq!(draft.validate(), Err(GroupValidationError::BlankName));

        let draft = GroupDraft::new("Chess Club", " ", "");
        assert_eq!(draft.validate(), Err(GroupValidationError::BlankUrl));
    }

    #[test]
    fn validate_rejects_url_with_whitespace() {
        let draft = GroupDraft::new("Chess Club", "chess club", "");
        assert!(matches!(
            draft.validate(),
            Err(GroupValidationError::UrlContainsWhitespace(_))
        ));
    }
}
