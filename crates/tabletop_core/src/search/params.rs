//! Group search parameters and their SQL translation.
//!
//! # Responsibility
//! - Validate textual search parameters into typed filters.
//! - Render filters as one parameterized SQL statement.
//!
//! # Invariants
//! - Unknown, duplicate or blank parameters are rejected at parse time.
//! - Filters combine by conjunction, in the order given.
//! - The same parameters always render the same SQL and bind values, ordered
//!   by `name COLLATE NOCASE ASC, id ASC`.
//! - An empty parameter set matches every group.

use crate::db::DbError;
use rusqlite::types::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for search APIs.
pub type SearchResult<T> = Result<T, SearchError>;

/// Search-layer error for parameter parsing, DB interaction and row decoding.
#[derive(Debug)]
pub enum SearchError {
    /// Parameter key is unknown, repeated, or carries a blank value.
    InvalidParameter { key: String, reason: &'static str },
    Db(DbError),
    InvalidData(String),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParameter { key, reason } => {
                write!(f, "invalid search parameter `{key}`: {reason}")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid search row: {message}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidParameter { .. } => None,
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for SearchError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Recognized filter keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKey {
    /// Exact group url.
    Url,
    /// Case-insensitive substring of the group name.
    Name,
    /// Group is linked to a location in this city.
    City,
    /// Group is linked to a location in this state.
    State,
}

impl SearchKey {
    pub const ALL: [SearchKey; 4] = [Self::Url, Self::Name, Self::City, Self::State];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Name => "name",
            Self::City => "city",
            Self::State => "state",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }

    fn predicate(self) -> &'static str {
        match self {
            Self::Url => "g.url = ?",
            Self::Name => "g.name LIKE ? ESCAPE '\\'",
            Self::City => {
                "EXISTS (
                    SELECT 1
                    FROM location_group_map lgm
                    INNER JOIN locations l ON l.id = lgm.location_id
                    WHERE lgm.group_id = g.id
                      AND l.city = ? COLLATE NOCASE
                )"
            }
            Self::State => {
                "EXISTS (
                    SELECT 1
                    FROM location_group_map lgm
                    INNER JOIN locations l ON l.id = lgm.location_id
                    WHERE lgm.group_id = g.id
                      AND l.state = ? COLLATE NOCASE
                )"
            }
        }
    }

    fn bind_value(self, value: &str) -> Value {
        match self {
            Self::Name => Value::Text(format!("%{}%", escape_like(value))),
            Self::Url | Self::City | Self::State => Value::Text(value.to_string()),
        }
    }
}

/// One validated filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pub key: SearchKey,
    pub value: String,
}

/// SQL text plus bind values, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupQuery {
    pub sql: String,
    pub bind_values: Vec<Value>,
}

/// Ordered, validated group search filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSearchParams {
    filters: Vec<SearchFilter>,
}

impl GroupSearchParams {
    /// Parses ordered `(key, value)` pairs.
    ///
    /// Keys are trimmed and lowercased; values are trimmed.
    pub fn parse<I, K, V>(pairs: I) -> SearchResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut filters = Vec::new();

        for (raw_key, raw_value) in pairs {
            let key_text = raw_key.as_ref().trim().to_ascii_lowercase();
            let key = SearchKey::parse(&key_text).ok_or_else(|| SearchError::InvalidParameter {
                key: key_text.clone(),
                reason: "unrecognized key",
            })?;
            if !seen.insert(key) {
                return Err(SearchError::InvalidParameter {
                    key: key_text,
                    reason: "key given more than once",
                });
            }

            let value = raw_value.as_ref().trim();
            if value.is_empty() {
                return Err(SearchError::InvalidParameter {
                    key: key_text,
                    reason: "value cannot be blank",
                });
            }

            filters.push(SearchFilter {
                key,
                value: value.to_string(),
            });
        }

        Ok(Self { filters })
    }

    /// Single-filter shortcut for lookups by url.
    pub fn by_url(url: impl Into<String>) -> Self {
        Self {
            filters: vec![SearchFilter {
                key: SearchKey::Url,
                value: url.into(),
            }],
        }
    }

    pub fn filters(&self) -> &[SearchFilter] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Renders the filters as one SELECT over `groups`.
    pub fn to_query(&self) -> GroupQuery {
        let mut sql = String::from(
            "SELECT
                g.id AS id,
                g.name AS name,
                g.url AS url,
                g.summary AS summary
             FROM groups g
             WHERE 1 = 1",
        );
        let mut bind_values = Vec::with_capacity(self.filters.len());

        for filter in &self.filters {
            sql.push_str(" AND ");
            sql.push_str(filter.key.predicate());
            bind_values.push(filter.key.bind_value(&filter.value));
        }

        sql.push_str(" ORDER BY g.name COLLATE NOCASE ASC, g.id ASC;");
        GroupQuery { sql, bind_values }
    }
}

impl Display for GroupSearchParams {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for filter in &self.filters {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", filter.key.as_str(), filter.value)?;
            first = false;
        }
        Ok(())
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{GroupSearchParams, SearchError, SearchKey};
    use rusqlite::types::Value;

    #[test]
    fn parse_normalizes_keys_and_values() {
        let params = GroupSearchParams::parse([(" URL ", " chess "), ("City", "Seattle")])
            .expect("params should parse");
        let filters = params.filters();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].key, SearchKey::Url);
        assert_eq!(filters[0].value, "chess");
        assert_eq!(filters[1].key, SearchKey::City);
    }

    #[test]
    fn parse_rejects_unknown_key() {
        let err = GroupSearchParams::parse([("owner", "alice")]).unwrap_err();
        assert!(matches!(
            err,
            SearchError::InvalidParameter { ref key, .. } if key == "owner"
        ));
    }

    #[test]
    fn parse_rejects_duplicate_and_blank_values() {
        let duplicate = GroupSearchParams::parse([("name", "chess"), ("NAME", "go")]).unwrap_err();
        assert!(duplicate.to_string().contains("more than once"));

        let blank = GroupSearchParams::parse([("city", "  ")]).unwrap_err();
        assert!(blank.to_string().contains("blank"));
    }

    #[test]
    fn empty_params_render_match_all_query() {
        let params = GroupSearchParams::parse(Vec::<(String, String)>::new()).unwrap();
        assert!(params.is_empty());
        let query = params.to_query();
        assert!(query.bind_values.is_empty());
        assert!(!query.sql.contains(" AND "));
        assert!(query.sql.contains("ORDER BY g.name COLLATE NOCASE ASC, g.id ASC"));
    }

    #[test]
    fn query_binds_values_in_parameter_order() {
        let params = GroupSearchParams::parse([("city", "Seattle"), ("url", "chess")]).unwrap();
        let query = params.to_query();
        assert_eq!(
            query.bind_values,
            vec![
                Value::Text("Seattle".to_string()),
                Value::Text("chess".to_string())
            ]
        );
        let city_at = query.sql.find("l.city = ?").unwrap();
        let url_at = query.sql.find("g.url = ?").unwrap();
        assert!(city_at < url_at);
    }

    #[test]
    fn query_is_deterministic() {
        let first = GroupSearchParams::parse([("name", "club"), ("state", "wa")]).unwrap();
        let second = GroupSearchParams::parse([("name", "club"), ("state", "wa")]).unwrap();
        assert_eq!(first.to_query(), second.to_query());
    }

    #[test]
    fn name_filter_escapes_like_wildcards() {
        let params = GroupSearchParams::parse([("name", "100%_fun")]).unwrap();
        let query = params.to_query();
        assert_eq!(
            query.bind_values,
            vec![Value::Text("%100\\%\\_fun%".to_string())]
        );
    }

    #[test]
    fn display_lists_filters_in_order() {
        let params = GroupSearchParams::parse([("url", "chess"), ("city", "Seattle")]).unwrap();
        assert_eq!(params.to_string(), "url=chess, city=Seattle");
    }
}
