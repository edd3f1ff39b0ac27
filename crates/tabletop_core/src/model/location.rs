//! Location records and free-text address parsing.
//!
//! # Responsibility
//! - Split free-text addresses into street/city/state/zip parts.
//! - Render the fixed display format `"{street}, {city}, {state} {zip}"`.
//!
//! # Invariants
//! - Missing parts are stored as empty strings, never NULL, so the
//!   four-column uniqueness constraint deduplicates city-only rows too.
//! - Two-letter state codes are uppercased; other parts keep caller casing.
//! - Parsing reads from the right, so streets and city names may contain
//!   commas.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Store-assigned location identifier.
pub type LocationId = i64;

// Trailing `ST 12345` segment of a full address; state may be a name or
// dotted code ("New York", "D.C.").
static STATE_ZIP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<state>[A-Za-z][A-Za-z.]*(?:\s+[A-Za-z][A-Za-z.]*)*)\s+(?P<zip>\d{5}(?:-\d{4})?)$")
        .expect("valid state/zip regex")
});
static STATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z.]*(?:\s+[A-Za-z][A-Za-z.]*)*$").expect("valid state regex")
});

/// Persisted location row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl Location {
    /// Formats the location as one display line.
    pub fn format_address(&self) -> String {
        format_address(&self.street_address, &self.city, &self.state, &self.zip_code)
    }
}

/// Address parts before they are resolved to a location row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressParts {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl AddressParts {
    /// Parses `"street, city, ST 12345"`, reading segments from the right.
    ///
    /// The last segment holds state and zip (zip may carry a `-1234`
    /// suffix), the one before it is the city, and everything earlier is the
    /// street, commas included.
    pub fn parse_full(address: &str) -> Option<Self> {
        let mut segments: Vec<&str> = address.split(',').map(str::trim).collect();
        if segments.len() < 3 || segments.iter().any(|segment| segment.is_empty()) {
            return None;
        }

        let caps = STATE_ZIP_RE.captures(segments.pop()?)?;
        let city = segments.pop()?;
        Some(Self {
            street_address: segments.join(", "),
            city: city.to_string(),
            state: normalize_state(&caps["state"]),
            zip_code: caps["zip"].to_string(),
        })
    }

    /// Parses a city-only location.
    ///
    /// A trailing segment that reads as a state (`"City, ST"`,
    /// `"Washington, D.C."`) becomes the state; otherwise the whole trimmed
    /// string is the city.
    pub fn parse_city(city: &str) -> Option<Self> {
        let city = city.trim();
        if city.is_empty() {
            return None;
        }

        let (name, state) = match city.rsplit_once(',') {
            Some((head, tail)) if STATE_RE.is_match(tail.trim()) => {
                (head.trim(), normalize_state(tail.trim()))
            }
            _ => (city, String::new()),
        };
        if name.is_empty() {
            return None;
        }

        Some(Self {
            city: name.to_string(),
            state,
            ..Self::default()
        })
    }
}

/// Two-letter codes are uppercased; longer names keep caller casing.
fn normalize_state(state: &str) -> String {
    let state = state.split_whitespace().collect::<Vec<_>>().join(" ");
    if state.len() == 2 {
        state.to_ascii_uppercase()
    } else {
        state
    }
}

/// Joins address parts using the fixed display format.
pub fn format_address(street: &str, city: &str, state: &str, zip: &str) -> String {
    format!("{street}, {city}, {state} {zip}")
}
