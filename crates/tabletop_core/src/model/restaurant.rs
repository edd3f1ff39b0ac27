//! Game restaurant records.

use serde::{Deserialize, Serialize};

/// Store-assigned restaurant identifier.
pub type GameRestaurantId = i64;

/// Persisted restaurant with its location flattened into one address line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRestaurant {
    pub id: GameRestaurantId,
    pub name: String,
    pub url: String,
    /// `"{street}, {city}, {state} {zip}"`.
    pub address: String,
}

/// Import payload; `address` is free text resolved to a location on insert.
///
/// Two payloads with the same name, url and resolved location are the same
/// restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGameRestaurant {
    pub name: String,
    pub url: String,
    pub address: String,
}

impl NewGameRestaurant {
    pub fn new(name: impl Into<String>, url: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            address: address.into(),
        }
    }
}
