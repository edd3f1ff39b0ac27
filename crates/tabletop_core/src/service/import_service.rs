//! Bulk import of groups and game restaurants.
//!
//! # Invariants
//! - Re-importing the same batch inserts nothing new.
//! - Groups import before restaurants; a failure stops the batch and keeps
//!   whatever was already committed.

use crate::model::group::GroupDraft;
use crate::model::restaurant::NewGameRestaurant;
use crate::repo::group_repo::{GroupsRepository, RepoResult};
use crate::repo::restaurant_repo::GameRestaurantRepository;
use log::info;
use serde::{Deserialize, Serialize};

/// Import payload, usually read from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportBatch {
    #[serde(default)]
    pub groups: Vec<GroupDraft>,
    #[serde(default)]
    pub game_restaurants: Vec<NewGameRestaurant>,
}

/// Counts of newly inserted rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub groups_inserted: usize,
    pub game_restaurants_inserted: usize,
}

pub struct ImportService<G: GroupsRepository, R: GameRestaurantRepository> {
    groups: G,
    restaurants: R,
}

impl<G: GroupsRepository, R: GameRestaurantRepository> ImportService<G, R> {
    pub fn new(groups: G, restaurants: R) -> Self {
        Self {
            groups,
            restaurants,
        }
    }

    pub fn import(&self, batch: &ImportBatch) -> RepoResult<ImportSummary> {
        let summary = ImportSummary {
            groups_inserted: self.groups.insert_groups(&batch.groups)?,
            game_restaurants_inserted: self
                .restaurants
                .insert_game_restaurants(&batch.game_restaurants)?,
        };
        info!(
            "event=import module=service status=ok groups_inserted={} restaurants_inserted={}",
            summary.groups_inserted, summary.game_restaurants_inserted
        );
        Ok(summary)
    }
}
