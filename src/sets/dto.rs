use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::FoodSet;
use crate::entries::{repo_types::FoodEntryWithFoodRow, FoodEntryView};

#[derive(Debug, Deserialize)]
pub struct SetEntryRequest {
    pub food_id: Uuid,
    pub serving_desc: String,
    pub quantity: f64,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSetRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub entries: Vec<SetEntryRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ApplyQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FoodSetView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub entries: Vec<FoodEntryView>,
}

impl FoodSetView {
    pub fn new(set: FoodSet, entries: Vec<FoodEntryWithFoodRow>) -> Self {
        Self {
            id: set.id,
            user_id: set.user_id,
            name: set.name,
            description: set.description,
            created_at: set.created_at,
            entries: entries.into_iter().map(FoodEntryView::from).collect(),
        }
    }
}
