use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::FoodEntryWithFoodRow;
use crate::foods::repo_types::Food;

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub food_id: Uuid,
    pub serving_desc: String,
    pub quantity: f64,
    #[serde(default)]
    pub date: Option<String>,
}

/// Body for logging a food that is not in the catalog.
#[derive(Debug, Deserialize)]
pub struct DirectEntryRequest {
    pub name: String,
    pub calories: i64, // per 100 g
    pub quantity: f64,
    #[serde(default)]
    pub date: Option<String>,
}

/// Either a single `date` or an inclusive `startDate`..`endDate` range.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateQuery {
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FoodEntryView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_id: Uuid,
    pub serving_desc: String,
    pub quantity: f64,
    pub date: String,
    pub calories: f64,
    pub food_set_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub food: Food,
}

impl From<FoodEntryWithFoodRow> for FoodEntryView {
    fn from(row: FoodEntryWithFoodRow) -> Self {
        let (e, food) = row.into_parts();
        Self {
            id: e.id,
            user_id: e.user_id,
            food_id: e.food_id,
            serving_desc: e.serving_desc,
            quantity: e.quantity,
            date: e.date,
            calories: e.calories,
            food_set_id: e.food_set_id,
            created_at: e.created_at,
            food,
        }
    }
}
