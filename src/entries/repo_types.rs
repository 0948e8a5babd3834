use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::foods::repo_types::Food;

/// Food entry record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct FoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_id: Uuid,
    pub serving_desc: String,
    pub quantity: f64,
    pub date: String, // YYYY-MM-DD
    pub calories: f64,
    pub food_set_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

/// Entry joined with its food.
#[derive(Debug, Clone, FromRow)]
pub struct FoodEntryWithFoodRow {
    #[sqlx(flatten)]
    pub entry: FoodEntry,
    pub food_name: String,
    pub food_calories_per_100g: i64,
    pub food_protein: f64,
    pub food_carbohydrates: f64,
    pub food_fat: f64,
    pub food_serving_size: i64,
    pub food_category: String,
}

impl FoodEntryWithFoodRow {
    pub fn into_parts(self) -> (FoodEntry, Food) {
        let food = Food {
            id: self.entry.food_id,
            name: self.food_name,
            calories_per_100g: self.food_calories_per_100g,
            protein: self.food_protein,
            carbohydrates: self.food_carbohydrates,
            fat: self.food_fat,
            serving_size: self.food_serving_size,
            category: self.food_category,
        };
        (self.entry, food)
    }
}
