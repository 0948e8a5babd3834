use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Catalog food; macronutrients are per 100 g.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "calories")]
    pub calories_per_100g: i64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    pub serving_size: i64, // grams
    pub category: String,
}

/// A named portion of a food.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FoodServing {
    pub id: Uuid,
    pub food_id: Uuid,
    pub description: String,
    pub grams: f64,
}

/// Fields needed to insert a food.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFood {
    pub name: String,
    pub calories_per_100g: i64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    pub serving_size: i64,
    pub category: String,
}

/// A serving to insert alongside its food.
#[derive(Debug, Clone, PartialEq)]
pub struct NewServing {
    pub description: &'static str,
    pub grams: f64,
}
