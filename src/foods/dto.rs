use serde::Serialize;

use super::repo_types::{Food, FoodServing};

/// A catalog food with its servings.
#[derive(Debug, Serialize)]
pub struct FoodWithServings {
    #[serde(flatten)]
    pub food: Food,
    pub servings: Vec<FoodServing>,
}
