//! Intake calculator and ledger writes.

use anyhow::Context;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::repo::{find_entry, insert_entry_tx};
use super::repo_types::FoodEntryWithFoodRow;
use crate::dates::normalize_date;
use crate::error::ApiError;
use crate::foods::repo::{find_food, find_serving, insert_food_tx};
use crate::foods::repo_types::{NewFood, NewServing};

const CUSTOM_CATEGORY: &str = "Custom";
const BASE_SERVING: &str = "100 grams";

#[derive(Debug, thiserror::Error)]
pub enum CalcError {
    #[error("unknown food")]
    UnknownFood,
    #[error("unknown serving")]
    UnknownServing,
    #[error("date must be YYYY-MM-DD")]
    BadDate,
    #[error("quantity must be a non-negative number")]
    BadQuantity,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl From<CalcError> for ApiError {
    fn from(e: CalcError) -> Self {
        match e {
            CalcError::UnknownFood => ApiError::InvalidFood,
            CalcError::UnknownServing => ApiError::InvalidServing,
            CalcError::BadDate => ApiError::Validation("Invalid date format, use YYYY-MM-DD".into()),
            CalcError::BadQuantity => {
                ApiError::Validation("Quantity must be a non-negative number".into())
            }
            CalcError::Store(inner) => ApiError::from(inner),
        }
    }
}

/// What a client asks to log.
#[derive(Debug, Clone)]
pub struct EntryInput {
    pub food_id: Uuid,
    pub serving_desc: String,
    pub quantity: f64,
    pub date: Option<String>,
}

/// A validated entry ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatedEntry {
    pub food_id: Uuid,
    pub serving_desc: String,
    pub quantity: f64,
    pub date: String,
    pub calories: f64,
}

/// Calories for `quantity` servings of `grams` each, unrounded.
pub fn entry_calories(calories_per_100g: i64, grams: f64, quantity: f64) -> f64 {
    calories_per_100g as f64 * grams * quantity / 100.0
}

pub fn validate_quantity(quantity: f64) -> Result<f64, CalcError> {
    if quantity.is_finite() && quantity >= 0.0 {
        Ok(quantity)
    } else {
        Err(CalcError::BadQuantity)
    }
}

pub async fn calculate(db: &SqlitePool, input: EntryInput) -> Result<CalculatedEntry, CalcError> {
    let quantity = validate_quantity(input.quantity)?;
    let food = find_food(db, input.food_id).await?.ok_or(CalcError::UnknownFood)?;
    let serving = find_serving(db, food.id, &input.serving_desc)
        .await?
        .ok_or(CalcError::UnknownServing)?;
    let date = normalize_date(input.date.as_deref()).ok_or(CalcError::BadDate)?;

    Ok(CalculatedEntry {
        food_id: food.id,
        serving_desc: serving.description,
        quantity,
        date,
        calories: entry_calories(food.calories_per_100g, serving.grams, quantity),
    })
}

/// Validates `input` through the calculator and appends it to the user's ledger.
pub async fn append(
    db: &SqlitePool,
    user_id: Uuid,
    input: EntryInput,
) -> Result<FoodEntryWithFoodRow, CalcError> {
    let calculated = calculate(db, input).await?;

    let mut tx = db.begin().await.context("begin append tx")?;
    let entry = insert_entry_tx(&mut tx, user_id, &calculated, None, 0, OffsetDateTime::now_utc())
        .await?;
    tx.commit().await.context("commit append tx")?;

    info!(%user_id, entry_id = %entry.id, calories = entry.calories, "food entry logged");
    fetch_created(db, user_id, entry.id).await
}

/// Logs a one-off food that is not in the catalog.
///
/// A fresh anonymous food (with only its base serving) is inserted alongside the entry,
/// in the same transaction.
pub async fn append_custom(
    db: &SqlitePool,
    user_id: Uuid,
    name: &str,
    calories_per_100g: i64,
    quantity: f64,
    date: Option<&str>,
) -> Result<FoodEntryWithFoodRow, CalcError> {
    let quantity = validate_quantity(quantity)?;
    let date = normalize_date(date).ok_or(CalcError::BadDate)?;

    let mut tx = db.begin().await.context("begin custom entry tx")?;
    let food = insert_food_tx(
        &mut tx,
        &NewFood {
            name: name.to_string(),
            calories_per_100g,
            protein: 0.0,
            carbohydrates: 0.0,
            fat: 0.0,
            serving_size: 100,
            category: CUSTOM_CATEGORY.to_string(),
        },
        &[NewServing { description: BASE_SERVING, grams: 100.0 }],
    )
    .await?;
    let calculated = CalculatedEntry {
        food_id: food.id,
        serving_desc: BASE_SERVING.to_string(),
        quantity,
        date,
        calories: entry_calories(food.calories_per_100g, 100.0, quantity),
    };
    let entry = insert_entry_tx(&mut tx, user_id, &calculated, None, 0, OffsetDateTime::now_utc())
        .await?;
    tx.commit().await.context("commit custom entry tx")?;

    info!(%user_id, entry_id = %entry.id, food_id = %food.id, "custom food entry logged");
    fetch_created(db, user_id, entry.id).await
}

async fn fetch_created(
    db: &SqlitePool,
    user_id: Uuid,
    entry_id: Uuid,
) -> Result<FoodEntryWithFoodRow, CalcError> {
    let row = find_entry(db, user_id, entry_id)
        .await?
        .context("entry vanished after insert")?;
    Ok(row)
}
