use std::collections::HashMap;

use anyhow::Context;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::repo_types::{Food, FoodServing, NewFood, NewServing};

const FOOD_COLUMNS: &str =
    "id, name, calories_per_100g, protein, carbohydrates, fat, serving_size, category";

pub async fn count_foods(db: &SqlitePool) -> anyhow::Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM foods WHERE deleted_at IS NULL")
        .fetch_one(db)
        .await
        .context("count foods")?;
    Ok(count)
}

pub async fn find_food(db: &SqlitePool, id: Uuid) -> anyhow::Result<Option<Food>> {
    let food = sqlx::query_as::<_, Food>(&format!(
        "SELECT {FOOD_COLUMNS} FROM foods WHERE id = ?1 AND deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find food")?;
    Ok(food)
}

/// Exact match on the serving description.
pub async fn find_serving(
    db: &SqlitePool,
    food_id: Uuid,
    description: &str,
) -> anyhow::Result<Option<FoodServing>> {
    let serving = sqlx::query_as::<_, FoodServing>(
        r#"
        SELECT id, food_id, description, grams
          FROM food_servings
         WHERE food_id = ?1 AND description = ?2
        "#,
    )
    .bind(food_id)
    .bind(description)
    .fetch_optional(db)
    .await
    .context("find serving")?;
    Ok(serving)
}

/// Every food with its servings, ordered by name.
pub async fn list_with_servings(
    db: &SqlitePool,
) -> anyhow::Result<Vec<(Food, Vec<FoodServing>)>> {
    let foods = sqlx::query_as::<_, Food>(&format!(
        "SELECT {FOOD_COLUMNS} FROM foods WHERE deleted_at IS NULL ORDER BY name ASC, rowid ASC"
    ))
    .fetch_all(db)
    .await
    .context("list foods")?;

    let servings = sqlx::query_as::<_, FoodServing>(
        r#"
        SELECT id, food_id, description, grams
          FROM food_servings
         ORDER BY rowid ASC
        "#,
    )
    .fetch_all(db)
    .await
    .context("list servings")?;

    let mut by_food: HashMap<Uuid, Vec<FoodServing>> = HashMap::new();
    for s in servings {
        by_food.entry(s.food_id).or_default().push(s);
    }

    Ok(foods
        .into_iter()
        .map(|f| {
            let servings = by_food.remove(&f.id).unwrap_or_default();
            (f, servings)
        })
        .collect())
}

/// Insert a food and its servings on an open connection or transaction.
pub async fn insert_food_tx(
    conn: &mut SqliteConnection,
    food: &NewFood,
    servings: &[NewServing],
) -> anyhow::Result<Food> {
    let inserted = sqlx::query_as::<_, Food>(&format!(
        r#"
        INSERT INTO foods (id, name, calories_per_100g, protein, carbohydrates, fat,
                           serving_size, category)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        RETURNING {FOOD_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(&food.name)
    .bind(food.calories_per_100g)
    .bind(food.protein)
    .bind(food.carbohydrates)
    .bind(food.fat)
    .bind(food.serving_size)
    .bind(&food.category)
    .fetch_one(&mut *conn)
    .await
    .with_context(|| format!("insert food {}", food.name))?;

    for s in servings {
        sqlx::query(
            r#"
            INSERT INTO food_servings (id, food_id, description, grams)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(inserted.id)
        .bind(s.description)
        .bind(s.grams)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("insert serving {} for {}", s.description, food.name))?;
    }

    Ok(inserted)
}
