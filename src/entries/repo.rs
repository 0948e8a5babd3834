use anyhow::Context;
use sqlx::{SqliteConnection, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{FoodEntry, FoodEntryWithFoodRow};
use super::services::CalculatedEntry;

const ENTRY_COLUMNS: &str = "id, user_id, food_id, serving_desc, quantity, date, \
                             calories, food_set_id, created_at";

pub(crate) const ENTRY_WITH_FOOD_SELECT: &str = r#"
    SELECT e.id, e.user_id, e.food_id, e.serving_desc, e.quantity, e.date, e.calories,
           e.food_set_id, e.created_at,
           f.name AS food_name, f.calories_per_100g AS food_calories_per_100g,
           f.protein AS food_protein, f.carbohydrates AS food_carbohydrates,
           f.fat AS food_fat, f.serving_size AS food_serving_size,
           f.category AS food_category
      FROM food_entries e
      JOIN foods f ON f.id = e.food_id
"#;

/// Insert one entry on an open connection or transaction.
pub async fn insert_entry_tx(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    entry: &CalculatedEntry,
    food_set_id: Option<Uuid>,
    position: i64,
    created_at: OffsetDateTime,
) -> anyhow::Result<FoodEntry> {
    let row = sqlx::query_as::<_, FoodEntry>(&format!(
        r#"
        INSERT INTO food_entries (id, user_id, food_id, serving_desc, quantity, date,
                                  calories, food_set_id, position, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        RETURNING {ENTRY_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(entry.food_id)
    .bind(&entry.serving_desc)
    .bind(entry.quantity)
    .bind(&entry.date)
    .bind(entry.calories)
    .bind(food_set_id)
    .bind(position)
    .bind(created_at)
    .fetch_one(&mut *conn)
    .await
    .context("insert food entry")?;
    Ok(row)
}

/// A single ledger entry owned by `user_id`.
pub async fn find_entry(
    db: &SqlitePool,
    user_id: Uuid,
    entry_id: Uuid,
) -> anyhow::Result<Option<FoodEntryWithFoodRow>> {
    let row = sqlx::query_as::<_, FoodEntryWithFoodRow>(&format!(
        "{ENTRY_WITH_FOOD_SELECT} WHERE e.id = ?1 AND e.user_id = ?2"
    ))
    .bind(entry_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("find food entry")?;
    Ok(row)
}

/// Ledger entries for one calendar day, newest first.
pub async fn list_by_date(
    db: &SqlitePool,
    user_id: Uuid,
    date: &str,
) -> anyhow::Result<Vec<FoodEntryWithFoodRow>> {
    let rows = sqlx::query_as::<_, FoodEntryWithFoodRow>(&format!(
        r#"{ENTRY_WITH_FOOD_SELECT}
         WHERE e.user_id = ?1 AND e.date = ?2
         ORDER BY e.rowid DESC
        "#
    ))
    .bind(user_id)
    .bind(date)
    .fetch_all(db)
    .await
    .context("list food entries by date")?;
    Ok(rows)
}

/// Ledger entries whose date lies in `[start, end]`, newest first.
pub async fn list_by_range(
    db: &SqlitePool,
    user_id: Uuid,
    start: &str,
    end: &str,
) -> anyhow::Result<Vec<FoodEntryWithFoodRow>> {
    let rows = sqlx::query_as::<_, FoodEntryWithFoodRow>(&format!(
        r#"{ENTRY_WITH_FOOD_SELECT}
         WHERE e.user_id = ?1 AND e.date >= ?2 AND e.date <= ?3
         ORDER BY e.rowid DESC
        "#
    ))
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await
    .context("list food entries by range")?;
    Ok(rows)
}

/// Sum of ledger calories for dates in `[start, end]`.
pub async fn sum_calories_in_range(
    db: &SqlitePool,
    user_id: Uuid,
    start: &str,
    end: &str,
) -> anyhow::Result<f64> {
    let total = sqlx::query_scalar::<_, f64>(
        r#"
        SELECT COALESCE(SUM(calories), 0.0)
          FROM food_entries
         WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_one(db)
    .await
    .context("sum calories in range")?;
    Ok(total)
}

/// Deletes an entry if `user_id` owns it. Returns whether a row went away.
pub async fn delete_entry(db: &SqlitePool, user_id: Uuid, entry_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query(
        r#"
        DELETE FROM food_entries
         WHERE id = ?1 AND user_id = ?2
        "#,
    )
    .bind(entry_id)
    .bind(user_id)
    .execute(db)
    .await
    .context("delete food entry")?;
    Ok(res.rows_affected() > 0)
}
