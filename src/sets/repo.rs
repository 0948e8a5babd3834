use anyhow::Context;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::FoodSet;
use crate::entries::repo::ENTRY_WITH_FOOD_SELECT;
use crate::entries::repo_types::FoodEntryWithFoodRow;

pub async fn insert_set_tx(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    name: &str,
    description: &str,
    created_at: OffsetDateTime,
) -> anyhow::Result<FoodSet> {
    let set = sqlx::query_as::<_, FoodSet>(
        r#"
        INSERT INTO food_sets (id, user_id, name, description, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id, user_id, name, description, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(name)
    .bind(description)
    .bind(created_at)
    .fetch_one(&mut *conn)
    .await
    .context("insert food set")?;
    Ok(set)
}

pub async fn find_set<'e, E: SqliteExecutor<'e>>(
    exec: E,
    user_id: Uuid,
    set_id: Uuid,
) -> anyhow::Result<Option<FoodSet>> {
    let set = sqlx::query_as::<_, FoodSet>(
        r#"
        SELECT id, user_id, name, description, created_at
          FROM food_sets
         WHERE id = ?1 AND user_id = ?2
        "#,
    )
    .bind(set_id)
    .bind(user_id)
    .fetch_optional(exec)
    .await
    .context("find food set")?;
    Ok(set)
}

/// A set's entries in insertion order.
pub async fn set_entries<'e, E: SqliteExecutor<'e>>(
    exec: E,
    set_id: Uuid,
) -> anyhow::Result<Vec<FoodEntryWithFoodRow>> {
    let rows = sqlx::query_as::<_, FoodEntryWithFoodRow>(&format!(
        "{ENTRY_WITH_FOOD_SELECT} WHERE e.food_set_id = ?1 ORDER BY e.position ASC, e.rowid ASC"
    ))
    .bind(set_id)
    .fetch_all(exec)
    .await
    .context("list food set entries")?;
    Ok(rows)
}

pub async fn list_sets(db: &SqlitePool, user_id: Uuid) -> anyhow::Result<Vec<FoodSet>> {
    let sets = sqlx::query_as::<_, FoodSet>(
        r#"
        SELECT id, user_id, name, description, created_at
          FROM food_sets
         WHERE user_id = ?1
         ORDER BY rowid DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list food sets")?;
    Ok(sets)
}

/// Entries of every set the user owns, grouped by set and in insertion order.
pub async fn list_all_set_entries(
    db: &SqlitePool,
    user_id: Uuid,
) -> anyhow::Result<Vec<FoodEntryWithFoodRow>> {
    let rows = sqlx::query_as::<_, FoodEntryWithFoodRow>(&format!(
        r#"{ENTRY_WITH_FOOD_SELECT}
         WHERE e.user_id = ?1 AND e.food_set_id IS NOT NULL
         ORDER BY e.food_set_id, e.position ASC, e.rowid ASC
        "#
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list entries of all food sets")?;
    Ok(rows)
}

/// Removes the set and, explicitly, every entry bound to it.
pub async fn delete_set_tx(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    set_id: Uuid,
) -> anyhow::Result<bool> {
    sqlx::query("DELETE FROM food_entries WHERE food_set_id = ?1 AND user_id = ?2")
        .bind(set_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .context("delete food set entries")?;

    let res = sqlx::query("DELETE FROM food_sets WHERE id = ?1 AND user_id = ?2")
        .bind(set_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .context("delete food set")?;
    Ok(res.rows_affected() > 0)
}
