use std::collections::HashMap;

use anyhow::Context;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::repo;
use super::repo_types::FoodSet;
use crate::entries::repo::insert_entry_tx;
use crate::entries::repo_types::FoodEntryWithFoodRow;
use crate::entries::services::{calculate, CalcError, CalculatedEntry, EntryInput};

/// Prices every entry, then writes the set and its entries in one transaction.
pub async fn create_set(
    db: &SqlitePool,
    user_id: Uuid,
    name: &str,
    description: &str,
    inputs: Vec<EntryInput>,
) -> Result<(FoodSet, Vec<FoodEntryWithFoodRow>), CalcError> {
    let mut calculated = Vec::with_capacity(inputs.len());
    for input in inputs {
        calculated.push(calculate(db, input).await?);
    }

    let now = OffsetDateTime::now_utc();
    let mut tx = db.begin().await.context("begin create set tx")?;
    let set = repo::insert_set_tx(&mut tx, user_id, name, description, now).await?;
    for (position, entry) in calculated.iter().enumerate() {
        insert_entry_tx(&mut tx, user_id, entry, Some(set.id), position as i64, now).await?;
    }
    tx.commit().await.context("commit create set tx")?;

    info!(%user_id, set_id = %set.id, entries = calculated.len(), "food set created");
    let entries = repo::set_entries(db, set.id).await?;
    Ok((set, entries))
}

/// All of the user's sets with their entries.
pub async fn list_sets(
    db: &SqlitePool,
    user_id: Uuid,
) -> anyhow::Result<Vec<(FoodSet, Vec<FoodEntryWithFoodRow>)>> {
    let sets = repo::list_sets(db, user_id).await?;
    let mut by_set: HashMap<Uuid, Vec<FoodEntryWithFoodRow>> = HashMap::new();
    for row in repo::list_all_set_entries(db, user_id).await? {
        if let Some(set_id) = row.entry.food_set_id {
            by_set.entry(set_id).or_default().push(row);
        }
    }
    Ok(sets
        .into_iter()
        .map(|s| {
            let entries = by_set.remove(&s.id).unwrap_or_default();
            (s, entries)
        })
        .collect())
}

/// Clones the set's entries onto `date` as fresh ledger entries.
///
/// Calories are copied, not recomputed. Returns `None` when the set is missing
/// or belongs to someone else.
pub async fn apply_set(
    db: &SqlitePool,
    user_id: Uuid,
    set_id: Uuid,
    date: &str,
) -> anyhow::Result<Option<Vec<FoodEntryWithFoodRow>>> {
    let mut tx = db.begin().await.context("begin apply set tx")?;
    if repo::find_set(&mut *tx, user_id, set_id).await?.is_none() {
        return Ok(None);
    }
    let templates = repo::set_entries(&mut *tx, set_id).await?;

    let now = OffsetDateTime::now_utc();
    let mut applied = Vec::with_capacity(templates.len());
    for (position, template) in templates.into_iter().enumerate() {
        let clone = CalculatedEntry {
            food_id: template.entry.food_id,
            serving_desc: template.entry.serving_desc.clone(),
            quantity: template.entry.quantity,
            date: date.to_string(),
            calories: template.entry.calories,
        };
        let entry = insert_entry_tx(&mut tx, user_id, &clone, None, position as i64, now).await?;
        applied.push(FoodEntryWithFoodRow { entry, ..template });
    }
    tx.commit().await.context("commit apply set tx")?;

    info!(%user_id, %set_id, %date, entries = applied.len(), "food set applied");
    Ok(Some(applied))
}

/// Deletes a set and its bound entries. Entries previously applied from it stay.
pub async fn delete_set(db: &SqlitePool, user_id: Uuid, set_id: Uuid) -> anyhow::Result<bool> {
    let mut tx = db.begin().await.context("begin delete set tx")?;
    if !repo::delete_set_tx(&mut tx, user_id, set_id).await? {
        tx.rollback().await.context("rollback delete set tx")?;
        return Ok(false);
    }
    tx.commit().await.context("commit delete set tx")?;
    info!(%user_id, %set_id, "food set deleted");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::{NewUser, User};
    use crate::entries::repo::{delete_entry, list_by_date, sum_calories_in_range};
    use crate::foods::repo::insert_food_tx;
    use crate::foods::repo_types::{NewFood, NewServing};
    use crate::measurements::{Gender, Goal};
    use crate::state::AppState;

    async fn create_user(state: &AppState, email: &str) -> Uuid {
        User::create(
            &state.db,
            &NewUser {
                name: "A".into(),
                email: email.into(),
                password_hash: "hash".into(),
                gender: Gender::Female,
                birthday: "1992-02-02".into(),
                weight: None,
                height: None,
                waist: None,
                neck: None,
                hip: None,
                goal: Goal::Maintain,
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn seed_food(state: &AppState, name: &str, calories: i64) -> Uuid {
        let mut tx = state.db.begin().await.unwrap();
        let food = insert_food_tx(
            &mut tx,
            &NewFood {
                name: name.into(),
                calories_per_100g: calories,
                protein: 0.0,
                carbohydrates: 0.0,
                fat: 0.0,
                serving_size: 100,
                category: "General".into(),
            },
            &[NewServing { description: "100 grams", grams: 100.0 }],
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();
        food.id
    }

    fn grams100(food_id: Uuid, quantity: f64) -> EntryInput {
        EntryInput {
            food_id,
            serving_desc: "100 grams".into(),
            quantity,
            date: Some("2024-03-01".into()),
        }
    }

    /// Three entries worth 100 + 150 + 250 = 500 kcal.
    async fn breakfast(state: &AppState, user: Uuid) -> FoodSet {
        let oats = seed_food(state, "Oats", 100).await;
        let milk = seed_food(state, "Milk", 50).await;
        let jam = seed_food(state, "Jam", 250).await;
        let (set, entries) = create_set(
            &state.db,
            user,
            "Breakfast",
            "weekday",
            vec![grams100(oats, 1.0), grams100(milk, 3.0), grams100(jam, 1.0)],
        )
        .await
        .unwrap();
        let total: f64 = entries.iter().map(|e| e.entry.calories).sum();
        assert_eq!(total, 500.0);
        set
    }

    #[tokio::test]
    async fn create_keeps_entry_order_and_logs_entries_on_their_date() {
        let state = AppState::for_tests().await;
        let user = create_user(&state, "a@x").await;
        let set = breakfast(&state, user).await;

        let sets = list_sets(&state.db, user).await.unwrap();
        assert_eq!(sets.len(), 1);
        let names: Vec<_> = sets[0].1.iter().map(|e| e.food_name.as_str()).collect();
        assert_eq!(names, vec!["Oats", "Milk", "Jam"]);
        assert_eq!(sets[0].0.id, set.id);

        let day = list_by_date(&state.db, user, "2024-03-01").await.unwrap();
        assert_eq!(day.len(), 3);
        assert!(day.iter().all(|e| e.entry.food_set_id == Some(set.id)));
        let total = sum_calories_in_range(&state.db, user, "2024-03-01", "2024-03-01")
            .await
            .unwrap();
        assert_eq!(total, 500.0);
    }

    #[tokio::test]
    async fn owner_can_delete_an_entry_bound_to_a_set() {
        let state = AppState::for_tests().await;
        let user = create_user(&state, "a@x").await;
        let other = create_user(&state, "b@x").await;
        breakfast(&state, user).await;

        let bound = list_by_date(&state.db, user, "2024-03-01").await.unwrap();
        let id = bound[0].entry.id;
        assert!(!delete_entry(&state.db, other, id).await.unwrap());
        assert!(delete_entry(&state.db, user, id).await.unwrap());

        assert_eq!(list_by_date(&state.db, user, "2024-03-01").await.unwrap().len(), 2);
        assert_eq!(list_sets(&state.db, user).await.unwrap()[0].1.len(), 2);
    }

    #[tokio::test]
    async fn create_fails_whole_set_on_bad_entry() {
        let state = AppState::for_tests().await;
        let user = create_user(&state, "a@x").await;
        let oats = seed_food(&state, "Oats", 100).await;

        let err = create_set(
            &state.db,
            user,
            "Broken",
            "",
            vec![grams100(oats, 1.0), grams100(Uuid::new_v4(), 1.0)],
        )
        .await;
        assert!(matches!(err, Err(CalcError::UnknownFood)));
        assert!(list_sets(&state.db, user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn applying_twice_makes_two_batches_and_leaves_set_alone() {
        let state = AppState::for_tests().await;
        let user = create_user(&state, "a@x").await;
        let set = breakfast(&state, user).await;

        let first = apply_set(&state.db, user, set.id, "2024-03-02").await.unwrap().unwrap();
        let second = apply_set(&state.db, user, set.id, "2024-03-03").await.unwrap().unwrap();
        assert_eq!(first.len(), 3);
        assert!(first.iter().all(|e| e.entry.food_set_id.is_none()));
        assert!(first.iter().all(|e| e.entry.date == "2024-03-02"));
        assert!(first.iter().all(|a| second.iter().all(|b| a.entry.id != b.entry.id)));

        let week = sum_calories_in_range(&state.db, user, "2024-03-02", "2024-03-08").await.unwrap();
        assert_eq!(week, 1000.0);

        let sets = list_sets(&state.db, user).await.unwrap();
        assert_eq!(sets[0].1.len(), 3);
        assert!(sets[0].1.iter().all(|e| e.entry.date == "2024-03-01"));
    }

    #[tokio::test]
    async fn apply_of_foreign_set_is_none() {
        let state = AppState::for_tests().await;
        let owner = create_user(&state, "a@x").await;
        let other = create_user(&state, "b@x").await;
        let set = breakfast(&state, owner).await;

        assert!(apply_set(&state.db, other, set.id, "2024-03-02").await.unwrap().is_none());
        assert!(apply_set(&state.db, owner, Uuid::new_v4(), "2024-03-02").await.unwrap().is_none());
        assert!(list_by_date(&state.db, other, "2024-03-02").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_cascades_to_bound_entries_only() {
        let state = AppState::for_tests().await;
        let user = create_user(&state, "a@x").await;
        let other = create_user(&state, "b@x").await;
        let set = breakfast(&state, user).await;
        apply_set(&state.db, user, set.id, "2024-03-02").await.unwrap().unwrap();

        assert!(!delete_set(&state.db, other, set.id).await.unwrap());
        assert_eq!(list_sets(&state.db, user).await.unwrap().len(), 1);

        assert!(delete_set(&state.db, user, set.id).await.unwrap());
        assert!(list_sets(&state.db, user).await.unwrap().is_empty());
        let bound: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM food_entries WHERE food_set_id = ?1")
            .bind(set.id)
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(bound, 0);
        assert_eq!(list_by_date(&state.db, user, "2024-03-02").await.unwrap().len(), 3);
        assert!(!delete_set(&state.db, user, set.id).await.unwrap());
    }
}
