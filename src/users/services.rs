//! Profile derivation and intake aggregation against the daily target.

use sqlx::SqlitePool;
use time::Date;

use super::dto::{DailyStats, ProfileResponse, WeeklyStats};
use crate::auth::repo_types::User;
use crate::entries::{repo, FoodEntryView};
use crate::error::ApiError;

/// Largest accepted weight (kg) or length (cm).
const MAX_MEASUREMENT: f64 = 1000.0;

/// Validates a client measurement: whole, within `[0, 1000]`, 0 meaning unknown.
pub fn optional_measurement(field: &str, value: Option<f64>) -> Result<Option<i64>, ApiError> {
    let Some(v) = value else {
        return Ok(None);
    };
    if !v.is_finite() || v < 0.0 {
        return Err(ApiError::Validation(format!("{field} must not be negative")));
    }
    if v > MAX_MEASUREMENT {
        return Err(ApiError::Validation(format!(
            "{field} must not exceed {MAX_MEASUREMENT}"
        )));
    }
    if v.fract() != 0.0 {
        return Err(ApiError::Validation(format!("{field} must be a whole number")));
    }
    Ok(if v == 0.0 { None } else { Some(v as i64) })
}

/// Applies an optional incoming value over the stored one.
pub fn merge_measurement(
    field: &str,
    incoming: Option<f64>,
    stored: Option<i64>,
) -> Result<Option<i64>, ApiError> {
    match incoming {
        None => Ok(stored),
        Some(_) => optional_measurement(field, incoming),
    }
}

pub fn profile(user: &User, today: Date) -> ProfileResponse {
    let m = user.measurements();
    let derived = m.derive(today);
    ProfileResponse {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        gender: m.gender,
        birthday: user.birthday.clone(),
        current_weight: user.weight,
        height: user.height,
        neck_measurement: user.neck,
        waist_measurement: user.waist,
        hip_measurement: user.hip,
        goal: m.goal,
        age: derived.age,
        fat_percentage: derived.fat_percentage,
        needed_calories: derived.needed_calories,
    }
}

/// Intake for one day compared with the user's current target.
pub async fn daily_stats(
    db: &SqlitePool,
    user: &User,
    date: &str,
    today: Date,
) -> anyhow::Result<DailyStats> {
    let rows = repo::list_by_date(db, user.id, date).await?;
    let daily_calories: f64 = rows.iter().map(|r| r.entry.calories).sum();

    let m = user.measurements();
    let derived = m.derive(today);
    Ok(DailyStats {
        daily_calories,
        needed_calories: derived.needed_calories,
        weight: user.weight,
        neck: user.neck,
        waist: user.waist,
        hip: user.hip,
        fat_percentage: derived.fat_percentage,
        goal: m.goal,
        age: derived.age,
        food_entries: rows.into_iter().map(FoodEntryView::from).collect(),
    })
}

/// Share of a seven-day target consumed; 0 when there is no target yet.
pub fn weekly_percentage(total_calories: f64, daily_target: i64) -> f64 {
    let weekly_goal = daily_target as f64 * 7.0;
    if weekly_goal <= 0.0 {
        return 0.0;
    }
    total_calories / weekly_goal * 100.0
}

pub async fn weekly_stats(
    db: &SqlitePool,
    user: &User,
    start: &str,
    end: &str,
    today: Date,
) -> anyhow::Result<WeeklyStats> {
    let total_calories = repo::sum_calories_in_range(db, user.id, start, end).await?;
    let target = user.measurements().derive(today).needed_calories;
    Ok(WeeklyStats {
        total_calories,
        average_percentage: weekly_percentage(total_calories, target),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::NewUser;
    use crate::entries::services::{append, EntryInput};
    use crate::foods::repo::insert_food_tx;
    use crate::foods::repo_types::{NewFood, NewServing};
    use crate::measurements::{Gender, Goal};
    use crate::state::AppState;
    use time::macros::date;
    use uuid::Uuid;

    const TODAY: Date = date!(2024 - 06 - 15);

    async fn measured_user(state: &AppState) -> User {
        User::create(
            &state.db,
            &NewUser {
                name: "A".into(),
                email: "a@x".into(),
                password_hash: "hash".into(),
                gender: Gender::Male,
                birthday: "1990-01-01".into(),
                weight: Some(80),
                height: Some(180),
                waist: Some(90),
                neck: Some(40),
                hip: None,
                goal: Goal::Maintain,
            },
        )
        .await
        .unwrap()
    }

    async fn seed_food(state: &AppState, calories: i64) -> Uuid {
        let mut tx = state.db.begin().await.unwrap();
        let food = insert_food_tx(
            &mut tx,
            &NewFood {
                name: "Food".into(),
                calories_per_100g: calories,
                protein: 0.0,
                carbohydrates: 0.0,
                fat: 0.0,
                serving_size: 100,
                category: "General".into(),
            },
            &[
                NewServing { description: "100 grams", grams: 100.0 },
                NewServing { description: "1 medium piece", grams: 150.0 },
            ],
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();
        food.id
    }

    async fn log(state: &AppState, user: &User, food: Uuid, serving: &str, date: &str) {
        append(
            &state.db,
            user.id,
            EntryInput {
                food_id: food,
                serving_desc: serving.into(),
                quantity: 1.0,
                date: Some(date.into()),
            },
        )
        .await
        .unwrap();
    }

    #[test]
    fn measurements_reject_negative_and_fractional_values() {
        assert_eq!(optional_measurement("height", None).unwrap(), None);
        assert_eq!(optional_measurement("height", Some(0.0)).unwrap(), None);
        assert_eq!(optional_measurement("height", Some(180.0)).unwrap(), Some(180));
        assert!(optional_measurement("height", Some(-1.0)).is_err());
        assert!(optional_measurement("height", Some(180.5)).is_err());
    }

    #[test]
    fn measurements_above_the_limit_are_rejected() {
        assert_eq!(optional_measurement("currentWeight", Some(1000.0)).unwrap(), Some(1000));
        assert!(matches!(
            optional_measurement("currentWeight", Some(1001.0)),
            Err(ApiError::Validation(_))
        ));
        assert!(optional_measurement("currentWeight", Some(1e300)).is_err());
    }

    #[test]
    fn merge_keeps_stored_value_when_absent() {
        assert_eq!(merge_measurement("hip", None, Some(90)).unwrap(), Some(90));
        assert_eq!(merge_measurement("hip", Some(0.0), Some(90)).unwrap(), None);
        assert_eq!(merge_measurement("hip", Some(95.0), Some(90)).unwrap(), Some(95));
    }

    #[test]
    fn weekly_percentage_guards_zero_goal() {
        assert_eq!(weekly_percentage(1000.0, 0), 0.0);
        assert_eq!(weekly_percentage(7000.0, 2000), 50.0);
    }

    #[test]
    fn weekly_percentage_does_not_overflow_on_huge_targets() {
        let p = weekly_percentage(100.0, i64::MAX);
        assert!(p > 0.0 && p < 1e-10);
    }

    #[tokio::test]
    async fn profile_recomputes_derived_fields() {
        let state = AppState::for_tests().await;
        let user = measured_user(&state).await;
        let p = profile(&user, TODAY);
        assert_eq!(p.age, 34);
        assert_eq!(p.fat_percentage, 18);
        assert_eq!(p.needed_calories, 2728);
        assert_eq!(p.current_weight, Some(80));
    }

    #[tokio::test]
    async fn daily_stats_sum_only_that_day() {
        let state = AppState::for_tests().await;
        let user = measured_user(&state).await;
        let apple = seed_food(&state, 52).await;
        let bar = seed_food(&state, 100).await;

        log(&state, &user, apple, "1 medium piece", "2024-03-01").await;
        log(&state, &user, bar, "100 grams", "2024-03-01").await;
        log(&state, &user, bar, "100 grams", "2024-03-02").await;

        let stats = daily_stats(&state.db, &user, "2024-03-01", TODAY).await.unwrap();
        assert_eq!(stats.daily_calories, 178.0);
        assert_eq!(stats.food_entries.len(), 2);
        assert_eq!(stats.needed_calories, 2728);
        assert_eq!(stats.goal, Goal::Maintain);

        let empty = daily_stats(&state.db, &user, "2024-04-01", TODAY).await.unwrap();
        assert_eq!(empty.daily_calories, 0.0);
        assert!(empty.food_entries.is_empty());
    }

    #[tokio::test]
    async fn weekly_stats_compare_against_seven_day_goal() {
        let state = AppState::for_tests().await;
        let user = measured_user(&state).await;
        let bar = seed_food(&state, 100).await;
        for d in ["2024-03-01", "2024-03-02", "2024-03-08", "2024-03-09"] {
            log(&state, &user, bar, "100 grams", d).await;
        }

        let week = weekly_stats(&state.db, &user, "2024-03-02", "2024-03-08", TODAY)
            .await
            .unwrap();
        assert_eq!(week.total_calories, 200.0);
        let expected = 200.0 / (2728.0 * 7.0) * 100.0;
        assert!((week.average_percentage - expected).abs() < 1e-9);
    }

    #[tokio::test]
    async fn weekly_stats_without_measurements_report_zero_percentage() {
        let state = AppState::for_tests().await;
        let mut user = measured_user(&state).await;
        user.weight = None;
        let week = weekly_stats(&state.db, &user, "2024-03-02", "2024-03-08", TODAY)
            .await
            .unwrap();
        assert_eq!(week, WeeklyStats { total_calories: 0.0, average_percentage: 0.0 });
    }
}
