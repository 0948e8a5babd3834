use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    DailyStats, ProfileResponse, StatsQuery, UpdateProfileRequest, UpdateProfileResponse,
    WeeklyStats, WeeklyStatsQuery,
};
use super::services::{self, merge_measurement};
use crate::{
    auth::{
        repo_types::{MeasurementsUpdate, User},
        services::AuthUser,
    },
    dates::{format_date, normalize_date, parse_date, today},
    error::ApiError,
    measurements::Goal,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/profile", get(get_profile).put(update_profile))
        .route("/user/stats", get(daily_stats))
        .route("/user/weekly-stats", get(weekly_stats))
}

/// A valid token whose user is gone is treated as unauthenticated.
async fn load_user(state: &AppState, user_id: Uuid) -> Result<User, ApiError> {
    User::find_by_id(&state.db, user_id).await?.ok_or_else(|| {
        warn!(%user_id, "token for unknown user");
        ApiError::Unauthorized("User not found".into())
    })
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = load_user(&state, user_id).await?;
    Ok(Json(services::profile(&user, today())))
}

#[instrument(skip(state, body))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>, ApiError> {
    let user = load_user(&state, user_id).await?;

    let goal = match body.goal.as_deref() {
        None => Goal::parse_or_default(&user.goal),
        Some(raw) => Goal::parse(raw)
            .ok_or_else(|| ApiError::Validation("Goal must be lose, maintain or gain".into()))?,
    };
    let update = MeasurementsUpdate {
        weight: merge_measurement("currentWeight", body.current_weight, user.weight)?,
        height: merge_measurement("height", body.height, user.height)?,
        neck: merge_measurement("neckMeasurement", body.neck_measurement, user.neck)?,
        waist: merge_measurement("waistMeasurement", body.waist_measurement, user.waist)?,
        hip: merge_measurement("hipMeasurement", body.hip_measurement, user.hip)?,
        goal,
    };

    let updated = User::update_measurements(&state.db, user_id, &update)
        .await?
        .ok_or(ApiError::NotFound)?;
    let m = updated.measurements();
    let derived = m.derive(today());

    info!(%user_id, goal = m.goal.as_str(), needed = derived.needed_calories, "profile updated");
    Ok(Json(UpdateProfileResponse {
        fat_percentage: derived.fat_percentage,
        goal: m.goal,
        needed_calories: derived.needed_calories,
    }))
}

/// Intake for `?date=` (today when absent) against the daily target.
#[instrument(skip(state))]
pub async fn daily_stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<StatsQuery>,
) -> Result<Json<DailyStats>, ApiError> {
    let date = normalize_date(q.date.as_deref())
        .ok_or_else(|| ApiError::Validation("Invalid date format, use YYYY-MM-DD".into()))?;
    let user = load_user(&state, user_id).await?;
    let stats = services::daily_stats(&state.db, &user, &date, today()).await?;
    Ok(Json(stats))
}

#[instrument(skip(state))]
pub async fn weekly_stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<WeeklyStatsQuery>,
) -> Result<Json<WeeklyStats>, ApiError> {
    let (Some(start), Some(end)) = (q.start_date.as_deref(), q.end_date.as_deref()) else {
        return Err(ApiError::Validation("startDate and endDate are required".into()));
    };
    let (Some(start), Some(end)) = (parse_date(start), parse_date(end)) else {
        return Err(ApiError::Validation("Invalid date format, use YYYY-MM-DD".into()));
    };
    let user = load_user(&state, user_id).await?;
    let stats = services::weekly_stats(
        &state.db,
        &user,
        &format_date(start),
        &format_date(end),
        today(),
    )
    .await?;
    Ok(Json(stats))
}
