use axum::{
    extract::{Path, Query, State},
    routing::{delete, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{CreateEntryRequest, DateQuery, DirectEntryRequest, FoodEntryView};
use super::repo;
use super::services::{append, append_custom, EntryInput};
use crate::{
    auth::{dto::MessageResponse, services::AuthUser},
    dates::{format_date, normalize_date, parse_date},
    error::ApiError,
    state::AppState,
};

pub fn entry_routes() -> Router<AppState> {
    Router::new()
        .route("/food-entries", post(create_entry).get(list_entries))
        .route("/food-entries/direct", post(create_direct_entry))
        .route("/food-entries/:id", delete(delete_entry))
}

#[instrument(skip(state, body))]
pub async fn create_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateEntryRequest>,
) -> Result<Json<FoodEntryView>, ApiError> {
    let row = append(
        &state.db,
        user_id,
        EntryInput {
            food_id: body.food_id,
            serving_desc: body.serving_desc,
            quantity: body.quantity,
            date: body.date,
        },
    )
    .await?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, body))]
pub async fn create_direct_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<DirectEntryRequest>,
) -> Result<Json<FoodEntryView>, ApiError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Food name is required".into()));
    }
    if body.calories < 0 {
        return Err(ApiError::Validation("Calories must not be negative".into()));
    }
    let row = append_custom(
        &state.db,
        user_id,
        name,
        body.calories,
        body.quantity,
        body.date.as_deref(),
    )
    .await?;
    Ok(Json(row.into()))
}

/// Entries for `?date=` (today when absent) or for `?startDate=&endDate=`.
#[instrument(skip(state))]
pub async fn list_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DateQuery>,
) -> Result<Json<Vec<FoodEntryView>>, ApiError> {
    let invalid = || ApiError::Validation("Invalid date format, use YYYY-MM-DD".into());
    let rows = match (q.start_date.as_deref(), q.end_date.as_deref()) {
        (None, None) => {
            let date = normalize_date(q.date.as_deref()).ok_or_else(invalid)?;
            repo::list_by_date(&state.db, user_id, &date).await?
        }
        (Some(start), Some(end)) => {
            let start = parse_date(start).map(format_date).ok_or_else(invalid)?;
            let end = parse_date(end).map(format_date).ok_or_else(invalid)?;
            repo::list_by_range(&state.db, user_id, &start, &end).await?
        }
        _ => {
            return Err(ApiError::Validation(
                "startDate and endDate must be given together".into(),
            ))
        }
    };
    Ok(Json(rows.into_iter().map(FoodEntryView::from).collect()))
}

#[instrument(skip(state))]
pub async fn delete_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !repo::delete_entry(&state.db, user_id, id).await? {
        warn!(%user_id, entry_id = %id, "delete of missing or foreign entry");
        return Err(ApiError::NotFound);
    }
    info!(%user_id, entry_id = %id, "food entry deleted");
    Ok(Json(MessageResponse {
        message: "Food entry deleted".into(),
    }))
}
