use axum::{
    extract::{Path, Query, State},
    routing::{delete, post},
    Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::dto::{ApplyQuery, CreateSetRequest, FoodSetView};
use super::services;
use crate::{
    auth::{dto::MessageResponse, services::AuthUser},
    dates::normalize_date,
    entries::{services::EntryInput, FoodEntryView},
    error::ApiError,
    state::AppState,
};

pub fn set_routes() -> Router<AppState> {
    Router::new()
        .route("/food-sets", post(create_set).get(list_sets))
        .route("/food-sets/:id", delete(delete_set))
        .route("/food-sets/:id/apply", post(apply_set))
}

#[instrument(skip(state, body))]
pub async fn create_set(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateSetRequest>,
) -> Result<Json<FoodSetView>, ApiError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Set name is required".into()));
    }
    if body.entries.is_empty() {
        return Err(ApiError::Validation("A food set needs at least one entry".into()));
    }

    let inputs = body
        .entries
        .into_iter()
        .map(|e| EntryInput {
            food_id: e.food_id,
            serving_desc: e.serving_desc,
            quantity: e.quantity,
            date: e.date,
        })
        .collect();
    let (set, entries) =
        services::create_set(&state.db, user_id, name, body.description.trim(), inputs).await?;
    Ok(Json(FoodSetView::new(set, entries)))
}

#[instrument(skip(state))]
pub async fn list_sets(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<FoodSetView>>, ApiError> {
    let sets = services::list_sets(&state.db, user_id).await?;
    Ok(Json(
        sets.into_iter()
            .map(|(set, entries)| FoodSetView::new(set, entries))
            .collect(),
    ))
}

/// Clones the set onto `?date=`, today when absent.
#[instrument(skip(state))]
pub async fn apply_set(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Query(q): Query<ApplyQuery>,
) -> Result<Json<Vec<FoodEntryView>>, ApiError> {
    let date = normalize_date(q.date.as_deref())
        .ok_or_else(|| ApiError::Validation("Invalid date format, use YYYY-MM-DD".into()))?;
    match services::apply_set(&state.db, user_id, id, &date).await? {
        Some(rows) => Ok(Json(rows.into_iter().map(FoodEntryView::from).collect())),
        None => {
            warn!(%user_id, set_id = %id, "apply of missing or foreign food set");
            Err(ApiError::NotFound)
        }
    }
}

#[instrument(skip(state))]
pub async fn delete_set(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !services::delete_set(&state.db, user_id, id).await? {
        warn!(%user_id, set_id = %id, "delete of missing or foreign food set");
        return Err(ApiError::NotFound);
    }
    Ok(Json(MessageResponse {
        message: "Food set deleted".into(),
    }))
}
