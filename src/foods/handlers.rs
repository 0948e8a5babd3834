use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::dto::FoodWithServings;
use super::repo;
use crate::{auth::services::AuthUser, error::ApiError, state::AppState};

pub fn food_routes() -> Router<AppState> {
    Router::new().route("/foods", get(list_foods))
}

#[instrument(skip(state))]
pub async fn list_foods(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<FoodWithServings>>, ApiError> {
    let foods = repo::list_with_servings(&state.db).await?;
    Ok(Json(
        foods
            .into_iter()
            .map(|(food, servings)| FoodWithServings { food, servings })
            .collect(),
    ))
}
