use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, MessageResponse, PublicUser, RegisterRequest},
        repo::is_unique_violation,
        repo_types::{NewUser, User},
        services::{hash_password, is_valid_email, verify_password, JwtKeys},
    },
    dates::{format_date, parse_date},
    error::ApiError,
    measurements::{Gender, Goal},
    state::AppState,
    users::services::optional_measurement,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    let name = payload.name.trim().to_string();

    if name.is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.password.is_empty() {
        return Err(ApiError::Validation("Password is required".into()));
    }
    let gender = Gender::parse(&payload.gender)
        .ok_or_else(|| ApiError::Validation("Gender must be male or female".into()))?;
    let birthday = parse_date(&payload.birthday)
        .map(format_date)
        .ok_or_else(|| ApiError::Validation("Birthday must be YYYY-MM-DD".into()))?;
    let goal = match payload.goal.as_deref() {
        None | Some("") => Goal::Maintain,
        Some(raw) => Goal::parse(raw)
            .ok_or_else(|| ApiError::Validation("Goal must be lose, maintain or gain".into()))?,
    };

    let new_user = NewUser {
        name,
        email: payload.email.clone(),
        password_hash: String::new(),
        gender,
        birthday,
        weight: optional_measurement("weight", payload.weight)?,
        height: optional_measurement("height", payload.height)?,
        waist: optional_measurement("waist", payload.waist)?,
        neck: optional_measurement("neck", payload.neck)?,
        hip: optional_measurement("hip", payload.hip)?,
        goal,
    };

    // Ensure email is not taken
    if User::find_by_email(&state.db, &new_user.email).await?.is_some() {
        warn!(email = %new_user.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "hash_password failed");
            return Err(ApiError::Internal);
        }
    };
    let new_user = NewUser {
        password_hash,
        ..new_user
    };

    let user = match User::create(&state.db, &new_user).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %new_user.email, "email registered concurrently");
            return Err(ApiError::Conflict("Email already registered".into()));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(ApiError::Internal);
        }
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(MessageResponse {
        message: "User registered successfully".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let user = match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(ApiError::Internal);
        }
    };

    let ok = match verify_password(&payload.password, &user.password_hash) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "verify_password failed");
            return Err(ApiError::Internal);
        }
    };

    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = match keys.sign(user.id) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "jwt sign failed");
            return Err(ApiError::Internal);
        }
    };

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: PublicUser {
            id: user.id,
            name: user.name,
            email: user.email,
        },
    }))
}
