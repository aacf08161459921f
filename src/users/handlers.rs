use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::AccountError,
    identity::Identifiable,
    state::AppState,
    users::{
        dto::{LoginRequest, PublicUser, RegisterRequest},
        manager::UserFields,
    },
};

const PASSWORD_MIN_LENGTH: usize = 8;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/:id", get(get_user))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

fn reject(e: AccountError) -> (StatusCode, String) {
    let status = e.status_code();
    if status.is_server_error() {
        error!(error = %e, "request failed");
        (status, "Internal server error".into())
    } else {
        (status, e.to_string())
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), (StatusCode, String)> {
    if payload.password.chars().count() < PASSWORD_MIN_LENGTH {
        warn!("password too short");
        return Err((StatusCode::BAD_REQUEST, "Password too short".into()));
    }

    let extra = UserFields {
        first_name: payload.first_name,
        last_name: payload.last_name,
        ..UserFields::default()
    };
    let user = state
        .users
        .create_user(&payload.email, Some(&payload.password), extra)
        .await
        .map_err(reject)?;

    info!(user_id = %user.id(), email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    match state.users.get(id).await.map_err(reject)? {
        Some(user) => Ok(Json(user.into())),
        None => Err(reject(AccountError::NotFound(id))),
    }
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let user = state
        .users
        .authenticate(&payload.email, &payload.password)
        .await
        .map_err(reject)?;

    let Some(mut user) = user else {
        warn!("login rejected");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    };

    state.users.record_login(&mut user).await.map_err(reject)?;
    info!(user_id = %user.id(), email = %user.email, "user logged in");
    Ok(Json(user.into()))
}
