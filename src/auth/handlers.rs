use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        extractors::AuthUser,
        services::AuthService,
    },
    error::AppError,
    extract::ValidJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

#[instrument(skip(auth, payload))]
pub async fn register(
    State(auth): State<AuthService>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let req = payload.normalized()?;
    Ok(Json(auth.register(req).await?))
}

#[instrument(skip(auth, payload))]
pub async fn login(
    State(auth): State<AuthService>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let req = payload.normalized()?;
    Ok(Json(auth.login(req).await?))
}

#[instrument(skip(auth))]
pub async fn get_me(
    State(auth): State<AuthService>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    Ok(Json(auth.current_user(user_id).await?))
}
