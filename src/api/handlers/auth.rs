/*
 * Responsibility
 * - /auth 系 handler (login / register / logout)
 * - cookie の発行・破棄は AuthService 側に寄せ、ここは HTTP の形だけ扱う
 */
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
};

use crate::api::dto::auth::{LoginRequest, RegisterRequest};
use crate::api::dto::users::UserResponse;
use crate::error::AppError;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<([(header::HeaderName, String); 1], &'static str), AppError> {
    req.validate().map_err(AppError::bad_request)?;

    let cookie = state.auth.login(&req.email, &req.password).await?;

    Ok(([(header::SET_COOKIE, cookie)], "logged in successfully"))
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    req.validate().map_err(AppError::bad_request)?;

    let created = state
        .auth
        .register(req.name.trim().to_string(), req.email, &req.password)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(created))))
}

pub async fn logout(
    State(state): State<AppState>,
) -> ([(header::HeaderName, String); 1], &'static str) {
    (
        [(header::SET_COOKIE, state.auth.logout_cookie())],
        "logout successful",
    )
}
