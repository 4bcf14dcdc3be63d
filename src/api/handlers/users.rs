/*
 * Responsibility
 * - /users 系 handler
 * - 認可は policy::decide 経由で統一 (admin 一覧・self 更新/削除・admin 更新/削除)
 * - 自分の email/password を変えたら新しい session cookie を焼き直す
 */
use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::api::dto::users::{AdminUpdateUserRequest, UpdateMeRequest, UserResponse};
use crate::api::extractors::{AuthCtx, AuthCtxExtractor, MaybeAuthCtx};
use crate::error::AppError;
use crate::repos::User;
use crate::services::auth::{password, policy, policy::EndpointClass};
use crate::state::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    MaybeAuthCtx(caller): MaybeAuthCtx,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    policy::authorize(caller.as_ref(), EndpointClass::AdminOnly)?;

    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn get_me(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<UserResponse>, AppError> {
    let user = load_caller(&state, &ctx).await?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn update_me(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<UpdateMeRequest>,
) -> Result<Response, AppError> {
    req.validate().map_err(AppError::bad_request)?;

    let mut user = load_caller(&state, &ctx).await?;

    if let Some(email) = &req.email {
        ensure_email_free(&state, email, user.id).await?;
    }

    let refresh_session = req.changes_credentials();
    apply_self_update(&mut user, req)?;
    let saved = state.users.save(user).await?;

    if refresh_session {
        // The subject binding changed, so the current token dies with its
        // TTL; hand out a replacement minted for the identity we just
        // verified. The update itself is already committed: a minting
        // failure is reported, not rolled back.
        match state.auth.mint_session(&saved) {
            Ok(cookie) => {
                return Ok((
                    [(header::SET_COOKIE, cookie)],
                    "updated successfully",
                )
                    .into_response());
            }
            Err(err) => {
                tracing::warn!(
                    user_id = %saved.id,
                    error = %err,
                    "session refresh failed after credential update; client must log in again"
                );
            }
        }
    }

    Ok("updated successfully".into_response())
}

pub async fn delete_me(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Response, AppError> {
    let user = load_caller(&state, &ctx).await?;

    state.products.delete_by_owner(user.id).await?;
    state.users.delete_by_id(user.id).await?;

    Ok((
        [(header::SET_COOKIE, state.auth.logout_cookie())],
        "deleted successfully",
    )
        .into_response())
}

pub async fn update_user(
    State(state): State<AppState>,
    MaybeAuthCtx(caller): MaybeAuthCtx,
    Path(user_id): Path<Uuid>,
    Json(req): Json<AdminUpdateUserRequest>,
) -> Result<&'static str, AppError> {
    policy::authorize(caller.as_ref(), EndpointClass::AdminOnly)?;
    req.validate().map_err(AppError::bad_request)?;

    let mut user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    if let Some(email) = &req.email {
        ensure_email_free(&state, email, user.id).await?;
    }

    if let Some(name) = req.name {
        user.name = name.trim().to_string();
    }
    if let Some(email) = req.email {
        user.email = email;
    }
    if let Some(password_plain) = req.password {
        user.password_hash = password::hash_password(&password_plain)?;
    }
    if let Some(role) = req.role {
        user.role = role;
    }

    state.users.save(user).await?;
    Ok("updated successfully")
}

pub async fn delete_user(
    State(state): State<AppState>,
    MaybeAuthCtx(caller): MaybeAuthCtx,
    Path(user_id): Path<Uuid>,
) -> Result<&'static str, AppError> {
    policy::authorize(caller.as_ref(), EndpointClass::AdminOnly)?;

    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    state.products.delete_by_owner(user.id).await?;
    state.users.delete_by_id(user.id).await?;

    Ok("deleted successfully")
}

/// The resolved caller should always exist, but it can race with a
/// concurrent account deletion; surface that as not-found.
async fn load_caller(state: &AppState, ctx: &AuthCtx) -> Result<User, AppError> {
    state
        .users
        .find_by_id(ctx.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))
}

/// Email uniqueness is checked before any write that changes the address;
/// the store's unique constraint backstops races.
async fn ensure_email_free(state: &AppState, email: &str, self_id: Uuid) -> Result<(), AppError> {
    if let Some(existing) = state.users.find_by_email(email).await?
        && existing.id != self_id
    {
        return Err(AppError::DuplicateEmail);
    }
    Ok(())
}

fn apply_self_update(user: &mut User, req: UpdateMeRequest) -> Result<(), AppError> {
    if let Some(name) = req.name {
        user.name = name.trim().to_string();
    }
    if let Some(email) = req.email {
        user.email = email;
    }
    if let Some(password_plain) = req.password {
        user.password_hash = password::hash_password(&password_plain)?;
    }
    Ok(())
}
