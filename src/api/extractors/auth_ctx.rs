use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AppError;
use crate::repos::Role;
use crate::services::auth::policy::{self, EndpointClass};
use crate::state::AppState;

/// Caller identity resolved from the session cookie, valid for one request.
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthCtx {
    pub fn new(user_id: Uuid, email: String, role: Role) -> Self {
        Self {
            user_id,
            email,
            role,
        }
    }
}

/// Handler で、 AuthCtx を受け取るための extractor
/// middleware が AuthCtx を request.extensions() に insert 済みである前提
/// 見つからない場合は 401 を返す（認証がかかってない・ミドルウェア未設定）
pub struct AuthCtxExtractor(pub AuthCtx);

impl FromRequestParts<AppState> for AuthCtxExtractor
where
    AppState: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ctx = parts.extensions.get::<AuthCtx>().cloned();
        policy::authorize(ctx.as_ref(), EndpointClass::AuthenticatedOnly)?;
        ctx.map(AuthCtxExtractor).ok_or(AppError::Unauthenticated)
    }
}

/// Optional variant for endpoints whose policy decision needs more than
/// "is a caller present" (admin gates, ownership checks) or none at all.
pub struct MaybeAuthCtx(pub Option<AuthCtx>);

impl FromRequestParts<AppState> for MaybeAuthCtx
where
    AppState: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthCtx(parts.extensions.get::<AuthCtx>().cloned()))
    }
}
