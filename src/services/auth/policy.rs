//! Endpoint authorization policy.
//!
//! One pure decision function consulted by every handler, instead of
//! per-route access expressions scattered through the router. Owner checks
//! are made against the owner the caller fetched from the store in the
//! same request, so a decision never runs against stale ownership.

use uuid::Uuid;

use crate::api::extractors::AuthCtx;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointClass {
    Public,
    AuthenticatedOnly,
    AdminOnly,
    OwnerOrAdmin { owner_id: Uuid },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No caller resolved for the request.
    Unauthenticated,
    /// Caller resolved but lacks the required role or ownership.
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

pub fn decide(caller: Option<&AuthCtx>, class: EndpointClass) -> Decision {
    match class {
        EndpointClass::Public => Decision::Allow,
        EndpointClass::AuthenticatedOnly => match caller {
            Some(_) => Decision::Allow,
            None => Decision::Deny(DenyReason::Unauthenticated),
        },
        EndpointClass::AdminOnly => match caller {
            None => Decision::Deny(DenyReason::Unauthenticated),
            Some(c) if c.role.is_admin() => Decision::Allow,
            Some(_) => Decision::Deny(DenyReason::Forbidden),
        },
        EndpointClass::OwnerOrAdmin { owner_id } => match caller {
            None => Decision::Deny(DenyReason::Unauthenticated),
            Some(c) if c.role.is_admin() || c.user_id == owner_id => Decision::Allow,
            Some(_) => Decision::Deny(DenyReason::Forbidden),
        },
    }
}

impl From<DenyReason> for AppError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::Unauthenticated => AppError::Unauthenticated,
            DenyReason::Forbidden => AppError::Forbidden,
        }
    }
}

/// `decide` mapped onto the HTTP error space (401/403).
pub fn authorize(caller: Option<&AuthCtx>, class: EndpointClass) -> Result<(), AppError> {
    match decide(caller, class) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => Err(reason.into()),
    }
}

/// AuthenticatedOnly gate that also hands back the caller.
pub fn require_caller(caller: Option<AuthCtx>) -> Result<AuthCtx, AppError> {
    authorize(caller.as_ref(), EndpointClass::AuthenticatedOnly)?;
    caller.ok_or(AppError::Unauthenticated)
}
