use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::repos::{Role, User, UserStore};
use crate::services::auth::password;
use crate::services::auth::token::TokenCodec;

/// Orchestrates credential checks, token issuance and caller resolution.
///
/// - TokenCodec signs/verifies the session tokens.
/// - UserStore is the credential store; subjects are email addresses.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    codec: TokenCodec,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, codec: TokenCodec) -> Self {
        Self { users, codec }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Check credentials and return the `Set-Cookie` value for a fresh
    /// session. Unknown email and wrong password are indistinguishable to
    /// the caller.
    pub async fn login(&self, email: &str, password_plain: &str) -> Result<String, AppError> {
        let user = match self.users.find_by_email(email).await? {
            Some(user) => user,
            None => {
                debug!("login attempt for unknown email");
                return Err(AppError::InvalidCredentials);
            }
        };

        if !password::verify_password(&user.password_hash, password_plain) {
            debug!(user_id = %user.id, "login attempt with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        self.mint_session(&user)
    }

    /// Create a new identity with role USER and a hashed password.
    pub async fn register(
        &self,
        name: String,
        email: String,
        password_plain: &str,
    ) -> Result<User, AppError> {
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash: password::hash_password(password_plain)?,
            role: Role::User,
        };

        // The store's unique email constraint backstops the pre-check
        // under concurrent registration (Conflict => DuplicateEmail).
        let saved = self.users.save(user).await?;
        Ok(saved)
    }

    /// `Set-Cookie` value for an identity that is already verified
    /// (login just now, or a caller resolved from a valid session). No
    /// password replay involved.
    pub fn mint_session(&self, user: &User) -> Result<String, AppError> {
        let token = self.codec.issue(&user.email, Utc::now())?;
        Ok(self.codec.session_cookie(&token))
    }

    /// `Set-Cookie` value that discards the session cookie. Always
    /// succeeds; previously issued tokens stay valid until they expire.
    pub fn logout_cookie(&self) -> String {
        self.codec.expired_cookie()
    }

    /// Resolve a session token to a caller identity.
    ///
    /// Every failure mode (bad signature, expired, subject deleted since
    /// issuance, store outage) yields `None`: the request continues
    /// unauthenticated and the endpoint's own policy decides whether that
    /// is acceptable.
    pub async fn resolve_token(&self, token: &str) -> Option<AuthCtx> {
        let subject = match self.codec.verify(token, Utc::now()) {
            Ok(subject) => subject,
            Err(err) => {
                debug!(error = %err, "session token rejected");
                return None;
            }
        };

        match self.users.find_by_email(&subject).await {
            Ok(Some(user)) => Some(AuthCtx::new(user.id, user.email, user.role)),
            Ok(None) => {
                warn!(subject = %subject, "valid session token for unknown subject");
                None
            }
            Err(err) => {
                warn!(error = %err, "credential store lookup failed during resolution");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::memory::MemoryUserStore;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn service() -> AuthService {
        let users = Arc::new(MemoryUserStore::new());
        let codec = TokenCodec::new(SECRET, 86_400).unwrap();
        AuthService::new(users, codec)
    }

    fn cookie_token(cookie: &str) -> String {
        cookie
            .strip_prefix("jwt=")
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn register_then_login_then_resolve() {
        let auth = service();
        let created = auth
            .register(
                "Alice".to_string(),
                "alice@example.com".to_string(),
                "UserPass789",
            )
            .await
            .unwrap();
        assert_eq!(created.role, Role::User);
        assert!(!created.password_hash.contains("UserPass789"));

        let cookie = auth.login("alice@example.com", "UserPass789").await.unwrap();
        let ctx = auth.resolve_token(&cookie_token(&cookie)).await.unwrap();
        assert_eq!(ctx.user_id, created.id);
        assert_eq!(ctx.email, "alice@example.com");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_identical() {
        let auth = service();
        auth.register(
            "Alice".to_string(),
            "alice@example.com".to_string(),
            "UserPass789",
        )
        .await
        .unwrap();

        let wrong_password = auth
            .login("alice@example.com", "nope")
            .await
            .unwrap_err();
        let unknown_email = auth.login("ghost@example.com", "nope").await.unwrap_err();

        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_email, AppError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn duplicate_registration_writes_nothing() {
        let auth = service();
        auth.register(
            "Alice".to_string(),
            "alice@example.com".to_string(),
            "UserPass789",
        )
        .await
        .unwrap();

        let err = auth
            .register(
                "Imposter".to_string(),
                "alice@example.com".to_string(),
                "Other123",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));

        // The original account still authenticates with its password.
        assert!(auth.login("alice@example.com", "UserPass789").await.is_ok());
        assert!(matches!(
            auth.login("alice@example.com", "Other123").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn deleted_subject_no_longer_resolves() {
        let auth = service();
        let created = auth
            .register(
                "Alice".to_string(),
                "alice@example.com".to_string(),
                "UserPass789",
            )
            .await
            .unwrap();
        let cookie = auth.login("alice@example.com", "UserPass789").await.unwrap();
        let token = cookie_token(&cookie);

        assert!(auth.resolve_token(&token).await.is_some());

        auth.users.delete_by_id(created.id).await.unwrap();
        assert!(auth.resolve_token(&token).await.is_none());
    }

    #[tokio::test]
    async fn logout_does_not_revoke_outstanding_tokens() {
        let auth = service();
        auth.register(
            "Alice".to_string(),
            "alice@example.com".to_string(),
            "UserPass789",
        )
        .await
        .unwrap();
        let cookie = auth.login("alice@example.com", "UserPass789").await.unwrap();
        let token = cookie_token(&cookie);

        let clear = auth.logout_cookie();
        assert!(clear.contains("Max-Age=0"));

        // Statelessness trade-off: the pre-logout token still resolves.
        assert!(auth.resolve_token(&token).await.is_some());
    }
}
