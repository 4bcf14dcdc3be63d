/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - stores, auth service, rate limiter
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::repos::{ProductStore, UserStore};
use crate::services::{auth::AuthService, rate_limit::RateLimiter};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
    pub auth: Arc<AuthService>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        products: Arc<dyn ProductStore>,
        auth: Arc<AuthService>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            users,
            products,
            auth,
            limiter,
        }
    }
}
