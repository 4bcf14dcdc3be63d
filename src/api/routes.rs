/*
 * Responsibility
 * - URL 構造を定義
 * - /auth は rate limit、resource 系は caller 解決 middleware を適用
 */
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};

use crate::middleware::{auth::resolve_caller, rate_limit::admit};
use crate::state::AppState;

use crate::api::handlers::{
    auth::{login, logout, register},
    health::health,
    products::{create_product, delete_product, list_products, my_products, update_product},
    users::{delete_me, delete_user, get_me, list_users, update_me, update_user},
};

pub fn routes(state: AppState) -> Router<AppState> {
    // Admission control in front of the credential endpoints; rejected
    // requests never reach the handlers below.
    let auth = Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/logout", post(logout))
        .route_layer(from_fn_with_state(state.clone(), admit));

    // Resource routes see the resolved caller (or nothing) in extensions;
    // each handler's policy decides whether anonymous is acceptable.
    let resources = Router::new()
        .route("/users", get(list_users).put(update_me).delete(delete_me))
        .route("/users/me", get(get_me).put(update_me).delete(delete_me))
        .route("/users/{user_id}", put(update_user).delete(delete_user))
        .route("/products", get(list_products).post(create_product))
        .route("/products/my-products", get(my_products))
        .route(
            "/products/{product_id}",
            put(update_product).delete(delete_product),
        )
        .layer(from_fn_with_state(state, resolve_caller));

    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth)
        .merge(resources)
}
