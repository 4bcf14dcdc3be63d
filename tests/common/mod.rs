#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Method, Request, header};
use axum::response::Response;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use secure_api::api;
use secure_api::app;
use secure_api::repos::memory::{MemoryProductStore, MemoryUserStore};
use secure_api::repos::{ProductStore, Role, User, UserStore};
use secure_api::services::auth::{AuthService, TokenCodec, password};
use secure_api::services::rate_limit::RateLimiter;
use secure_api::state::AppState;

pub const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef";

pub fn test_state() -> AppState {
    let users: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
    let products: Arc<dyn ProductStore> = Arc::new(MemoryProductStore::new());
    let codec = TokenCodec::new(TEST_SECRET, 86_400).unwrap();
    let auth = Arc::new(AuthService::new(users.clone(), codec));
    let limiter = Arc::new(RateLimiter::new(10, Duration::from_secs(60)));
    AppState::new(users, products, auth, limiter)
}

pub fn test_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api::routes(state.clone()))
        .fallback(app::fallback)
        .with_state(state)
}

pub const PEER: [u8; 4] = [127, 0, 0, 1];

fn builder(method: Method, uri: &str, peer: [u8; 4]) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .extension(ConnectInfo(SocketAddr::from((peer, 49152))))
}

pub fn get(uri: &str) -> Request<Body> {
    builder(Method::GET, uri, PEER).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    builder(Method::GET, uri, PEER)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    post_json_from(PEER, uri, body)
}

pub fn post_json_from(peer: [u8; 4], uri: &str, body: &Value) -> Request<Body> {
    builder(Method::POST, uri, peer)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_json_with_cookie(uri: &str, cookie: &str, body: &Value) -> Request<Body> {
    builder(Method::POST, uri, PEER)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, cookie)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_empty(uri: &str) -> Request<Body> {
    builder(Method::POST, uri, PEER).body(Body::empty()).unwrap()
}

pub fn put_json_with_cookie(uri: &str, cookie: &str, body: &Value) -> Request<Body> {
    builder(Method::PUT, uri, PEER)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, cookie)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn put_json(uri: &str, body: &Value) -> Request<Body> {
    builder(Method::PUT, uri, PEER)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    builder(Method::DELETE, uri, PEER)
        .body(Body::empty())
        .unwrap()
}

pub fn delete_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    builder(Method::DELETE, uri, PEER)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(router: &Router, req: Request<Body>) -> Response {
    router.clone().oneshot(req).await.unwrap()
}

pub async fn body_string(res: Response) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

pub async fn body_json(res: Response) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

/// Full `Set-Cookie` value from a response, if any.
pub fn set_cookie(res: &Response) -> Option<String> {
    res.headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().expect("cookie").to_string())
}

/// Reduce a `Set-Cookie` value to the `name=value` pair for a `Cookie` header.
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().expect("pair").trim().to_string()
}

/// Insert a user straight into the store (the API can only register USERs).
pub async fn create_user(
    state: &AppState,
    name: &str,
    email: &str,
    password_plain: &str,
    role: Role,
) -> User {
    state
        .users
        .save(User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password::hash_password(password_plain).unwrap(),
            role,
        })
        .await
        .unwrap()
}

/// Login through the API and return the `Cookie` header value for the session.
pub async fn login(router: &Router, email: &str, password_plain: &str) -> String {
    let res = send(
        router,
        post_json(
            "/api/auth/login",
            &serde_json::json!({ "email": email, "password": password_plain }),
        ),
    )
    .await;
    assert_eq!(res.status(), axum::http::StatusCode::OK, "login failed");
    cookie_pair(&set_cookie(&res).expect("login sets a cookie"))
}

/// Register through the API and return the created identity JSON.
pub async fn register(router: &Router, name: &str, email: &str, password_plain: &str) -> Value {
    let res = send(
        router,
        post_json(
            "/api/auth/register",
            &serde_json::json!({ "name": name, "email": email, "password": password_plain }),
        ),
    )
    .await;
    assert_eq!(
        res.status(),
        axum::http::StatusCode::CREATED,
        "register failed"
    );
    body_json(res).await
}
