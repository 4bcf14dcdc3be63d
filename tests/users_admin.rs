mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;
use secure_api::repos::Role;

async fn seeded() -> (secure_api::state::AppState, axum::Router, String, String) {
    let state = test_state();
    let router = test_router(state.clone());

    create_user(&state, "Root", "admin@example.com", "AdminPass123", Role::Admin).await;
    create_user(&state, "Alice", "alice@example.com", "UserPass789", Role::User).await;

    let admin = login(&router, "admin@example.com", "AdminPass123").await;
    let alice = login(&router, "alice@example.com", "UserPass789").await;

    (state, router, admin, alice)
}

#[tokio::test]
async fn listing_users_is_admin_only() {
    let (_, router, admin, alice) = seeded().await;

    let res = send(&router, get("/api/users")).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = send(&router, get_with_cookie("/api/users", &alice)).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = send(&router, get_with_cookie("/api/users", &admin)).await;
    assert_eq!(res.status(), StatusCode::OK);

    let list = body_json(res).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    for entry in list {
        let obj = entry.as_object().unwrap();
        assert!(obj.contains_key("email"));
        assert!(!obj.contains_key("password_hash"));
    }
}

#[tokio::test]
async fn admin_can_update_role_and_the_grant_takes_effect() {
    let (state, router, admin, alice) = seeded().await;
    let alice_id = state
        .users
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap()
        .id;

    // Before the grant, alice cannot list users.
    let res = send(&router, get_with_cookie("/api/users", &alice)).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = send(
        &router,
        put_json_with_cookie(
            &format!("/api/users/{}", alice_id),
            &admin,
            &json!({ "role": "ADMIN" }),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    // Role is read fresh per request; the existing session now passes the
    // admin gate.
    let res = send(&router, get_with_cookie("/api/users", &alice)).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_update_enforces_email_uniqueness() {
    let (state, router, admin, _) = seeded().await;
    let alice_id = state
        .users
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap()
        .id;

    let res = send(
        &router,
        put_json_with_cookie(
            &format!("/api/users/{}", alice_id),
            &admin,
            &json!({ "email": "admin@example.com" }),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_admin_cannot_use_the_admin_routes() {
    let (state, router, _, alice) = seeded().await;
    let admin_id = state
        .users
        .find_by_email("admin@example.com")
        .await
        .unwrap()
        .unwrap()
        .id;

    let res = send(
        &router,
        put_json_with_cookie(
            &format!("/api/users/{}", admin_id),
            &alice,
            &json!({ "role": "USER" }),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = send(
        &router,
        delete_with_cookie(&format!("/api/users/{}", admin_id), &alice),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_delete_cascades_to_the_users_products() {
    let (state, router, admin, alice) = seeded().await;

    let res = send(
        &router,
        post_json_with_cookie(
            "/api/products",
            &alice,
            &json!({ "name": "Lamp", "price": 12.5 }),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let alice_id = state
        .users
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap()
        .id;

    let res = send(
        &router,
        delete_with_cookie(&format!("/api/users/{}", alice_id), &admin),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    // Account and products are both gone.
    assert!(state.products.list().await.unwrap().is_empty());
    let res = send(
        &router,
        post_json(
            "/api/auth/login",
            &json!({ "email": "alice@example.com", "password": "UserPass789" }),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deleting_a_missing_user_is_not_found() {
    let (_, router, admin, _) = seeded().await;

    let res = send(
        &router,
        delete_with_cookie("/api/users/00000000-0000-0000-0000-000000000000", &admin),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
