/*
 * Responsibility
 * - 起動時のデモデータ投入 (SEED_DEMO_DATA=true のときだけ)
 * - email 単位で冪等: 既存ユーザーは触らない
 */
use anyhow::Result;
use uuid::Uuid;

use crate::repos::{Product, Role, User};
use crate::services::auth::password;
use crate::state::AppState;

pub async fn run(state: &AppState) -> Result<()> {
    tracing::info!("seeding demo data");

    create_if_missing(
        state,
        "Primary Admin",
        "admin1@example.com",
        "AdminPass123",
        Role::Admin,
        2,
    )
    .await?;
    create_if_missing(
        state,
        "Secondary Admin",
        "admin2@example.com",
        "AdminPass456",
        Role::Admin,
        1,
    )
    .await?;
    create_if_missing(
        state,
        "Normal User A",
        "userA@example.com",
        "UserPass789",
        Role::User,
        2,
    )
    .await?;
    create_if_missing(
        state,
        "Normal User B",
        "userB@example.com",
        "UserPass000",
        Role::User,
        2,
    )
    .await?;

    tracing::info!("demo data seeding complete");
    Ok(())
}

async fn create_if_missing(
    state: &AppState,
    name: &str,
    email: &str,
    password_plain: &str,
    role: Role,
    product_count: u32,
) -> Result<()> {
    if state.users.find_by_email(email).await?.is_some() {
        tracing::debug!(email, "seed user already exists, skipping");
        return Ok(());
    }

    let user = state
        .users
        .save(User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password::hash_password(password_plain)?,
            role,
        })
        .await?;

    for i in 1..=product_count {
        state
            .products
            .save(Product {
                id: Uuid::new_v4(),
                name: format!("{}'s Product {}", name, i),
                description: Some(format!("Description for {}'s Product {}", name, i)),
                price: 10.0 + f64::from(i) * 5.0,
                owner_id: user.id,
            })
            .await?;
    }

    tracing::info!(email, "created seed user");
    Ok(())
}
