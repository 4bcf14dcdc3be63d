/*
 * Responsibility
 * - domain 型 (User/Role/Product) の定義
 * - store trait の定義 (Postgres / in-memory backend が実装する)
 */
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;
pub mod memory;
pub mod product_repo;
pub mod user_repo;

use error::RepoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    // Unique, case-sensitive lookup key
    pub email: String,
    // PHC string; the plaintext is never stored
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    // Set once at creation; ownership never changes afterwards
    pub owner_id: Uuid,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;
    async fn list(&self) -> Result<Vec<User>, RepoError>;
    /// Insert-or-update keyed by id. Returns `RepoError::Conflict` when the
    /// email is already taken by a different user.
    async fn save(&self, user: User) -> Result<User, RepoError>;
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, RepoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, RepoError>;
    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Product>, RepoError>;
    async fn save(&self, product: Product) -> Result<Product, RepoError>;
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RepoError>;
    async fn delete_by_owner(&self, owner_id: Uuid) -> Result<u64, RepoError>;
}
