//! In-memory store backends.
//!
//! `HashMap`s guarded by `tokio::sync::RwLock`; used by the integration
//! tests and as the fallback when no `DATABASE_URL` is configured. Not
//! durable: all state is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repos::error::RepoError;
use crate::repos::{Product, ProductStore, User, UserStore};

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        // Mirrors the unique index the durable backend has on email.
        let taken = users
            .values()
            .any(|u| u.id != user.id && u.email == user.email);
        if taken {
            return Err(RepoError::Conflict);
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut users = self.users.write().await;
        Ok(users.remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct MemoryProductStore {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn list(&self) -> Result<Vec<Product>, RepoError> {
        let products = self.products.read().await;
        let mut all: Vec<Product> = products.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, RepoError> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Product>, RepoError> {
        let products = self.products.read().await;
        let mut owned: Vec<Product> = products
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(owned)
    }

    async fn save(&self, product: Product) -> Result<Product, RepoError> {
        let mut products = self.products.write().await;
        match products.get_mut(&product.id) {
            Some(existing) => {
                // Ownership is fixed at creation; updates only touch the
                // mutable fields, as the durable backend's upsert does.
                existing.name = product.name;
                existing.description = product.description;
                existing.price = product.price;
                Ok(existing.clone())
            }
            None => {
                products.insert(product.id, product.clone());
                Ok(product)
            }
        }
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut products = self.products.write().await;
        Ok(products.remove(&id).is_some())
    }

    async fn delete_by_owner(&self, owner_id: Uuid) -> Result<u64, RepoError> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|_, p| p.owner_id != owner_id);
        Ok((before - products.len()) as u64)
    }
}
