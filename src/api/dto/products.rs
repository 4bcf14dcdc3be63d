/*
 * Responsibility
 * - Products の request/response DTO
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::Product;

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub owner_id: Uuid,
    // Denormalized for list views
    pub owner_name: String,
}

impl ProductResponse {
    pub fn new(product: Product, owner_name: String) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            owner_id: product.owner_id,
            owner_name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
}

impl CreateProductRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err("price must be positive");
        }
        Ok(())
    }
}

/// Partial update; absent fields are left untouched. Ownership is not a
/// field here at all.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

impl UpdateProductRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err("name cannot be empty");
        }
        if let Some(price) = self.price
            && (!price.is_finite() || price <= 0.0)
        {
            return Err("price must be positive");
        }
        Ok(())
    }
}
