/*
 * Responsibility
 * - /products 系 handler
 * - owner-or-admin 判定は「その場で取り直した owner_id」に対して行う
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::api::dto::products::{CreateProductRequest, ProductResponse, UpdateProductRequest};
use crate::api::extractors::{AuthCtxExtractor, MaybeAuthCtx};
use crate::error::AppError;
use crate::repos::Product;
use crate::services::auth::{policy, policy::EndpointClass};
use crate::state::AppState;

// PUBLIC: anyone can browse the catalog
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = state.products.list().await?;

    let mut res = Vec::with_capacity(products.len());
    for product in products {
        let owner_name = match state.users.find_by_id(product.owner_id).await? {
            Some(owner) => owner.name,
            None => "Unknown".to_string(),
        };
        res.push(ProductResponse::new(product, owner_name));
    }

    Ok(Json(res))
}

pub async fn my_products(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let owner = state
        .users
        .find_by_id(ctx.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    let products = state.products.find_by_owner(owner.id).await?;
    let res = products
        .into_iter()
        .map(|p| ProductResponse::new(p, owner.name.clone()))
        .collect();

    Ok(Json(res))
}

pub async fn create_product(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    req.validate().map_err(AppError::bad_request)?;

    let product = Product {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        description: req.description,
        price: req.price,
        // The creator owns the product, regardless of what the body says.
        owner_id: ctx.user_id,
    };

    let saved = state.products.save(product).await?;
    let owner_name = state
        .users
        .find_by_id(ctx.user_id)
        .await?
        .map(|u| u.name)
        .unwrap_or_else(|| "Unknown".to_string());

    Ok((
        StatusCode::CREATED,
        Json(ProductResponse::new(saved, owner_name)),
    ))
}

// OWNER or ADMIN
pub async fn update_product(
    State(state): State<AppState>,
    MaybeAuthCtx(caller): MaybeAuthCtx,
    Path(product_id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let caller = policy::require_caller(caller)?;
    req.validate().map_err(AppError::bad_request)?;

    // Ownership is read fresh for the decision, never from a cache.
    let mut product = state
        .products
        .find_by_id(product_id)
        .await?
        .ok_or_else(|| AppError::not_found("product"))?;

    policy::authorize(
        Some(&caller),
        EndpointClass::OwnerOrAdmin {
            owner_id: product.owner_id,
        },
    )?;

    if let Some(name) = req.name {
        product.name = name.trim().to_string();
    }
    if let Some(description) = req.description {
        product.description = Some(description);
    }
    if let Some(price) = req.price {
        product.price = price;
    }

    let saved = state.products.save(product).await?;
    let owner_name = state
        .users
        .find_by_id(saved.owner_id)
        .await?
        .map(|u| u.name)
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(Json(ProductResponse::new(saved, owner_name)))
}

// OWNER or ADMIN
pub async fn delete_product(
    State(state): State<AppState>,
    MaybeAuthCtx(caller): MaybeAuthCtx,
    Path(product_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let caller = policy::require_caller(caller)?;

    let product = state
        .products
        .find_by_id(product_id)
        .await?
        .ok_or_else(|| AppError::not_found("product"))?;

    policy::authorize(
        Some(&caller),
        EndpointClass::OwnerOrAdmin {
            owner_id: product.owner_id,
        },
    )?;

    state.products.delete_by_id(product.id).await?;
    Ok(StatusCode::OK)
}
