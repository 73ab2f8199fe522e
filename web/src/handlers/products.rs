//! `/api/products`.

use crate::WebResult;
use crate::extractors::{Admin, Authenticated};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use storefront_auth::authorize::require_role;
use storefront_core::domain::catalog::{NewProduct, Product, ProductPatch, ProductView};
use storefront_core::{ProductId, Role};

/// Body of a product deletion.
#[derive(Debug, Serialize)]
pub struct ProductDeleted {
    /// Acknowledgement
    pub message: &'static str,
    /// The removed product
    pub product: Product,
}

/// `POST /api/products/create-product` (admin)
pub async fn create_product(
    State(state): State<AppState>,
    _admin: Admin,
    Json(input): Json<NewProduct>,
) -> WebResult<(StatusCode, Json<Product>)> {
    let product = state.catalog.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `GET /api/products`
pub async fn list_products(
    State(state): State<AppState>,
    _caller: Authenticated,
) -> WebResult<Json<Vec<ProductView>>> {
    Ok(Json(state.catalog.list_products().await?))
}

/// `GET /api/products/:id`
pub async fn get_product(
    State(state): State<AppState>,
    _caller: Authenticated,
    Path(id): Path<ProductId>,
) -> WebResult<Json<ProductView>> {
    Ok(Json(state.catalog.get_product(id).await?))
}

/// `PUT /api/products/:id` (customer or admin)
pub async fn update_product(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<ProductId>,
    Json(patch): Json<ProductPatch>,
) -> WebResult<Json<Product>> {
    require_role(&actor, &[Role::Customer, Role::Admin])?;
    Ok(Json(state.catalog.update_product(id, patch).await?))
}

/// `DELETE /api/products/:id` (admin)
pub async fn delete_product(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<ProductId>,
) -> WebResult<Json<ProductDeleted>> {
    let product = state.catalog.delete_product(id).await?;
    Ok(Json(ProductDeleted {
        message: "Product deleted",
        product,
    }))
}
