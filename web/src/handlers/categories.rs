//! `/api/categories` (admin only).

use crate::WebResult;
use crate::extractors::Admin;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use storefront_core::CategoryId;
use storefront_core::domain::catalog::{Category, CategoryPatch, NewCategory, NewSubcategory};

/// Body of a category deletion.
#[derive(Debug, Serialize)]
pub struct CategoryDeleted {
    /// Acknowledgement
    pub message: &'static str,
    /// The removed category
    pub category: Category,
}

/// `POST /api/categories/create-category`
pub async fn create_category(
    State(state): State<AppState>,
    _admin: Admin,
    Json(input): Json<NewCategory>,
) -> WebResult<(StatusCode, Json<Category>)> {
    let category = state.catalog.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// `POST /api/categories/:id/create-subcategory`
pub async fn create_subcategory(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<CategoryId>,
    Json(input): Json<NewSubcategory>,
) -> WebResult<Json<Category>> {
    Ok(Json(state.catalog.add_subcategory(id, input).await?))
}

/// `GET /api/categories`
pub async fn list_categories(
    State(state): State<AppState>,
    _admin: Admin,
) -> WebResult<Json<Vec<Category>>> {
    Ok(Json(state.catalog.list_categories().await?))
}

/// `PUT /api/categories/:id`
pub async fn update_category(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<CategoryId>,
    Json(patch): Json<CategoryPatch>,
) -> WebResult<Json<Category>> {
    Ok(Json(state.catalog.update_category(id, patch).await?))
}

/// `DELETE /api/categories/:id`
pub async fn delete_category(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<CategoryId>,
) -> WebResult<Json<CategoryDeleted>> {
    let category = state.catalog.delete_category(id).await?;
    Ok(Json(CategoryDeleted {
        message: "Category and subcategories deleted",
        category,
    }))
}
