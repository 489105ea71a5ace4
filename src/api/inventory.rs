//! Spare-parts inventory endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{inventory::InventoryItemInput, InventoryItem, Permission},
};

use super::AuthenticatedUser;

/// List inventory items
#[utoipa::path(
    get,
    path = "/inventory",
    tag = "inventory",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Inventory", body = Vec<InventoryItem>)
    )
)]
pub async fn list_inventory(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<InventoryItem>>> {
    claims.require(Permission::ViewConsumables)?;
    Ok(Json(state.services.consumables.inventory().await))
}

/// Add an inventory item
#[utoipa::path(
    post,
    path = "/inventory",
    tag = "inventory",
    security(("bearer_auth" = [])),
    request_body = InventoryItemInput,
    responses(
        (status = 201, description = "Item added", body = InventoryItem),
        (status = 400, description = "Missing name or zero quantity", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_inventory_item(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<InventoryItemInput>,
) -> AppResult<(StatusCode, Json<InventoryItem>)> {
    claims.require(Permission::EditConsumables)?;
    data.validate()?;
    let item = state.services.consumables.add_inventory_item(data).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Update an inventory item
#[utoipa::path(
    put,
    path = "/inventory/{id}",
    tag = "inventory",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Item ID")),
    request_body = InventoryItemInput,
    responses(
        (status = 200, description = "Item updated", body = InventoryItem),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_inventory_item(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(data): Json<InventoryItemInput>,
) -> AppResult<Json<InventoryItem>> {
    claims.require(Permission::EditConsumables)?;
    data.validate()?;
    let item = state.services.consumables.update_inventory_item(id, data).await?;
    Ok(Json(item))
}

/// Delete an inventory item
#[utoipa::path(
    delete,
    path = "/inventory/{id}",
    tag = "inventory",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Item ID")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_inventory_item(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    claims.require(Permission::EditConsumables)?;
    state.services.consumables.delete_inventory_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
