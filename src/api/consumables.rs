//! Consumable endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        consumable::{ConsumableQuery, CreateConsumable, UpdateConsumable},
        Consumable, Permission,
    },
};

use super::AuthenticatedUser;

/// List consumables, optionally for one tool
#[utoipa::path(
    get,
    path = "/consumables",
    tag = "consumables",
    security(("bearer_auth" = [])),
    params(ConsumableQuery),
    responses(
        (status = 200, description = "Consumable list", body = Vec<Consumable>)
    )
)]
pub async fn list_consumables(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ConsumableQuery>,
) -> AppResult<Json<Vec<Consumable>>> {
    claims.require(Permission::ViewConsumables)?;
    let consumables = state.services.consumables.list(query.tool.as_deref()).await;
    Ok(Json(consumables))
}

/// Tool names consumables may be attached to
#[utoipa::path(
    get,
    path = "/consumables/tools",
    tag = "consumables",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Tool names", body = Vec<String>)
    )
)]
pub async fn list_consumable_tools(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<String>>> {
    claims.require(Permission::ViewConsumables)?;
    Ok(Json(state.services.consumables.tool_names().await))
}

/// Consumables that reached their guaranteed hours
#[utoipa::path(
    get,
    path = "/consumables/due",
    tag = "consumables",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Consumables needing replacement", body = Vec<Consumable>)
    )
)]
pub async fn list_due_consumables(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Consumable>>> {
    claims.require(Permission::ViewConsumables)?;
    Ok(Json(state.services.consumables.due().await))
}

/// Add a consumable
#[utoipa::path(
    post,
    path = "/consumables",
    tag = "consumables",
    security(("bearer_auth" = [])),
    request_body = CreateConsumable,
    responses(
        (status = 201, description = "Consumable created", body = Consumable)
    )
)]
pub async fn create_consumable(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateConsumable>,
) -> AppResult<(StatusCode, Json<Consumable>)> {
    claims.require(Permission::EditConsumables)?;
    data.validate()?;
    let consumable = state.services.consumables.create(data).await?;
    Ok((StatusCode::CREATED, Json(consumable)))
}

/// Replace a consumable record
#[utoipa::path(
    put,
    path = "/consumables/{id}",
    tag = "consumables",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Consumable ID")),
    request_body = UpdateConsumable,
    responses(
        (status = 200, description = "Consumable updated", body = Consumable),
        (status = 404, description = "Consumable not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_consumable(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateConsumable>,
) -> AppResult<Json<Consumable>> {
    claims.require(Permission::EditConsumables)?;
    data.validate()?;
    let consumable = state.services.consumables.update(id, data).await?;
    Ok(Json(consumable))
}

/// Delete a consumable
#[utoipa::path(
    delete,
    path = "/consumables/{id}",
    tag = "consumables",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Consumable ID")),
    responses(
        (status = 204, description = "Consumable deleted"),
        (status = 404, description = "Consumable not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_consumable(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require(Permission::EditConsumables)?;
    state.services.consumables.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
