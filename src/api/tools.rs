//! Tool endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        tool::{CreateTool, RenameTool},
        Permission, Tool,
    },
};

use super::AuthenticatedUser;

#[derive(Serialize, ToSchema)]
pub struct RecomputeResponse {
    /// Number of tools whose status changed
    pub changed: usize,
}

/// List all tools with their current status
#[utoipa::path(
    get,
    path = "/tools",
    tag = "tools",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Tool list", body = Vec<Tool>)
    )
)]
pub async fn list_tools(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Tool>>> {
    claims.require(Permission::ViewToolStatus)?;
    Ok(Json(state.services.tools.list().await))
}

/// Get tool by ID
#[utoipa::path(
    get,
    path = "/tools/{id}",
    tag = "tools",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Tool ID")),
    responses(
        (status = 200, description = "Tool details", body = Tool),
        (status = 404, description = "Tool not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_tool(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Tool>> {
    claims.require(Permission::ViewToolStatus)?;
    let tool = state.services.tools.get_by_id(id).await?;
    Ok(Json(tool))
}

/// Add a tool
#[utoipa::path(
    post,
    path = "/tools",
    tag = "tools",
    security(("bearer_auth" = [])),
    request_body = CreateTool,
    responses(
        (status = 201, description = "Tool created", body = Tool),
        (status = 409, description = "Name already in use", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_tool(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateTool>,
) -> AppResult<(StatusCode, Json<Tool>)> {
    claims.require(Permission::ManageTools)?;
    data.validate()?;
    let tool = state.services.tools.create(&data.name).await?;
    Ok((StatusCode::CREATED, Json(tool)))
}

/// Rename a tool (consumables, history and credentials follow)
#[utoipa::path(
    put,
    path = "/tools/{id}",
    tag = "tools",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Tool ID")),
    request_body = RenameTool,
    responses(
        (status = 200, description = "Tool renamed", body = Tool),
        (status = 404, description = "Tool not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Name already in use", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_tool(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<RenameTool>,
) -> AppResult<Json<Tool>> {
    claims.require(Permission::ManageTools)?;
    data.validate()?;
    let tool = state.services.tools.rename(id, &data.name).await?;
    Ok(Json(tool))
}

/// Remove a tool with its consumables and credentials
#[utoipa::path(
    delete,
    path = "/tools/{id}",
    tag = "tools",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Tool ID")),
    responses(
        (status = 204, description = "Tool removed"),
        (status = 404, description = "Tool not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_tool(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require(Permission::ManageTools)?;
    state.services.tools.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Re-derive every tool's status now
#[utoipa::path(
    post,
    path = "/tools/recompute",
    tag = "tools",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Statuses recomputed", body = RecomputeResponse)
    )
)]
pub async fn recompute_status(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<RecomputeResponse>> {
    claims.require(Permission::ViewToolStatus)?;
    let changed = state.services.tools.recompute().await;
    Ok(Json(RecomputeResponse { changed }))
}
