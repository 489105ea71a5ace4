//! History endpoints: issues, maintenance, recoveries and the event log

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        event::{HistoryQuery, LogQuery, PerformRecovery, ReportIssue, ResolveEvent, ScheduleMaintenance},
        HistoryEvent, Permission,
    },
};

use super::AuthenticatedUser;

/// History of one tool, newest first
#[utoipa::path(
    get,
    path = "/tools/{id}/history",
    tag = "history",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Tool ID"), HistoryQuery),
    responses(
        (status = 200, description = "Tool history", body = Vec<HistoryEvent>),
        (status = 404, description = "Tool not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn tool_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<HistoryEvent>>> {
    claims.require(Permission::ViewToolStatus)?;
    let events = state.services.history.for_tool(id, query).await?;
    Ok(Json(events))
}

/// Report an issue on a tool
#[utoipa::path(
    post,
    path = "/tools/{id}/issues",
    tag = "history",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Tool ID")),
    request_body = ReportIssue,
    responses(
        (status = 201, description = "Issue logged", body = HistoryEvent),
        (status = 404, description = "Tool not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn report_issue(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<ReportIssue>,
) -> AppResult<(StatusCode, Json<HistoryEvent>)> {
    claims.require(Permission::EditTools)?;
    data.validate()?;
    let event = state.services.history.report_issue(id, data, &claims.sub).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Schedule a maintenance window on a tool
#[utoipa::path(
    post,
    path = "/tools/{id}/maintenance",
    tag = "history",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Tool ID")),
    request_body = ScheduleMaintenance,
    responses(
        (status = 201, description = "Maintenance scheduled", body = HistoryEvent),
        (status = 400, description = "Window ends before it starts", body = crate::error::ErrorResponse),
        (status = 404, description = "Tool not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn schedule_maintenance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<ScheduleMaintenance>,
) -> AppResult<(StatusCode, Json<HistoryEvent>)> {
    claims.require(Permission::EditTools)?;
    data.validate()?;
    let event = state
        .services
        .history
        .schedule_maintenance(id, data, &claims.sub)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Recover a tool from selected issues / maintenance windows
#[utoipa::path(
    post,
    path = "/tools/{id}/recovery",
    tag = "history",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Tool ID")),
    request_body = PerformRecovery,
    responses(
        (status = 201, description = "Recovery events logged", body = Vec<HistoryEvent>),
        (status = 400, description = "Nothing selected", body = crate::error::ErrorResponse),
        (status = 404, description = "Tool not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn perform_recovery(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<PerformRecovery>,
) -> AppResult<(StatusCode, Json<Vec<HistoryEvent>>)> {
    claims.require(Permission::EditTools)?;
    data.validate()?;
    let events = state.services.history.perform_recovery(id, data).await?;
    Ok((StatusCode::CREATED, Json(events)))
}

/// Whole event log, newest first. Resolved events are included by default;
/// `tools` may be repeated to narrow the log to a set of tools.
#[utoipa::path(
    get,
    path = "/history",
    tag = "history",
    security(("bearer_auth" = [])),
    params(LogQuery),
    responses(
        (status = 200, description = "Event log", body = Vec<HistoryEvent>)
    )
)]
pub async fn list_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    axum_extra::extract::Query(query): axum_extra::extract::Query<LogQuery>,
) -> AppResult<Json<Vec<HistoryEvent>>> {
    claims.require(Permission::ViewToolStatus)?;
    let events = state.services.history.list(query).await?;
    Ok(Json(events))
}

/// Resolve an event
#[utoipa::path(
    put,
    path = "/history/{id}/resolve",
    tag = "history",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Event ID")),
    request_body = ResolveEvent,
    responses(
        (status = 204, description = "Event resolved (unknown ids are ignored)")
    )
)]
pub async fn resolve_event(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(data): Json<ResolveEvent>,
) -> AppResult<StatusCode> {
    claims.require(Permission::EditTools)?;
    data.validate()?;
    state.services.history.resolve(id, data).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete an event
#[utoipa::path(
    delete,
    path = "/history/{id}",
    tag = "history",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Event deleted (unknown ids are ignored)")
    )
)]
pub async fn delete_event(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    claims.require(Permission::EditTools)?;
    state.services.history.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
