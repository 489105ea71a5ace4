//! Dashboard endpoint

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{dashboard::DashboardSummary, Permission},
};

use super::AuthenticatedUser;

/// Tool statuses, worn consumables and the maintenance outlook
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardSummary),
        (status = 403, description = "Missing view_dashboard", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_dashboard(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<DashboardSummary>> {
    claims.require(Permission::ViewDashboard)?;
    Ok(Json(state.services.dashboard.summary().await))
}
