//! Password manager endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        credential::{CredentialInput, ToolCredentialEntry},
        Permission, ToolCredential,
    },
};

use super::AuthenticatedUser;

/// Every stored credential with its tool
#[utoipa::path(
    get,
    path = "/credentials",
    tag = "credentials",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All credentials", body = Vec<ToolCredentialEntry>),
        (status = 403, description = "Missing edit_password_manager", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_all_credentials(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<ToolCredentialEntry>>> {
    claims.require(Permission::EditPasswordManager)?;
    Ok(Json(state.services.credentials.list_all().await))
}

/// Credentials of one tool
#[utoipa::path(
    get,
    path = "/tools/{id}/credentials",
    tag = "credentials",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Tool ID")),
    responses(
        (status = 200, description = "Tool credentials", body = Vec<ToolCredential>),
        (status = 404, description = "Tool not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_tool_credentials(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<ToolCredential>>> {
    claims.require(Permission::EditPasswordManager)?;
    let credentials = state.services.credentials.list(id).await?;
    Ok(Json(credentials))
}

/// Store a credential for a tool
#[utoipa::path(
    post,
    path = "/tools/{id}/credentials",
    tag = "credentials",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Tool ID")),
    request_body = CredentialInput,
    responses(
        (status = 201, description = "Credential stored", body = ToolCredential),
        (status = 404, description = "Tool not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_credential(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<CredentialInput>,
) -> AppResult<(StatusCode, Json<ToolCredential>)> {
    claims.require_credential_editor()?;
    data.validate()?;
    let credential = state.services.credentials.create(id, data).await?;
    Ok((StatusCode::CREATED, Json(credential)))
}

/// Update a credential
#[utoipa::path(
    put,
    path = "/tools/{id}/credentials/{credential_id}",
    tag = "credentials",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Tool ID"),
        ("credential_id" = i64, Path, description = "Credential ID")
    ),
    request_body = CredentialInput,
    responses(
        (status = 200, description = "Credential updated", body = ToolCredential),
        (status = 404, description = "Tool or credential not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_credential(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((id, credential_id)): Path<(i32, i64)>,
    Json(data): Json<CredentialInput>,
) -> AppResult<Json<ToolCredential>> {
    claims.require_credential_editor()?;
    data.validate()?;
    let credential = state
        .services
        .credentials
        .update(id, credential_id, data)
        .await?;
    Ok(Json(credential))
}

/// Delete a credential
#[utoipa::path(
    delete,
    path = "/tools/{id}/credentials/{credential_id}",
    tag = "credentials",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Tool ID"),
        ("credential_id" = i64, Path, description = "Credential ID")
    ),
    responses(
        (status = 204, description = "Credential deleted"),
        (status = 404, description = "Tool or credential not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_credential(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((id, credential_id)): Path<(i32, i64)>,
) -> AppResult<StatusCode> {
    claims.require_credential_editor()?;
    state.services.credentials.delete(id, credential_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
