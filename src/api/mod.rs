//! API handlers for Toolwatch REST endpoints

pub mod auth;
pub mod consumables;
pub mod credentials;
pub mod dashboard;
pub mod health;
pub mod history;
pub mod inventory;
pub mod openapi;
pub mod tools;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/auth/change-password", post(auth::change_password))
        // Dashboard
        .route("/dashboard", get(dashboard::get_dashboard))
        // Tools
        .route("/tools", get(tools::list_tools).post(tools::create_tool))
        .route("/tools/recompute", post(tools::recompute_status))
        .route(
            "/tools/:id",
            get(tools::get_tool).put(tools::update_tool).delete(tools::delete_tool),
        )
        // Tool history workflows
        .route("/tools/:id/history", get(history::tool_history))
        .route("/tools/:id/issues", post(history::report_issue))
        .route("/tools/:id/maintenance", post(history::schedule_maintenance))
        .route("/tools/:id/recovery", post(history::perform_recovery))
        // Event log
        .route("/history", get(history::list_history))
        .route("/history/:id/resolve", put(history::resolve_event))
        .route("/history/:id", axum::routing::delete(history::delete_event))
        // Consumables
        .route(
            "/consumables",
            get(consumables::list_consumables).post(consumables::create_consumable),
        )
        .route("/consumables/tools", get(consumables::list_consumable_tools))
        .route("/consumables/due", get(consumables::list_due_consumables))
        .route(
            "/consumables/:id",
            put(consumables::update_consumable).delete(consumables::delete_consumable),
        )
        // Spare-parts inventory
        .route(
            "/inventory",
            get(inventory::list_inventory).post(inventory::create_inventory_item),
        )
        .route(
            "/inventory/:id",
            put(inventory::update_inventory_item).delete(inventory::delete_inventory_item),
        )
        // Password manager
        .route("/credentials", get(credentials::list_all_credentials))
        .route(
            "/tools/:id/credentials",
            get(credentials::list_tool_credentials).post(credentials::create_credential),
        )
        .route(
            "/tools/:id/credentials/:credential_id",
            put(credentials::update_credential).delete(credentials::delete_credential),
        )
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .with_state(state);

    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
