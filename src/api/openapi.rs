//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, consumables, credentials, dashboard, health, history, inventory, tools, users};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Toolwatch API",
        version = "1.0.0",
        description = "Equipment status, maintenance and consumables tracking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        auth::change_password,
        // Dashboard
        dashboard::get_dashboard,
        // Tools
        tools::list_tools,
        tools::get_tool,
        tools::create_tool,
        tools::update_tool,
        tools::delete_tool,
        tools::recompute_status,
        // History
        history::tool_history,
        history::report_issue,
        history::schedule_maintenance,
        history::perform_recovery,
        history::list_history,
        history::resolve_event,
        history::delete_event,
        // Consumables
        consumables::list_consumables,
        consumables::list_consumable_tools,
        consumables::list_due_consumables,
        consumables::create_consumable,
        consumables::update_consumable,
        consumables::delete_consumable,
        // Inventory
        inventory::list_inventory,
        inventory::create_inventory_item,
        inventory::update_inventory_item,
        inventory::delete_inventory_item,
        // Credentials
        credentials::list_all_credentials,
        credentials::list_tool_credentials,
        credentials::create_credential,
        credentials::update_credential,
        credentials::delete_credential,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            crate::models::user::ChangePassword,
            // Dashboard
            crate::models::dashboard::DashboardSummary,
            crate::models::dashboard::MaintenanceEntry,
            crate::models::dashboard::MaintenancePhase,
            // Tools
            crate::models::Tool,
            crate::models::ToolDerivedStatus,
            crate::models::ToolStatus,
            crate::models::tool::CreateTool,
            crate::models::tool::RenameTool,
            tools::RecomputeResponse,
            // History
            crate::models::HistoryEvent,
            crate::models::EventType,
            crate::models::event::ReportIssue,
            crate::models::event::ScheduleMaintenance,
            crate::models::event::PerformRecovery,
            crate::models::event::ResolveEvent,
            // Consumables & inventory
            crate::models::Consumable,
            crate::models::consumable::CreateConsumable,
            crate::models::consumable::UpdateConsumable,
            crate::models::InventoryItem,
            crate::models::inventory::InventoryItemInput,
            // Credentials
            crate::models::ToolCredential,
            crate::models::credential::ToolCredentialEntry,
            crate::models::credential::CredentialInput,
            // Users
            crate::models::user::UserInfo,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::Role,
            crate::models::Permission,
            // Health
            health::HealthResponse,
            health::ReadinessResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "dashboard", description = "Dashboard summary"),
        (name = "tools", description = "Tool registry and status"),
        (name = "history", description = "Issues, maintenance and recoveries"),
        (name = "consumables", description = "Consumable wear tracking"),
        (name = "inventory", description = "Spare-parts inventory"),
        (name = "credentials", description = "Per-tool password manager"),
        (name = "users", description = "User management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
