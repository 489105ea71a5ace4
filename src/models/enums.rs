//! Shared domain enums

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// ToolStatus
// ---------------------------------------------------------------------------

/// Operational status shown for a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum ToolStatus {
    #[default]
    Up,
    Down,
    Maintenance,
}

impl std::fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ToolStatus::Up => "Up",
            ToolStatus::Down => "Down",
            ToolStatus::Maintenance => "Maintenance",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// EventType
// ---------------------------------------------------------------------------

/// Kind of history event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Issue,
    Maintenance,
    Recovery,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Issue => "issue",
            EventType::Maintenance => "maintenance",
            EventType::Recovery => "recovery",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "issue" => Ok(EventType::Issue),
            "maintenance" => Ok(EventType::Maintenance),
            "recovery" => Ok(EventType::Recovery),
            _ => Err(format!("Invalid event type: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// User role; selects the default permission set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Lead,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Lead => "lead",
            Role::User => "user",
        }
    }

    /// Permissions granted to a freshly created account of this role
    pub fn default_permissions(&self) -> Vec<Permission> {
        match self {
            Role::Admin => Permission::ALL.to_vec(),
            Role::Lead => vec![
                Permission::ViewDashboard,
                Permission::ViewToolStatus,
                Permission::ViewConsumables,
                Permission::EditTools,
                Permission::EditConsumables,
                Permission::EditPasswordManager,
            ],
            Role::User => vec![
                Permission::ViewDashboard,
                Permission::ViewToolStatus,
                Permission::ViewConsumables,
            ],
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Permission
// ---------------------------------------------------------------------------

/// Fine-grained permission carried by each user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewDashboard,
    ViewToolStatus,
    ViewConsumables,
    EditTools,
    EditConsumables,
    EditPasswordManager,
    ManageTools,
    ViewUserManagement,
    EditUserManagement,
}

impl Permission {
    pub const ALL: [Permission; 9] = [
        Permission::ViewDashboard,
        Permission::ViewToolStatus,
        Permission::ViewConsumables,
        Permission::EditTools,
        Permission::EditConsumables,
        Permission::EditPasswordManager,
        Permission::ManageTools,
        Permission::ViewUserManagement,
        Permission::EditUserManagement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewDashboard => "view_dashboard",
            Permission::ViewToolStatus => "view_tool_status",
            Permission::ViewConsumables => "view_consumables",
            Permission::EditTools => "edit_tools",
            Permission::EditConsumables => "edit_consumables",
            Permission::EditPasswordManager => "edit_password_manager",
            Permission::ManageTools => "manage_tools",
            Permission::ViewUserManagement => "view_user_management",
            Permission::EditUserManagement => "edit_user_management",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_gets_every_permission() {
        assert_eq!(Role::Admin.default_permissions().len(), Permission::ALL.len());
    }

    #[test]
    fn plain_users_can_only_view() {
        let perms = Role::User.default_permissions();
        assert!(perms.contains(&Permission::ViewToolStatus));
        assert!(!perms.contains(&Permission::EditTools));
        assert!(!perms.contains(&Permission::ManageTools));
    }

    #[test]
    fn permission_names_match_their_serde_form() {
        for p in Permission::ALL {
            let json = serde_json::to_string(&p).unwrap();
            assert_eq!(json, format!("\"{}\"", p.as_str()));
        }
    }

    #[test]
    fn event_type_parses_case_insensitively() {
        assert_eq!("Maintenance".parse::<EventType>().unwrap(), EventType::Maintenance);
        assert!("outage".parse::<EventType>().is_err());
    }
}
