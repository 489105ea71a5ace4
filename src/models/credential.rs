//! Per-tool credential model (password manager)

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Login for a system attached to a tool; stored in plaintext
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ToolCredential {
    pub id: i64,
    pub system: String,
    pub username: String,
    pub password: String,
}

/// Credential together with the tool it belongs to
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToolCredentialEntry {
    pub tool_name: String,
    #[serde(flatten)]
    pub credential: ToolCredential,
}

/// Create / update credential request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CredentialInput {
    #[validate(length(min = 1, message = "System is required"))]
    pub system: String,
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl CredentialInput {
    pub fn into_credential(self, id: i64) -> ToolCredential {
        ToolCredential {
            id,
            system: self.system,
            username: self.username,
            password: self.password,
        }
    }
}
