//! Data models for Toolwatch

pub mod consumable;
pub mod credential;
pub mod dashboard;
pub mod enums;
pub mod event;
pub mod inventory;
pub mod timestamp;
pub mod tool;
pub mod user;

// Re-export commonly used types
pub use consumable::Consumable;
pub use credential::ToolCredential;
pub use enums::{EventType, Permission, Role, ToolStatus};
pub use event::{HistoryEvent, NewEvent};
pub use inventory::InventoryItem;
pub use tool::{Tool, ToolDerivedStatus};
pub use user::{User, UserClaims};
