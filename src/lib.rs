//! Toolwatch equipment status server
//!
//! Tracks the operational status of laboratory instruments from a log of
//! issues, maintenance windows and recoveries, together with consumable part
//! wear, a spare-parts inventory, per-tool credentials and role-based users.
//! Everything is served as a REST JSON API.

use std::sync::Arc;

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod storage;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub storage: Arc<dyn storage::Storage>,
}
