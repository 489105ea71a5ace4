//! Business logic services

pub mod consumables;
pub mod credentials;
pub mod dashboard;
pub mod history;
pub mod monitor;
pub mod status;
pub mod tools;
pub mod users;

use std::sync::Arc;

use crate::{clock::Clock, config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub status: status::StatusService,
    pub tools: tools::ToolsService,
    pub history: history::HistoryService,
    pub consumables: consumables::ConsumablesService,
    pub credentials: credentials::CredentialsService,
    pub users: users::UsersService,
    pub dashboard: dashboard::DashboardService,
}

impl Services {
    /// Create all services over one repository and clock
    pub fn new(repository: Repository, clock: Arc<dyn Clock>, auth_config: AuthConfig) -> Self {
        let status = status::StatusService::new(repository.clone(), clock);
        Self {
            tools: tools::ToolsService::new(repository.clone(), status.clone()),
            history: history::HistoryService::new(repository.clone(), status.clone()),
            consumables: consumables::ConsumablesService::new(repository.clone(), status.clone()),
            credentials: credentials::CredentialsService::new(repository.clone()),
            users: users::UsersService::new(repository.clone(), auth_config),
            dashboard: dashboard::DashboardService::new(repository, status.clone()),
            status,
        }
    }
}
