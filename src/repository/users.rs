//! Users repository

use std::sync::Arc;

use tokio::sync::RwLock;

use super::persist;
use crate::{
    error::{AppError, AppResult},
    models::{
        user::{CreateUser, UpdateUser},
        Role, User,
    },
    storage::{self, Storage},
};

#[derive(Debug, Clone, Default)]
pub struct UserRegistry {
    users: Vec<User>,
}

fn default_account(id: i32, username: &str, role: Role, password: &str) -> User {
    User {
        id,
        username: username.to_string(),
        role,
        permissions: role.default_permissions(),
        password: password.to_string(),
        deleted: false,
    }
}

impl UserRegistry {
    /// The three stock accounts a fresh installation starts with
    pub fn seeded() -> Self {
        Self {
            users: vec![
                default_account(1, "admin", Role::Admin, "admin123"),
                default_account(2, "lead", Role::Lead, "lead123"),
                default_account(3, "user", Role::User, "user123"),
            ],
        }
    }

    pub fn from_users(users: Vec<User>) -> Self {
        Self { users }
    }

    /// Every record, soft-deleted ones included
    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn active(&self) -> impl Iterator<Item = &User> {
        self.users.iter().filter(|u| !u.deleted)
    }

    pub fn get(&self, id: i32) -> Option<&User> {
        self.active().find(|u| u.id == id)
    }

    /// Plaintext credential match against active accounts
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&User> {
        self.active()
            .find(|u| u.username == username && u.password == password)
    }

    pub fn change_password(&mut self, username: &str, current: &str, new_password: &str) -> bool {
        match self
            .users
            .iter_mut()
            .find(|u| !u.deleted && u.username == username && u.password == current)
        {
            Some(user) => {
                user.password = new_password.to_string();
                true
            }
            None => false,
        }
    }

    fn ensure_username_free(&self, username: &str, except: Option<i32>) -> AppResult<()> {
        if self
            .active()
            .any(|u| u.username == username && Some(u.id) != except)
        {
            return Err(AppError::Conflict(format!("Username '{}' is already taken", username)));
        }
        Ok(())
    }

    pub fn add(&mut self, request: CreateUser) -> AppResult<User> {
        self.ensure_username_free(&request.username, None)?;
        let id = self.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = User {
            id,
            permissions: request
                .permissions
                .unwrap_or_else(|| request.role.default_permissions()),
            username: request.username,
            role: request.role,
            password: request.password,
            deleted: false,
        };
        self.users.push(user.clone());
        Ok(user)
    }

    /// Apply the provided fields; `Ok(None)` when the user does not exist.
    /// Changing the role without explicit permissions resets them to the role defaults.
    pub fn update(&mut self, id: i32, request: UpdateUser) -> AppResult<Option<User>> {
        if let Some(username) = &request.username {
            self.ensure_username_free(username, Some(id))?;
        }
        let Some(user) = self.users.iter_mut().find(|u| u.id == id && !u.deleted) else {
            return Ok(None);
        };
        if let Some(username) = request.username {
            user.username = username;
        }
        if let Some(password) = request.password {
            user.password = password;
        }
        match (request.role, request.permissions) {
            (_, Some(permissions)) => {
                if let Some(role) = request.role {
                    user.role = role;
                }
                user.permissions = permissions;
            }
            (Some(role), None) if role != user.role => {
                user.role = role;
                user.permissions = role.default_permissions();
            }
            _ => {}
        }
        Ok(Some(user.clone()))
    }

    /// Soft delete
    pub fn delete(&mut self, id: i32) -> bool {
        match self.users.iter_mut().find(|u| u.id == id && !u.deleted) {
            Some(user) => {
                user.deleted = true;
                true
            }
            None => false,
        }
    }
}

#[derive(Clone)]
pub struct UsersRepository {
    storage: Arc<dyn Storage>,
    store: Arc<RwLock<UserRegistry>>,
}

impl UsersRepository {
    pub fn new(storage: Arc<dyn Storage>, registry: UserRegistry) -> Self {
        Self {
            storage,
            store: Arc::new(RwLock::new(registry)),
        }
    }

    pub(crate) fn store(&self) -> &Arc<RwLock<UserRegistry>> {
        &self.store
    }

    async fn save(&self, registry: &UserRegistry) {
        persist(self.storage.as_ref(), storage::KEY_USERS, registry.users()).await;
    }

    /// Active users
    pub async fn list(&self) -> Vec<User> {
        self.store.read().await.active().cloned().collect()
    }

    pub async fn get(&self, id: i32) -> Option<User> {
        self.store.read().await.get(id).cloned()
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Option<User> {
        self.store.read().await.authenticate(username, password).cloned()
    }

    pub async fn change_password(&self, username: &str, current: &str, new_password: &str) -> bool {
        let mut registry = self.store.write().await;
        let changed = registry.change_password(username, current, new_password);
        if changed {
            self.save(&registry).await;
        }
        changed
    }

    pub async fn add(&self, request: CreateUser) -> AppResult<User> {
        let mut registry = self.store.write().await;
        let user = registry.add(request)?;
        self.save(&registry).await;
        Ok(user)
    }

    pub async fn update(&self, id: i32, request: UpdateUser) -> AppResult<Option<User>> {
        let mut registry = self.store.write().await;
        let user = registry.update(id, request)?;
        if user.is_some() {
            self.save(&registry).await;
        }
        Ok(user)
    }

    pub async fn delete(&self, id: i32) -> bool {
        let mut registry = self.store.write().await;
        let deleted = registry.delete(id);
        if deleted {
            self.save(&registry).await;
        }
        deleted
    }
}
