//! Authentication and user management service

use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        user::{ChangePassword, CreateUser, UpdateUser},
        User, UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by username and password and return a JWT token
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .authenticate(username, password)
            .await
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            permissions: user.permissions.clone(),
            exp: now + (self.config.jwt_expiration_hours as i64 * 3600),
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        tracing::info!("User {} logged in", user.username);
        Ok((token, user))
    }

    /// Self-service password change; the current password must match
    pub async fn change_password(&self, request: &ChangePassword) -> AppResult<()> {
        let changed = self
            .repository
            .users
            .change_password(&request.username, &request.current_password, &request.new_password)
            .await;
        if !changed {
            return Err(AppError::Authentication(
                "Invalid username or current password".to_string(),
            ));
        }
        tracing::info!("Password changed for {}", request.username);
        Ok(())
    }

    pub async fn list(&self) -> Vec<User> {
        self.repository.users.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository
            .users
            .get(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    pub async fn create(&self, request: CreateUser) -> AppResult<User> {
        let user = self.repository.users.add(request).await?;
        tracing::info!("Created user {} ({})", user.username, user.role);
        Ok(user)
    }

    pub async fn update(&self, id: i32, request: UpdateUser) -> AppResult<User> {
        self.repository
            .users
            .update(id, request)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Soft delete; the caller may not delete their own account
    pub async fn delete(&self, id: i32, requested_by: &UserClaims) -> AppResult<()> {
        if id == requested_by.user_id {
            return Err(AppError::BadRequest("You cannot delete your own account".to_string()));
        }
        if !self.repository.users.delete(id).await {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        tracing::info!("User {} deleted by {}", id, requested_by.sub);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::Permission, storage::MemoryStorage};
    use std::sync::Arc;

    fn service() -> UsersService {
        UsersService::new(
            Repository::new(Arc::new(MemoryStorage::new())),
            AuthConfig::default(),
        )
    }

    #[tokio::test]
    async fn login_issues_token_with_permissions() {
        let users = service();
        let (token, user) = users.authenticate("lead", "lead123").await.unwrap();
        let claims = UserClaims::from_token(&token, &AuthConfig::default().jwt_secret).unwrap();
        assert_eq!(claims.sub, "lead");
        assert_eq!(claims.user_id, user.id);
        assert!(claims.has_permission(Permission::EditPasswordManager));
        assert!(!claims.has_permission(Permission::ManageTools));
    }

    #[tokio::test]
    async fn bad_credentials_are_rejected() {
        let users = service();
        assert!(matches!(
            users.authenticate("lead", "nope").await,
            Err(AppError::Authentication(_))
        ));
        let request = ChangePassword {
            username: "lead".to_string(),
            current_password: "nope".to_string(),
            new_password: "x".to_string(),
        };
        assert!(matches!(
            users.change_password(&request).await,
            Err(AppError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn users_cannot_delete_themselves() {
        let users = service();
        let (token, _) = users.authenticate("admin", "admin123").await.unwrap();
        let claims = UserClaims::from_token(&token, &AuthConfig::default().jwt_secret).unwrap();
        assert!(matches!(users.delete(1, &claims).await, Err(AppError::BadRequest(_))));
        users.delete(3, &claims).await.unwrap();
        assert!(matches!(users.get_by_id(3).await, Err(AppError::NotFound(_))));
    }
}
