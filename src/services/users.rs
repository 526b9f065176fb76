//! User management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all registered users
    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Register a new user
    pub async fn register(&self, user: CreateUser) -> AppResult<User> {
        user.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.users.create(&user).await
    }

    /// Partial profile update; empty fields keep the stored value
    pub async fn update(&self, id: i32, update: UpdateUser) -> AppResult<User> {
        self.repository.users.update(id, &update).await
    }

    /// Plain credential-equality login. No tokens, no hashing policy; the
    /// core does not own authentication.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<User> {
        let user = self
            .repository
            .users
            .find_by_email(email)
            .await?
            .filter(|u| u.password == password)
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;
        Ok(user)
    }
}
