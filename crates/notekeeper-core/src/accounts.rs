//! Registration, credential checks and login.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::models::{Identity, User};
use crate::token::TokenCodec;
use crate::traits::{PasswordHasher, UserRepository};

/// Account operations on top of the user repository and credential hasher.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    codec: TokenCodec,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        codec: TokenCodec,
    ) -> Self {
        Self {
            users,
            hasher,
            codec,
        }
    }

    /// Register a new user with a hashed password.
    pub async fn register(&self, email: &str, password: &str) -> Result<User> {
        let identity = Identity::parse_email(email)?;
        if password.trim().is_empty() {
            return Err(Error::InvalidInput("Password must not be blank".to_string()));
        }
        if self.users.find_by_email(identity.as_str()).await?.is_some() {
            warn!(subsystem = "accounts", op = "register", user = %identity, "Duplicate email");
            return Err(Error::DuplicateUser(identity.into_inner()));
        }
        let hash = self.hasher.hash_password(password)?;
        let user = self.users.insert(identity.as_str(), &hash).await?;
        info!(subsystem = "accounts", op = "register", user = %identity, "User registered");
        Ok(user)
    }

    /// Check a password against the stored credential.
    pub async fn check_credentials(&self, email: &str, password: &str) -> Result<bool> {
        let user = self.get_user_by_email(email).await?;
        Ok(self.hasher.verify_password(password, &user.password_hash))
    }

    /// Verify credentials and issue a token for the user.
    pub async fn login(&self, email: &str, password: &str, now: DateTime<Utc>) -> Result<String> {
        let identity = Identity::parse_email(email)?;
        if !self.check_credentials(identity.as_str(), password).await? {
            warn!(subsystem = "accounts", op = "login", user = %identity, "Invalid password");
            return Err(Error::InvalidCredentials);
        }
        let token = self.codec.issue(&identity, now)?;
        info!(subsystem = "accounts", op = "login", user = %identity, "User logged in");
        Ok(token)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<User> {
        match self.users.find_by_email(email.trim()).await? {
            Some(user) => Ok(user),
            None => {
                warn!(subsystem = "accounts", user = email, "User not found");
                Err(Error::UserNotFound(email.to_string()))
            }
        }
    }
}
