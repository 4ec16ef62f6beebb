//! Driving port for registration and credential authentication.
//!
//! Inbound adapters call this port so handler tests can substitute a test
//! double instead of wiring persistence and password hashing.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{DomainError, Registration, Role, User};

/// Driving port for account registration and login.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Create an account with role `user` and a zero starting balance.
    ///
    /// Fails with `InvalidRequest` when the username or email is taken.
    async fn register(&self, registration: &Registration) -> Result<(), DomainError>;

    /// Validate credentials and return the authenticated user.
    ///
    /// Fails with `Unauthorized` for unknown usernames or wrong passwords.
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, DomainError>;
}

/// Fixture authenticator: `admin` / `password` yields a fixed admin user.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn register(&self, _registration: &Registration) -> Result<(), DomainError> {
        Ok(())
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<User, DomainError> {
        if username == "admin" && password == "password" {
            Ok(User {
                id: Uuid::nil(),
                username: "admin".to_owned(),
                fullname: "Fixture Admin".to_owned(),
                email: "admin@example.com".to_owned(),
                role: Role::Admin,
                points: 0,
                created_at: Utc::now(),
            })
        } else {
            Err(DomainError::unauthorized("invalid credentials"))
        }
    }
}
