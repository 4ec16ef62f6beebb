//! PostgreSQL-backed registration, login, and profile reads.
//!
//! Passwords are hashed with Argon2id and stored in PHC string format; the
//! clear text never leaves this adapter.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{LoginService, UserProfileQuery};
use crate::domain::{DomainError, Registration, Role, User};

use super::error_mapping::{is_unique_violation, map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the login and profile ports.
#[derive(Clone)]
pub struct DieselLoginService {
    pool: DbPool,
}

impl DieselLoginService {
    /// Create a new service with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DomainError {
    map_basic_pool_error(error, DomainError::service_unavailable)
}

fn map_diesel_error(error: diesel::result::Error) -> DomainError {
    map_basic_diesel_error(error, DomainError::internal, DomainError::service_unavailable)
}

fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| DomainError::internal(format!("failed to hash password: {err}")))
}

fn password_matches(hash: &str, password: &str) -> Result<bool, DomainError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| DomainError::internal(format!("stored password hash is corrupt: {err}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn row_to_user(row: UserRow) -> Result<User, DomainError> {
    let role: Role = row.role.parse().map_err(DomainError::internal)?;
    Ok(User {
        id: row.id,
        username: row.username,
        fullname: row.fullname,
        email: row.email,
        role,
        points: row.points,
        created_at: row.created_at,
    })
}

#[async_trait]
impl LoginService for DieselLoginService {
    async fn register(&self, registration: &Registration) -> Result<(), DomainError> {
        let password_hash = hash_password(&registration.password)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let user_id = Uuid::new_v4();
        diesel::insert_into(users::table)
            .values(&NewUserRow {
                id: user_id,
                username: &registration.username,
                fullname: &registration.fullname,
                email: &registration.email,
                password_hash: &password_hash,
                role: "user",
                points: 0,
            })
            .execute(&mut conn)
            .await
            .map_err(|error| {
                if is_unique_violation(&error) {
                    DomainError::invalid_request("Username or email already taken")
                } else {
                    map_diesel_error(error)
                }
            })?;

        info!(%user_id, username = %registration.username, "registered new user");
        Ok(())
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<User, DomainError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        // Unknown username and wrong password share one message so the
        // response does not reveal which usernames exist.
        let Some(row) = row else {
            return Err(DomainError::unauthorized("invalid credentials"));
        };
        if !password_matches(&row.password_hash, password)? {
            return Err(DomainError::unauthorized("invalid credentials"));
        }
        row_to_user(row)
    }
}

#[async_trait]
impl UserProfileQuery for DieselLoginService {
    async fn fetch(&self, user_id: Uuid) -> Result<User, DomainError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(user_id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user)
            .transpose()?
            .ok_or_else(|| DomainError::not_found("User not found"))
    }
}
