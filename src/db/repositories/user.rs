use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::db::collection::JsonCollection;
use crate::models::User;

pub struct UserRepository {
    col: Arc<JsonCollection<User>>,
}

impl UserRepository {
    #[must_use]
    pub const fn new(col: Arc<JsonCollection<User>>) -> Self {
        Self { col }
    }

    /// Create a user with a freshly hashed password.
    ///
    /// Returns `Ok(None)` when the username is already taken
    /// (case-insensitive). The uniqueness check runs inside the same
    /// write-lock section as the insert.
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<Option<User>> {
        let password = password.to_string();
        let cfg = security.clone();

        // Argon2 is CPU-intensive; do not block the async runtime.
        let password_hash = task::spawn_blocking(move || hash_password(&password, &cfg))
            .await
            .context("Password hashing task panicked")??;

        self.col
            .mutate(|users| {
                let taken = users
                    .iter()
                    .any(|u| u.username.eq_ignore_ascii_case(username));
                if taken {
                    return None;
                }

                let user = User {
                    id: Uuid::new_v4().to_string(),
                    username: username.to_string(),
                    password_hash,
                };
                users.push(user.clone());
                Some(user)
            })
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self
            .col
            .read(|users| users.iter().find(|u| u.id == id).cloned())
            .await)
    }

    /// Verify credentials and return the matching user.
    ///
    /// The username comparison is exact; only registration enforces
    /// case-insensitive uniqueness. A missing user and a wrong password
    /// are indistinguishable to the caller.
    pub async fn verify_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = self
            .col
            .read(|users| users.iter().find(|u| u.username == username).cloned())
            .await;

        let Some(user) = user else {
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid.then_some(user))
    }
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, security: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        security.argon2_memory_cost_kib,
        security.argon2_time_cost,
        security.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
