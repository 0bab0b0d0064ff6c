//! User and session operations.

use chrono::Utc;

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::services::TokenService;
use crate::soap::envelope::Fields;
use crate::soap::error::OperationError;
use crate::soap::response::Field;

pub async fn register(
    store: &Store,
    security: &SecurityConfig,
    fields: &Fields,
) -> Result<Vec<Field>, OperationError> {
    let username = fields.required("username")?;
    let password = fields.required("password")?;

    let Some(user) = store.users().create(username, password, security).await? else {
        return Err(OperationError::Conflict("User already exists".to_string()));
    };

    tracing::info!(username = %user.username, "Registered user");

    Ok(vec![
        Field::text("id", user.id),
        Field::text("username", user.username),
    ])
}

pub async fn login(
    store: &Store,
    tokens: &TokenService,
    fields: &Fields,
) -> Result<Vec<Field>, OperationError> {
    let username = fields.required("username")?;
    let password = fields.required("password")?;

    // Same fault for a missing user and a wrong password.
    let Some(user) = store.users().verify_password(username, password).await? else {
        return Err(OperationError::Unauthorized(
            "Invalid credentials".to_string(),
        ));
    };

    let token = tokens.issue(&user.id, Utc::now());
    tracing::info!(username = %user.username, "Login");

    Ok(vec![Field::text("token", token)])
}

/// Revoke the caller's token. The dispatcher has already resolved it as
/// valid, so a repeat logout never reaches this handler.
pub async fn logout(tokens: &TokenService, fields: &Fields) -> Result<Vec<Field>, OperationError> {
    let token = fields.required("token")?;
    tokens.revoke(token, Utc::now()).await?;

    Ok(vec![Field::text("message", "Logout successful")])
}
