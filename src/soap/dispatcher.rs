//! Request orchestration: parse the payload, route it to an operation,
//! extract fields, authenticate when required, run the handler and
//! serialize the outcome. No failure escapes this boundary unserialized.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::services::{TokenService, TokenStatus};
use crate::soap::envelope::{EnvelopeDoc, EnvelopeError};
use crate::soap::error::OperationError;
use crate::soap::ops;
use crate::soap::registry::{self, OpKind, OpSpec};
use crate::soap::response::{fault_envelope, success_envelope};

/// A serialized reply plus the transport status to send it with.
#[derive(Debug)]
pub struct SoapReply {
    pub status: u16,
    pub body: String,
}

/// Every fault ships with transport status 500 while the semantic code
/// rides in the body, matching what existing callers parse.
const FAULT_TRANSPORT_STATUS: u16 = 500;

#[derive(Clone)]
pub struct Dispatcher {
    store: Store,
    tokens: Arc<TokenService>,
    security: SecurityConfig,
}

impl Dispatcher {
    #[must_use]
    pub const fn new(store: Store, tokens: Arc<TokenService>, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
        }
    }

    /// Handle one raw payload. Always produces an envelope; faults are
    /// logged here rather than propagated.
    pub async fn handle(&self, raw: &str) -> SoapReply {
        match self.dispatch(raw).await {
            Ok(body) => SoapReply { status: 200, body },
            Err(err) => {
                let code = err.detail_code();
                let message = err.to_string();
                if matches!(err, OperationError::Internal(_)) {
                    error!("Request failed: {message}");
                } else {
                    debug!(code, "Request rejected: {message}");
                }
                SoapReply {
                    status: FAULT_TRANSPORT_STATUS,
                    body: fault_envelope(&message, code),
                }
            }
        }
    }

    async fn dispatch(&self, raw: &str) -> Result<String, OperationError> {
        let doc = EnvelopeDoc::parse(raw)?;

        let op = doc
            .operation()
            .and_then(registry::find_operation)
            .ok_or(OperationError::Unsupported)?;

        let fields = doc.extract(&op.schema).map_err(|err| match err {
            EnvelopeError::MissingField(field) => OperationError::BadRequest(
                registry::missing_field_message(op.kind, &field).to_string(),
            ),
            other => OperationError::from(other),
        })?;

        if op.requires_auth {
            self.authenticate(op, fields.required("token")?).await?;
        }

        let payload = match op.kind {
            OpKind::RegisterUser => ops::users::register(&self.store, &self.security, &fields).await?,
            OpKind::Login => ops::users::login(&self.store, &self.tokens, &fields).await?,
            OpKind::Logout => ops::users::logout(&self.tokens, &fields).await?,
            OpKind::GetNotes => ops::notes::list(&self.store).await?,
            OpKind::CreateNote => ops::notes::create(&self.store, &fields).await?,
            OpKind::UpdateNote => ops::notes::update(&self.store, &fields).await?,
            OpKind::DeleteNote => ops::notes::delete(&self.store, &fields).await?,
            OpKind::GetTags => ops::tags::list(&self.store).await?,
            OpKind::CreateTag => ops::tags::create(&self.store, &fields).await?,
            OpKind::UpdateTag => ops::tags::update(&self.store, &fields).await?,
            OpKind::DeleteTag => ops::tags::delete(&self.store, &fields).await?,
        };

        Ok(success_envelope(op.name, &payload))
    }

    /// Resolve the bearer token before any business effect runs. Each
    /// failure reason keeps its own fault message; an unresolvable
    /// subject fails closed.
    async fn authenticate(&self, op: &OpSpec, token: &str) -> Result<(), OperationError> {
        match self.tokens.resolve(token, Utc::now()).await? {
            TokenStatus::Valid(user) => {
                debug!(username = %user.username, operation = op.name, "Authenticated request");
                Ok(())
            }
            TokenStatus::Revoked => Err(OperationError::Unauthorized(
                "Token has been revoked".to_string(),
            )),
            TokenStatus::Expired => Err(OperationError::Unauthorized(
                "Token has expired".to_string(),
            )),
            TokenStatus::Malformed => Err(OperationError::Unauthorized(
                "Invalid token format".to_string(),
            )),
            TokenStatus::UnknownSubject => {
                warn!(operation = op.name, "Token subject no longer exists");
                Err(OperationError::Unauthorized("Unauthorized".to_string()))
            }
        }
    }
}
