use thiserror::Error;

use crate::soap::envelope::EnvelopeError;

/// The failure taxonomy every operation funnels into. Each variant maps
/// to the semantic code carried in the fault body; the transport status
/// is decided separately by the dispatcher.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Unsupported operation")]
    Unsupported,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl OperationError {
    #[must_use]
    pub const fn detail_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::Unsupported => 400,
            Self::Unauthorized(_) => 401,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }
}

impl From<anyhow::Error> for OperationError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<EnvelopeError> for OperationError {
    fn from(err: EnvelopeError) -> Self {
        Self::BadRequest(err.to_string())
    }
}
