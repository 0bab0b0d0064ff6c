use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A revocation record. Lives in the blacklist until `expires_at`
/// passes, after which pruning removes it; by then the token itself has
/// expired, so the record is no longer load-bearing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: DateTime<Utc>,
}
