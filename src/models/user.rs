use serde::{Deserialize, Serialize};

/// A registered account. The hash is persisted but never emitted in
/// response envelopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
}
