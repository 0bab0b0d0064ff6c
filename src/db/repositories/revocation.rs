use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::db::collection::JsonCollection;
use crate::models::RevokedToken;

pub struct RevocationRepository {
    col: Arc<JsonCollection<RevokedToken>>,
}

impl RevocationRepository {
    #[must_use]
    pub const fn new(col: Arc<JsonCollection<RevokedToken>>) -> Self {
        Self { col }
    }

    /// Record a revocation. Revoking an already-revoked token is a
    /// no-op, not an error.
    pub async fn insert(&self, record: RevokedToken) -> Result<()> {
        self.col
            .mutate(|records| {
                if records.iter().any(|r| r.token == record.token) {
                    return;
                }
                records.push(record);
            })
            .await
    }

    pub async fn contains(&self, token: &str) -> Result<bool> {
        Ok(self
            .col
            .read(|records| records.iter().any(|r| r.token == token))
            .await)
    }

    /// Drop records whose expiry has passed; returns how many were
    /// removed.
    pub async fn prune_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        self.col
            .mutate(|records| {
                let before = records.len();
                records.retain(|r| r.expires_at > now);
                before - records.len()
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(token: &str, expires_at: DateTime<Utc>) -> RevokedToken {
        RevokedToken {
            token: token.to_string(),
            expires_at,
            revoked_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let col = JsonCollection::load(dir.path().join("blacklist.json"))
            .await
            .unwrap();
        let repo = RevocationRepository::new(Arc::new(col));

        let now = Utc::now();
        repo.insert(record("t1", now + Duration::hours(1)))
            .await
            .unwrap();
        repo.insert(record("t1", now + Duration::hours(2)))
            .await
            .unwrap();

        assert!(repo.contains("t1").await.unwrap());
        assert_eq!(repo.prune_expired(now + Duration::hours(3)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn prune_keeps_live_records() {
        let dir = tempfile::tempdir().unwrap();
        let col = JsonCollection::load(dir.path().join("blacklist.json"))
            .await
            .unwrap();
        let repo = RevocationRepository::new(Arc::new(col));

        let now = Utc::now();
        repo.insert(record("old", now - Duration::minutes(5)))
            .await
            .unwrap();
        repo.insert(record("live", now + Duration::minutes(5)))
            .await
            .unwrap();

        assert_eq!(repo.prune_expired(now).await.unwrap(), 1);
        assert!(!repo.contains("old").await.unwrap());
        assert!(repo.contains("live").await.unwrap());
    }
}
