use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::models::{Note, RevokedToken, Tag, User};
use crate::services::token::TokenStore;

pub mod collection;
pub mod repositories;

use collection::JsonCollection;
pub use repositories::{
    NoteRepository, RevocationRepository, TagRename, TagRepository, UserRepository,
};

/// Facade over the flat-file collections. Cloning is cheap; all clones
/// share the same in-memory state and locks.
#[derive(Clone)]
pub struct Store {
    users: Arc<JsonCollection<User>>,
    notes: Arc<JsonCollection<Note>>,
    tags: Arc<JsonCollection<Tag>>,
    revocations: Arc<JsonCollection<RevokedToken>>,
}

impl Store {
    /// Open (or create) the data directory and load every collection.
    pub async fn open(data_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let users = Arc::new(JsonCollection::load(data_dir.join("users.json")).await?);
        let notes = Arc::new(JsonCollection::load(data_dir.join("notes.json")).await?);
        let tags = Arc::new(JsonCollection::load(data_dir.join("tags.json")).await?);
        let revocations = Arc::new(JsonCollection::load(data_dir.join("blacklist.json")).await?);

        let store = Self {
            users,
            notes,
            tags,
            revocations,
        };

        info!(
            "Store loaded from {} ({} users, {} notes, {} tags, {} revocations)",
            data_dir.display(),
            store.users.read(|u| u.len()).await,
            store.notes.read(|n| n.len()).await,
            store.tags.read(|t| t.len()).await,
            store.revocations.read(|r| r.len()).await,
        );

        Ok(store)
    }

    #[must_use]
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.users.clone())
    }

    #[must_use]
    pub fn notes(&self) -> NoteRepository {
        NoteRepository::new(self.notes.clone())
    }

    #[must_use]
    pub fn tags(&self) -> TagRepository {
        TagRepository::new(self.tags.clone())
    }

    #[must_use]
    pub fn revocations(&self) -> RevocationRepository {
        RevocationRepository::new(self.revocations.clone())
    }
}

#[async_trait]
impl TokenStore for Store {
    async fn find_subject(&self, id: &str) -> Result<Option<User>> {
        self.users().find_by_id(id).await
    }

    async fn is_revoked(&self, token: &str) -> Result<bool> {
        self.revocations().contains(token).await
    }

    async fn insert_revocation(&self, record: RevokedToken) -> Result<()> {
        self.revocations().insert(record).await
    }

    async fn prune_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        self.revocations().prune_expired(now).await
    }
}
