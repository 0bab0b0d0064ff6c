use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::collection::JsonCollection;
use crate::models::Tag;

/// Outcome of a tag rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagRename {
    Renamed,
    NotFound,
    NameTaken,
}

pub struct TagRepository {
    col: Arc<JsonCollection<Tag>>,
}

impl TagRepository {
    #[must_use]
    pub const fn new(col: Arc<JsonCollection<Tag>>) -> Self {
        Self { col }
    }

    pub async fn list(&self) -> Result<Vec<Tag>> {
        Ok(self.col.read(|tags| tags.to_vec()).await)
    }

    /// Create a tag. Returns `Ok(None)` when the name is already in use.
    pub async fn create(&self, name: &str) -> Result<Option<Tag>> {
        self.col
            .mutate(|tags| {
                if tags.iter().any(|t| t.name == name) {
                    return None;
                }

                let tag = Tag {
                    id: Uuid::new_v4().to_string(),
                    name: name.to_string(),
                };
                tags.push(tag.clone());
                Some(tag)
            })
            .await
    }

    /// Rename a tag, enforcing name uniqueness against every other tag.
    pub async fn rename(&self, id: &str, name: &str) -> Result<TagRename> {
        self.col
            .mutate(|tags| {
                if !tags.iter().any(|t| t.id == id) {
                    return TagRename::NotFound;
                }
                if tags.iter().any(|t| t.name == name && t.id != id) {
                    return TagRename::NameTaken;
                }

                if let Some(tag) = tags.iter_mut().find(|t| t.id == id) {
                    tag.name = name.to_string();
                }
                TagRename::Renamed
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        self.col
            .mutate(|tags| {
                let before = tags.len();
                tags.retain(|t| t.id != id);
                tags.len() != before
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo(dir: &tempfile::TempDir) -> TagRepository {
        let col = JsonCollection::load(dir.path().join("tags.json"))
            .await
            .unwrap();
        TagRepository::new(Arc::new(col))
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let tags = repo(&dir).await;

        assert!(tags.create("work").await.unwrap().is_some());
        assert!(tags.create("work").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rename_checks_target_and_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let tags = repo(&dir).await;

        let work = tags.create("work").await.unwrap().unwrap();
        let _home = tags.create("home").await.unwrap().unwrap();

        assert_eq!(tags.rename("nope", "x").await.unwrap(), TagRename::NotFound);
        assert_eq!(
            tags.rename(&work.id, "home").await.unwrap(),
            TagRename::NameTaken
        );
        // Renaming to its own current name is allowed.
        assert_eq!(
            tags.rename(&work.id, "work").await.unwrap(),
            TagRename::Renamed
        );
        assert_eq!(
            tags.rename(&work.id, "office").await.unwrap(),
            TagRename::Renamed
        );
    }
}
