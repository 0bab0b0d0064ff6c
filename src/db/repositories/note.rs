use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::collection::JsonCollection;
use crate::models::{Note, NotePatch};

pub struct NoteRepository {
    col: Arc<JsonCollection<Note>>,
}

impl NoteRepository {
    #[must_use]
    pub const fn new(col: Arc<JsonCollection<Note>>) -> Self {
        Self { col }
    }

    pub async fn list(&self) -> Result<Vec<Note>> {
        Ok(self.col.read(|notes| notes.to_vec()).await)
    }

    pub async fn create(
        &self,
        title: String,
        content: String,
        tags: Vec<String>,
        reminder: Option<String>,
    ) -> Result<Note> {
        let note = Note {
            id: Uuid::new_v4().to_string(),
            title,
            content,
            tags,
            reminder,
        };

        let stored = note.clone();
        self.col.mutate(move |notes| notes.push(stored)).await?;
        Ok(note)
    }

    /// Apply a partial update. Returns `false` when no note has the
    /// given id; an empty patch still counts as a successful update.
    pub async fn update(&self, id: &str, patch: NotePatch) -> Result<bool> {
        self.col
            .mutate(|notes| {
                let Some(note) = notes.iter_mut().find(|n| n.id == id) else {
                    return false;
                };
                note.apply(patch);
                true
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        self.col
            .mutate(|notes| {
                let before = notes.len();
                notes.retain(|n| n.id != id);
                notes.len() != before
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo(dir: &tempfile::TempDir) -> NoteRepository {
        let col = JsonCollection::load(dir.path().join("notes.json"))
            .await
            .unwrap();
        NoteRepository::new(Arc::new(col))
    }

    #[tokio::test]
    async fn update_with_only_title_keeps_other_fields() {
        let dir = tempfile::tempdir().unwrap();
        let notes = repo(&dir).await;

        let note = notes
            .create(
                "T".to_string(),
                "C".to_string(),
                vec!["a".to_string(), "b".to_string()],
                None,
            )
            .await
            .unwrap();

        let updated = notes
            .update(
                &note.id,
                NotePatch {
                    title: Some("T2".to_string()),
                    ..NotePatch::default()
                },
            )
            .await
            .unwrap();
        assert!(updated);

        let stored = notes.list().await.unwrap().remove(0);
        assert_eq!(stored.title, "T2");
        assert_eq!(stored.content, "C");
        assert_eq!(stored.tags, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn update_unknown_id_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let notes = repo(&dir).await;

        let updated = notes.update("nope", NotePatch::default()).await.unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn delete_removes_only_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let notes = repo(&dir).await;

        let a = notes
            .create("A".to_string(), "1".to_string(), vec![], None)
            .await
            .unwrap();
        let _b = notes
            .create("B".to_string(), "2".to_string(), vec![], None)
            .await
            .unwrap();

        assert!(notes.delete(&a.id).await.unwrap());
        assert!(!notes.delete(&a.id).await.unwrap());

        let remaining = notes.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "B");
    }
}
