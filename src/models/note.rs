use serde::{Deserialize, Serialize};

/// A note. Tags are free-text names kept in request order, duplicates
/// allowed; renaming a `Tag` entity does not rewrite them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<String>,
}

/// Partial update for a note. Only fields that were present in the
/// request overwrite existing values.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub reminder: Option<String>,
}

impl Note {
    pub fn apply(&mut self, patch: NotePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(reminder) = patch.reminder {
            self.reminder = Some(reminder);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Note {
        Note {
            id: "n1".to_string(),
            title: "Groceries".to_string(),
            content: "milk, eggs".to_string(),
            tags: vec!["home".to_string()],
            reminder: None,
        }
    }

    #[test]
    fn patch_overwrites_only_present_fields() {
        let mut note = sample();
        note.apply(NotePatch {
            title: Some("Shopping".to_string()),
            ..NotePatch::default()
        });
        assert_eq!(note.title, "Shopping");
        assert_eq!(note.content, "milk, eggs");
        assert_eq!(note.tags, vec!["home".to_string()]);
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut note = sample();
        note.apply(NotePatch::default());
        assert_eq!(note.title, "Groceries");
        assert!(note.reminder.is_none());
    }
}
