//! Note operations. Notes are a global collection; authentication gates
//! access but entities carry no owner.

use crate::db::Store;
use crate::models::{Note, NotePatch};
use crate::soap::envelope::Fields;
use crate::soap::error::OperationError;
use crate::soap::response::Field;

pub async fn list(store: &Store) -> Result<Vec<Field>, OperationError> {
    let notes = store.notes().list().await?;
    Ok(notes.into_iter().map(note_record).collect())
}

pub async fn create(store: &Store, fields: &Fields) -> Result<Vec<Field>, OperationError> {
    let title = fields.required("title")?.to_string();
    let content = fields.required("content")?.to_string();
    let tags = fields.all("tags");
    let reminder = fields.get("reminder").map(str::to_string);

    let note = store.notes().create(title, content, tags, reminder).await?;
    tracing::debug!(id = %note.id, "Created note");

    let mut out = vec![
        Field::text("id", note.id),
        Field::text("title", note.title),
        Field::text("content", note.content),
    ];
    for tag in note.tags {
        out.push(Field::text("tags", tag));
    }
    if let Some(reminder) = note.reminder {
        out.push(Field::text("reminder", reminder));
    }
    Ok(out)
}

pub async fn update(store: &Store, fields: &Fields) -> Result<Vec<Field>, OperationError> {
    let id = fields.required("id")?;

    // A tags element must be present for the list to be replaced; an
    // empty patch still reports success.
    let tags = fields.all("tags");
    let patch = NotePatch {
        title: fields.get("title").map(str::to_string),
        content: fields.get("content").map(str::to_string),
        tags: (!tags.is_empty()).then_some(tags),
        reminder: fields.get("reminder").map(str::to_string),
    };

    if !store.notes().update(id, patch).await? {
        return Err(OperationError::NotFound("Note not found".to_string()));
    }

    Ok(vec![Field::text("message", "Note updated successfully")])
}

pub async fn delete(store: &Store, fields: &Fields) -> Result<Vec<Field>, OperationError> {
    let id = fields.required("id")?;

    if !store.notes().delete(id).await? {
        return Err(OperationError::NotFound("Note not found".to_string()));
    }

    Ok(vec![Field::text("message", "Note deleted successfully")])
}

fn note_record(note: Note) -> Field {
    let mut children = vec![
        Field::text("id", note.id),
        Field::text("title", note.title),
        Field::text("content", note.content),
    ];
    for tag in note.tags {
        children.push(Field::text("tags", tag));
    }
    if let Some(reminder) = note.reminder {
        children.push(Field::text("reminder", reminder));
    }
    Field::group("notes", children)
}
