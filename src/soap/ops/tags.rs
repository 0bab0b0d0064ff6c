//! Tag operations. Tag names are globally unique; notes reference tags
//! by name, so neither rename nor delete cascades into notes.

use crate::db::{Store, TagRename};
use crate::soap::envelope::Fields;
use crate::soap::error::OperationError;
use crate::soap::response::Field;

pub async fn list(store: &Store) -> Result<Vec<Field>, OperationError> {
    let tags = store.tags().list().await?;
    Ok(tags
        .into_iter()
        .map(|tag| {
            Field::group(
                "tags",
                vec![Field::text("id", tag.id), Field::text("name", tag.name)],
            )
        })
        .collect())
}

pub async fn create(store: &Store, fields: &Fields) -> Result<Vec<Field>, OperationError> {
    let name = fields.required("name")?;

    let Some(tag) = store.tags().create(name).await? else {
        return Err(OperationError::Conflict("Tag already exists".to_string()));
    };
    tracing::debug!(id = %tag.id, name = %tag.name, "Created tag");

    Ok(vec![
        Field::text("id", tag.id),
        Field::text("name", tag.name),
    ])
}

pub async fn update(store: &Store, fields: &Fields) -> Result<Vec<Field>, OperationError> {
    let id = fields.required("id")?;
    let name = fields.required("name")?;

    match store.tags().rename(id, name).await? {
        TagRename::NotFound => Err(OperationError::NotFound("Tag not found".to_string())),
        TagRename::NameTaken => Err(OperationError::Conflict(
            "Tag name already exists".to_string(),
        )),
        TagRename::Renamed => Ok(vec![Field::text("message", "Tag updated successfully")]),
    }
}

pub async fn delete(store: &Store, fields: &Fields) -> Result<Vec<Field>, OperationError> {
    let id = fields.required("id")?;

    if !store.tags().delete(id).await? {
        return Err(OperationError::NotFound("Tag not found".to_string()));
    }

    Ok(vec![Field::text("message", "Tag deleted successfully")])
}
