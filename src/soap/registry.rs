//! The operation table: one entry per logical operation, declaring its
//! marker element, auth requirement and field schema.
//!
//! Routing compares the parsed Body element name against `marker`
//! exactly, in table order, so markers cannot collide the way substring
//! sniffing could (`RegisterUserRequest` vs `LoginRequest`).

use crate::soap::envelope::FieldSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    RegisterUser,
    Login,
    Logout,
    GetNotes,
    CreateNote,
    UpdateNote,
    DeleteNote,
    GetTags,
    CreateTag,
    UpdateTag,
    DeleteTag,
}

#[derive(Debug, Clone, Copy)]
pub struct OpSpec {
    pub kind: OpKind,
    /// Operation name; also the prefix of the response wrapper element.
    pub name: &'static str,
    /// The request marker element sniffed from the payload.
    pub marker: &'static str,
    pub requires_auth: bool,
    pub schema: FieldSchema,
}

const NONE: &[&str] = &[];

pub const OPERATIONS: &[OpSpec] = &[
    OpSpec {
        kind: OpKind::RegisterUser,
        name: "RegisterUser",
        marker: "RegisterUserRequest",
        requires_auth: false,
        schema: FieldSchema {
            required: &["username", "password"],
            optional: NONE,
            repeatable: NONE,
        },
    },
    OpSpec {
        kind: OpKind::Login,
        name: "Login",
        marker: "LoginRequest",
        requires_auth: false,
        schema: FieldSchema {
            required: &["username", "password"],
            optional: NONE,
            repeatable: NONE,
        },
    },
    OpSpec {
        kind: OpKind::Logout,
        name: "Logout",
        marker: "LogoutRequest",
        requires_auth: true,
        schema: FieldSchema {
            required: &["token"],
            optional: NONE,
            repeatable: NONE,
        },
    },
    OpSpec {
        kind: OpKind::GetNotes,
        name: "GetNotes",
        marker: "GetNotesRequest",
        requires_auth: true,
        schema: FieldSchema {
            required: &["token"],
            optional: NONE,
            repeatable: NONE,
        },
    },
    OpSpec {
        kind: OpKind::CreateNote,
        name: "CreateNote",
        marker: "CreateNoteRequest",
        requires_auth: true,
        schema: FieldSchema {
            required: &["token", "title", "content"],
            optional: &["tags", "reminder"],
            repeatable: &["tags"],
        },
    },
    OpSpec {
        kind: OpKind::UpdateNote,
        name: "UpdateNote",
        marker: "UpdateNoteRequest",
        requires_auth: true,
        schema: FieldSchema {
            required: &["token", "id"],
            optional: &["title", "content", "tags", "reminder"],
            repeatable: &["tags"],
        },
    },
    OpSpec {
        kind: OpKind::DeleteNote,
        name: "DeleteNote",
        marker: "DeleteNoteRequest",
        requires_auth: true,
        schema: FieldSchema {
            required: &["token", "id"],
            optional: NONE,
            repeatable: NONE,
        },
    },
    OpSpec {
        kind: OpKind::GetTags,
        name: "GetTags",
        marker: "GetTagsRequest",
        requires_auth: true,
        schema: FieldSchema {
            required: &["token"],
            optional: NONE,
            repeatable: NONE,
        },
    },
    OpSpec {
        kind: OpKind::CreateTag,
        name: "CreateTag",
        marker: "CreateTagRequest",
        requires_auth: true,
        schema: FieldSchema {
            required: &["token", "name"],
            optional: NONE,
            repeatable: NONE,
        },
    },
    OpSpec {
        kind: OpKind::UpdateTag,
        name: "UpdateTag",
        marker: "UpdateTagRequest",
        requires_auth: true,
        schema: FieldSchema {
            required: &["token", "id", "name"],
            optional: NONE,
            repeatable: NONE,
        },
    },
    OpSpec {
        kind: OpKind::DeleteTag,
        name: "DeleteTag",
        marker: "DeleteTagRequest",
        requires_auth: true,
        schema: FieldSchema {
            required: &["token", "id"],
            optional: NONE,
            repeatable: NONE,
        },
    },
];

/// Find the operation whose marker matches the Body element, in table
/// order.
#[must_use]
pub fn find_operation(marker: &str) -> Option<&'static OpSpec> {
    OPERATIONS.iter().find(|op| op.marker == marker)
}

/// The fault message used when a required field is absent. Fields are
/// grouped into the message categories callers already know.
#[must_use]
pub fn missing_field_message(kind: OpKind, field: &str) -> &'static str {
    match (kind, field) {
        (OpKind::RegisterUser | OpKind::Login, _) => "Missing username or password",
        (OpKind::Logout | OpKind::GetNotes | OpKind::GetTags, _)
        | (OpKind::CreateNote | OpKind::CreateTag, "token") => "Missing authentication token",
        (OpKind::CreateNote, _) => "Title and content are required",
        (OpKind::CreateTag, _) => "Tag name is required",
        (OpKind::UpdateNote | OpKind::DeleteNote, _) => {
            "Missing authentication token or note ID"
        }
        (OpKind::UpdateTag, _) => "Missing authentication token, tag ID, or new name",
        (OpKind::DeleteTag, _) => "Missing authentication token or tag ID",
    }
}
