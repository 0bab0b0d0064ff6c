pub mod note;
pub mod revocation;
pub mod tag;
pub mod user;

pub use note::NoteRepository;
pub use revocation::RevocationRepository;
pub use tag::{TagRename, TagRepository};
pub use user::UserRepository;
