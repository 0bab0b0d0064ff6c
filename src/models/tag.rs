use serde::{Deserialize, Serialize};

/// A tag entity. Notes reference tags by name, not id, so a rename here
/// leaves note tag lists untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
}
