pub mod note;
pub mod tag;
pub mod token;
pub mod user;

pub use note::{Note, NotePatch};
pub use tag::Tag;
pub use token::RevokedToken;
pub use user::User;
