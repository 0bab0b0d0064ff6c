pub mod token;

pub use token::{TokenService, TokenStatus, TokenStore};
