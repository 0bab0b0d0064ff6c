pub mod notes;
pub mod tags;
pub mod users;
