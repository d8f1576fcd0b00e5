pub mod auth;
pub mod entries;
pub mod groups;
pub mod students;
pub mod users;
