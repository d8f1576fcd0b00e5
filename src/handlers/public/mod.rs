pub mod auth;
pub mod entries;
pub mod roles;
pub mod service;
