pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod normalize;
pub mod services;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use app::{router, AppState};
