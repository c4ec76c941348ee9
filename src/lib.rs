pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod hooks;
pub mod metrics;
pub mod model;
pub mod types;

#[cfg(test)]
pub mod testing;
