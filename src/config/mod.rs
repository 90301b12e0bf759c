/// Database configuration and connection management
pub mod database;

/// Portal configuration loading from config.toml
pub mod catalog;

/// Coordinator credentials from environment variables
pub mod coordinator;
