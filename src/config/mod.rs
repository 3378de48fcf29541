/// Database configuration and connection management
pub mod database;

/// Demo seed file loading from TOML
pub mod seed;

/// HTTP server settings from environment variables
pub mod server;
