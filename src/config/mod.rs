/// Database configuration and connection management
pub mod database;

/// Optimizer service settings loading from optimizer.toml
pub mod optimizer;
