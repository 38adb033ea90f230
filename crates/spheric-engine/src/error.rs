//! Error types for the world engine binary.
//!
//! [`EngineError`] wraps every subsystem failure the startup sequence
//! can hit. `main` itself returns `anyhow::Result`, adding `.context()`
//! at each step; this enum exists for the structured errors underneath,
//! the same way the rest of the workspace wraps subsystem errors rather
//! than stringly-typing them.

/// Top-level error for the world engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: spheric_core::config::ConfigError,
    },

    /// A database connection or query failed.
    #[error("database error: {source}")]
    Db {
        /// The underlying database error.
        #[from]
        source: spheric_db::DbError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: spheric_core::runner::RunnerError,
    },

    /// Observer API server failed to start.
    #[error("observer error: {message}")]
    Observer {
        /// Description of the observer failure.
        message: String,
    },
}
