//! Error types for the demo engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup.

/// Top-level error for the demo engine binary.
///
/// Each variant wraps a specific failure, providing a single error type
/// that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Run configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: braid_runner::config::ConfigError,
    },

    /// Model parameter loading failed.
    #[error("model error: {message}")]
    Model {
        /// Description of the model config failure.
        message: String,
    },
}
