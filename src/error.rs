//! Centralized error types for the framework.
//!
//! Setup failures are fatal and surface from construction. Handler failures
//! propagate synchronously out of the emit that ran them, aborting the rest of
//! the fold and the rest of the tick.

/// Main error type for the framework.
///
/// This is the primary error type that should be used in public APIs.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Setup failed: {0}")]
    Setup(String),

    #[error("Handler for '{event}' failed: {source}")]
    Handler {
        event: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Color error: {0}")]
    Color(#[from] ParseColorError),

    #[error("SDL error: {0}")]
    Sdl(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Platform-specific errors.
#[derive(thiserror::Error, Debug)]
pub enum PlatformError {
    #[error("Logging initialization failed: {0}")]
    LoggingInit(String),
}

/// Error type for parsing color strings such as `#ff0000` or `red`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseColorError {
    #[error("Unknown color name: {0}")]
    UnknownName(String),

    #[error("Invalid hex color: {0}")]
    InvalidHex(String),
}

/// Result type for framework operations.
pub type GameResult<T> = Result<T, GameError>;
