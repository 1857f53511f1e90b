use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for tether operations outside the resolution engine.
#[derive(Debug, Error, Diagnostic)]
pub enum TetherError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unreadable configuration file.
    #[error("Config error: {message}")]
    #[diagnostic(help("Check ~/.tether/config.toml or the file passed with --config"))]
    Config { message: String },

    /// Invalid module universe description.
    #[error("Universe error: {message}")]
    #[diagnostic(help("Check the [[module]] tables of your universe file"))]
    Universe { message: String },

    /// Resolution could not produce a consistent wiring.
    #[error("Resolution failed: {message}")]
    Resolution { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type TetherResult<T> = miette::Result<T>;

