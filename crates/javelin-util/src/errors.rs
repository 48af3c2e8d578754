use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all javelin operations.
#[derive(Debug, Error, Diagnostic)]
pub enum JavelinError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed deps manifest (e.g. javelin.toml).
    #[error("Manifest error: {message}")]
    #[diagnostic(help("Check your javelin.toml for syntax errors"))]
    Manifest { message: String },

    /// Bad caller input at the API boundary (unknown alias key, missing
    /// coordinate data, unqualified library name).
    #[error("Invalid input: {message}")]
    Input { message: String },

    /// Dependency resolution failed for a specific library.
    ///
    /// Carries the originating library and, when known, the coordinate
    /// summary so callers can point at the offending manifest entry.
    #[error("Resolution of {lib} failed: {message}")]
    Resolution {
        lib: String,
        coord: Option<String>,
        message: String,
    },

    /// Network request or download failed.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Work was abandoned because the operation shut down first.
    #[error("Interrupted: {message}")]
    Interrupted { message: String },

    /// An internal invariant of the version map or expander was broken.
    /// Always a bug, never a user error.
    #[error("Internal invariant violated: {message}")]
    #[diagnostic(help("This is a bug in javelin; please report it"))]
    Invariant { message: String },
}

impl JavelinError {
    /// Build a resolution error for a library with no coordinate context.
    pub fn resolution(lib: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolution {
            lib: lib.into(),
            coord: None,
            message: message.into(),
        }
    }
}

/// Convenience alias for `miette::Result<T>`.
pub type JavelinResult<T> = miette::Result<T>;
