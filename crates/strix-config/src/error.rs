//! Configuration errors.

/// Failures resolving the environment into a [`crate::Config`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable was not set.
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),

    /// An environment variable that must parse as a number didn't.
    #[error("environment variable {var} must be a number, got {value:?}")]
    InvalidNumber {
        /// The variable name.
        var: &'static str,
        /// The value that failed to parse.
        value: String,
    },

    /// An environment variable that must parse as a boolean-like flag
    /// didn't (accepted: `1`, `true`, `0`, `false`, case-insensitive).
    #[error("environment variable {var} must be a boolean flag, got {value:?}")]
    InvalidBool {
        /// The variable name.
        var: &'static str,
        /// The value that failed to parse.
        value: String,
    },
}

/// Result alias for fallible configuration resolution.
pub type ConfigResult<T> = Result<T, ConfigError>;
