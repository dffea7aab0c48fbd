//! Error types and Result aliases for OmegaTerm

use std::fmt;
use std::path::PathBuf;

use crate::status::StatusError;

/// Result type alias for OmegaTerm operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for OmegaTerm
#[derive(Debug)]
pub enum Error {
    // === Engine errors ===
    /// Input was submitted while the line feed or a reload holds the prompt
    InputSuspended,

    // === Credential errors ===
    /// A configured secret digest could not be parsed
    InvalidCredentialDigest {
        field: String,
        reason: String,
    },

    // === Persistence errors ===
    /// Failed to read or write the remembered-session marker
    PersistenceFailed {
        path: PathBuf,
        reason: String,
    },

    // === Configuration errors ===
    /// Failed to load configuration file
    ConfigLoadFailed {
        path: PathBuf,
        reason: String,
    },

    /// Configuration file not found
    ConfigNotFound,

    /// Configuration validation failed
    ConfigValidationFailed {
        field: String,
        reason: String,
    },

    /// Failed to serialize configuration
    ConfigSerializationFailed {
        format: String,
        reason: String,
    },

    /// Failed to parse configuration
    ConfigParseFailed {
        format: String,
        reason: String,
    },

    // === Status feed errors ===
    /// Status provider failure
    Status(StatusError),

    // === I/O and serialization errors ===
    /// I/O errors
    Io(std::io::Error),

    /// Serialization errors
    Serde(serde_json::Error),

    /// TOML parsing errors
    Toml(toml::de::Error),

    // === Generic fallback (use sparingly) ===
    /// Generic errors (for cases not yet categorized)
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InputSuspended => {
                write!(f, "Input is suspended while output is being typed")
            }

            Error::InvalidCredentialDigest { field, reason } => {
                write!(f, "Invalid credential digest for '{}': {}", field, reason)
            }

            Error::PersistenceFailed { path, reason } => {
                write!(
                    f,
                    "Failed to persist session state at '{}': {}",
                    path.display(),
                    reason
                )
            }

            Error::ConfigLoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path.display(), reason)
            }
            Error::ConfigNotFound => {
                write!(f, "Configuration file not found")
            }
            Error::ConfigValidationFailed { field, reason } => {
                write!(f, "Configuration validation failed for '{}': {}", field, reason)
            }
            Error::ConfigSerializationFailed { format, reason } => {
                write!(f, "Failed to serialize config as {}: {}", format, reason)
            }
            Error::ConfigParseFailed { format, reason } => {
                write!(f, "Failed to parse {} config: {}", format, reason)
            }

            Error::Status(err) => write!(f, "Status feed error: {}", err),

            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Serde(err) => write!(f, "Serialization error: {}", err),
            Error::Toml(err) => write!(f, "TOML parsing error: {}", err),

            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Status(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Serde(err) => Some(err),
            Error::Toml(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StatusError> for Error {
    fn from(err: StatusError) -> Self {
        Error::Status(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Toml(err)
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Other(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Other(err.to_string())
    }
}
