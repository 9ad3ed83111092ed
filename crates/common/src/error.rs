//! Error types shared across deskreel crates.

use std::path::PathBuf;

/// Top-level error type for deskreel operations.
#[derive(Debug, thiserror::Error)]
pub enum DeskreelError {
    /// A monitor grab or focus/window query failed.
    #[error("Acquisition error: {message}")]
    Acquisition { message: String },

    /// Directory creation or file publication failed.
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// A file already exists where a new frame would be published.
    #[error("Refusing to overwrite existing capture at {path}")]
    PathCollision { path: PathBuf },

    /// An internal precondition was violated (e.g. zero monitors reported).
    #[error("Format error: {message}")]
    Format { message: String },

    #[error("Platform error: {message}")]
    Platform { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using DeskreelError.
pub type DeskreelResult<T> = Result<T, DeskreelError>;

impl DeskreelError {
    pub fn acquisition(msg: impl Into<String>) -> Self {
        Self::Acquisition {
            message: msg.into(),
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage {
            message: msg.into(),
        }
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format {
            message: msg.into(),
        }
    }

    pub fn platform(msg: impl Into<String>) -> Self {
        Self::Platform {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether retrying the same operation within a cycle may succeed.
    ///
    /// Disk-full and permission problems can clear up between attempts;
    /// a collision or a violated precondition will fail identically.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage { .. } | Self::Io(_) => true,
            Self::Image(image::ImageError::IoError(_)) => true,
            _ => false,
        }
    }
}
