//! Error types for STEP file operations.

use thiserror::Error;

/// Errors that can occur during STEP file operations.
#[derive(Error, Debug)]
pub enum StepError {
    /// I/O error writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid geometry (e.g., non-finite coordinate, zero-length seam).
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The solid has no faces to export.
    #[error("Solid has no faces")]
    EmptySolid,
}

impl StepError {
    /// Create an invalid geometry error.
    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry(message.into())
    }
}
