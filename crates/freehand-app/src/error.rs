//! Application errors.

use freehand_core::{CommandError, LibraryError, SceneError, StorageError};
use freehand_render::RendererError;
use thiserror::Error;

/// Errors surfaced by the application shell.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Render error: {0}")]
    Render(#[from] RendererError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Unsupported image: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Command {0} needs an argument")]
    MissingArgument(&'static str),
}

impl AppError {
    /// Short text shown to the user when an action is rejected.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Scene(_) => "Invalid file".to_string(),
            AppError::Library(LibraryError::Json(_) | LibraryError::NotAnArray) => {
                "Import failed".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(AppError::Scene(SceneError::NotAnArray).user_message(), "Invalid file");
        assert_eq!(
            AppError::Library(LibraryError::NotAnArray).user_message(),
            "Import failed"
        );
        assert_eq!(
            AppError::InvalidColor("red".to_string()).user_message(),
            "Invalid color: red"
        );
    }

    #[test]
    fn test_storage_errors_pass_through() {
        let err = AppError::Library(LibraryError::Storage(StorageError::Io("disk full".to_string())));
        assert!(err.user_message().contains("disk full"));
    }
}
