//! Error types and conversions

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Popup blocked: {0}")]
    PopupBlocked(String),

    #[error("Flow error: {0}")]
    Flow(String),

    #[error("Flow cancelled")]
    Cancelled,

    #[error("Fragment error: {0}")]
    Fragment(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::PopupBlocked("https://example.com/authorize".to_string());
        assert_eq!(
            err.to_string(),
            "Popup blocked: https://example.com/authorize"
        );

        let err = AppError::Cancelled;
        assert_eq!(err.to_string(), "Flow cancelled");
    }

    #[test]
    fn test_error_to_string_conversion() {
        let message: String = AppError::Flow("no such flow".to_string()).into();
        assert_eq!(message, "Flow error: no such flow");
    }
}
