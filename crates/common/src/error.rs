//! Error types shared across check-in crates.

use std::path::PathBuf;

/// Top-level error type for check-in operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckinError {
    #[error("Roster error: {message}")]
    Roster { message: String },

    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Print error: {message}")]
    Print { message: String },

    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Roster is missing required column '{column}'")]
    MissingColumn { column: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using CheckinError.
pub type CheckinResult<T> = Result<T, CheckinError>;

impl CheckinError {
    pub fn roster(msg: impl Into<String>) -> Self {
        Self::Roster {
            message: msg.into(),
        }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn print(msg: impl Into<String>) -> Self {
        Self::Print {
            message: msg.into(),
        }
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Error for a required input file that does not exist.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_names_the_column() {
        let err = CheckinError::MissingColumn {
            column: "Order ID".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Roster is missing required column 'Order ID'"
        );
    }

    #[test]
    fn io_errors_convert_transparently() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CheckinError = io.into();
        assert_eq!(err.to_string(), "gone");
    }
}
