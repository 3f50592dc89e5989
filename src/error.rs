use thiserror::Error;

pub type MarkupResult<T> = Result<T, MarkupError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarkupError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid theme field '{field}': {reason}")]
    InvalidThemeField { field: String, reason: String },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("YAML error: {0}")]
    Yaml(String),

    #[error("Theme storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for MarkupError {
    fn from(err: serde_json::Error) -> Self {
        MarkupError::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for MarkupError {
    fn from(err: serde_yaml::Error) -> Self {
        MarkupError::Yaml(err.to_string())
    }
}

impl From<std::io::Error> for MarkupError {
    fn from(err: std::io::Error) -> Self {
        MarkupError::Io(err.to_string())
    }
}
