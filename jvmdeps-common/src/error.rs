use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum JvmDepsError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] Arc<serde_json::Error>),

    #[error("TOML Parsing Error: {0}")]
    Toml(#[from] Arc<toml::de::Error>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Invalid label {input:?}: {reason}")]
    LabelParse { input: String, reason: String },

    #[error("Invalid Maven coordinate {0:?} - needed at least 2 :s")]
    Coordinate(String),

    #[error("Manifest Error: {0}")]
    Manifest(String),

    #[error("no external imports provide package {package}")]
    NoExternalImports { package: String },

    #[error("package {package} is provided by multiple artifacts: {}", candidates.join(", "))]
    MultipleExternalImports {
        package: String,
        candidates: Vec<String>,
    },

    #[error("Parsing Error in {0}: {1}")]
    ParseError(&'static str, String),
}

impl JvmDepsError {
    pub fn label_parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LabelParse {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for JvmDepsError {
    fn from(err: std::io::Error) -> Self {
        JvmDepsError::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for JvmDepsError {
    fn from(err: serde_json::Error) -> Self {
        JvmDepsError::Json(Arc::new(err))
    }
}

impl From<toml::de::Error> for JvmDepsError {
    fn from(err: toml::de::Error) -> Self {
        JvmDepsError::Toml(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, JvmDepsError>;
