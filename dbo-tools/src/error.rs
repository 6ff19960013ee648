use thiserror::Error;
use crate::DboKind;

#[derive(Error, Debug)]
pub enum DboToolsError {
    #[error("Invalid {kind} descriptor '{name}': {reason}")]
    InvalidDescriptor {
        kind: DboKind,
        name: String,
        reason: String,
    },

    #[error("Cannot diff a {actual} against a {expected}")]
    ObjectKindMismatch {
        expected: DboKind,
        actual: DboKind,
    },

    #[error("Unknown function argument mode '{0}'")]
    UnknownArgumentMode(String),

    #[error("Unknown volatility '{0}'")]
    UnknownVolatility(String),

    #[error("Unknown parallel mode '{0}'")]
    UnknownParallel(String),

    #[error("Catalog row for function `{function}` has {actual} entries in `{array}`, expected {expected}")]
    CatalogArrayMismatch {
        function: String,
        array: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("io error: `{0}`")]
    IoError(#[from] std::io::Error),

    #[error("Failed to read descriptor json: `{0}`")]
    JsonError(#[from] serde_json::Error),
}

impl DboToolsError {
    pub(crate) fn invalid(kind: DboKind, name: &str, reason: impl Into<String>) -> Self {
        DboToolsError::InvalidDescriptor {
            kind,
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T = ()> = std::result::Result<T, DboToolsError>;
