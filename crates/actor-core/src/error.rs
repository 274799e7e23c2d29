use crate::index::IndexError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActorError {
    #[error("action already registered: {0}")]
    DuplicateAction(String),

    #[error("invalid definition for action '{name}': {reason}")]
    InvalidDefinition { name: String, reason: String },

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("type mismatch on action '{action}': expected {expected}, got {got}")]
    TypeMismatch {
        action: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("action '{0}' does not take a timestamp")]
    UnexpectedTimestamp(String),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("config not found at {}: run 'actor publish'", .0.display())]
    ConfigNotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ActorError>;
