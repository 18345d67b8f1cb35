//! Error types for tree edits and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Reasons a structural edit was refused. None of these leave the tree in a
/// modified state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// No node carries the identifier.
    #[error("Item not found: {uuid}")]
    NotFound { uuid: String },

    /// The move would put an item inside itself or its own subtree.
    #[error("Cannot move {item} into {target}")]
    IllegalMove { item: String, target: String },

    /// The target node cannot hold children.
    #[error("Not a folder: {uuid}")]
    NotAFolder { uuid: String },

    /// The root has no parent to be detached from.
    #[error("Cannot detach the root item: {uuid}")]
    RootItem { uuid: String },
}

impl TreeError {
    /// Create a not-found error for an identifier.
    pub fn not_found(uuid: impl Into<String>) -> Self {
        Self::NotFound { uuid: uuid.into() }
    }

    /// Check if this error only means the target was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors raised while loading client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value failed validation.
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_error_display() {
        let err = TreeError::IllegalMove {
            item: "a".to_string(),
            target: "b".to_string(),
        };
        assert_eq!(err.to_string(), "Cannot move a into b");
        assert!(TreeError::not_found("x").is_not_found());
        assert!(!err.is_not_found());
    }
}
