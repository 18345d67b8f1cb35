//! Persistence operations and bulk results.

use serde::{Deserialize, Serialize};
use strum::Display;

use doctree_core::{DocRef, PermissionInheritance};

/// A request the sync client should send to the explorer service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocOperation {
    /// Load the whole document tree.
    FetchDocTree,
    /// Load the list of known document types.
    FetchDocRefTypes,
    /// Load audit information for one document.
    FetchDocInfo { doc_ref: DocRef },
    /// Rename a single document or folder.
    Rename { doc_ref: DocRef, name: String },
    /// Copy documents into a folder.
    Copy {
        doc_refs: Vec<DocRef>,
        destination: DocRef,
        permission_inheritance: PermissionInheritance,
    },
    /// Move documents into a folder.
    Move {
        doc_refs: Vec<DocRef>,
        destination: DocRef,
        permission_inheritance: PermissionInheritance,
    },
    /// Delete documents and their contents.
    Delete { doc_refs: Vec<DocRef> },
}

impl DocOperation {
    /// Create a rename operation.
    pub fn rename(doc_ref: DocRef, name: impl Into<String>) -> Self {
        Self::Rename {
            doc_ref,
            name: name.into(),
        }
    }

    /// Create a copy operation.
    pub fn copy(
        doc_refs: Vec<DocRef>,
        destination: DocRef,
        permission_inheritance: PermissionInheritance,
    ) -> Self {
        Self::Copy {
            doc_refs,
            destination,
            permission_inheritance,
        }
    }

    /// Create a move operation.
    pub fn move_to(
        doc_refs: Vec<DocRef>,
        destination: DocRef,
        permission_inheritance: PermissionInheritance,
    ) -> Self {
        Self::Move {
            doc_refs,
            destination,
            permission_inheritance,
        }
    }

    /// Create a delete operation.
    pub fn delete(doc_refs: Vec<DocRef>) -> Self {
        Self::Delete { doc_refs }
    }

    /// Short label used in logs and request tracking.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FetchDocTree => "fetch tree",
            Self::FetchDocRefTypes => "fetch types",
            Self::FetchDocInfo { .. } => "fetch info",
            Self::Rename { .. } => "rename",
            Self::Copy { .. } => "copy",
            Self::Move { .. } => "move",
            Self::Delete { .. } => "delete",
        }
    }

    /// Check if this operation changes server state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Rename { .. } | Self::Copy { .. } | Self::Move { .. } | Self::Delete { .. }
        )
    }
}

/// The kind of bulk action a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BulkOperation {
    Copy,
    Move,
    Delete,
}

/// Per-item outcome of a bulk copy, move or delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkActionResult {
    /// Items the service processed. For copies these are the new documents.
    #[serde(default)]
    pub succeeded: Vec<DocRef>,
    /// Items the service refused.
    #[serde(default)]
    pub failed: Vec<DocRef>,
    /// Optional human-readable summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BulkActionResult {
    /// Result where every item succeeded.
    pub fn all_succeeded(succeeded: Vec<DocRef>) -> Self {
        Self {
            succeeded,
            failed: Vec::new(),
            message: None,
        }
    }

    /// Check if nothing failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Human-readable summary of the outcome.
    pub fn summary(&self, operation: BulkOperation) -> String {
        let action = match operation {
            BulkOperation::Copy => "Copied",
            BulkOperation::Move => "Moved",
            BulkOperation::Delete => "Deleted",
        };

        if self.failed.is_empty() {
            format!("{} {} items", action, self.succeeded.len())
        } else {
            format!(
                "{} {} items, {} failed",
                action,
                self.succeeded.len(),
                self.failed.len()
            )
        }
    }
}
