//! Events reported by the sync client.

use uuid::Uuid;

use doctree_store::{DocOperation, ExplorerAction};

use crate::SyncError;

/// Lifecycle of one request.
///
/// Every request produces `Started` followed by exactly one of
/// `Confirmed` or `Failed`.
#[derive(Debug)]
pub enum SyncEvent {
    /// The request is about to be sent. `marker` is the local action to
    /// dispatch before the response arrives, if the operation has one.
    Started {
        request_id: Uuid,
        label: &'static str,
        marker: Option<ExplorerAction>,
    },
    /// The service accepted the request. `action` carries both the request
    /// payload and the service's result.
    Confirmed {
        request_id: Uuid,
        label: &'static str,
        action: ExplorerAction,
    },
    /// The request failed. No confirmation follows and pending state is
    /// left in place.
    Failed {
        request_id: Uuid,
        label: &'static str,
        error: SyncError,
    },
}

impl SyncEvent {
    pub fn request_id(&self) -> Uuid {
        match self {
            Self::Started { request_id, .. }
            | Self::Confirmed { request_id, .. }
            | Self::Failed { request_id, .. } => *request_id,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Started { label, .. }
            | Self::Confirmed { label, .. }
            | Self::Failed { label, .. } => *label,
        }
    }

    /// Check if this event ends its request.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Started { .. })
    }
}

/// Local action to apply when an operation starts.
///
/// Opening the info panel happens before the info is fetched. Drag-and-drop
/// moves are applied by the store itself when the drop is accepted.
pub fn optimistic_marker(operation: &DocOperation) -> Option<ExplorerAction> {
    match operation {
        DocOperation::FetchDocInfo { doc_ref } => Some(ExplorerAction::DocRefInfoOpened {
            doc_ref: doc_ref.clone(),
        }),
        _ => None,
    }
}
