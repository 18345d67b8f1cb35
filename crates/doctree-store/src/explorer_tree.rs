//! The document tree store.
//!
//! Holds the canonical document tree and the view state of every open
//! explorer. UI events and server confirmations arrive as
//! [`ExplorerAction`]s and are applied by [`ExplorerTreeStore::reduce`].
//! Actions addressed to an explorer or document that no longer exists are
//! ignored, since confirmations can arrive after the widget that asked for
//! them has gone.

use std::collections::{BTreeSet, HashMap};

use doctree_core::tree::{
    can_move, find_item, find_parent, move_item_in_tree, reassign_uuids,
    try_delete_item_from_tree, try_insert_item_in_tree, update_item_in_tree,
};
use doctree_core::{DocRef, DocRefInfo, DocRefUpdate, FOLDER_TYPE, PermissionInheritance};

use crate::explorer::ExplorerState;
use crate::operation::{BulkActionResult, BulkOperation, DocOperation};
use crate::picker::PickerId;

/// Actions handled by the [`ExplorerTreeStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplorerAction {
    /// An explorer was mounted.
    ExplorerTreeOpened {
        explorer_id: String,
        allow_multi_select: bool,
        allow_drag_and_drop: bool,
        type_filter: Option<BTreeSet<String>>,
    },
    /// An explorer was unmounted.
    ExplorerTreeClosed { explorer_id: String },
    SearchTermUpdated {
        explorer_id: String,
        search_term: String,
    },
    FolderOpenToggled {
        explorer_id: String,
        doc_ref: DocRef,
    },
    DocRefSelected {
        explorer_id: String,
        doc_ref: DocRef,
    },
    /// A drag-and-drop move inside an explorer. Applied optimistically and
    /// persisted with a move request.
    MoveExplorerItem {
        explorer_id: String,
        item: DocRef,
        target: DocRef,
        permission_inheritance: PermissionInheritance,
    },
    /// Full tree from the service.
    DocTreeReceived { document_tree: DocRef },
    DocRefTypesReceived { doc_ref_types: Vec<String> },
    DocRefInfoOpened { doc_ref: DocRef },
    DocRefInfoReceived { info: DocRefInfo },
    DocRefInfoClosed,
    /// Server-confirmed rename.
    DocRefRenamed {
        doc_ref: DocRef,
        name: String,
        result: DocRef,
    },
    /// Server-confirmed copy.
    DocRefsCopied {
        doc_refs: Vec<DocRef>,
        destination: DocRef,
        result: BulkActionResult,
    },
    /// Server-confirmed move.
    DocRefsMoved {
        doc_refs: Vec<DocRef>,
        destination: DocRef,
        result: BulkActionResult,
    },
    /// Server-confirmed delete.
    DocRefsDeleted {
        doc_refs: Vec<DocRef>,
        result: BulkActionResult,
    },
    PrepareDocRefCopy { doc_refs: Vec<DocRef> },
    CompleteDocRefCopy,
    PrepareDocRefMove { doc_refs: Vec<DocRef> },
    CompleteDocRefMove,
    PrepareDocRefDelete { doc_refs: Vec<DocRef> },
    CompleteDocRefDelete,
}

/// Documents gathered for a copy, move or delete dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingBulkAction {
    pub doc_refs: Vec<DocRef>,
}

impl PendingBulkAction {
    /// Check if the dialog should be showing.
    pub fn is_active(&self) -> bool {
        !self.doc_refs.is_empty()
    }

    fn set(&mut self, doc_refs: Vec<DocRef>) {
        self.doc_refs = doc_refs;
    }

    fn clear(&mut self) {
        self.doc_refs.clear();
    }
}

/// State of the document info panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocRefInfoState {
    pub is_open: bool,
    pub doc_ref: Option<DocRef>,
    pub info: Option<DocRefInfo>,
}

/// Items of a bulk action the service refused, for the user to be told.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkActionNotice {
    pub operation: BulkOperation,
    pub failed: Vec<DocRef>,
    pub message: Option<String>,
}

impl std::fmt::Display for BulkActionNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.failed.iter().map(|d| d.name.as_str()).collect();
        write!(
            f,
            "{} failed for {} items: {}",
            self.operation,
            self.failed.len(),
            names.join(", ")
        )?;
        if let Some(message) = &self.message {
            write!(f, " ({message})")?;
        }
        Ok(())
    }
}

/// Canonical document tree plus the explorers viewing it.
#[derive(Debug, Default)]
pub struct ExplorerTreeStore {
    document_tree: Option<DocRef>,
    explorers: HashMap<String, ExplorerState>,
    picked_doc_refs: HashMap<PickerId, DocRef>,
    doc_ref_types: Vec<String>,
    doc_ref_info: DocRefInfoState,
    pending_copy: PendingBulkAction,
    pending_move: PendingBulkAction,
    pending_delete: PendingBulkAction,
    notices: Vec<BulkActionNotice>,
    /// Parent each dropped item had before its unconfirmed move.
    dropped_from: HashMap<String, String>,
}

impl ExplorerTreeStore {
    /// Create an empty store. The tree is absent until the first
    /// [`ExplorerAction::DocTreeReceived`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The canonical tree, if it has been loaded.
    pub fn document_tree(&self) -> Option<&DocRef> {
        self.document_tree.as_ref()
    }

    /// View state of an explorer, if it is open.
    pub fn explorer(&self, explorer_id: &str) -> Option<&ExplorerState> {
        self.explorers.get(explorer_id)
    }

    /// Document picked by a picker, if any.
    pub fn picked_doc_ref(&self, picker_id: &PickerId) -> Option<&DocRef> {
        self.picked_doc_refs.get(picker_id)
    }

    pub fn doc_ref_types(&self) -> &[String] {
        &self.doc_ref_types
    }

    pub fn doc_ref_info(&self) -> &DocRefInfoState {
        &self.doc_ref_info
    }

    pub fn pending_copy(&self) -> &PendingBulkAction {
        &self.pending_copy
    }

    pub fn pending_move(&self) -> &PendingBulkAction {
        &self.pending_move
    }

    pub fn pending_delete(&self) -> &PendingBulkAction {
        &self.pending_delete
    }

    /// Drain the queued partial-failure notices.
    pub fn take_notices(&mut self) -> Vec<BulkActionNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Check if `item` may be dropped onto `target` in an explorer.
    ///
    /// The explorer must allow drag and drop, and both nodes are resolved
    /// against the canonical tree before [`can_move`] is applied. The same
    /// check gates [`ExplorerAction::MoveExplorerItem`].
    pub fn can_drop(&self, explorer_id: &str, item: &DocRef, target: &DocRef) -> bool {
        self.resolve_drop(explorer_id, item, target).is_some()
    }

    /// Record a picked document.
    pub fn doc_ref_picked(&mut self, picker_id: PickerId, doc_ref: DocRef) {
        self.picked_doc_refs.insert(picker_id, doc_ref);
    }

    /// Apply an action. Returns the request to send when the action needs
    /// persisting.
    pub fn reduce(&mut self, action: ExplorerAction) -> Option<DocOperation> {
        match action {
            ExplorerAction::ExplorerTreeOpened {
                explorer_id,
                allow_multi_select,
                allow_drag_and_drop,
                type_filter,
            } => {
                let mut explorer =
                    ExplorerState::new(allow_multi_select, allow_drag_and_drop, type_filter);
                explorer.recompute_visibility(self.document_tree.as_ref());
                if let Some(root) = &self.document_tree {
                    explorer.open_folder(&root.uuid);
                }
                self.explorers.insert(explorer_id, explorer);
            }
            ExplorerAction::ExplorerTreeClosed { explorer_id } => {
                self.explorers.remove(&explorer_id);
            }
            ExplorerAction::SearchTermUpdated {
                explorer_id,
                search_term,
            } => {
                let tree = self.document_tree.as_ref();
                if let Some(explorer) = explorer_mut(&mut self.explorers, &explorer_id) {
                    explorer.set_search_term(search_term, tree);
                }
            }
            ExplorerAction::FolderOpenToggled {
                explorer_id,
                doc_ref,
            } => {
                if let Some(explorer) = explorer_mut(&mut self.explorers, &explorer_id) {
                    explorer.toggle_folder(&doc_ref.uuid);
                }
            }
            ExplorerAction::DocRefSelected {
                explorer_id,
                doc_ref,
            } => {
                if let Some(explorer) = explorer_mut(&mut self.explorers, &explorer_id) {
                    explorer.select(&doc_ref.uuid);
                }
            }
            ExplorerAction::MoveExplorerItem {
                explorer_id,
                item,
                target,
                permission_inheritance,
            } => {
                return self.move_explorer_item(&explorer_id, &item, &target, permission_inheritance);
            }
            ExplorerAction::DocTreeReceived { document_tree } => {
                for explorer in self.explorers.values_mut() {
                    explorer.prune(&document_tree);
                    if !explorer.has_open_state() {
                        explorer.open_folder(&document_tree.uuid);
                    }
                }
                self.dropped_from.clear();
                self.document_tree = Some(document_tree);
                self.refresh_visibility();
            }
            ExplorerAction::DocRefTypesReceived { doc_ref_types } => {
                self.doc_ref_types = doc_ref_types;
            }
            ExplorerAction::DocRefInfoOpened { doc_ref } => {
                self.doc_ref_info = DocRefInfoState {
                    is_open: true,
                    doc_ref: Some(doc_ref),
                    info: None,
                };
            }
            ExplorerAction::DocRefInfoReceived { info } => {
                let expected = self
                    .doc_ref_info
                    .doc_ref
                    .as_ref()
                    .is_some_and(|d| d.uuid == info.doc_ref.uuid);
                if self.doc_ref_info.is_open && expected {
                    self.doc_ref_info.info = Some(info);
                } else {
                    tracing::debug!(uuid = %info.doc_ref.uuid, "info arrived for a closed panel");
                }
            }
            ExplorerAction::DocRefInfoClosed => {
                self.doc_ref_info = DocRefInfoState::default();
            }
            ExplorerAction::DocRefRenamed {
                doc_ref,
                name,
                result,
            } => {
                self.apply_rename(&doc_ref, &name, &result);
            }
            ExplorerAction::DocRefsCopied {
                doc_refs,
                destination,
                result,
            } => {
                self.pending_copy.clear();
                self.apply_copy(&doc_refs, &destination, result);
            }
            ExplorerAction::DocRefsMoved {
                doc_refs,
                destination,
                result,
            } => {
                self.pending_move.clear();
                self.apply_move(&doc_refs, &destination, result);
            }
            ExplorerAction::DocRefsDeleted { doc_refs, result } => {
                self.pending_delete.clear();
                self.apply_delete(&doc_refs, result);
            }
            ExplorerAction::PrepareDocRefCopy { doc_refs } => self.pending_copy.set(doc_refs),
            ExplorerAction::CompleteDocRefCopy => self.pending_copy.clear(),
            ExplorerAction::PrepareDocRefMove { doc_refs } => self.pending_move.set(doc_refs),
            ExplorerAction::CompleteDocRefMove => self.pending_move.clear(),
            ExplorerAction::PrepareDocRefDelete { doc_refs } => self.pending_delete.set(doc_refs),
            ExplorerAction::CompleteDocRefDelete => self.pending_delete.clear(),
        }
        None
    }

    /// Resolve a drop to the current nodes of the canonical tree, if legal.
    fn resolve_drop(
        &self,
        explorer_id: &str,
        item: &DocRef,
        target: &DocRef,
    ) -> Option<(&DocRef, &DocRef)> {
        let explorer = self.explorers.get(explorer_id)?;
        if !explorer.allow_drag_and_drop() {
            return None;
        }
        let tree = self.document_tree.as_ref()?;
        let item = find_item(tree, &item.uuid)?;
        let target = find_item(tree, &target.uuid)?;
        can_move(item, target).then_some((item, target))
    }

    fn move_explorer_item(
        &mut self,
        explorer_id: &str,
        item: &DocRef,
        target: &DocRef,
        permission_inheritance: PermissionInheritance,
    ) -> Option<DocOperation> {
        let Some((item, target)) = self.resolve_drop(explorer_id, item, target) else {
            tracing::warn!(
                explorer = explorer_id,
                item = %item.uuid,
                target = %target.uuid,
                "drop rejected"
            );
            return None;
        };
        let (item, target) = (item.clone(), target.clone());
        let tree = self.document_tree.as_ref()?;
        let parent = find_parent(tree, &item.uuid)?.uuid.clone();

        if parent == target.uuid {
            tracing::debug!(item = %item.uuid, "drop onto current parent");
            return None;
        }

        let moved = move_item_in_tree(tree, &item, &target);
        self.dropped_from.entry(item.uuid.clone()).or_insert(parent);
        self.document_tree = Some(moved);
        self.refresh_visibility();

        Some(DocOperation::move_to(
            vec![item.stripped()],
            target.stripped(),
            permission_inheritance,
        ))
    }

    fn apply_rename(&mut self, doc_ref: &DocRef, name: &str, result: &DocRef) {
        let Some(tree) = &self.document_tree else {
            return;
        };
        if result.name != name {
            tracing::debug!(requested = name, applied = %result.name, "service adjusted name");
        }
        let update = DocRefUpdate {
            name: Some(result.name.clone()),
            doc_type: Some(result.doc_type.clone()),
        };
        self.document_tree = Some(update_item_in_tree(tree, &doc_ref.uuid, &update));

        for picked in self.picked_doc_refs.values_mut() {
            if picked.uuid == doc_ref.uuid {
                picked.name = result.name.clone();
            }
        }
        self.refresh_visibility();
        tracing::info!(uuid = %doc_ref.uuid, name = %result.name, "renamed");
    }

    fn apply_copy(&mut self, doc_refs: &[DocRef], destination: &DocRef, result: BulkActionResult) {
        self.notify_failures(BulkOperation::Copy, &result);
        let Some(mut tree) = self.document_tree.clone() else {
            return;
        };

        for copied in &result.succeeded {
            // An echoed source identifier gets a local copy with fresh ids
            // until the next full refresh.
            let item = match find_item(&tree, &copied.uuid) {
                Some(source) => reassign_uuids(source),
                None => copy_from_confirmation(&tree, doc_refs, copied),
            };
            match try_insert_item_in_tree(&tree, &destination.uuid, item) {
                Ok(new_tree) => tree = new_tree,
                Err(e) => tracing::debug!(error = %e, "copy not applied"),
            }
        }

        self.document_tree = Some(tree);
        self.refresh_visibility();
        tracing::info!(
            requested = doc_refs.len(),
            "{}",
            result.summary(BulkOperation::Copy)
        );
    }

    fn apply_move(&mut self, doc_refs: &[DocRef], destination: &DocRef, result: BulkActionResult) {
        self.notify_failures(BulkOperation::Move, &result);
        let Some(mut tree) = self.document_tree.clone() else {
            return;
        };

        for moved in &result.succeeded {
            self.dropped_from.remove(&moved.uuid);
            let already_there =
                find_parent(&tree, &moved.uuid).is_some_and(|p| p.uuid == destination.uuid);
            if !already_there {
                tree = move_item_in_tree(&tree, moved, destination);
            }
        }

        // Undo optimistic drops the service refused.
        for failed in &result.failed {
            let Some(parent) = self.dropped_from.remove(&failed.uuid) else {
                continue;
            };
            let Some(origin) = find_item(&tree, &parent).cloned() else {
                tracing::debug!(uuid = %failed.uuid, "original parent gone, drop kept");
                continue;
            };
            tree = move_item_in_tree(&tree, failed, &origin);
            tracing::info!(uuid = %failed.uuid, parent = %parent, "drop rolled back");
        }

        self.document_tree = Some(tree);
        self.refresh_visibility();
        tracing::info!(
            requested = doc_refs.len(),
            "{}",
            result.summary(BulkOperation::Move)
        );
    }

    fn apply_delete(&mut self, doc_refs: &[DocRef], result: BulkActionResult) {
        self.notify_failures(BulkOperation::Delete, &result);
        let Some(mut tree) = self.document_tree.clone() else {
            return;
        };

        for deleted in &result.succeeded {
            match try_delete_item_from_tree(&tree, &deleted.uuid) {
                Ok(new_tree) => tree = new_tree,
                Err(e) => tracing::debug!(error = %e, "delete not applied"),
            }
        }

        for explorer in self.explorers.values_mut() {
            explorer.prune(&tree);
        }
        self.document_tree = Some(tree);
        self.refresh_visibility();
        tracing::info!(
            requested = doc_refs.len(),
            "{}",
            result.summary(BulkOperation::Delete)
        );
    }

    fn notify_failures(&mut self, operation: BulkOperation, result: &BulkActionResult) {
        if result.failed.is_empty() {
            return;
        }
        let notice = BulkActionNotice {
            operation,
            failed: result.failed.clone(),
            message: result.message.clone(),
        };
        tracing::warn!("{notice}");
        self.notices.push(notice);
    }

    fn refresh_visibility(&mut self) {
        let tree = self.document_tree.as_ref();
        for explorer in self.explorers.values_mut() {
            explorer.recompute_visibility(tree);
        }
    }
}

/// Local version of a copy the service created under a new identifier.
///
/// Confirmations carry stripped references, so the subtree comes from the
/// matching source item with fresh identifiers below the service's root id.
fn copy_from_confirmation(tree: &DocRef, doc_refs: &[DocRef], copied: &DocRef) -> DocRef {
    let source = doc_refs
        .iter()
        .filter(|d| d.doc_type == copied.doc_type && d.name == copied.name)
        .find_map(|d| find_item(tree, &d.uuid));

    let mut item = match source {
        Some(source) => reassign_uuids(source),
        None => copied.clone(),
    };
    item.uuid = copied.uuid.clone();
    item.name = copied.name.clone();
    if item.doc_type == FOLDER_TYPE && item.children.is_none() {
        item.children = Some(Vec::new());
    }
    item
}

fn explorer_mut<'a>(
    explorers: &'a mut HashMap<String, ExplorerState>,
    explorer_id: &str,
) -> Option<&'a mut ExplorerState> {
    let explorer = explorers.get_mut(explorer_id);
    if explorer.is_none() {
        tracing::debug!(explorer = explorer_id, "action for unknown explorer");
    }
    explorer
}
