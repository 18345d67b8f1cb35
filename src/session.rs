//! Dispatch loop tying the store to the sync client.

use std::collections::BTreeSet;

use color_eyre::eyre::{Result, bail, eyre};
use tokio::sync::mpsc;

use doctree_core::tree::{can_move, find_item};
use doctree_core::{ClientConfig, DocRef, DocRefInfo, PermissionInheritance};
use doctree_store::{Action, BulkOperation, DocOperation, ExplorerAction, Store};
use doctree_sync::{RequestTracker, SyncClient, SyncEvent};

use crate::render;

/// Id of the explorer the command line views the tree through.
const EXPLORER_ID: &str = "cli";

/// One command-line session against the explorer service.
pub struct Session {
    store: Store,
    client: SyncClient,
    events: mpsc::Receiver<SyncEvent>,
    tracker: RequestTracker,
    last_outcome: Option<String>,
}

impl Session {
    /// Create a session. Nothing is fetched until [`Session::load`].
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let (client, events) = SyncClient::new(config)?;
        tracing::info!(url = %client.base_url(), "using explorer service");

        Ok(Self {
            store: Store::new(),
            client,
            events,
            tracker: RequestTracker::new(),
            last_outcome: None,
        })
    }

    /// Fetch the document tree and type list.
    pub async fn load(&mut self) -> Result<()> {
        self.submit(DocOperation::FetchDocTree);
        self.submit(DocOperation::FetchDocRefTypes);
        self.settle().await
    }

    pub fn document_tree(&self) -> Result<&DocRef> {
        self.store
            .explorer_tree()
            .document_tree()
            .ok_or_else(|| eyre!("Document tree has not been loaded"))
    }

    pub fn doc_ref_types(&self) -> &[String] {
        self.store.explorer_tree().doc_ref_types()
    }

    /// Render the tree as seen through an explorer with the given filters.
    pub fn tree(
        &mut self,
        search: &str,
        types: Vec<String>,
        depth: Option<usize>,
    ) -> Result<String> {
        let type_filter: Option<BTreeSet<String>> =
            (!types.is_empty()).then(|| types.into_iter().collect());

        self.dispatch(ExplorerAction::ExplorerTreeOpened {
            explorer_id: EXPLORER_ID.to_string(),
            allow_multi_select: false,
            allow_drag_and_drop: false,
            type_filter,
        });
        self.dispatch(ExplorerAction::SearchTermUpdated {
            explorer_id: EXPLORER_ID.to_string(),
            search_term: search.to_string(),
        });

        let tree = self.document_tree()?;
        let explorer = self
            .store
            .explorer_tree()
            .explorer(EXPLORER_ID)
            .ok_or_else(|| eyre!("Explorer was not opened"))?;
        Ok(render::render_tree(tree, explorer, depth))
    }

    /// Fetch audit information for one document.
    pub async fn info(&mut self, doc_type: &str, uuid: &str) -> Result<DocRefInfo> {
        let doc_ref = DocRef::new_document(uuid, doc_type, "");
        self.submit(DocOperation::FetchDocInfo { doc_ref });
        self.settle().await?;

        let state = self.store.explorer_tree().doc_ref_info().clone();
        self.dispatch(ExplorerAction::DocRefInfoClosed);
        state
            .info
            .ok_or_else(|| eyre!("No information returned for {uuid}"))
    }

    /// Rename a document and return it as the service now has it.
    pub async fn rename(&mut self, uuid: &str, name: &str) -> Result<DocRef> {
        let doc_ref = self.require(uuid)?;
        self.submit(DocOperation::rename(doc_ref, name));
        self.settle().await?;
        self.require(uuid)
    }

    pub async fn move_to(
        &mut self,
        uuids: &[String],
        destination: &str,
        permission_inheritance: PermissionInheritance,
    ) -> Result<String> {
        let (doc_refs, destination) = self.bulk_targets(uuids, destination)?;
        self.dispatch(ExplorerAction::PrepareDocRefMove {
            doc_refs: doc_refs.clone(),
        });
        self.submit(DocOperation::move_to(
            doc_refs,
            destination,
            permission_inheritance,
        ));
        self.settle().await?;
        self.take_outcome()
    }

    pub async fn copy(
        &mut self,
        uuids: &[String],
        destination: &str,
        permission_inheritance: PermissionInheritance,
    ) -> Result<String> {
        let (doc_refs, destination) = self.bulk_targets(uuids, destination)?;
        self.dispatch(ExplorerAction::PrepareDocRefCopy {
            doc_refs: doc_refs.clone(),
        });
        self.submit(DocOperation::copy(doc_refs, destination, permission_inheritance));
        self.settle().await?;
        self.take_outcome()
    }

    pub async fn delete(&mut self, uuids: &[String]) -> Result<String> {
        let doc_refs = uuids
            .iter()
            .map(|uuid| self.require(uuid))
            .collect::<Result<Vec<_>>>()?;
        let root = self.document_tree()?.uuid.clone();
        if doc_refs.iter().any(|d| d.uuid == root) {
            bail!("Cannot delete the root folder");
        }

        self.dispatch(ExplorerAction::PrepareDocRefDelete {
            doc_refs: doc_refs.clone(),
        });
        self.submit(DocOperation::delete(doc_refs));
        self.settle().await?;
        self.take_outcome()
    }

    /// Print any partial-failure notices to stderr.
    pub fn report_notices(&mut self) {
        for notice in self.store.explorer_tree_mut().take_notices() {
            eprintln!("warning: {notice}");
        }
    }

    fn dispatch(&mut self, action: impl Into<Action>) {
        if let Some(operation) = self.store.dispatch(action) {
            self.submit(operation);
        }
    }

    fn submit(&mut self, operation: DocOperation) {
        let label = operation.label();
        let request_id = self.client.submit(operation);
        self.tracker.expect(request_id, label);
    }

    /// Apply sync events until no request is in flight. Fails if any
    /// request failed.
    async fn settle(&mut self) -> Result<()> {
        while !self.tracker.is_idle() {
            let Some(event) = self.events.recv().await else {
                bail!("Sync client stopped with requests in flight");
            };
            self.tracker.observe(&event);

            match event {
                SyncEvent::Started {
                    marker: Some(marker),
                    ..
                } => self.dispatch(marker),
                SyncEvent::Started { .. } => {}
                SyncEvent::Confirmed { action, .. } => {
                    if let Some(outcome) = bulk_outcome(&action) {
                        self.last_outcome = Some(outcome);
                    }
                    self.dispatch(action);
                }
                SyncEvent::Failed { label, error, .. } => {
                    tracing::error!(label, %error, "request failed");
                }
            }
        }

        let failures = self.tracker.take_failures();
        if let Some(first) = failures.first() {
            bail!("{first} ({} requests failed)", failures.len());
        }
        tracing::debug!("{}", self.tracker.summary());
        Ok(())
    }

    fn require(&self, uuid: &str) -> Result<DocRef> {
        find_item(self.document_tree()?, uuid)
            .cloned()
            .ok_or_else(|| eyre!("No document with uuid {uuid}"))
    }

    fn bulk_targets(&self, uuids: &[String], destination: &str) -> Result<(Vec<DocRef>, DocRef)> {
        let destination = self.require(destination)?;
        if !destination.is_folder() {
            bail!("{} is not a folder", destination.name);
        }

        let mut doc_refs = Vec::with_capacity(uuids.len());
        for uuid in uuids {
            let doc_ref = self.require(uuid)?;
            if !can_move(&doc_ref, &destination) {
                bail!("Cannot put {} inside {}", doc_ref.name, destination.name);
            }
            doc_refs.push(doc_ref);
        }
        Ok((doc_refs, destination))
    }

    fn take_outcome(&mut self) -> Result<String> {
        self.last_outcome
            .take()
            .ok_or_else(|| eyre!("The service did not report a result"))
    }
}

/// Summary of a confirmed bulk action.
fn bulk_outcome(action: &ExplorerAction) -> Option<String> {
    match action {
        ExplorerAction::DocRefsCopied { result, .. } => Some(result.summary(BulkOperation::Copy)),
        ExplorerAction::DocRefsMoved { result, .. } => Some(result.summary(BulkOperation::Move)),
        ExplorerAction::DocRefsDeleted { result, .. } => {
            Some(result.summary(BulkOperation::Delete))
        }
        _ => None,
    }
}
