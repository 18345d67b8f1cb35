//! Root dispatcher over the document tree and expression stores.

use doctree_core::DocRef;

use crate::explorer_tree::{ExplorerAction, ExplorerTreeStore};
use crate::expression::{ExpressionAction, ExpressionStore};
use crate::operation::DocOperation;
use crate::picker::PickerId;

/// Any action the application can dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Explorer(ExplorerAction),
    Expression(ExpressionAction),
    /// A document picker made a choice. Every store sees it and keeps what
    /// it owns.
    DocRefPicked { picker_id: PickerId, doc_ref: DocRef },
}

impl From<ExplorerAction> for Action {
    fn from(action: ExplorerAction) -> Self {
        Self::Explorer(action)
    }
}

impl From<ExpressionAction> for Action {
    fn from(action: ExpressionAction) -> Self {
        Self::Expression(action)
    }
}

/// Application state. Actions are applied one at a time through
/// [`Store::dispatch`].
#[derive(Debug, Default)]
pub struct Store {
    explorer_tree: ExplorerTreeStore,
    expressions: ExpressionStore,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn explorer_tree(&self) -> &ExplorerTreeStore {
        &self.explorer_tree
    }

    pub fn explorer_tree_mut(&mut self) -> &mut ExplorerTreeStore {
        &mut self.explorer_tree
    }

    pub fn expressions(&self) -> &ExpressionStore {
        &self.expressions
    }

    /// Apply an action and return the request it calls for, if any.
    pub fn dispatch(&mut self, action: impl Into<Action>) -> Option<DocOperation> {
        match action.into() {
            Action::Explorer(action) => self.explorer_tree.reduce(action),
            Action::Expression(action) => {
                self.expressions.reduce(action);
                None
            }
            Action::DocRefPicked { picker_id, doc_ref } => {
                self.expressions.doc_ref_picked(&picker_id, doc_ref.clone());
                self.explorer_tree.doc_ref_picked(picker_id, doc_ref);
                None
            }
        }
    }
}
