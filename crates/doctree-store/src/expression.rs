//! The expression tree store.

use std::collections::HashMap;

use doctree_core::tree::{
    add_item_to_tree, assign_random_uuids, delete_item_from_tree, find_item, move_item_in_tree,
    strip_uuids, update_item_in_tree,
};
use doctree_core::{DocRef, ExpressionItem, ExpressionItemUpdate};

use crate::picker::PickerId;

/// Actions handled by the [`ExpressionStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionAction {
    /// Replace an expression wholesale.
    ExpressionChanged {
        expression_id: String,
        expression: ExpressionItem,
    },
    /// Append a default term under an operator.
    TermAdded {
        expression_id: String,
        operator_id: String,
    },
    /// Append a default operator under an operator.
    OperatorAdded {
        expression_id: String,
        operator_id: String,
    },
    ItemUpdated {
        expression_id: String,
        item_id: String,
        updates: ExpressionItemUpdate,
    },
    ItemDeleted {
        expression_id: String,
        item_id: String,
    },
    /// Reparent an item within the same expression.
    ItemMoved {
        expression_id: String,
        item: ExpressionItem,
        destination: ExpressionItem,
    },
}

/// Expressions being edited, keyed by expression id.
#[derive(Debug, Clone, Default)]
pub struct ExpressionStore {
    expressions: HashMap<String, ExpressionItem>,
}

impl ExpressionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The expression with the given id. `None` means the editor is still
    /// waiting for it.
    pub fn expression(&self, expression_id: &str) -> Option<&ExpressionItem> {
        self.expressions.get(expression_id)
    }

    /// Copy of an expression without client-side identifiers, in the form
    /// the server stores.
    pub fn export(&self, expression_id: &str) -> Option<ExpressionItem> {
        self.expressions.get(expression_id).map(strip_uuids)
    }

    /// Number of expressions held.
    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// Apply an action.
    pub fn reduce(&mut self, action: ExpressionAction) {
        match action {
            ExpressionAction::ExpressionChanged {
                expression_id,
                expression,
            } => {
                self.expressions
                    .insert(expression_id, assign_random_uuids(&expression));
            }
            ExpressionAction::TermAdded {
                expression_id,
                operator_id,
            } => {
                let template = ExpressionItem::new_term();
                self.edit(&expression_id, |tree| {
                    add_item_to_tree(tree, &operator_id, &template)
                });
            }
            ExpressionAction::OperatorAdded {
                expression_id,
                operator_id,
            } => {
                let template = ExpressionItem::new_operator();
                self.edit(&expression_id, |tree| {
                    add_item_to_tree(tree, &operator_id, &template)
                });
            }
            ExpressionAction::ItemUpdated {
                expression_id,
                item_id,
                updates,
            } => {
                self.edit(&expression_id, |tree| {
                    update_item_in_tree(tree, &item_id, &updates)
                });
            }
            ExpressionAction::ItemDeleted {
                expression_id,
                item_id,
            } => {
                self.edit(&expression_id, |tree| delete_item_from_tree(tree, &item_id));
            }
            ExpressionAction::ItemMoved {
                expression_id,
                item,
                destination,
            } => {
                self.edit(&expression_id, |tree| {
                    move_item_in_tree(tree, &item, &destination)
                });
            }
        }
    }

    /// Attach a picked document to the term named by an expression picker.
    /// Pickers belonging to anything else are ignored.
    pub fn doc_ref_picked(&mut self, picker_id: &PickerId, doc_ref: DocRef) {
        let Some((expression_id, term_uuid)) = picker_id.expression_term() else {
            return;
        };
        let is_term = self
            .expressions
            .get(expression_id)
            .and_then(|tree| find_item(tree, term_uuid))
            .is_some_and(ExpressionItem::is_term);
        if !is_term {
            tracing::debug!(picker = %picker_id, "picked document for unknown term");
            return;
        }

        let update = ExpressionItemUpdate::picked_dictionary(doc_ref);
        self.edit(expression_id, |tree| update_item_in_tree(tree, term_uuid, &update));
    }

    fn edit<F>(&mut self, expression_id: &str, edit: F)
    where
        F: FnOnce(&ExpressionItem) -> ExpressionItem,
    {
        match self.expressions.get_mut(expression_id) {
            Some(tree) => *tree = edit(tree),
            None => tracing::debug!(expression = expression_id, "action for unknown expression"),
        }
    }
}
