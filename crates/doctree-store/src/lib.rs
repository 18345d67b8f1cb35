//! State stores for doctree.
//!
//! This crate holds the client-side state behind document explorers and
//! expression editors. State changes only through actions applied one at
//! a time by [`Store::dispatch`]; actions that need persisting yield a
//! [`DocOperation`] for the sync client, whose confirmations come back as
//! further actions.
//!
//! - [`ExplorerTreeStore`] owns the canonical document tree and one
//!   [`ExplorerState`] per open explorer.
//! - [`ExpressionStore`] owns any number of predicate expressions keyed by
//!   expression id.
//! - [`PickerId`] routes picked documents back to the widget, or
//!   expression term, that asked for them.

mod explorer;
mod explorer_tree;
mod expression;
mod operation;
mod picker;
mod store;

pub use explorer::{ExplorerState, compute_visibility};
pub use explorer_tree::{
    BulkActionNotice, DocRefInfoState, ExplorerAction, ExplorerTreeStore, PendingBulkAction,
};
pub use expression::{ExpressionAction, ExpressionStore};
pub use operation::{BulkActionResult, BulkOperation, DocOperation};
pub use picker::{EXPRESSION_PREFIX, PICKER_DELIM, PickerId, PickerKeyError, PlainPickerId};
pub use store::{Action, Store};
