//! Core types and structural utilities for doctree.
//!
//! This crate provides the fundamental data structures shared by the
//! explorer and expression stores: document references, predicate
//! expression trees, the generic tree utilities that edit them, and the
//! client configuration.

mod config;
mod doc_ref;
mod error;
mod expression;
pub mod tree;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use doc_ref::{DocRef, DocRefInfo, DocRefUpdate, FOLDER_TYPE, PermissionInheritance};
pub use error::{ConfigError, TreeError};
pub use expression::{
    Condition, ExpressionItem, ExpressionItemUpdate, ExpressionOperator, ExpressionTerm, Op,
};
pub use tree::TreeNode;
