//! Explorer service client for doctree.
//!
//! Requests produced by the stores run as spawned tasks. Their outcome is
//! reported as [`SyncEvent`]s on a channel which the owner of the store
//! drains, so store state only ever changes on the dispatching task.

mod client;
mod error;
mod event;
mod request;
mod tracker;

pub use client::SyncClient;
pub use error::SyncError;
pub use event::{SyncEvent, optimistic_marker};
pub use request::{BulkRequest, RenameRequest, stripped_refs};
pub use tracker::{RequestFailure, RequestTracker};

/// Default channel buffer size for sync events.
pub const SYNC_CHANNEL_SIZE: usize = 100;
