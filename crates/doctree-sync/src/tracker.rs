//! Request tracking.

use std::collections::HashMap;
use std::time::Instant;

use uuid::Uuid;

use crate::SyncEvent;

/// A request that ended in failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailure {
    pub request_id: Uuid,
    pub label: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl std::fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.label, self.message)
    }
}

/// Tracks in-flight requests and the failures reported for them.
#[derive(Debug, Default)]
pub struct RequestTracker {
    pending: HashMap<Uuid, (&'static str, Instant)>,
    failures: Vec<RequestFailure>,
    confirmed: usize,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event.
    pub fn observe(&mut self, event: &SyncEvent) {
        match event {
            SyncEvent::Started {
                request_id, label, ..
            } => {
                self.pending.insert(*request_id, (*label, Instant::now()));
            }
            SyncEvent::Confirmed { request_id, .. } => {
                self.finish(*request_id);
                self.confirmed += 1;
            }
            SyncEvent::Failed {
                request_id,
                label,
                error,
            } => {
                self.finish(*request_id);
                self.failures.push(RequestFailure {
                    request_id: *request_id,
                    label: *label,
                    message: error.to_string(),
                    retryable: error.is_retryable(),
                });
            }
        }
    }

    fn finish(&mut self, request_id: Uuid) {
        if let Some((label, started)) = self.pending.remove(&request_id) {
            tracing::debug!(
                %request_id,
                label,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "request finished"
            );
        }
    }

    /// Mark a submitted request as in flight before its `Started` event
    /// arrives.
    pub fn expect(&mut self, request_id: Uuid, label: &'static str) {
        self.pending
            .entry(request_id)
            .or_insert((label, Instant::now()));
    }

    /// Check if a request has not finished yet.
    pub fn is_pending(&self, request_id: Uuid) -> bool {
        self.pending.contains_key(&request_id)
    }

    /// Number of requests still in flight.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Check if nothing is in flight.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn confirmed_count(&self) -> usize {
        self.confirmed
    }

    pub fn failures(&self) -> &[RequestFailure] {
        &self.failures
    }

    /// Drain the recorded failures.
    pub fn take_failures(&mut self) -> Vec<RequestFailure> {
        std::mem::take(&mut self.failures)
    }

    /// Human-readable summary of finished requests.
    pub fn summary(&self) -> String {
        if self.failures.is_empty() {
            format!("{} requests confirmed", self.confirmed)
        } else {
            format!(
                "{} requests confirmed, {} failed",
                self.confirmed,
                self.failures.len()
            )
        }
    }
}
