//! Remote Layer - Core Traits
//!
//! Defines the abstract interface to the remote data service.
//! Implementations can be HTTP-backed, in-memory, etc.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::{DomainResult, Todo, TodoDraft, TodoId, TodoPatch};

/// A full authoritative view of the collection, as emitted by the
/// live query and returned by `list`
pub type QuerySnapshot = Vec<Todo>;

/// Remote data service for the todo collection
///
/// Four request/response operations plus one push-based live query.
/// All operations are async to support various backends.
#[async_trait]
pub trait TodoService: Send + Sync {
    /// Fetch all current records
    async fn list(&self) -> DomainResult<Vec<Todo>>;

    /// Create a new record; the service assigns id and timestamps
    async fn create(&self, draft: &TodoDraft) -> DomainResult<Todo>;

    /// Partially update an existing record; fails if `id` does not exist
    async fn update(&self, id: &TodoId, patch: &TodoPatch) -> DomainResult<Todo>;

    /// Delete a record; fails if `id` does not exist
    async fn delete(&self, id: &TodoId) -> DomainResult<()>;

    /// Open a live query over the collection. Every change to the
    /// underlying collection produces a push of the full current
    /// record sequence. Cancelled by dropping the observer.
    fn observe_query(&self) -> QueryObserver;
}

/// Receiving end of a live query
pub struct QueryObserver {
    rx: broadcast::Receiver<QuerySnapshot>,
}

impl QueryObserver {
    pub fn new(rx: broadcast::Receiver<QuerySnapshot>) -> Self {
        QueryObserver { rx }
    }

    /// Wait for the next emission. Returns None once the service side
    /// is gone. Missed emissions are skipped, not replayed: every push
    /// carries the whole collection, so only the latest matters.
    pub async fn next(&mut self) -> Option<QuerySnapshot> {
        loop {
            match self.rx.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    log::warn!("live query lagged, skipped {} stale emissions", missed);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
