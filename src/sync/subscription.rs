//! Subscription Glue
//!
//! Bridges the remote live query to the local store: one authoritative
//! list fetch up front, then a background task applying every push via
//! `replace_all`. Teardown cancels the task and detaches the session so
//! nothing mutates the store afterwards.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::domain::DomainResult;
use super::session::{SyncNotice, TodoSession};

/// Handle to a running live subscription. Dropping it (or calling
/// `unsubscribe`) cancels the background task; no further store
/// mutation can originate from this subscription afterwards.
pub struct SubscriptionHandle {
    task: JoinHandle<()>,
    attached: Arc<AtomicBool>,
}

impl SubscriptionHandle {
    pub fn is_active(&self) -> bool {
        self.attached.load(Ordering::SeqCst) && !self.task.is_finished()
    }

    /// Explicit teardown; equivalent to dropping the handle
    pub fn unsubscribe(self) {}
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.attached.store(false, Ordering::SeqCst);
        self.task.abort();
    }
}

impl TodoSession {
    /// Populate the store with one authoritative `list` fetch, then open
    /// the live subscription. The observer is opened before the fetch so
    /// no change can fall between the two; any push that raced the fetch
    /// is applied right after it, and pushes carry full snapshots anyway.
    pub async fn subscribe(&self) -> DomainResult<SubscriptionHandle> {
        let mut observer = self.service.observe_query();

        let records = self.service.list().await?;
        self.store.lock().await.replace_all(records);
        self.attached.store(true, Ordering::SeqCst);

        let store = self.store();
        let attached = Arc::clone(&self.attached);
        let notices = self.notices.clone();

        let task = tokio::spawn(async move {
            while let Some(snapshot) = observer.next().await {
                if !attached.load(Ordering::SeqCst) {
                    break;
                }
                store.lock().await.replace_all(snapshot);
            }
            // the service side closed the stream; tell the view
            if attached.swap(false, Ordering::SeqCst) {
                log::warn!("live query ended by the service");
                let _ = notices.send(SyncNotice::SubscriptionEnded);
            }
        });

        Ok(SubscriptionHandle {
            task,
            attached: Arc::clone(&self.attached),
        })
    }
}
