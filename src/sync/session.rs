//! Reconciliation Session
//!
//! Sequences each user action as: optimistic store mutation first, remote
//! request second, compensation third if the request fails. Successful
//! requests need no follow-up; the next live-query push supersedes the
//! optimistic state. Failures are compensated locally and surfaced as
//! notices for the embedding view to display.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use crate::domain::{DomainError, DomainResult, Todo, TodoDraft, TodoEdit, TodoId, TodoPatch, TodoStatus};
use crate::remote::TodoService;
use crate::store::{StoreOutcome, TodoStore};

/// Store shared between the session, the subscription task, and the view
pub type SharedStore = Arc<Mutex<TodoStore>>;

/// User action categories, for failure notices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncAction::Create => f.write_str("create"),
            SyncAction::Update => f.write_str("update"),
            SyncAction::Delete => f.write_str("delete"),
        }
    }
}

/// User-visible notifications emitted by the session
#[derive(Debug, Clone)]
pub enum SyncNotice {
    /// A remote request failed; local state has been compensated
    ActionFailed { action: SyncAction, error: DomainError },
    /// The authoritative refetch after a failed update/delete also
    /// failed; the store was left as-is
    RefetchFailed { error: DomainError },
    /// The live query terminated on its own (service side gone)
    SubscriptionEnded,
}

/// A reconciliation session binding one store to one remote service
pub struct TodoSession {
    pub(super) service: Arc<dyn TodoService>,
    pub(super) store: SharedStore,
    pub(super) attached: Arc<AtomicBool>,
    pub(super) notices: mpsc::UnboundedSender<SyncNotice>,
}

impl TodoSession {
    /// Create a session over the given service. Returns the session and
    /// the receiving end of its notification channel.
    pub fn new(service: Arc<dyn TodoService>) -> (Self, mpsc::UnboundedReceiver<SyncNotice>) {
        let (notices, rx) = mpsc::unbounded_channel();
        let session = TodoSession {
            service,
            store: Arc::new(Mutex::new(TodoStore::new())),
            attached: Arc::new(AtomicBool::new(true)),
            notices,
        };
        (session, rx)
    }

    /// Handle to the shared store, for views that render it directly
    pub fn store(&self) -> SharedStore {
        Arc::clone(&self.store)
    }

    /// Current contents of the store
    pub async fn snapshot(&self) -> Vec<Todo> {
        self.store.lock().await.snapshot()
    }

    /// Whether the session is still attached to a live view.
    /// Compensation logic becomes a no-op once detached.
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Create a new todo: validate, insert an optimistic placeholder,
    /// then submit. Returns the placeholder id; the server-confirmed
    /// record arrives via the next push and replaces it.
    pub async fn create(&self, draft: TodoDraft) -> DomainResult<TodoId> {
        draft.validate()?;

        let optimistic = Todo::optimistic(&draft);
        let placeholder = optimistic.id.clone();
        self.store.lock().await.insert_optimistic(optimistic);

        match self.service.create(&draft).await {
            Ok(_confirmed) => Ok(placeholder),
            Err(error) => {
                if self.is_attached() {
                    let outcome = self.store.lock().await.remove_optimistic(&placeholder);
                    if outcome == StoreOutcome::NotFound {
                        // a snapshot already superseded the placeholder
                        log::warn!("placeholder {} already gone during rollback", placeholder);
                    }
                } else {
                    log::warn!("create failed after teardown, skipping rollback");
                }
                self.notify(SyncNotice::ActionFailed {
                    action: SyncAction::Create,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// Partially update an existing todo, optimistically first
    pub async fn update(&self, id: &TodoId, patch: TodoPatch) -> DomainResult<()> {
        let outcome = self.store.lock().await.mutate_optimistic(id, &patch);
        if outcome == StoreOutcome::NotFound {
            log::warn!("optimistic update target {} not in store", id);
        }

        match self.service.update(id, &patch).await {
            Ok(_updated) => Ok(()),
            Err(error) => {
                self.refetch_replace().await;
                self.notify(SyncNotice::ActionFailed {
                    action: SyncAction::Update,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// Status-only update (the status dropdown on a rendered record)
    pub async fn set_status(&self, id: &TodoId, status: TodoStatus) -> DomainResult<()> {
        self.update(id, TodoPatch::status_only(status)).await
    }

    /// Commit a whole-record edit (the edit-form flow)
    pub async fn apply_edit(&self, edit: TodoEdit) -> DomainResult<()> {
        let (id, patch) = edit.into_patch();
        self.update(&id, patch).await
    }

    /// Delete a todo, optimistically first
    pub async fn delete(&self, id: &TodoId) -> DomainResult<()> {
        let outcome = self.store.lock().await.remove_optimistic(id);
        if outcome == StoreOutcome::NotFound {
            log::warn!("optimistic delete target {} not in store", id);
        }

        match self.service.delete(id).await {
            Ok(()) => Ok(()),
            Err(error) => {
                self.refetch_replace().await;
                self.notify(SyncNotice::ActionFailed {
                    action: SyncAction::Delete,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// Compensation for failed updates/deletes: one authoritative `list`,
    /// applied wholesale. Discards any other optimistic state in flight,
    /// which is the accepted cost of snapshot-level reconciliation.
    async fn refetch_replace(&self) {
        if !self.is_attached() {
            log::warn!("refetch skipped, session detached");
            return;
        }
        match self.service.list().await {
            Ok(records) => {
                self.store.lock().await.replace_all(records);
            }
            Err(error) => {
                log::warn!("authoritative refetch failed: {}", error);
                self.notify(SyncNotice::RefetchFailed { error });
            }
        }
    }

    fn notify(&self, notice: SyncNotice) {
        // receiver may be gone if the view stopped listening
        let _ = self.notices.send(notice);
    }
}
