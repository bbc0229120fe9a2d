//! In-Memory Todo Service
//!
//! Reference implementation of `TodoService`: an interior-mutable record
//! table with server-side id allocation and a broadcast push of the full
//! snapshot after every successful mutation. Stands in for the hosted
//! backend in tests and demos, with fault injection and call counters.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::{broadcast, Mutex};

use crate::domain::{DomainError, DomainResult, Todo, TodoDraft, TodoId, TodoPatch};
use super::traits::{QueryObserver, QuerySnapshot, TodoService};

/// The four request/response operations, for fault injection and counting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOp {
    List,
    Create,
    Update,
    Delete,
}

#[derive(Default)]
struct Faults {
    list: usize,
    create: usize,
    update: usize,
    delete: usize,
}

impl Faults {
    fn slot(&mut self, op: ServiceOp) -> &mut usize {
        match op {
            ServiceOp::List => &mut self.list,
            ServiceOp::Create => &mut self.create,
            ServiceOp::Update => &mut self.update,
            ServiceOp::Delete => &mut self.delete,
        }
    }
}

/// In-memory implementation of the remote todo service
pub struct MemoryTodoService {
    records: Mutex<Vec<Todo>>,
    faults: Mutex<Faults>,
    next_id: AtomicU64,
    tx: broadcast::Sender<QuerySnapshot>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl MemoryTodoService {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(32);
        MemoryTodoService {
            records: Mutex::new(Vec::new()),
            faults: Mutex::new(Faults::default()),
            next_id: AtomicU64::new(1),
            tx,
            list_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }

    /// Queue one injected failure for the given operation
    pub async fn fail_next(&self, op: ServiceOp) {
        *self.faults.lock().await.slot(op) += 1;
    }

    /// How many times the given operation has been called
    pub fn calls(&self, op: ServiceOp) -> usize {
        match op {
            ServiceOp::List => self.list_calls.load(Ordering::Relaxed),
            ServiceOp::Create => self.create_calls.load(Ordering::Relaxed),
            ServiceOp::Update => self.update_calls.load(Ordering::Relaxed),
            ServiceOp::Delete => self.delete_calls.load(Ordering::Relaxed),
        }
    }

    /// Mutate the collection out of band (another client / another tab)
    /// and push the resulting snapshot to all observers.
    pub async fn inject_record(&self, todo: Todo) {
        let snapshot = {
            let mut records = self.records.lock().await;
            records.push(todo);
            records.clone()
        };
        self.push(snapshot);
    }

    async fn take_fault(&self, op: ServiceOp) -> DomainResult<()> {
        let mut faults = self.faults.lock().await;
        let slot = faults.slot(op);
        if *slot > 0 {
            *slot -= 1;
            return Err(DomainError::Unavailable(format!("injected {:?} failure", op)));
        }
        Ok(())
    }

    fn allocate_id(&self) -> TodoId {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        TodoId::new(format!("srv-{}", n))
    }

    fn push(&self, snapshot: QuerySnapshot) {
        // send only errors when there are no observers, which is fine
        let _ = self.tx.send(snapshot);
    }
}

impl Default for MemoryTodoService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TodoService for MemoryTodoService {
    async fn list(&self) -> DomainResult<Vec<Todo>> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        self.take_fault(ServiceOp::List).await?;
        Ok(self.records.lock().await.clone())
    }

    async fn create(&self, draft: &TodoDraft) -> DomainResult<Todo> {
        self.create_calls.fetch_add(1, Ordering::Relaxed);
        self.take_fault(ServiceOp::Create).await?;

        let now = Utc::now();
        let todo = Todo {
            id: self.allocate_id(),
            content: draft.content.clone(),
            due_date: draft.due_date,
            status: draft.status,
            created_at: now,
            updated_at: now,
        };

        let snapshot = {
            let mut records = self.records.lock().await;
            records.push(todo.clone());
            records.clone()
        };
        self.push(snapshot);
        Ok(todo)
    }

    async fn update(&self, id: &TodoId, patch: &TodoPatch) -> DomainResult<Todo> {
        self.update_calls.fetch_add(1, Ordering::Relaxed);
        self.take_fault(ServiceOp::Update).await?;

        let (updated, snapshot) = {
            let mut records = self.records.lock().await;
            let updated = {
                let todo = records
                    .iter_mut()
                    .find(|t| &t.id == id)
                    .ok_or_else(|| DomainError::NotFound(format!("todo {}", id)))?;
                patch.apply_to(todo);
                todo.updated_at = Utc::now();
                todo.clone()
            };
            (updated, records.clone())
        };
        self.push(snapshot);
        Ok(updated)
    }

    async fn delete(&self, id: &TodoId) -> DomainResult<()> {
        self.delete_calls.fetch_add(1, Ordering::Relaxed);
        self.take_fault(ServiceOp::Delete).await?;

        let snapshot = {
            let mut records = self.records.lock().await;
            let before = records.len();
            records.retain(|t| &t.id != id);
            if records.len() == before {
                return Err(DomainError::NotFound(format!("todo {}", id)));
            }
            records.clone()
        };
        self.push(snapshot);
        Ok(())
    }

    fn observe_query(&self) -> QueryObserver {
        QueryObserver::new(self.tx.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TodoStatus;

    #[tokio::test]
    async fn test_create_assigns_server_id() {
        let service = MemoryTodoService::new();

        let created = service
            .create(&TodoDraft::new("Test todo"))
            .await
            .expect("Failed to create");

        assert!(!created.id.is_placeholder());
        assert_eq!(created.content, "Test todo");
        assert_eq!(created.status, TodoStatus::Pending);
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let service = MemoryTodoService::new();

        let err = service
            .update(&TodoId::new("nope"), &TodoPatch::status_only(TodoStatus::Done))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_id_is_not_found() {
        let service = MemoryTodoService::new();

        let err = service.delete(&TodoId::new("nope")).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mutations_push_full_snapshots() {
        let service = MemoryTodoService::new();
        let mut observer = service.observe_query();

        let created = service.create(&TodoDraft::new("One")).await.unwrap();
        let snapshot = observer.next().await.expect("No push after create");
        assert_eq!(snapshot.len(), 1);

        service
            .update(&created.id, &TodoPatch::status_only(TodoStatus::Done))
            .await
            .unwrap();
        let snapshot = observer.next().await.expect("No push after update");
        assert_eq!(snapshot[0].status, TodoStatus::Done);

        service.delete(&created.id).await.unwrap();
        let snapshot = observer.next().await.expect("No push after delete");
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure_is_consumed_once() {
        let service = MemoryTodoService::new();
        service.fail_next(ServiceOp::Create).await;

        let err = service.create(&TodoDraft::new("x")).await.unwrap_err();
        assert!(matches!(err, DomainError::Unavailable(_)));

        // next attempt succeeds, and the failed one was still counted
        service.create(&TodoDraft::new("x")).await.unwrap();
        assert_eq!(service.calls(ServiceOp::Create), 2);
    }

    #[tokio::test]
    async fn test_failed_mutation_pushes_nothing() {
        let service = MemoryTodoService::new();
        let mut observer = service.observe_query();

        service.fail_next(ServiceOp::Create).await;
        let _ = service.create(&TodoDraft::new("x")).await;

        service.create(&TodoDraft::new("y")).await.unwrap();
        let snapshot = observer.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].content, "y");
    }
}
