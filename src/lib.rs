//! Todo Sync Engine
//!
//! Optimistic-update reconciliation between a local in-memory todo
//! collection and a remote CRUD + live-query data service.
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - remote: Data service abstraction and in-memory implementation
//! - store: The local ordered collection backing the view
//! - sync: Reconciliation sessions and subscription glue
//!
//! The flow per user action: mutate the store optimistically, issue the
//! remote request, and let the next live-query push deliver the
//! authoritative state. Failures compensate locally (rollback for
//! creates, wholesale refetch for updates/deletes) and surface as
//! notices on the session's channel.

pub mod domain;
pub mod remote;
pub mod store;
pub mod sync;

pub use domain::{DomainError, DomainResult, Entity, Todo, TodoDraft, TodoEdit, TodoId, TodoPatch, TodoStatus};
pub use remote::{MemoryTodoService, QueryObserver, QuerySnapshot, ServiceOp, TodoService};
pub use store::{StoreOutcome, TodoStore};
pub use sync::{SharedStore, SubscriptionHandle, SyncAction, SyncNotice, TodoSession};
