//! Remote Layer
//!
//! Abstraction over the remote data service, plus the in-memory
//! reference implementation used in tests and demos.

mod memory;
mod traits;

pub use memory::{MemoryTodoService, ServiceOp};
pub use traits::{QueryObserver, QuerySnapshot, TodoService};
