//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO external dependencies (except serde/chrono for
//! serialization and timestamps).

mod entity;
mod todo;

pub use entity::{DomainError, DomainResult, Entity};
pub use todo::{Todo, TodoDraft, TodoEdit, TodoId, TodoPatch, TodoStatus};
