//! Local Todo Store
//!
//! The in-memory ordered collection backing the view: the current
//! best-known state, mutated both optimistically (ahead of server
//! confirmation) and authoritatively (wholesale, on every live-query
//! push). At most one record per id, always.

use std::collections::HashSet;

use crate::domain::{Todo, TodoId, TodoPatch, TodoStatus};

/// Explicit result of a single-record store operation.
///
/// The absent-id cases are reported rather than silently ignored, so a
/// caller can tell an applied mutation from one that raced a snapshot
/// which already removed the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The mutation was applied
    Applied,
    /// No record with the given id exists
    NotFound,
    /// Insert rejected: a record with the same id is already present
    Duplicate,
}

/// Ordered in-memory collection of todo records
#[derive(Debug, Default)]
pub struct TodoStore {
    records: Vec<Todo>,
}

impl TodoStore {
    pub fn new() -> Self {
        TodoStore { records: Vec::new() }
    }

    /// Replace the whole store with an authoritative sequence.
    ///
    /// Afterwards the store equals the supplied sequence; optimistic
    /// entries absent from it are discarded. Duplicate ids in the input
    /// are dropped (first occurrence wins) to keep the uniqueness
    /// invariant even against a misbehaving service.
    pub fn replace_all(&mut self, records: Vec<Todo>) {
        let mut seen = HashSet::new();
        self.records = records
            .into_iter()
            .filter(|todo| {
                if seen.insert(todo.id.clone()) {
                    true
                } else {
                    log::warn!("dropping duplicate id {} from snapshot", todo.id);
                    false
                }
            })
            .collect();
    }

    /// Append an optimistic record. No semantic duplicate check; only an
    /// id collision is rejected.
    pub fn insert_optimistic(&mut self, record: Todo) -> StoreOutcome {
        if self.contains(&record.id) {
            log::warn!("optimistic insert rejected, id {} already present", record.id);
            return StoreOutcome::Duplicate;
        }
        self.records.push(record);
        StoreOutcome::Applied
    }

    /// Apply a partial update to the record matching `id`
    pub fn mutate_optimistic(&mut self, id: &TodoId, patch: &TodoPatch) -> StoreOutcome {
        match self.records.iter_mut().find(|t| &t.id == id) {
            Some(todo) => {
                patch.apply_to(todo);
                StoreOutcome::Applied
            }
            None => StoreOutcome::NotFound,
        }
    }

    /// Remove the record matching `id`
    pub fn remove_optimistic(&mut self, id: &TodoId) -> StoreOutcome {
        let before = self.records.len();
        self.records.retain(|t| &t.id != id);
        if self.records.len() == before {
            StoreOutcome::NotFound
        } else {
            StoreOutcome::Applied
        }
    }

    pub fn get(&self, id: &TodoId) -> Option<&Todo> {
        self.records.iter().find(|t| &t.id == id)
    }

    pub fn contains(&self, id: &TodoId) -> bool {
        self.get(id).is_some()
    }

    /// All records with the given status, in store order
    pub fn with_status(&self, status: TodoStatus) -> Vec<&Todo> {
        self.records.iter().filter(|t| t.status == status).collect()
    }

    pub fn snapshot(&self) -> Vec<Todo> {
        self.records.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Todo> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
