//! Todo Entity
//!
//! The synced record: content, optional due date, and a three-state status.
//! Identifiers are server-assigned; locally created records carry a
//! placeholder id until the server-confirmed record supersedes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use super::entity::{DomainError, DomainResult, Entity};

/// Prefix reserved for client-generated placeholder identifiers.
/// Server-assigned ids never use it, so the two spaces cannot collide.
const PLACEHOLDER_PREFIX: &str = "local-";

static PLACEHOLDER_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque record identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TodoId(String);

impl TodoId {
    pub fn new(id: impl Into<String>) -> Self {
        TodoId(id.into())
    }

    /// Allocate a fresh placeholder id from a process-wide monotonic counter
    pub fn placeholder() -> Self {
        let n = PLACEHOLDER_COUNTER.fetch_add(1, Ordering::Relaxed);
        TodoId(format!("{}{}", PLACEHOLDER_PREFIX, n))
    }

    /// Whether this id is a client-generated placeholder (not authoritative)
    pub fn is_placeholder(&self) -> bool {
        self.0.starts_with(PLACEHOLDER_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Todo lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

impl TodoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::Pending => "PENDING",
            TodoStatus::InProgress => "IN_PROGRESS",
            TodoStatus::Done => "DONE",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "IN_PROGRESS" => TodoStatus::InProgress,
            "DONE" => TodoStatus::Done,
            _ => TodoStatus::Pending,
        }
    }
}

/// A todo record as held in the local store and on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier, server-assigned (placeholder until confirmed)
    pub id: TodoId,
    /// Free-form text, required, non-empty
    pub content: String,
    /// Optional due timestamp; None means no due date
    pub due_date: Option<DateTime<Utc>>,
    /// Current status
    pub status: TodoStatus,
    /// Server-assigned creation timestamp
    pub created_at: DateTime<Utc>,
    /// Server-assigned last-modified timestamp
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Build an optimistic record from a draft, with a placeholder id and
    /// local submission-time timestamps. The record is replaced wholesale
    /// once the server-confirmed one arrives.
    pub fn optimistic(draft: &TodoDraft) -> Self {
        let now = Utc::now();
        Todo {
            id: TodoId::placeholder(),
            content: draft.content.clone(),
            due_date: draft.due_date,
            status: draft.status,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Todo {
    type Id = TodoId;

    fn id(&self) -> &TodoId {
        &self.id
    }
}

/// Input for creating a new todo
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoDraft {
    pub content: String,
    pub due_date: Option<DateTime<Utc>>,
    pub status: TodoStatus,
}

impl TodoDraft {
    pub fn new(content: impl Into<String>) -> Self {
        TodoDraft {
            content: content.into(),
            due_date: None,
            status: TodoStatus::default(),
        }
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Reject empty or whitespace-only content before anything is submitted
    pub fn validate(&self) -> DomainResult<()> {
        if self.content.trim().is_empty() {
            return Err(DomainError::InvalidInput("content must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Partial update to an existing todo
///
/// `due_date` is doubly optional: `None` leaves it unchanged,
/// `Some(None)` clears it, `Some(Some(t))` sets it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPatch {
    pub content: Option<String>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub status: Option<TodoStatus>,
}

impl TodoPatch {
    /// Patch changing only the status
    pub fn status_only(status: TodoStatus) -> Self {
        TodoPatch {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.due_date.is_none() && self.status.is_none()
    }

    /// Apply the patch fields to a record in place
    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(content) = &self.content {
            todo.content = content.clone();
        }
        if let Some(due_date) = self.due_date {
            todo.due_date = due_date;
        }
        if let Some(status) = self.status {
            todo.status = status;
        }
    }
}

/// A whole-record edit of an existing todo (the edit-form flow):
/// content, due date, and status are all submitted together.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoEdit {
    pub id: TodoId,
    pub content: String,
    pub due_date: Option<DateTime<Utc>>,
    pub status: TodoStatus,
}

impl TodoEdit {
    /// Capture the editable fields of an existing record
    pub fn from_todo(todo: &Todo) -> Self {
        TodoEdit {
            id: todo.id.clone(),
            content: todo.content.clone(),
            due_date: todo.due_date,
            status: todo.status,
        }
    }

    pub fn into_patch(self) -> (TodoId, TodoPatch) {
        let patch = TodoPatch {
            content: Some(self.content),
            due_date: Some(self.due_date),
            status: Some(self.status),
        };
        (self.id, patch)
    }
}
