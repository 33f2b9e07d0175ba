//! Domain types and wire shapes for the `todos` table.
//!
//! # Design
//! `TodoRow` is the store's row exactly as it travels over the wire, with
//! `due_date` as `YYYY-MM-DD` text. `Todo` is the in-memory shape, with the
//! due date normalized to UTC midnight. Conversion happens only through
//! `TryFrom<TodoRow>`, so every row leaving the client is normalized.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::date::{parse_due_date, DueDateInput};
use crate::error::ApiError;

/// A single todo item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub created_at: String,
    pub task: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

/// A row of the `todos` table as the store returns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoRow {
    pub id: i64,
    pub created_at: String,
    pub task: String,
    #[serde(default)]
    pub due_date: Option<String>,
}

impl TryFrom<TodoRow> for Todo {
    type Error = ApiError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        let due_date = row.due_date.as_deref().map(parse_due_date).transpose()?;
        Ok(Todo {
            id: row.id,
            created_at: row.created_at,
            task: row.task,
            due_date,
        })
    }
}

/// Insert payload. `due_date` is omitted from the JSON when absent so the
/// column takes its default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTodo {
    pub task: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl NewTodo {
    pub fn new(task: impl Into<String>, due_date: Option<DueDateInput>) -> Self {
        Self {
            task: task.into(),
            due_date: due_date.and_then(|d| d.to_store_value()),
        }
    }
}

/// Partial update of a todo. Fields left `None` are not sent and stay
/// unchanged in the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoUpdate {
    pub task: Option<String>,
    /// `Some(None)` clears the due date.
    pub due_date: Option<Option<DueDateInput>>,
}

impl TodoUpdate {
    pub fn task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }

    pub fn due_date(mut self, due_date: impl Into<DueDateInput>) -> Self {
        self.due_date = Some(Some(due_date.into()));
        self
    }

    pub fn clear_due_date(mut self) -> Self {
        self.due_date = Some(None);
        self
    }

    pub(crate) fn to_patch(&self) -> TodoPatch<'_> {
        TodoPatch {
            task: self.task.as_deref(),
            due_date: self
                .due_date
                .as_ref()
                .map(|d| d.as_ref().and_then(DueDateInput::to_store_value)),
        }
    }
}

/// Wire form of `TodoUpdate`. `due_date: Some(None)` serializes as `null`.
#[derive(Debug, Serialize)]
pub(crate) struct TodoPatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<String>>,
}
