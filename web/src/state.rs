//! The one state record shared by the page handlers.

use std::sync::Arc;

use tokio::sync::RwLock;
use todo_core::{ApiError, DueDateInput, Todo, TodoRepository, Transport};
use tracing::error;

use crate::page::Pages;

/// Repository, compiled page templates and the last successfully fetched
/// list.
///
/// The snapshot is what the page shows. It is only replaced by a complete,
/// successful fetch, so a failed reload keeps showing the previous list.
pub struct AppState<T> {
    repository: Arc<TodoRepository<T>>,
    snapshot: Arc<RwLock<Vec<Todo>>>,
    pages: Pages,
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            snapshot: Arc::clone(&self.snapshot),
            pages: self.pages.clone(),
        }
    }
}

impl<T> AppState<T>
where
    T: Transport + Send + Sync + 'static,
{
    /// Fails only if the page templates do not compile.
    pub fn new(repository: TodoRepository<T>) -> Result<Self, tera::Error> {
        Ok(Self {
            repository: Arc::new(repository),
            snapshot: Arc::new(RwLock::new(Vec::new())),
            pages: Pages::new()?,
        })
    }

    pub fn pages(&self) -> &Pages {
        &self.pages
    }

    /// Re-fetch the full list and return what the page should show.
    ///
    /// Overlapping reloads are not ordered: whichever fetch finishes last
    /// wins the snapshot, even if it started first. A later failed reload
    /// then shows that list.
    pub async fn reload(&self) -> Vec<Todo> {
        match self.blocking(|repo| repo.fetch_todos()).await {
            Ok(todos) => {
                let mut snapshot = self.snapshot.write().await;
                *snapshot = todos.clone();
                todos
            }
            Err(err) => {
                error!(error = %err, "error loading todos");
                self.snapshot.read().await.clone()
            }
        }
    }

    pub async fn add_todo(&self, task: String, due_date: Option<DueDateInput>) -> Result<Todo, ApiError> {
        self.blocking(move |repo| repo.add_todo(&task, due_date)).await
    }

    pub async fn delete_todo(&self, id: i64) -> Result<bool, ApiError> {
        self.blocking(move |repo| repo.delete_todo(id)).await
    }

    /// Run one repository call on the blocking pool; the transport is
    /// synchronous.
    async fn blocking<F, R>(&self, call: F) -> Result<R, ApiError>
    where
        F: FnOnce(&TodoRepository<T>) -> Result<R, ApiError> + Send + 'static,
        R: Send + 'static,
    {
        let repository = Arc::clone(&self.repository);
        tokio::task::spawn_blocking(move || call(&repository))
            .await
            .map_err(|e| ApiError::Transport(format!("store call aborted: {e}")))?
    }
}
