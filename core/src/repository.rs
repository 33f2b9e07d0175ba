//! The four todo operations, each one round trip through a `Transport`.

use tracing::{debug, error};

use crate::client::TodoClient;
use crate::date::DueDateInput;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{NewTodo, Todo, TodoUpdate};

/// CRUD bridge between in-memory `Todo` values and the row store.
///
/// Every method logs a failure before returning it. Callers that cache the
/// list must reload it themselves after a mutation.
#[derive(Debug)]
pub struct TodoRepository<T> {
    client: TodoClient,
    transport: T,
}

impl<T: Transport> TodoRepository<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self { client, transport }
    }

    /// All todos, ascending by due date. An `Err` means the list is
    /// unavailable, not empty.
    pub fn fetch_todos(&self) -> Result<Vec<Todo>, ApiError> {
        let result = self
            .transport
            .execute(self.client.build_fetch_todos())
            .and_then(|response| self.client.parse_fetch_todos(response));
        let todos = logged("fetch", result)?;
        debug!(count = todos.len(), "fetched todos");
        Ok(todos)
    }

    /// Insert one todo. The caller guarantees `task` is non-empty.
    pub fn add_todo(&self, task: &str, due_date: Option<DueDateInput>) -> Result<Todo, ApiError> {
        let input = NewTodo::new(task, due_date);
        let result = self
            .client
            .build_add_todo(&input)
            .and_then(|request| self.transport.execute(request))
            .and_then(|response| self.client.parse_add_todo(response));
        let todo = logged("add", result)?;
        debug!(id = todo.id, "added todo");
        Ok(todo)
    }

    pub fn update_todo(&self, id: i64, update: &TodoUpdate) -> Result<Todo, ApiError> {
        let result = self
            .client
            .build_update_todo(id, update)
            .and_then(|request| self.transport.execute(request))
            .and_then(|response| self.client.parse_update_todo(response));
        let todo = logged("update", result)?;
        debug!(id, "updated todo");
        Ok(todo)
    }

    /// Returns `true` once the row is gone. Deleting an id that does not
    /// exist is `ApiError::NotFound`.
    pub fn delete_todo(&self, id: i64) -> Result<bool, ApiError> {
        let result = self
            .transport
            .execute(self.client.build_delete_todo(id))
            .and_then(|response| self.client.parse_delete_todo(response));
        logged("delete", result)?;
        debug!(id, "deleted todo");
        Ok(true)
    }
}

fn logged<V>(operation: &'static str, result: Result<V, ApiError>) -> Result<V, ApiError> {
    if let Err(err) = &result {
        error!(operation, error = %err, "todo store operation failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use chrono::NaiveDate;

    use super::*;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Replays canned responses and records every request it sees.
    #[derive(Default)]
    struct Scripted {
        responses: RefCell<VecDeque<Result<HttpResponse, ApiError>>>,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn reply(self, status: u16, body: &str) -> Self {
            self.responses
                .borrow_mut()
                .push_back(Ok(HttpResponse::new(status, body)));
            self
        }

        fn fail(self, message: &str) -> Self {
            self.responses
                .borrow_mut()
                .push_back(Err(ApiError::Transport(message.to_string())));
            self
        }
    }

    impl Transport for Scripted {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.borrow_mut().push(request);
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("no scripted response left")
        }
    }

    fn repo(transport: Scripted) -> TodoRepository<Scripted> {
        TodoRepository::new(TodoClient::new("http://store.test"), transport)
    }

    #[test]
    fn fetch_todos_single_round_trip() {
        let repo = repo(Scripted::default().reply(
            200,
            r#"[{"id":1,"created_at":"2024-01-01T00:00:00+00:00","task":"a","due_date":"2024-05-05"}]"#,
        ));
        let todos = repo.fetch_todos().unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(repo.transport.seen.borrow().len(), 1);
    }

    #[test]
    fn fetch_todos_propagates_transport_failure() {
        let repo = repo(Scripted::default().fail("connection refused"));
        let err = repo.fetch_todos().unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn add_todo_serializes_utc_day() {
        let repo = repo(Scripted::default().reply(
            201,
            r#"[{"id":9,"created_at":"2024-01-01T00:00:00+00:00","task":"Buy milk","due_date":"2024-01-01"}]"#,
        ));
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let todo = repo.add_todo("Buy milk", Some(date.into())).unwrap();
        assert_eq!(todo.id, 9);

        let seen = repo.transport.seen.borrow();
        assert_eq!(seen[0].method, HttpMethod::Post);
        let body: serde_json::Value =
            serde_json::from_str(seen[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!([{"task": "Buy milk", "due_date": "2024-01-01"}]));
    }

    #[test]
    fn add_todo_passes_text_through() {
        let repo = repo(Scripted::default().reply(
            201,
            r#"[{"id":2,"created_at":"2024-01-01T00:00:00+00:00","task":"t","due_date":"2030-12-31"}]"#,
        ));
        repo.add_todo("t", Some("2030-12-31".into())).unwrap();
        let seen = repo.transport.seen.borrow();
        assert!(seen[0].body.as_deref().unwrap().contains(r#""due_date":"2030-12-31""#));
    }

    #[test]
    fn update_todo_missing_row() {
        let repo = repo(Scripted::default().reply(200, "[]"));
        let err = repo
            .update_todo(5, &TodoUpdate::default().task("x"))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn delete_todo_reports_success() {
        let repo = repo(Scripted::default().reply(
            200,
            r#"[{"id":4,"created_at":"2024-01-01T00:00:00+00:00","task":"t","due_date":null}]"#,
        ));
        assert!(repo.delete_todo(4).unwrap());
        assert_eq!(repo.transport.seen.borrow()[0].method, HttpMethod::Delete);
    }

    #[test]
    fn delete_todo_surfaces_store_error() {
        let repo = repo(Scripted::default().reply(
            401,
            r#"{"code":"PGRST301","message":"JWT expired"}"#,
        ));
        let err = repo.delete_todo(4).unwrap_err();
        assert!(matches!(err, ApiError::StoreError { status: 401, .. }));
    }
}
