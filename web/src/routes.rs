//! Page routes. Every mutation answers `303 See Other` to `/`, whose
//! handler re-fetches the full list.

use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use chrono::Local;
use serde::Deserialize;
use todo_core::{parse_due_date, DueDateInput, Transport};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::state::AppState;

pub fn app<T>(state: AppState<T>) -> Router
where
    T: Transport + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(home::<T>))
        .route("/todos", post(add_todo::<T>))
        .route("/todos/{id}/delete", post(delete_todo::<T>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Fields of the add form. Browsers send an empty `due_date` when the date
/// picker is left blank.
#[derive(Debug, Deserialize)]
pub struct AddTodoForm {
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub due_date: String,
}

async fn home<T>(State(state): State<AppState<T>>) -> Response
where
    T: Transport + Send + Sync + 'static,
{
    let todos = state.reload().await;
    match state.pages().render_home(&todos, &Local) {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            error!(error = %err, "error rendering page");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn add_todo<T>(State(state): State<AppState<T>>, Form(form): Form<AddTodoForm>) -> Redirect
where
    T: Transport + Send + Sync + 'static,
{
    if form.task.trim().is_empty() {
        return Redirect::to("/");
    }

    let due_date = match form.due_date.trim() {
        "" => None,
        raw => match parse_due_date(raw) {
            Ok(date) => Some(DueDateInput::Date(date)),
            Err(err) => {
                error!(error = %err, "error adding todo");
                return Redirect::to("/");
            }
        },
    };

    match state.add_todo(form.task, due_date).await {
        Ok(todo) => info!(id = todo.id, "todo added"),
        Err(err) => error!(error = %err, "error adding todo"),
    }
    Redirect::to("/")
}

async fn delete_todo<T>(State(state): State<AppState<T>>, Path(id): Path<i64>) -> Redirect
where
    T: Transport + Send + Sync + 'static,
{
    match state.delete_todo(id).await {
        Ok(_) => info!(id, "todo deleted"),
        Err(err) => error!(id, error = %err, "error deleting todo"),
    }
    Redirect::to("/")
}
