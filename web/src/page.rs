//! Server-side rendering of the single page: add form plus todo list.
//!
//! The markup lives in `templates/home.html` and is compiled into the
//! binary. Tera autoescapes everything inserted into `.html` templates, so
//! task text and store timestamps reach the page escaped.

use std::fmt;
use std::sync::Arc;

use chrono::TimeZone;
use serde::Serialize;
use tera::{Context, Tera};
use todo_core::{display_created_at, display_due_date, Todo};

const HOME: &str = "home.html";

/// One list item with its dates already formatted for the viewer.
#[derive(Debug, Serialize)]
struct TodoView<'a> {
    id: i64,
    task: &'a str,
    due: Option<String>,
    created: String,
}

impl<'a> TodoView<'a> {
    fn new<Tz>(todo: &'a Todo, viewer: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            id: todo.id,
            task: &todo.task,
            due: todo
                .due_date
                .as_ref()
                .map(|due| display_due_date(Some(due), viewer)),
            created: display_created_at(&todo.created_at, viewer),
        }
    }
}

#[derive(Serialize)]
struct HomeView<'a> {
    todos: Vec<TodoView<'a>>,
}

/// Compiled page templates, shared by every request.
#[derive(Clone)]
pub struct Pages {
    tera: Arc<Tera>,
}

impl Pages {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template(HOME, include_str!("../templates/home.html"))?;
        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    /// Render the home page for `todos`, with dates shown for a viewer in
    /// `viewer`'s timezone.
    pub fn render_home<Tz>(&self, todos: &[Todo], viewer: &Tz) -> Result<String, tera::Error>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let view = HomeView {
            todos: todos.iter().map(|todo| TodoView::new(todo, viewer)).collect(),
        };
        self.tera.render(HOME, &Context::from_serialize(&view)?)
    }
}
