//! Data-access core for a todo list kept in a hosted row store.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for the
//! store's REST surface without touching the network (host-does-IO
//! pattern). `TodoRepository` joins the builder to a `Transport` and exposes
//! the four operations the UI layer calls.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only connection settings.
//! - Each operation is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - Due dates travel as `YYYY-MM-DD` text and live in memory as UTC
//!   midnight; see [`date`].
//! - Every repository operation is one round trip. Failures are logged and
//!   returned; there is no retry.

pub mod client;
pub mod date;
pub mod error;
pub mod http;
pub mod repository;
pub mod transport;
pub mod types;

pub use client::{TodoClient, DEFAULT_TABLE};
pub use date::{
    display_created_at, display_due_date, format_due_date, parse_due_date, DueDateInput,
    NO_DUE_DATE,
};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use repository::TodoRepository;
pub use transport::Transport;
pub use types::{NewTodo, Todo, TodoRow, TodoUpdate};
