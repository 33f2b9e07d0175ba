//! Single-page todo UI served over HTTP.
//!
//! # Overview
//! One page with an add form and the current list. Adding and deleting go
//! through `todo_core::TodoRepository`; after each mutation the browser is
//! redirected to `/`, which reloads the whole list from the store. Failures
//! are logged and the page stays as it was.

pub mod config;
pub mod page;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod transport;

pub use config::{Config, ConfigError};
pub use page::Pages;
pub use routes::app;
pub use state::AppState;
pub use transport::UreqTransport;
