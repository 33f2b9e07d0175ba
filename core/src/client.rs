//! Stateless HTTP request builder and response parser for the `todos` table.
//!
//! # Design
//! `TodoClient` holds only connection settings (base URL, table, API key)
//! and carries no mutable state between calls. Each CRUD operation is split
//! into a `build_*` method that produces an `HttpRequest` and a `parse_*`
//! method that consumes an `HttpResponse`. Requests target the PostgREST
//! surface at `/rest/v1/{table}`; mutations ask for
//! `return=representation` so the affected rows come back in the body.

use serde::Deserialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{NewTodo, Todo, TodoRow, TodoUpdate};

/// Table used when none is configured.
pub const DEFAULT_TABLE: &str = "todos";

const REST_PREFIX: &str = "rest/v1";
const RETURN_REPRESENTATION: &str = "return=representation";

/// Synchronous, stateless client for the `todos` table.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
    table: String,
    api_key: Option<String>,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            table: DEFAULT_TABLE.to_string(),
            api_key: None,
        }
    }

    pub fn with_table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    /// Send `apikey` and `authorization: Bearer` headers on every request.
    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    /// All rows, ascending by due date. Null ordering is the store's default.
    pub fn build_fetch_todos(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}?select=*&order=due_date.asc", self.table_url()),
            headers: self.headers(&[]),
            body: None,
        }
    }

    pub fn build_add_todo(&self, input: &NewTodo) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(&[input])
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}?select=*", self.table_url()),
            headers: self.headers(&[
                ("content-type", "application/json"),
                ("prefer", RETURN_REPRESENTATION),
            ]),
            body: Some(body),
        })
    }

    pub fn build_update_todo(&self, id: i64, update: &TodoUpdate) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(&update.to_patch())
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Patch,
            url: format!("{}?id=eq.{id}&select=*", self.table_url()),
            headers: self.headers(&[
                ("content-type", "application/json"),
                ("prefer", RETURN_REPRESENTATION),
            ]),
            body: Some(body),
        })
    }

    pub fn build_delete_todo(&self, id: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: format!("{}?id=eq.{id}", self.table_url()),
            headers: self.headers(&[("prefer", RETURN_REPRESENTATION)]),
            body: None,
        }
    }

    pub fn parse_fetch_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response, &[200])?;
        parse_rows(&response.body)
    }

    pub fn parse_add_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, &[201])?;
        parse_rows(&response.body)?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::UnexpectedResponse("insert returned no rows".to_string()))
    }

    /// An empty representation means no row had the requested id.
    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, &[200])?;
        parse_rows(&response.body)?
            .into_iter()
            .next()
            .ok_or(ApiError::NotFound)
    }

    /// `204` is accepted for stores that ignore the `prefer` header.
    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, &[200, 204])?;
        if response.status == 204 {
            return Ok(());
        }
        let rows: Vec<TodoRow> = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        if rows.is_empty() {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    fn table_url(&self) -> String {
        format!("{}/{REST_PREFIX}/{}", self.base_url, self.table)
    }

    fn headers(&self, extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut headers = Vec::with_capacity(extra.len() + 2);
        if let Some(key) = &self.api_key {
            headers.push(("apikey".to_string(), key.clone()));
            headers.push(("authorization".to_string(), format!("Bearer {key}")));
        }
        headers.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        headers
    }
}

/// PostgREST error body: `{"code": "...", "message": "...", ...}`.
#[derive(Deserialize)]
struct StoreErrorBody {
    code: Option<String>,
    message: String,
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    let (code, message) = match serde_json::from_str::<StoreErrorBody>(&response.body) {
        Ok(body) => (body.code, body.message),
        Err(_) => (None, response.body.clone()),
    };
    Err(ApiError::StoreError {
        status: response.status,
        code,
        message,
    })
}

fn parse_rows(body: &str) -> Result<Vec<Todo>, ApiError> {
    let rows: Vec<TodoRow> =
        serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))?;
    rows.into_iter().map(Todo::try_from).collect()
}
