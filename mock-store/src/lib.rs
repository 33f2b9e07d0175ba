//! In-memory stand-in for a hosted PostgREST row store.
//!
//! Serves one table at `/rest/v1/{table}` with the slice of PostgREST the
//! todo client relies on: `select=*`, `order=<col>.<asc|desc>[.nullsfirst|
//! .nullslast]`, `id=eq.<n>` filters and `prefer: return=representation`.
//! Errors come back as PostgREST-shaped JSON bodies with PostgreSQL codes.

use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub const DEFAULT_TABLE: &str = "todos";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Row {
    pub id: i64,
    pub created_at: String,
    pub task: String,
    pub due_date: Option<String>,
}

#[derive(Debug)]
pub struct Table {
    name: String,
    next_id: i64,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            next_id: 1,
            rows: Vec::new(),
        }
    }

    fn insert(&mut self, task: String, due_date: Option<String>) -> Row {
        let row = Row {
            id: self.next_id,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false),
            task,
            due_date,
        };
        self.next_id += 1;
        self.rows.push(row.clone());
        row
    }

    fn check_name(&self, requested: &str) -> Result<(), StoreError> {
        if requested == self.name {
            return Ok(());
        }
        Err(StoreError::new(
            StatusCode::NOT_FOUND,
            "42P01",
            format!("relation \"public.{requested}\" does not exist"),
        ))
    }
}

pub type Db = Arc<RwLock<Table>>;

pub fn app() -> Router {
    app_for_table(DEFAULT_TABLE)
}

pub fn app_for_table(table: &str) -> Router {
    let db: Db = Arc::new(RwLock::new(Table::new(table)));
    Router::new()
        .route(
            "/rest/v1/{table}",
            get(select_rows)
                .post(insert_rows)
                .patch(update_rows)
                .delete(delete_rows),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// PostgREST error body.
#[derive(Debug, Serialize)]
pub struct StoreError {
    #[serde(skip)]
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<String>,
    hint: Option<String>,
}

impl StoreError {
    fn new(status: StatusCode, code: &'static str, message: String) -> Self {
        Self {
            status,
            code,
            message,
            details: None,
            hint: None,
        }
    }

    fn bad_request(code: &'static str, message: String) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    fn not_null(column: &str, table: &str) -> Self {
        let mut err = Self::bad_request(
            "23502",
            format!("null value in column \"{column}\" of relation \"{table}\" violates not-null constraint"),
        );
        err.details = Some(format!("Failing row contains null {column}."));
        err
    }

    fn unknown_column(column: &str, table: &str) -> Self {
        Self::bad_request(
            "PGRST204",
            format!("Could not find the '{column}' column of '{table}' in the schema cache"),
        )
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Id,
    CreatedAt,
    Task,
    DueDate,
}

impl Column {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Column::Id),
            "created_at" => Some(Column::CreatedAt),
            "task" => Some(Column::Task),
            "due_date" => Some(Column::DueDate),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey<'a> {
    Int(i64),
    Text(&'a str),
}

fn sort_key(row: &Row, column: Column) -> Option<SortKey<'_>> {
    match column {
        Column::Id => Some(SortKey::Int(row.id)),
        Column::CreatedAt => Some(SortKey::Text(&row.created_at)),
        Column::Task => Some(SortKey::Text(&row.task)),
        Column::DueDate => row.due_date.as_deref().map(SortKey::Text),
    }
}

/// `order=` clause. Nulls sort last ascending and first descending unless
/// overridden, as in PostgreSQL. Ties fall back to id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Order {
    column: Column,
    descending: bool,
    nulls_first: bool,
}

impl Order {
    fn parse(raw: &str) -> Result<Self, StoreError> {
        let mut parts = raw.split('.');
        let name = parts.next().unwrap_or_default();
        let column = Column::parse(name).ok_or_else(|| {
            StoreError::bad_request("42703", format!("column {name} does not exist"))
        })?;

        let mut descending = false;
        let mut nulls_first = None;
        for modifier in parts {
            match modifier {
                "asc" => descending = false,
                "desc" => descending = true,
                "nullsfirst" => nulls_first = Some(true),
                "nullslast" => nulls_first = Some(false),
                other => {
                    return Err(StoreError::bad_request(
                        "PGRST100",
                        format!("failed to parse order ({raw}): unexpected \"{other}\""),
                    ))
                }
            }
        }
        Ok(Order {
            column,
            descending,
            nulls_first: nulls_first.unwrap_or(descending),
        })
    }

    fn compare(&self, a: &Row, b: &Row) -> Ordering {
        let ord = match (sort_key(a, self.column), sort_key(b, self.column)) {
            (Some(x), Some(y)) if self.descending => y.cmp(&x),
            (Some(x), Some(y)) => x.cmp(&y),
            (None, None) => Ordering::Equal,
            (None, Some(_)) if self.nulls_first => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) if self.nulls_first => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
        };
        ord.then(a.id.cmp(&b.id))
    }
}

/// Parsed query string: horizontal filter plus ordering.
#[derive(Debug, Default)]
struct RowQuery {
    id: Option<i64>,
    order: Option<Order>,
}

impl RowQuery {
    fn parse(params: &HashMap<String, String>, table: &str) -> Result<Self, StoreError> {
        let mut query = RowQuery::default();
        for (key, value) in params {
            match key.as_str() {
                // Only whole rows are served.
                "select" => {}
                "order" => query.order = Some(Order::parse(value)?),
                "id" => {
                    let id = value
                        .strip_prefix("eq.")
                        .and_then(|v| v.parse().ok())
                        .ok_or_else(|| {
                            StoreError::bad_request(
                                "PGRST100",
                                format!("failed to parse filter (id={value})"),
                            )
                        })?;
                    query.id = Some(id);
                }
                other => {
                    return Err(StoreError::bad_request(
                        "42703",
                        format!("column {table}.{other} does not exist"),
                    ))
                }
            }
        }
        Ok(query)
    }

    fn matches(&self, row: &Row) -> bool {
        self.id.map_or(true, |id| row.id == id)
    }

    fn select(&self, rows: &[Row]) -> Vec<Row> {
        let mut selected: Vec<Row> = rows.iter().filter(|r| self.matches(r)).cloned().collect();
        match self.order {
            Some(order) => selected.sort_by(|a, b| order.compare(a, b)),
            None => selected.sort_by_key(|r| r.id),
        }
        selected
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct InsertRow {
    task: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
}

/// Column assignments of a PATCH body. `due_date: Some(None)` sets null.
#[derive(Debug, Default, PartialEq, Eq)]
struct Patch {
    task: Option<String>,
    due_date: Option<Option<String>>,
}

impl Patch {
    fn from_json(body: Map<String, Value>, table: &str) -> Result<Self, StoreError> {
        let mut patch = Patch::default();
        for (column, value) in body {
            match (column.as_str(), value) {
                ("task", Value::String(task)) => patch.task = Some(task),
                ("task", Value::Null) => return Err(StoreError::not_null("task", table)),
                ("due_date", Value::Null) => patch.due_date = Some(None),
                ("due_date", Value::String(raw)) => {
                    patch.due_date = Some(Some(normalize_date(&raw)?));
                }
                ("task" | "due_date", other) => {
                    return Err(StoreError::bad_request(
                        "22P02",
                        format!("invalid input syntax for column \"{column}\": {other}"),
                    ))
                }
                (other, _) => return Err(StoreError::unknown_column(other, table)),
            }
        }
        Ok(patch)
    }

    fn apply(&self, row: &mut Row) {
        if let Some(task) = &self.task {
            row.task = task.clone();
        }
        if let Some(due_date) = &self.due_date {
            row.due_date = due_date.clone();
        }
    }
}

/// Validate a `date` column value and store it in canonical `YYYY-MM-DD`.
fn normalize_date(raw: &str) -> Result<String, StoreError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(|date| date.format(DATE_FORMAT).to_string())
        .map_err(|_| {
            StoreError::bad_request(
                "22007",
                format!("invalid input syntax for type date: \"{raw}\""),
            )
        })
}

fn prefers_representation(headers: &HeaderMap) -> bool {
    headers
        .get_all("prefer")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|pref| pref.trim() == "return=representation")
}

/// Body with the affected rows when asked for, bare status otherwise.
fn respond(status: StatusCode, headers: &HeaderMap, rows: Vec<Row>) -> Response {
    if prefers_representation(headers) {
        return (status, Json(rows)).into_response();
    }
    if status == StatusCode::CREATED {
        StatusCode::CREATED.into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

async fn select_rows(
    State(db): State<Db>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Row>>, StoreError> {
    let db = db.read().await;
    db.check_name(&table)?;
    let query = RowQuery::parse(&params, &db.name)?;
    Ok(Json(query.select(&db.rows)))
}

async fn insert_rows(
    State(db): State<Db>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response, StoreError> {
    let items = match body {
        Value::Array(items) => items,
        item => vec![item],
    };

    let mut db = db.write().await;
    db.check_name(&table)?;

    // The whole batch is rejected if any row is invalid.
    let mut pending = Vec::with_capacity(items.len());
    for item in items {
        let row: InsertRow = serde_json::from_value(item)
            .map_err(|e| StoreError::bad_request("PGRST204", e.to_string()))?;
        let task = row.task.ok_or_else(|| StoreError::not_null("task", &db.name))?;
        let due_date = row.due_date.as_deref().map(normalize_date).transpose()?;
        pending.push((task, due_date));
    }

    let inserted: Vec<Row> = pending
        .into_iter()
        .map(|(task, due_date)| db.insert(task, due_date))
        .collect();
    debug!(count = inserted.len(), "inserted rows");
    Ok(respond(StatusCode::CREATED, &headers, inserted))
}

async fn update_rows(
    State(db): State<Db>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Map<String, Value>>,
) -> Result<Response, StoreError> {
    let mut db = db.write().await;
    db.check_name(&table)?;
    let query = RowQuery::parse(&params, &db.name)?;
    let patch = Patch::from_json(body, &db.name)?;

    let mut updated = Vec::new();
    for row in db.rows.iter_mut().filter(|r| query.matches(r)) {
        patch.apply(row);
        updated.push(row.clone());
    }
    debug!(count = updated.len(), "updated rows");
    Ok(respond(StatusCode::OK, &headers, updated))
}

async fn delete_rows(
    State(db): State<Db>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Response, StoreError> {
    let mut db = db.write().await;
    db.check_name(&table)?;
    let query = RowQuery::parse(&params, &db.name)?;

    let (removed, kept): (Vec<Row>, Vec<Row>) = std::mem::take(&mut db.rows)
        .into_iter()
        .partition(|r| query.matches(r));
    db.rows = kept;
    debug!(count = removed.len(), "deleted rows");
    Ok(respond(StatusCode::OK, &headers, removed))
}
