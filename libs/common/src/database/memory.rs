//! In-process `TableStore` that evaluates queries the way the data service does

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::{Direction, Filter, Page, Query, TableStore};
use crate::error::DataResult;

/// Tables held as JSON rows behind an async lock
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<String, Vec<Value>>>>,
    echo_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Arc::default(),
            echo_writes: true,
        }
    }

    /// A store that applies writes but returns no representation for them
    pub fn without_echo() -> Self {
        Self {
            tables: Arc::default(),
            echo_writes: false,
        }
    }

    pub async fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        let mut tables = self.tables.write().await;
        tables.entry(table.to_string()).or_default().extend(rows);
    }

    /// Snapshot of every row in `table`
    pub async fn rows(&self, table: &str) -> Vec<Value> {
        let tables = self.tables.read().await;
        tables.get(table).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn select(&self, table: &str, query: &Query) -> DataResult<Page> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Value> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| matches_filter(row, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_column(a, b, &order.column);
                match (is_null(a, &order.column), is_null(b, &order.column)) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    _ if order.direction == Direction::Desc => ordering.reverse(),
                    _ => ordering,
                }
            });
        }

        let total = query.count.then_some(rows.len() as u64);
        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        let rows = rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| project(row, query.columns.as_deref()))
            .collect();

        Ok(Page { rows, total })
    }

    async fn insert(&self, table: &str, row: &Value) -> DataResult<Vec<Value>> {
        let mut tables = self.tables.write().await;
        tables.entry(table.to_string()).or_default().push(row.clone());
        Ok(self.echo(vec![row.clone()]))
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: &Value,
    ) -> DataResult<Vec<Value>> {
        let mut tables = self.tables.write().await;
        let mut updated = Vec::new();
        if let (Some(rows), Value::Object(changes)) = (tables.get_mut(table), patch) {
            for row in rows.iter_mut() {
                if !filters.iter().all(|f| matches_filter(row, f)) {
                    continue;
                }
                if let Value::Object(fields) = row {
                    for (key, value) in changes {
                        fields.insert(key.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(self.echo(updated))
    }

    async fn health_check(&self) -> DataResult<bool> {
        Ok(true)
    }
}

impl MemoryStore {
    fn echo(&self, rows: Vec<Value>) -> Vec<Value> {
        if self.echo_writes { rows } else { Vec::new() }
    }
}

fn is_null(row: &Value, column: &str) -> bool {
    row.get(column).map_or(true, Value::is_null)
}

fn matches_filter(row: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(column, expected) => row
            .get(column)
            .is_some_and(|actual| compare_values(actual, expected) == Some(Ordering::Equal)),
        Filter::Gte(column, bound) => row.get(column).is_some_and(|actual| {
            matches!(
                compare_values(actual, bound),
                Some(Ordering::Greater | Ordering::Equal)
            )
        }),
        Filter::Lte(column, bound) => row.get(column).is_some_and(|actual| {
            matches!(
                compare_values(actual, bound),
                Some(Ordering::Less | Ordering::Equal)
            )
        }),
        Filter::ILike(column, needle) => row
            .get(column)
            .and_then(Value::as_str)
            .is_some_and(|s| s.to_lowercase().contains(&needle.to_lowercase())),
        Filter::IsNull(column) => is_null(row, column),
        Filter::AnyOf(groups) => groups
            .iter()
            .any(|group| group.iter().all(|f| matches_filter(row, f))),
    }
}

fn compare_column(a: &Value, b: &Value, column: &str) -> Ordering {
    match (a.get(column), b.get(column)) {
        (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::Number(x), Value::String(y)) => x.as_f64()?.partial_cmp(&y.parse::<f64>().ok()?),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::String(x), Value::String(y)) => {
            match (parse_timestamp(x), parse_timestamp(y)) {
                (Some(tx), Some(ty)) => Some(tx.cmp(&ty)),
                _ => Some(x.cmp(y)),
            }
        }
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn project(row: Value, columns: Option<&str>) -> Value {
    let columns = match columns {
        Some(columns) if columns.trim() != "*" => columns,
        _ => return row,
    };
    let Value::Object(fields) = row else {
        return row;
    };
    let mut projected = Map::new();
    for column in columns.split(',').map(str::trim) {
        if let Some(value) = fields.get(column) {
            projected.insert(column.to_string(), value.clone());
        }
    }
    Value::Object(projected)
}
