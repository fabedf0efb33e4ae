//! Database module for the hosted, REST-queryable data service
//!
//! The backend keeps no database of its own. Every table lives in a managed
//! PostgREST-style service and is reached through the [`TableStore`] trait:
//! [`RestClient`] talks HTTP to the real service, `MemoryStore` (feature
//! `memory`) evaluates the same queries in-process for tests.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{DataError, DataResult};

#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod rest;

#[cfg(any(test, feature = "memory"))]
pub use memory::MemoryStore;
pub use rest::RestClient;

/// Data service configuration
#[derive(Debug, Clone)]
pub struct DataServiceConfig {
    /// Base URL of the hosted project (e.g. "https://project.supabase.co")
    pub url: String,
    /// API key sent both as `apikey` and as bearer token
    pub api_key: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Table probed by the health check
    pub health_table: String,
}

impl DataServiceConfig {
    /// Create a configuration with the default timeout (15 seconds)
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            timeout_secs: 15,
            health_table: "user_profiles".to_string(),
        }
    }
}

/// A single row predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column = value`
    Eq(String, Value),
    /// `column >= value`
    Gte(String, Value),
    /// `column <= value`
    Lte(String, Value),
    /// Case-insensitive substring match
    ILike(String, String),
    /// `column IS NULL`
    IsNull(String),
    /// Disjunction of conjunctions: any group whose filters all match
    AnyOf(Vec<Vec<Filter>>),
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(column.to_string(), value.into())
    }

    pub fn gte(column: &str, value: impl Into<Value>) -> Self {
        Filter::Gte(column.to_string(), value.into())
    }

    pub fn lte(column: &str, value: impl Into<Value>) -> Self {
        Filter::Lte(column.to_string(), value.into())
    }

    /// Substring match; wildcard characters in `needle` are stripped so user
    /// input can never widen the pattern.
    pub fn contains(column: &str, needle: &str) -> Self {
        let needle: String = needle.chars().filter(|c| !matches!(c, '*' | '%')).collect();
        Filter::ILike(column.to_string(), needle)
    }

    pub fn is_null(column: &str) -> Self {
        Filter::IsNull(column.to_string())
    }

    pub fn any_of(groups: Vec<Vec<Filter>>) -> Self {
        Filter::AnyOf(groups)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// Ordering clause
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

/// A select query against one table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Comma separated column list; `None` selects every column
    pub columns: Option<String>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    /// Ask the service for the exact number of matching rows
    pub count: bool,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.columns = Some(columns.to_string());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            direction,
        });
        self
    }

    pub fn range(mut self, offset: u64, limit: u64) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_count(mut self) -> Self {
        self.count = true;
        self
    }
}

/// One page of rows
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub rows: Vec<Value>,
    /// Exact number of matching rows when the query asked for it
    pub total: Option<u64>,
}

/// Table-level operations offered by the data service
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Run a select query
    async fn select(&self, table: &str, query: &Query) -> DataResult<Page>;

    /// Insert one row and return what the service stored
    async fn insert(&self, table: &str, row: &Value) -> DataResult<Vec<Value>>;

    /// Patch every row matching `filters` and return the updated rows
    async fn update(&self, table: &str, filters: &[Filter], patch: &Value)
    -> DataResult<Vec<Value>>;

    /// Check data service connectivity
    async fn health_check(&self) -> DataResult<bool>;
}

/// Decode every row into `T`
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> DataResult<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(DataError::from))
        .collect()
}

/// Decode the first row of a write response.
///
/// An empty response means the service did not echo the canonical row; that
/// is reported as [`DataError::MissingEcho`] instead of trusting the payload
/// the caller sent.
pub fn decode_echo<T: DeserializeOwned>(table: &str, rows: Vec<Value>) -> DataResult<T> {
    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| DataError::MissingEcho(table.to_string()))?;
    Ok(serde_json::from_value(row)?)
}
