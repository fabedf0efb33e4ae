//! PostgREST client for the hosted data service

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, error, info};

use super::{DataServiceConfig, Filter, Page, Query, TableStore};
use crate::error::{DataError, DataResult};

/// HTTP client for `{url}/rest/v1/{table}`
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    health_table: String,
}

impl RestClient {
    /// Build a client carrying the API key on every request
    pub fn new(config: &DataServiceConfig) -> DataResult<Self> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| DataError::Configuration(format!("invalid API key: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| DataError::Configuration(format!("invalid API key: {}", e)))?;
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DataError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        info!("Data service client configured for {}", config.url);

        Ok(Self {
            client,
            base_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            health_table: config.health_table.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    async fn send(&self, request: RequestBuilder) -> DataResult<Response> {
        let response = Self::dispatch(request).await?;
        Self::ensure_success(response).await
    }

    async fn dispatch(request: RequestBuilder) -> DataResult<Response> {
        request.send().await.map_err(|e| {
            error!("Data service request failed: {}", e);
            DataError::Request(e)
        })
    }

    async fn ensure_success(response: Response) -> DataResult<Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Data service returned {}: {}", status, body);
            return Err(DataError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn rows(response: Response) -> DataResult<Vec<Value>> {
        let text = response.text().await.map_err(DataError::Request)?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&text)? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            row => Ok(vec![row]),
        }
    }
}

#[async_trait]
impl TableStore for RestClient {
    async fn select(&self, table: &str, query: &Query) -> DataResult<Page> {
        let params = query_params(query);
        debug!("select {} {:?}", table, params);

        let mut request = self.client.get(self.table_url(table)).query(&params);
        if query.count {
            request = request.header("Prefer", "count=exact");
        }

        let response = Self::dispatch(request).await?;
        if let Some(page) = page_past_end(response.status(), response.headers()) {
            debug!("select {} offset is past the last row", table);
            return Ok(page);
        }

        let response = Self::ensure_success(response).await?;
        let total = content_range_total(response.headers());
        let rows = Self::rows(response).await?;

        Ok(Page { rows, total })
    }

    async fn insert(&self, table: &str, row: &Value) -> DataResult<Vec<Value>> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(row);
        let response = self.send(request).await?;
        Self::rows(response).await
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: &Value,
    ) -> DataResult<Vec<Value>> {
        let params: Vec<(String, String)> = filters.iter().map(filter_param).collect();
        let request = self
            .client
            .patch(self.table_url(table))
            .query(&params)
            .header("Prefer", "return=representation")
            .json(patch);
        let response = self.send(request).await?;
        Self::rows(response).await
    }

    async fn health_check(&self) -> DataResult<bool> {
        let query = Query::new().select("id").limit(1);
        self.select(&self.health_table, &query).await?;
        Ok(true)
    }
}

/// Render a query as PostgREST URL parameters
pub(crate) fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = Vec::new();
    params.push((
        "select".to_string(),
        query.columns.clone().unwrap_or_else(|| "*".to_string()),
    ));
    params.extend(query.filters.iter().map(filter_param));
    if let Some(order) = &query.order {
        params.push((
            "order".to_string(),
            format!("{}.{}", order.column, order.direction.as_str()),
        ));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    if let Some(offset) = query.offset {
        params.push(("offset".to_string(), offset.to_string()));
    }
    params
}

fn filter_param(filter: &Filter) -> (String, String) {
    match filter {
        Filter::Eq(column, value) => (column.clone(), format!("eq.{}", plain(value))),
        Filter::Gte(column, value) => (column.clone(), format!("gte.{}", plain(value))),
        Filter::Lte(column, value) => (column.clone(), format!("lte.{}", plain(value))),
        Filter::ILike(column, needle) => (column.clone(), format!("ilike.*{}*", needle)),
        Filter::IsNull(column) => (column.clone(), "is.null".to_string()),
        Filter::AnyOf(groups) => ("or".to_string(), format!("({})", or_groups(groups))),
    }
}

fn or_groups(groups: &[Vec<Filter>]) -> String {
    groups
        .iter()
        .map(|group| {
            let inner: Vec<String> = group.iter().map(logic_term).collect();
            format!("and({})", inner.join(","))
        })
        .collect::<Vec<_>>()
        .join(",")
}

// Filters nested inside `or=(...)` use the `column.op.value` form and need
// quoting for PostgREST's reserved characters.
fn logic_term(filter: &Filter) -> String {
    match filter {
        Filter::Eq(column, value) => format!("{}.eq.{}", column, quoted(&plain(value))),
        Filter::Gte(column, value) => format!("{}.gte.{}", column, quoted(&plain(value))),
        Filter::Lte(column, value) => format!("{}.lte.{}", column, quoted(&plain(value))),
        Filter::ILike(column, needle) => {
            format!("{}.ilike.{}", column, quoted(&format!("*{}*", needle)))
        }
        Filter::IsNull(column) => format!("{}.is.null", column),
        Filter::AnyOf(groups) => format!("or({})", or_groups(groups)),
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn quoted(raw: &str) -> String {
    if raw.contains([',', '(', ')', '.', ':', '"', ' ']) {
        format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        raw.to_string()
    }
}

/// Total from a `Content-Range` header such as `0-11/42` or `*/0`
pub(crate) fn parse_content_range_total(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

fn content_range_total(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range_total)
}

/// PostgREST answers 416 when the offset lies beyond the last row; that is
/// an empty page, with the total still reported as `*/N`.
fn page_past_end(status: StatusCode, headers: &HeaderMap) -> Option<Page> {
    (status == StatusCode::RANGE_NOT_SATISFIABLE).then(|| Page {
        rows: Vec::new(),
        total: content_range_total(headers),
    })
}
