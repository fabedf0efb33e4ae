//! Common library for the PesXChange backend
//!
//! This crate provides shared functionality used across the services of the
//! PesXChange backend: access to the hosted, REST-queryable data service,
//! the errors it raises, and small serde helpers for its rows.

pub mod database;
pub mod de;
pub mod error;

/// Example usage of the database module
///
/// ```rust,no_run
/// use common::database::{DataServiceConfig, Filter, Query, RestClient, TableStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DataServiceConfig::new("https://project.supabase.co", "anon-key");
///     let client = RestClient::new(&config)?;
///     let page = client
///         .select("items", &Query::new().filter(Filter::eq("condition", "Good")).with_count())
///         .await?;
///     println!("{} matching items", page.total.unwrap_or(0));
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
