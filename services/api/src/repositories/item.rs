//! Item repository for data service operations

use std::sync::Arc;

use chrono::Utc;
use common::database::{Direction, Filter, Query, TableStore, decode_echo, decode_rows};
use common::error::DataResult;
use serde_json::{Map, Value, json};
use tracing::info;
use uuid::Uuid;

use crate::models::item::{Condition, ItemFilters, LISTING_COLUMNS};
use crate::models::{CreateItemRequest, Item};
use crate::validation::PageRequest;

const TABLE: &str = "items";

/// One page of items and the number of items matching the filters
#[derive(Debug, Clone)]
pub struct ItemPage {
    pub items: Vec<Item>,
    pub total: u64,
}

/// Outcome of a write that requires ownership of the target row
#[derive(Debug)]
pub enum Mutation<T> {
    Applied(T),
    NotFound,
    Forbidden,
}

/// Item repository
#[derive(Clone)]
pub struct ItemRepository {
    store: Arc<dyn TableStore>,
}

impl ItemRepository {
    /// Create a new item repository
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    fn visible() -> Filter {
        Filter::eq("is_deleted", false)
    }

    async fn page(&self, query: Query, page: PageRequest) -> DataResult<ItemPage> {
        let query = query
            .select(LISTING_COLUMNS)
            .filter(Self::visible())
            .range(page.offset, page.limit)
            .with_count();
        let result = self.store.select(TABLE, &query).await?;
        let items: Vec<Item> = decode_rows(result.rows)?;

        // The service may omit the count; never report fewer rows than were seen
        let seen = page.offset + items.len() as u64;
        let total = result.total.map_or(seen, |total| total.max(seen));

        Ok(ItemPage { items, total })
    }

    /// List items matching `filters`
    pub async fn list(&self, filters: &ItemFilters, page: PageRequest) -> DataResult<ItemPage> {
        let mut query = Query::new();
        if let Some(search) = &filters.search {
            query = query.filter(Filter::contains("title", search));
        }
        if let Some(category) = &filters.category {
            query = query.filter(Filter::eq("category", category.as_str()));
        }
        if let Some(condition) = &filters.condition {
            query = query.filter(Filter::eq("condition", condition.as_str()));
        }
        if let Some(min_price) = filters.min_price {
            query = query.filter(Filter::gte("price", min_price));
        }
        if let Some(max_price) = filters.max_price {
            query = query.filter(Filter::lte("price", max_price));
        }
        if let Some(location) = &filters.location {
            query = query.filter(Filter::contains("location", location));
        }
        let (column, direction) = filters.sort.order();

        self.page(query.order_by(column, direction), page).await
    }

    /// Items of one seller, newest first
    pub async fn list_by_seller(&self, seller_id: Uuid, page: PageRequest) -> DataResult<ItemPage> {
        let query = Query::new()
            .filter(Filter::eq("seller_id", seller_id.to_string()))
            .order_by("created_at", Direction::Desc);
        self.page(query, page).await
    }

    /// Find a visible item by ID
    pub async fn find_by_id(&self, id: Uuid) -> DataResult<Option<Item>> {
        let query = Query::new()
            .filter(Filter::eq("id", id.to_string()))
            .filter(Self::visible())
            .limit(1);
        let page = self.store.select(TABLE, &query).await?;
        Ok(decode_rows::<Item>(page.rows)?.into_iter().next())
    }

    /// Create an item owned by `seller_id`
    pub async fn create(
        &self,
        seller_id: Uuid,
        request: &CreateItemRequest,
        condition: Condition,
    ) -> DataResult<Item> {
        let now = Utc::now();
        let location = match request.location.trim() {
            "" => auth::models::DEFAULT_LOCATION,
            location => location,
        };
        let row = json!({
            "id": Uuid::new_v4(),
            "title": request.title.trim(),
            "description": request.description.trim(),
            "price": request.price,
            "location": location,
            "condition": condition,
            "category": request.category.trim(),
            "images": request.images,
            "views": 0,
            "is_available": request.is_available.unwrap_or(true),
            "is_featured": false,
            "is_deleted": false,
            "seller_id": seller_id,
            "created_at": now,
            "updated_at": now,
        });

        let rows = self.store.insert(TABLE, &row).await?;
        let item: Item = decode_echo(TABLE, rows)?;
        info!("Item {} created by {}", item.id, seller_id);
        Ok(item)
    }

    /// Patch an item owned by `owner`; the stored row is untouched unless
    /// the owner matches
    pub async fn update(
        &self,
        id: Uuid,
        owner: Uuid,
        mut patch: Map<String, Value>,
    ) -> DataResult<Mutation<Item>> {
        let existing = match self.find_by_id(id).await? {
            Some(item) => item,
            None => return Ok(Mutation::NotFound),
        };
        if existing.seller_id != owner {
            return Ok(Mutation::Forbidden);
        }

        patch.insert("updated_at".to_string(), json!(Utc::now()));
        let filters = [
            Filter::eq("id", id.to_string()),
            Filter::eq("seller_id", owner.to_string()),
            Self::visible(),
        ];
        let rows = self
            .store
            .update(TABLE, &filters, &Value::Object(patch))
            .await?;
        decode_echo(TABLE, rows).map(Mutation::Applied)
    }

    /// Soft delete: hide the item and mark it unavailable
    pub async fn delete(&self, id: Uuid, owner: Uuid) -> DataResult<Mutation<()>> {
        let mut patch = Map::new();
        patch.insert("is_deleted".to_string(), Value::Bool(true));
        patch.insert("is_available".to_string(), Value::Bool(false));

        Ok(match self.update(id, owner, patch).await? {
            Mutation::Applied(item) => {
                info!("Item {} deleted by {}", item.id, owner);
                Mutation::Applied(())
            }
            Mutation::NotFound => Mutation::NotFound,
            Mutation::Forbidden => Mutation::Forbidden,
        })
    }
}
