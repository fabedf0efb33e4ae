//! Item models for the API service

use std::fmt;

use chrono::{DateTime, Utc};
use common::database::Direction;
use common::de::null_to_default;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Images surfaced per item in list responses
pub const LISTING_IMAGE_LIMIT: usize = 3;

/// Inline images longer than this are left out of list responses
pub const INLINE_IMAGE_LISTING_MAX: usize = 500;

/// Columns fetched for list responses
pub const LISTING_COLUMNS: &str = "id,title,description,price,location,condition,seller_id,images,category,created_at,updated_at,is_available,views";

/// Condition of an item for sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    New,
    #[serde(rename = "Like New")]
    LikeNew,
    Good,
    Fair,
    Poor,
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Condition::New,
        Condition::LikeNew,
        Condition::Good,
        Condition::Fair,
        Condition::Poor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "New",
            Condition::LikeNew => "Like New",
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::Poor => "Poor",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row of the `items` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub title: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub description: String,
    pub price: f64,
    #[serde(default, deserialize_with = "null_to_default")]
    pub location: String,
    #[serde(default)]
    pub year: Option<i32>,
    pub condition: Condition,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub views: i64,
    #[serde(default, deserialize_with = "null_to_default")]
    pub is_available: bool,
    #[serde(default, deserialize_with = "null_to_default")]
    pub is_featured: bool,
    #[serde(default, skip_serializing, deserialize_with = "null_to_default")]
    pub is_deleted: bool,
    pub seller_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An item as returned to clients, with the legacy compatibility fields
#[derive(Debug, Clone, Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: Item,
    pub image_urls: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

impl ItemView {
    /// Full item, every image included
    pub fn detail(item: Item) -> Self {
        let categories = if item.category.is_empty() {
            Vec::new()
        } else {
            vec![item.category.clone()]
        };
        Self {
            image_urls: item.images.clone(),
            categories,
            item,
        }
    }

    /// Item trimmed for list responses: first three images, large inline
    /// payloads dropped
    pub fn listing(mut item: Item) -> Self {
        item.images = listing_images(&item.id, &item.images);
        Self {
            image_urls: item.images.clone(),
            categories: Vec::new(),
            item,
        }
    }
}

fn listing_images(item_id: &Uuid, images: &[String]) -> Vec<String> {
    images
        .iter()
        .take(LISTING_IMAGE_LIMIT)
        .enumerate()
        .filter(|(index, image)| {
            let inline = image.len() > INLINE_IMAGE_LISTING_MAX && image.starts_with("data:image/");
            if inline {
                tracing::debug!("Item {} still stores inline image {}", item_id, index);
            }
            !inline
        })
        .map(|(_, image)| image.clone())
        .collect()
}

/// Body of `POST /api/items`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateItemRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub seller_id: Option<String>,
    pub is_available: Option<bool>,
}

/// Keys a client may send in an update but which belong to the server
const ITEM_SERVER_MANAGED: &[&str] = &["id", "seller_id", "created_at", "updated_at", "views"];

/// Allow-listed item patch
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub location: Option<String>,
    pub condition: Option<String>,
    pub category: Option<String>,
    pub category_id: Option<String>,
    pub year: Option<i32>,
    pub images: Option<Vec<String>>,
    pub is_available: Option<bool>,
}

impl ItemPatch {
    /// Parse a client body, dropping server-managed keys and rejecting
    /// unknown ones
    pub fn from_json(body: Value) -> Result<Self, String> {
        let Value::Object(mut fields) = body else {
            return Err("Request body must be a JSON object".to_string());
        };
        for key in ITEM_SERVER_MANAGED {
            fields.remove(*key);
        }
        serde_json::from_value(Value::Object(fields)).map_err(|e| e.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self == &ItemPatch::default()
    }

    /// Columns to patch; text is trimmed
    pub fn into_patch(self) -> Map<String, Value> {
        let mut patch = Map::new();
        let trimmed = |value: String| Value::String(value.trim().to_string());

        if let Some(title) = self.title {
            patch.insert("title".to_string(), trimmed(title));
        }
        if let Some(description) = self.description {
            patch.insert("description".to_string(), trimmed(description));
        }
        if let Some(price) = self.price {
            patch.insert("price".to_string(), Value::from(price));
        }
        if let Some(location) = self.location {
            let location = match location.trim() {
                "" => auth::models::DEFAULT_LOCATION.to_string(),
                l => l.to_string(),
            };
            patch.insert("location".to_string(), Value::String(location));
        }
        if let Some(condition) = self.condition {
            patch.insert("condition".to_string(), Value::String(condition));
        }
        if let Some(category) = self.category {
            patch.insert("category".to_string(), trimmed(category));
        }
        if let Some(category_id) = self.category_id {
            patch.insert("category_id".to_string(), Value::String(category_id));
        }
        if let Some(year) = self.year {
            patch.insert("year".to_string(), Value::from(year));
        }
        if let Some(images) = self.images {
            patch.insert("images".to_string(), Value::from(images));
        }
        if let Some(is_available) = self.is_available {
            patch.insert("is_available".to_string(), Value::Bool(is_available));
        }
        patch
    }
}

/// Sort orders offered by item listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Title,
}

impl SortKey {
    /// Unknown or missing keys fall back to newest first
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("price_asc") => SortKey::PriceAsc,
            Some("price_desc") => SortKey::PriceDesc,
            Some("title") => SortKey::Title,
            _ => SortKey::Newest,
        }
    }

    pub fn order(&self) -> (&'static str, Direction) {
        match self {
            SortKey::Newest => ("created_at", Direction::Desc),
            SortKey::PriceAsc => ("price", Direction::Asc),
            SortKey::PriceDesc => ("price", Direction::Desc),
            SortKey::Title => ("title", Direction::Asc),
        }
    }
}

/// Query string of `GET /api/items`; every value is parsed leniently
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub location: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Filters of an item listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFilters {
    pub search: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    /// Only positive bounds are kept
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub location: Option<String>,
    pub sort: SortKey,
}

impl ItemQuery {
    pub fn filters(&self) -> ItemFilters {
        let text = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let bound = |value: &Option<String>| {
            value
                .as_deref()
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| *v > 0.0)
        };

        ItemFilters {
            search: text(&self.search),
            category: text(&self.category),
            condition: text(&self.condition),
            min_price: bound(&self.min_price),
            max_price: bound(&self.max_price),
            location: text(&self.location),
            sort: SortKey::parse(self.sort.as_deref()),
        }
    }
}
