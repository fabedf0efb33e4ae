//! Request validation for items, messages and pagination

use uuid::Uuid;

use crate::error::ApiError;
use crate::models::item::Condition;
use crate::models::{CreateItemRequest, ItemPatch, SendMessageRequest};

/// Page size of item and message listings when none is given
pub const DEFAULT_PAGE_LIMIT: u64 = 12;
/// Page size of seller listings when none is given
pub const SELLER_PAGE_LIMIT: u64 = 50;
/// Largest page size a client may ask for
pub const MAX_PAGE_LIMIT: u64 = 50;

const MAX_ITEM_IMAGES: usize = 10;
const MAX_MESSAGE_LEN: usize = 1000;

/// Clamped offset/limit pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

impl PageRequest {
    /// Missing, unparsable or non-positive limits fall back to `default_limit`;
    /// limits above [`MAX_PAGE_LIMIT`] are clamped; negative offsets become 0.
    pub fn parse(limit: Option<&str>, offset: Option<&str>, default_limit: u64) -> Self {
        let limit = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l >= 1)
            .map(|l| (l as u64).min(MAX_PAGE_LIMIT))
            .unwrap_or(default_limit.min(MAX_PAGE_LIMIT));
        let offset = offset
            .and_then(|o| o.trim().parse::<i64>().ok())
            .map(|o| o.max(0) as u64)
            .unwrap_or(0);
        Self { limit, offset }
    }
}

fn check_text(errors: &mut Vec<String>, field: &str, value: &str, min: usize, max: usize) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.push(format!("{} is required", field));
    } else if len < min {
        errors.push(format!("{} must be at least {} characters long", field, min));
    } else if len > max {
        errors.push(format!("{} must be at most {} characters long", field, max));
    }
}

fn check_price(errors: &mut Vec<String>, price: f64) {
    if !price.is_finite() || price <= 0.0 {
        errors.push("price must be greater than 0".to_string());
    }
}

fn check_condition(errors: &mut Vec<String>, condition: &str) -> Option<Condition> {
    if condition.is_empty() {
        errors.push("condition is required".to_string());
        return None;
    }
    let parsed = Condition::parse(condition);
    if parsed.is_none() {
        let allowed: Vec<&str> = Condition::ALL.iter().map(Condition::as_str).collect();
        errors.push(format!("condition must be one of: {}", allowed.join(", ")));
    }
    parsed
}

fn check_images(errors: &mut Vec<String>, images: &[String]) {
    if images.len() > MAX_ITEM_IMAGES {
        errors.push(format!("images must contain at most {} entries", MAX_ITEM_IMAGES));
    }
}

fn finish(errors: Vec<String>) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors.join(", ")))
    }
}

/// Validate a new listing and return its condition
pub fn validate_new_item(request: &CreateItemRequest) -> Result<Condition, ApiError> {
    let mut errors = Vec::new();
    check_text(&mut errors, "title", &request.title, 3, 100);
    check_text(&mut errors, "description", &request.description, 10, 1000);
    check_price(&mut errors, request.price);
    let condition = check_condition(&mut errors, &request.condition);
    check_images(&mut errors, &request.images);
    finish(errors)?;
    condition.ok_or_else(|| ApiError::Validation("condition is required".to_string()))
}

/// Validate the fields present in an item patch
pub fn validate_item_patch(patch: &ItemPatch) -> Result<(), ApiError> {
    if patch.is_empty() {
        return Err(ApiError::Validation("No valid fields to update".to_string()));
    }

    let mut errors = Vec::new();
    if let Some(title) = &patch.title {
        check_text(&mut errors, "title", title, 3, 100);
    }
    if let Some(description) = &patch.description {
        check_text(&mut errors, "description", description, 10, 1000);
    }
    if let Some(price) = patch.price {
        check_price(&mut errors, price);
    }
    if let Some(condition) = &patch.condition {
        check_condition(&mut errors, condition);
    }
    if let Some(images) = &patch.images {
        check_images(&mut errors, images);
    }
    finish(errors)
}

/// Validate a message and return the receiver
pub fn validate_message(request: &SendMessageRequest) -> Result<Uuid, ApiError> {
    let mut errors = Vec::new();

    let receiver = if request.receiver_id.trim().is_empty() {
        errors.push("receiver_id is required".to_string());
        None
    } else {
        let parsed = Uuid::parse_str(request.receiver_id.trim()).ok();
        if parsed.is_none() {
            errors.push("receiver_id must be a valid ID".to_string());
        }
        parsed
    };
    check_text(&mut errors, "message", &request.message, 1, MAX_MESSAGE_LEN);

    finish(errors)?;
    receiver.ok_or_else(|| ApiError::Validation("receiver_id is required".to_string()))
}
