//! User model and related functionality

use chrono::{DateTime, Utc};
use common::de::null_to_default;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Location given to new profiles and to profiles that clear theirs
pub const DEFAULT_LOCATION: &str = "PES University, Bangalore";

/// Row of the `user_profiles` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub srn: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub prn: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub bio: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub avatar_url: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub program: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub branch: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub semester: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub section: String,
    #[serde(default)]
    pub campus_code: Option<i64>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub campus: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub rating: f64,
    #[serde(default, deserialize_with = "null_to_default")]
    pub verified: bool,
    #[serde(default, deserialize_with = "null_to_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub nickname: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

/// Keys a client may send but which are owned by the server; they are dropped
const SERVER_MANAGED: &[&str] = &[
    "id",
    "srn",
    "created_at",
    "verified",
    "rating",
    "updated_at",
    "last_login",
];

/// Allow-listed profile patch
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdate {
    pub nickname: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
}

impl ProfileUpdate {
    /// Parse a client body: strips server-managed keys, rejects unknown ones
    /// and validates every provided field.
    pub fn from_json(body: Value) -> Result<Self, String> {
        let Value::Object(mut fields) = body else {
            return Err("Request body must be a JSON object".to_string());
        };
        for key in SERVER_MANAGED {
            fields.remove(*key);
        }

        let update: ProfileUpdate =
            serde_json::from_value(Value::Object(fields)).map_err(|e| e.to_string())?;
        update.validate()?;
        Ok(update)
    }

    pub fn validate(&self) -> Result<(), String> {
        check_len("nickname", self.nickname.as_deref(), 50)?;
        check_len("bio", self.bio.as_deref(), 500)?;
        check_len("phone", self.phone.as_deref(), 20)?;
        check_len("location", self.location.as_deref(), 200)?;
        check_len("avatar_url", self.avatar_url.as_deref(), 2048)?;

        if let Some(url) = self.avatar_url.as_deref().map(str::trim) {
            if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err("avatar_url must be an http or https URL".to_string());
            }
        }

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self == &ProfileUpdate::default()
    }

    /// Columns to patch, with values trimmed
    pub fn into_patch(self) -> Map<String, Value> {
        let mut patch = Map::new();
        let mut set = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                patch.insert(key.to_string(), Value::String(value.trim().to_string()));
            }
        };
        set("nickname", self.nickname);
        set("bio", self.bio);
        set("avatar_url", self.avatar_url);
        set("phone", self.phone);
        set(
            "location",
            self.location.map(|l| {
                if l.trim().is_empty() {
                    DEFAULT_LOCATION.to_string()
                } else {
                    l
                }
            }),
        );
        patch
    }
}

fn check_len(field: &str, value: Option<&str>, max: usize) -> Result<(), String> {
    match value {
        Some(v) if v.trim().chars().count() > max => Err(format!(
            "{} must be at most {} characters long",
            field, max
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_managed_keys_are_stripped() {
        let update = ProfileUpdate::from_json(json!({
            "nickname": "ash",
            "rating": 5.0,
            "verified": false,
            "srn": "PES1UG21CS999"
        }))
        .unwrap();
        assert_eq!(update.nickname.as_deref(), Some("ash"));
        assert_eq!(update.into_patch().len(), 1);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ProfileUpdate::from_json(json!({"is_admin": true})).unwrap_err();
        assert!(err.contains("is_admin"));
    }

    #[test]
    fn blank_location_resets_to_default() {
        let patch = ProfileUpdate::from_json(json!({"location": "   "}))
            .unwrap()
            .into_patch();
        assert_eq!(patch["location"], DEFAULT_LOCATION);
    }

    #[test]
    fn avatar_must_be_http() {
        assert!(ProfileUpdate::from_json(json!({"avatar_url": "javascript:alert(1)"})).is_err());
        assert!(ProfileUpdate::from_json(json!({"avatar_url": "https://cdn.example.com/a.png"})).is_ok());
    }

    #[test]
    fn long_bio_is_rejected() {
        let bio = "b".repeat(501);
        assert_eq!(
            ProfileUpdate::from_json(json!({ "bio": bio })).unwrap_err(),
            "bio must be at most 500 characters long"
        );
    }

    #[test]
    fn user_row_tolerates_nulls() {
        let user: User = serde_json::from_value(json!({
            "id": "5f0c1a9e-8d2b-4a8e-9a51-0d6b8f3e2c11",
            "srn": "PES1UG21CS001",
            "bio": null,
            "rating": null,
            "campus_code": null,
            "created_at": "2024-03-01T10:00:00Z",
            "updated_at": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(user.bio, "");
        assert_eq!(user.rating, 0.0);
        assert!(user.last_login.is_none());
    }
}
