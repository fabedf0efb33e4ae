//! Wire types of the PESU identity provider

use common::de::null_to_default;
use serde::{Deserialize, Serialize};

/// Student profile returned by a successful authentication
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PesuProfile {
    #[serde(default, deserialize_with = "null_to_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub prn: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub srn: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub program: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub branch: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub semester: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub section: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub phone: String,
    #[serde(default)]
    pub campus_code: Option<i64>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub campus: String,
}

/// Body of `POST /authenticate`
#[derive(Debug, Clone, Deserialize)]
pub struct PesuAuthResponse {
    pub status: bool,
    #[serde(default)]
    pub profile: Option<PesuProfile>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub timestamp: String,
}

/// Body sent to `POST /authenticate`
#[derive(Debug, Serialize)]
pub(crate) struct PesuAuthRequest<'a> {
    pub username: String,
    pub password: &'a str,
    pub profile: bool,
}
