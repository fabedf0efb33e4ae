//! User repository for data service operations

use std::sync::Arc;

use chrono::Utc;
use common::database::{Filter, Query, TableStore, decode_echo, decode_rows};
use common::error::DataResult;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::models::{DEFAULT_LOCATION, PesuProfile, ProfileUpdate, User};

const TABLE: &str = "user_profiles";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn TableStore>,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    async fn find_one(&self, filter: Filter) -> DataResult<Option<User>> {
        let page = self
            .store
            .select(TABLE, &Query::new().filter(filter).limit(1))
            .await?;
        Ok(decode_rows::<User>(page.rows)?.into_iter().next())
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> DataResult<Option<User>> {
        self.find_one(Filter::eq("id", id.to_string())).await
    }

    /// Find a user by SRN (exact match)
    pub async fn find_by_srn(&self, srn: &str) -> DataResult<Option<User>> {
        self.find_one(Filter::eq("srn", srn)).await
    }

    /// Whether a profile exists for `srn`
    pub async fn srn_exists(&self, srn: &str) -> DataResult<bool> {
        let query = Query::new()
            .select("id")
            .filter(Filter::eq("srn", srn.to_uppercase()))
            .limit(1);
        let page = self.store.select(TABLE, &query).await?;
        Ok(!page.rows.is_empty())
    }

    /// Create or refresh the profile of a freshly authenticated student.
    ///
    /// Provider-owned fields are overwritten; bio, avatar, rating, location,
    /// nickname and created_at are left as stored.
    pub async fn upsert_from_profile(&self, profile: &PesuProfile) -> DataResult<User> {
        let now = Utc::now();
        let mut row = json!({
            "srn": profile.srn,
            "prn": profile.prn,
            "name": profile.name,
            "email": profile.email,
            "phone": profile.phone,
            "program": profile.program,
            "branch": profile.branch,
            "semester": profile.semester,
            "section": profile.section,
            "campus_code": profile.campus_code,
            "campus": profile.campus,
            "verified": true,
            "updated_at": now,
            "last_login": now,
        });

        match self.find_by_srn(&profile.srn).await? {
            Some(existing) => {
                info!("Refreshing profile for {}", profile.srn);
                let rows = self
                    .store
                    .update(TABLE, &[Filter::eq("id", existing.id.to_string())], &row)
                    .await?;
                decode_echo(TABLE, rows)
            }
            None => {
                info!("Creating profile for {}", profile.srn);
                if let Value::Object(fields) = &mut row {
                    fields.insert("id".to_string(), json!(Uuid::new_v4()));
                    fields.insert("bio".to_string(), json!(""));
                    fields.insert("avatar_url".to_string(), json!(""));
                    fields.insert("nickname".to_string(), json!(""));
                    fields.insert("rating".to_string(), json!(0.0));
                    fields.insert("location".to_string(), json!(DEFAULT_LOCATION));
                    fields.insert("created_at".to_string(), json!(now));
                }
                let rows = self.store.insert(TABLE, &row).await?;
                decode_echo(TABLE, rows)
            }
        }
    }

    /// Apply an allow-listed patch; `None` when the user does not exist
    pub async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> DataResult<Option<User>> {
        if self.find_by_id(id).await?.is_none() {
            return Ok(None);
        }

        let mut patch = update.into_patch();
        patch.insert("updated_at".to_string(), json!(Utc::now()));

        let rows = self
            .store
            .update(TABLE, &[Filter::eq("id", id.to_string())], &Value::Object(patch))
            .await?;
        decode_echo(TABLE, rows).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::database::MemoryStore;
    use common::error::DataError;

    fn profile() -> PesuProfile {
        PesuProfile {
            name: "Asha Rao".to_string(),
            prn: "PES1202100001".to_string(),
            srn: "PES1UG21CS001".to_string(),
            program: "Bachelor of Technology".to_string(),
            branch: "CSE".to_string(),
            semester: "Sem-6".to_string(),
            section: "A".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9999999999".to_string(),
            campus_code: Some(1),
            campus: "RR".to_string(),
        }
    }

    #[tokio::test]
    async fn first_login_creates_profile_with_defaults() {
        let store = MemoryStore::new();
        let repo = UserRepository::new(Arc::new(store.clone()));

        let user = repo.upsert_from_profile(&profile()).await.unwrap();
        assert_eq!(user.location, DEFAULT_LOCATION);
        assert!(user.verified);
        assert_eq!(user.rating, 0.0);
        assert!(user.last_login.is_some());
        assert_eq!(store.rows(TABLE).await.len(), 1);
    }

    #[tokio::test]
    async fn later_login_preserves_local_fields() {
        let store = MemoryStore::new();
        let repo = UserRepository::new(Arc::new(store.clone()));
        let first = repo.upsert_from_profile(&profile()).await.unwrap();

        let update = ProfileUpdate {
            bio: Some("Selling my old books".to_string()),
            nickname: Some("ash".to_string()),
            ..Default::default()
        };
        repo.update_profile(first.id, update).await.unwrap();

        let mut changed = profile();
        changed.semester = "Sem-7".to_string();
        let second = repo.upsert_from_profile(&changed).await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.semester, "Sem-7");
        assert_eq!(second.bio, "Selling my old books");
        assert_eq!(second.nickname, "ash");
        assert_eq!(store.rows(TABLE).await.len(), 1);
    }

    #[tokio::test]
    async fn srn_lookup_is_case_insensitive_on_input() {
        let repo = UserRepository::new(Arc::new(MemoryStore::new()));
        repo.upsert_from_profile(&profile()).await.unwrap();

        assert!(repo.srn_exists("pes1ug21cs001").await.unwrap());
        assert!(!repo.srn_exists("PES1UG21CS002").await.unwrap());
    }

    #[tokio::test]
    async fn updating_unknown_user_returns_none() {
        let repo = UserRepository::new(Arc::new(MemoryStore::new()));
        let result = repo
            .update_profile(Uuid::new_v4(), ProfileUpdate::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn missing_echo_is_an_error() {
        let repo = UserRepository::new(Arc::new(MemoryStore::without_echo()));
        let err = repo.upsert_from_profile(&profile()).await.unwrap_err();
        assert!(matches!(err, DataError::MissingEcho(_)));
    }
}
