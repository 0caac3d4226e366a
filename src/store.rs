// User Store
// Client for the managed document store holding user records, keyed by the
// stable identity identifier. Create uses the store's create-if-absent
// semantics; a 409 from a concurrent first login surfaces as AlreadyExists
// so the resolver can treat the race explicitly as benign.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::AuthError;

/// Persisted user record; exactly one per identity identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: Option<String>,

    /// Stored role string; not trusted verbatim, see Role::from_stored
    pub role: String,

    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// A fresh first-login record with the default role.
    pub fn new_member(email: Option<String>) -> Self {
        Self {
            email,
            role: "member".to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Contract with the document store for user records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user_record(&self, uid: &str) -> Result<Option<UserRecord>, AuthError>;

    /// Create-if-absent; fails with AuthError::AlreadyExists when another
    /// request created the record first.
    async fn create_user_record(&self, uid: &str, record: UserRecord) -> Result<(), AuthError>;
}

/// REST implementation of [`UserStore`].
pub struct HttpUserStore {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl HttpUserStore {
    pub fn new(config: &StoreConfig) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.call_timeout())
            .build()
            .map_err(|e| AuthError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http_client,
        })
    }

    fn document_url(&self, uid: &str) -> String {
        format!("{}/v1/users/{}?key={}", self.base_url, uid, self.api_key)
    }
}

#[async_trait]
impl UserStore for HttpUserStore {
    async fn get_user_record(&self, uid: &str) -> Result<Option<UserRecord>, AuthError> {
        let response = self
            .http_client
            .get(self.document_url(uid))
            .send()
            .await
            .map_err(|e| match AuthError::from(e) {
                AuthError::Timeout => AuthError::Timeout,
                other => AuthError::StoreUnavailable(other.to_string()),
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let record: UserRecord = response.json().await?;
                debug!(uid = %uid, role = %record.role, "user record fetched");
                Ok(Some(record))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AuthError::StoreUnavailable(format!(
                    "document store returned {}: {}",
                    status, body
                )))
            }
        }
    }

    async fn create_user_record(&self, uid: &str, record: UserRecord) -> Result<(), AuthError> {
        let response = self
            .http_client
            .post(self.document_url(uid))
            .json(&record)
            .send()
            .await
            .map_err(|e| match AuthError::from(e) {
                AuthError::Timeout => AuthError::Timeout,
                other => AuthError::StoreUnavailable(other.to_string()),
            })?;

        match response.status() {
            StatusCode::CONFLICT => Err(AuthError::AlreadyExists),
            status if status.is_success() => {
                debug!(uid = %uid, "user record created");
                Ok(())
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AuthError::StoreUnavailable(format!(
                    "document store returned {}: {}",
                    status, body
                )))
            }
        }
    }
}
