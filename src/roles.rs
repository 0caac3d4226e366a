// Roles and Role Resolution
// The role set is closed; anything unrecognized in storage degrades to
// Member so a bad write can never grant privileges.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::store::{UserRecord, UserStore};

/// Authorization tier attached to a user record and mirrored into the
/// identity provider's custom claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
        }
    }

    /// Interpret a stored role string. Unrecognized values coerce to
    /// Member rather than being trusted verbatim.
    pub fn from_stored(value: &str) -> Self {
        match value {
            "admin" => Role::Admin,
            "member" => Role::Member,
            other => {
                warn!(stored = %other, "unrecognized role in user record, treating as member");
                Role::Member
            }
        }
    }
}

/// Resolves the caller's role from the user store, creating a first-login
/// record when none exists.
pub struct RoleResolver {
    store: Arc<dyn UserStore>,
}

impl RoleResolver {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Resolve the role for a verified identity.
    ///
    /// Infallible by contract: the write path is best-effort, and any store
    /// failure degrades to Member. The duplicate create from a concurrent
    /// first login is expected and logged at debug.
    pub async fn resolve(&self, uid: &str, email: Option<&str>) -> Role {
        match self.store.get_user_record(uid).await {
            Ok(Some(record)) => Role::from_stored(&record.role),
            Ok(None) => {
                let record = UserRecord::new_member(email.map(str::to_string));
                match self.store.create_user_record(uid, record).await {
                    Ok(()) => {}
                    Err(e) if e.is_benign_create_race() => {
                        debug!(uid = %uid, "user record created concurrently");
                    }
                    Err(e) => {
                        warn!(uid = %uid, error = %e, "failed to create first-login user record");
                    }
                }
                Role::Member
            }
            Err(e) => {
                warn!(uid = %uid, error = %e, "user store read failed, defaulting to member");
                Role::Member
            }
        }
    }
}
