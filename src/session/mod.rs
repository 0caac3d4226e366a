// Session Management
// Issuance and reading of the cookie-backed session. The issuer runs only
// at login; the reader runs on every protected request and is the actual
// trust boundary behind the route guard's presence check.

pub mod cookie;
pub mod issuer;
pub mod reader;

use serde::{Deserialize, Serialize};

use crate::identity::IdentityClaims;
use crate::roles::Role;

pub use cookie::{find_cookie, CookieSettings};
pub use issuer::{IssueOutcome, IssuedSession, SessionIssuer, ISSUE_FAILED_MESSAGE};
pub use reader::SessionReader;

/// Request-scoped decoded view of a verified session artifact.
/// Never persisted; recomputed per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub is_admin: bool,
}

impl From<IdentityClaims> for Session {
    fn from(claims: IdentityClaims) -> Self {
        // is_admin holds iff the embedded role claim is exactly "admin";
        // from_stored already refuses to escalate anything else.
        let is_admin = claims
            .role
            .as_deref()
            .map(Role::from_stored)
            .is_some_and(|role| role == Role::Admin);
        Self {
            uid: claims.uid,
            email: claims.email,
            name: claims.name,
            picture: claims.picture,
            is_admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Option<&str>) -> IdentityClaims {
        IdentityClaims {
            uid: "uid-1".to_string(),
            email: Some("m@coop.test".to_string()),
            name: Some("Member One".to_string()),
            picture: None,
            role: role.map(str::to_string),
        }
    }

    #[test]
    fn test_admin_claim_sets_is_admin() {
        let session = Session::from(claims(Some("admin")));
        assert!(session.is_admin);
    }

    #[test]
    fn test_member_claim_is_not_admin() {
        assert!(!Session::from(claims(Some("member"))).is_admin);
    }

    #[test]
    fn test_missing_or_unrecognized_claim_is_not_admin() {
        assert!(!Session::from(claims(None)).is_admin);
        assert!(!Session::from(claims(Some("superuser"))).is_admin);
        assert!(!Session::from(claims(Some("Admin"))).is_admin);
    }
}
