//! Verified caller identity

use uuid::Uuid;

use crate::jwt::Claims;

/// Identity of the caller, established by the identity middleware from a
/// validated token. Owner fields on new rows are always taken from here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}
