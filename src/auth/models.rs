use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the `auth` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub uid: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 digest, never exposed in JSON
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// The single current token pair for a user, one row per uid.
///
/// `expires_at` mirrors the access token's expiry for inspection only;
/// actual expiry is enforced by decoding the token itself.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRecord {
    pub token_id: i64,
    pub uid: i64,
    pub access_token: String,
    pub refresh_token: String,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub uid: i64,
    pub email: String,
    pub username: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            uid: user.uid,
            email: user.email.clone(),
            username: user.username.clone(),
        }
    }
}
