use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::debug;

use crate::auth::models::{SessionRecord, User};
use crate::error::AuthError;

/// Persistence seam for user records. The `auth.email` unique constraint
/// is the authoritative guard against duplicate registration.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; a duplicate email surfaces as `Conflict`.
    async fn create(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<User, AuthError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    async fn find_by_id(&self, uid: i64) -> Result<Option<User>, AuthError>;
}

/// Persistence seam for the per-user token pair. The `token.uid` unique
/// constraint keeps the store at zero-or-one record per user.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Replace the user's record in place, or insert one if absent, as a
    /// single atomic statement. Last writer wins under concurrent sign-ins.
    async fn upsert(
        &self,
        uid: i64,
        access_token: &str,
        refresh_token: &str,
        issued_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> Result<(), AuthError>;

    async fn find(&self, uid: i64) -> Result<Option<SessionRecord>, AuthError>;

    /// Idempotent: deleting a missing record is not an error.
    async fn delete(&self, uid: i64) -> Result<(), AuthError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<User, AuthError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO auth (email, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING uid, username, email, password_hash, is_active, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::Conflict,
            _ => AuthError::Internal(e.into()),
        })?;
        debug!(uid = user.uid, "user row inserted");
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT uid, username, email, password_hash, is_active, created_at, updated_at
            FROM auth
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, uid: i64) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT uid, username, email, password_hash, is_active, created_at, updated_at
            FROM auth
            WHERE uid = $1
            "#,
        )
        .bind(uid)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}

#[derive(Clone)]
pub struct PgSessionStore {
    db: PgPool,
}

impl PgSessionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn upsert(
        &self,
        uid: i64,
        access_token: &str,
        refresh_token: &str,
        issued_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            INSERT INTO token (uid, access_token, refresh_token, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (uid) DO UPDATE SET
                access_token = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(uid)
        .bind(access_token)
        .bind(refresh_token)
        .bind(issued_at)
        .bind(expires_at)
        .execute(&self.db)
        .await?;
        debug!(uid, "session record upserted");
        Ok(())
    }

    async fn find(&self, uid: i64) -> Result<Option<SessionRecord>, AuthError> {
        let record = sqlx::query_as::<_, SessionRecord>(
            r#"
            SELECT token_id, uid, access_token, refresh_token, created_at, expires_at
            FROM token
            WHERE uid = $1
            "#,
        )
        .bind(uid)
        .fetch_optional(&self.db)
        .await?;
        Ok(record)
    }

    async fn delete(&self, uid: i64) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM token WHERE uid = $1")
            .bind(uid)
            .execute(&self.db)
            .await?;
        debug!(uid, "session record deleted");
        Ok(())
    }
}
