use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, warn};

use crate::auth::jwt::{JwtKeys, TokenKind};
use crate::auth::models::UserSummary;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::store::{SessionStore, UserStore};
use crate::error::AuthError;

/// Orchestrates credential verification, token issuance and the per-user
/// session record. All state lives in the stores and the read-only keys,
/// so the service is freely shared across concurrent requests.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, sessions: Arc<dyn SessionStore>, keys: JwtKeys) -> Self {
        Self {
            users,
            sessions,
            keys,
        }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    /// Register a new user. The email pre-check is advisory only; the
    /// storage unique constraint decides races between concurrent
    /// sign-ups, so a losing racer still observes `Conflict`.
    pub async fn signup(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<i64, AuthError> {
        if self.users.find_by_email(email).await?.is_some() {
            warn!(email, "signup with registered email");
            return Err(AuthError::Conflict);
        }
        let hash = hash_password(password)?;
        let user = self.users.create(email, username, &hash).await?;
        info!(uid = user.uid, email, "user registered");
        Ok(user.uid)
    }

    /// Verify credentials, mint a fresh token pair and persist it as the
    /// user's single current session. Unknown email and wrong password
    /// produce the same error so callers cannot enumerate accounts.
    pub async fn signin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, String, UserSummary), AuthError> {
        let user = match self.users.find_by_email(email).await? {
            Some(u) => u,
            None => {
                warn!(email, "signin with unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };
        if !verify_password(password, &user.password_hash) {
            warn!(uid = user.uid, "signin with invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.keys.sign_access(user.uid)?;
        let refresh_token = self.keys.sign_refresh(user.uid)?;

        let issued_at = OffsetDateTime::now_utc();
        let expires_at = issued_at + self.keys.access_ttl;
        self.sessions
            .upsert(user.uid, &access_token, &refresh_token, issued_at, expires_at)
            .await?;

        info!(uid = user.uid, "user signed in");
        Ok((access_token, refresh_token, UserSummary::from(&user)))
    }

    /// Drop the session record of whoever the token belongs to. An absent,
    /// invalid or expired token only means there is nothing to delete;
    /// sign-out itself never fails for token reasons.
    pub async fn signout(&self, access_token: Option<&str>) -> Result<(), AuthError> {
        let uid = access_token.and_then(|t| self.keys.decode(t, TokenKind::Access).ok());
        if let Some(uid) = uid {
            self.sessions.delete(uid).await?;
            info!(uid, "user signed out");
        }
        Ok(())
    }

    /// Resolve an access token to its subject uid. Keeps `InvalidToken`
    /// and `TokenExpired` distinct so callers can tell re-login from
    /// refresh; boundaries that only need "logged in or not" collapse
    /// both to `Unauthenticated`.
    pub fn resolve(&self, access_token: &str) -> Result<i64, AuthError> {
        self.keys.decode(access_token, TokenKind::Access)
    }

    pub async fn get_profile(&self, uid: i64) -> Result<UserSummary, AuthError> {
        let user = self.users.find_by_id(uid).await?.ok_or(AuthError::NotFound)?;
        Ok(UserSummary::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::mem::{MemSessionStore, MemUserStore};
    use crate::config::JwtConfig;
    use time::Duration;

    fn make_service() -> AuthService {
        let keys = JwtKeys::new(&JwtConfig {
            secret: "test-secret".into(),
            access_ttl_minutes: 5,
            refresh_ttl_days: 1,
        });
        AuthService::new(
            Arc::new(MemUserStore::new()),
            Arc::new(MemSessionStore::new()),
            keys,
        )
    }

    #[tokio::test]
    async fn signup_then_duplicate_is_conflict() {
        let service = make_service();
        service
            .signup("a@x.com", "alice", "pw123")
            .await
            .expect("first signup");
        let err = service.signup("a@x.com", "bob", "pw456").await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn signin_roundtrip_resolves_to_uid() {
        let service = make_service();
        let uid = service.signup("a@x.com", "alice", "pw123").await.unwrap();
        let (access, _refresh, user) = service.signin("a@x.com", "pw123").await.unwrap();
        assert_eq!(user.uid, uid);
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.username, "alice");
        assert_eq!(service.resolve(&access).unwrap(), uid);
    }

    #[tokio::test]
    async fn bad_password_and_unknown_email_are_indistinguishable() {
        let service = make_service();
        service.signup("a@x.com", "alice", "pw123").await.unwrap();
        let wrong_pw = service.signin("a@x.com", "wrong").await.unwrap_err();
        let no_user = service.signin("nouser@x.com", "pw").await.unwrap_err();
        assert!(matches!(wrong_pw, AuthError::InvalidCredentials));
        assert!(matches!(no_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_pw.to_string(), no_user.to_string());
    }

    #[tokio::test]
    async fn second_signin_replaces_the_session() {
        let service = make_service();
        let uid = service.signup("a@x.com", "alice", "pw123").await.unwrap();

        // Seed a distinguishable existing session so the replacement is
        // observable even when both token pairs are minted within the
        // same second.
        let now = OffsetDateTime::now_utc();
        service
            .sessions
            .upsert(uid, "old-access", "old-refresh", now, now)
            .await
            .unwrap();

        let (access, refresh, _) = service.signin("a@x.com", "pw123").await.unwrap();

        let record = service
            .sessions
            .find(uid)
            .await
            .unwrap()
            .expect("one session record");
        assert_eq!(record.access_token, access);
        assert_eq!(record.refresh_token, refresh);
        assert_ne!(record.access_token, "old-access");
        assert_ne!(record.refresh_token, "old-refresh");
    }

    #[tokio::test]
    async fn signout_deletes_the_session() {
        let service = make_service();
        let uid = service.signup("a@x.com", "alice", "pw123").await.unwrap();
        let (access, _, _) = service.signin("a@x.com", "pw123").await.unwrap();
        service.signout(Some(&access)).await.unwrap();
        assert!(service.sessions.find(uid).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn signout_without_token_is_a_noop() {
        let service = make_service();
        service.signout(None).await.expect("no-op signout");
        service
            .signout(Some("garbage-token"))
            .await
            .expect("invalid token during signout is not an error");
    }

    #[tokio::test]
    async fn expired_access_token_resolves_to_token_expired() {
        let service = make_service();
        let uid = service.signup("a@x.com", "alice", "pw123").await.unwrap();
        let stale = service
            .keys()
            .issue(uid, TokenKind::Access, Duration::seconds(-1))
            .unwrap();
        let err = service.resolve(&stale).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn refresh_token_does_not_resolve() {
        let service = make_service();
        service.signup("a@x.com", "alice", "pw123").await.unwrap();
        let (_, refresh, _) = service.signin("a@x.com", "pw123").await.unwrap();
        let err = service.resolve(&refresh).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn get_profile_of_missing_user_is_not_found() {
        let service = make_service();
        let err = service.get_profile(12345).await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound));

        let uid = service.signup("a@x.com", "alice", "pw123").await.unwrap();
        let profile = service.get_profile(uid).await.unwrap();
        assert_eq!(profile.username, "alice");
    }
}
