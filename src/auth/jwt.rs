use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::{config::JwtConfig, error::AuthError};

/// Token type used to distinguish access and refresh JWTs.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by every token issued here.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user ID as a decimal string
    pub exp: usize,
    pub iat: usize,
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

/// Holds the HS256 signing/verification keys and the configured TTLs.
/// Built once from config at startup; read-only afterwards.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl JwtKeys {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            access_ttl: Duration::minutes(config.access_ttl_minutes),
            refresh_ttl: Duration::days(config.refresh_ttl_days),
        }
    }

    /// Sign a token for `uid` expiring `ttl` from now.
    pub fn issue(&self, uid: i64, kind: TokenKind, ttl: Duration) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + ttl;
        let claims = Claims {
            sub: uid.to_string(),
            exp: exp.unix_timestamp() as usize,
            iat: now.unix_timestamp() as usize,
            kind,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(uid, kind = ?kind, "jwt signed");
        Ok(token)
    }

    pub fn sign_access(&self, uid: i64) -> anyhow::Result<String> {
        self.issue(uid, TokenKind::Access, self.access_ttl)
    }

    pub fn sign_refresh(&self, uid: i64) -> anyhow::Result<String> {
        self.issue(uid, TokenKind::Refresh, self.refresh_ttl)
    }

    /// Verify signature and expiry, enforce the expected token type, and
    /// return the subject uid. Expiry is checked with zero leeway so a
    /// stale token is always reported as `TokenExpired`, never accepted.
    pub fn decode(&self, token: &str, expected: TokenKind) -> Result<i64, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })?;
        if data.claims.kind != expected {
            return Err(AuthError::InvalidToken);
        }
        let uid = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidToken)?;
        debug!(uid, kind = ?data.claims.kind, "jwt verified");
        Ok(uid)
    }
}
