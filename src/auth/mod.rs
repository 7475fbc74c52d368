use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;

use crate::config;
use crate::database::manager::DatabaseError;
use crate::database::models::User;
use crate::database::queries;

pub mod password;

/// JWT payload: subject (username) plus issue/expiry instants.
/// Access and refresh tokens share this shape.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(subject: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: subject.into(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Which signing secret and lifetime a token uses. A leaked refresh key
/// cannot mint access tokens and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn secret(&self) -> &'static str {
        let security = &config::config().security;
        match self {
            TokenKind::Access => &security.access_token_secret,
            TokenKind::Refresh => &security.refresh_token_secret,
        }
    }

    /// Configured time-to-live for this kind
    pub fn ttl(&self) -> Duration {
        let security = &config::config().security;
        match self {
            TokenKind::Access => Duration::minutes(security.access_token_expire_minutes),
            TokenKind::Refresh => Duration::minutes(security.refresh_token_expire_minutes),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token generation error: {0}")]
    Generation(String),

    #[error("token secret not configured")]
    InvalidSecret,

    #[error("invalid token")]
    Invalid,
}

/// Sign `{sub, exp = now + ttl}` with the secret belonging to `kind`.
pub fn issue_token(subject: &str, ttl: Duration, kind: TokenKind) -> Result<String, TokenError> {
    let secret = kind.secret();
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let claims = Claims::new(subject, ttl);
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| TokenError::Generation(e.to_string()))
}

/// Verify signature and expiry against the secret for `kind`; expired or
/// malformed tokens (including tokens of the other kind) are rejected.
/// Returns the decoded subject.
pub fn validate_token(token: &str, kind: TokenKind) -> Result<String, TokenError> {
    let secret = kind.secret();
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|_| TokenError::Invalid)?;

    Ok(token_data.claims.sub)
}

/// Credential verifier: look up the user by username and check the password
/// against the stored hash. `Ok(None)` means unknown user or wrong password;
/// the caller decides how to report it.
pub async fn authenticate_user(
    pool: &PgPool,
    username: &str,
    plain_password: &str,
) -> Result<Option<User>, DatabaseError> {
    let user = match queries::find_user_by_username(pool, username).await? {
        Some(user) => user,
        None => return Ok(None),
    };

    if !password::verify_password(&user.hashed_password, plain_password) {
        return Ok(None);
    }

    Ok(Some(user))
}

/// Identity resolver: map a validated token subject back to the user it
/// names. The user may have been deleted after issuance; tokens are not
/// revoked, so the lookup is the only liveness check.
pub async fn resolve_subject(pool: &PgPool, subject: &str) -> Result<Option<User>, DatabaseError> {
    queries::find_user_by_username(pool, subject).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_per_kind() {
        for kind in [TokenKind::Access, TokenKind::Refresh] {
            let token = issue_token("alice", Duration::minutes(5), kind).unwrap();
            let subject = validate_token(&token, kind).unwrap();
            assert_eq!(subject, "alice");
        }
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the default validation leeway
        let token = issue_token("alice", Duration::minutes(-10), TokenKind::Access).unwrap();
        assert!(matches!(
            validate_token(&token, TokenKind::Access),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn kinds_are_isolated() {
        let access = issue_token("alice", Duration::minutes(5), TokenKind::Access).unwrap();
        let refresh = issue_token("alice", Duration::minutes(5), TokenKind::Refresh).unwrap();

        assert!(matches!(
            validate_token(&access, TokenKind::Refresh),
            Err(TokenError::Invalid)
        ));
        assert!(matches!(
            validate_token(&refresh, TokenKind::Access),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            validate_token("not-a-jwt", TokenKind::Access),
            Err(TokenError::Invalid)
        ));
    }
}
