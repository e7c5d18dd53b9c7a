use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::SessionUser;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum TokenError {
    Invalid,
    Expired,
}

/// Signs a session token for `user`, valid for `ttl`.
pub fn create_session_token(
    user: &SessionUser,
    secret: &str,
    ttl: Duration,
) -> Result<(String, DateTime<Utc>), jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expires_at = now + ttl;
    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    // Truncate to the second so the value matches the `exp` claim.
    let expires_at = Utc
        .timestamp_opt(claims.exp, 0)
        .single()
        .unwrap_or(expires_at);
    Ok((token, expires_at))
}

pub fn verify_session_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> SessionUser {
        SessionUser {
            id: "u1".into(),
            email: "a@example.com".into(),
        }
    }

    #[test]
    fn round_trips_claims() {
        let (token, expires_at) = create_session_token(&user(), "secret", Duration::minutes(5)).unwrap();
        let claims = verify_session_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn rejects_wrong_secret_and_expired_tokens() {
        let (token, _) = create_session_token(&user(), "secret", Duration::minutes(5)).unwrap();
        assert_eq!(verify_session_token(&token, "other").unwrap_err(), TokenError::Invalid);

        let (expired, _) = create_session_token(&user(), "secret", Duration::minutes(-5)).unwrap();
        assert_eq!(verify_session_token(&expired, "secret").unwrap_err(), TokenError::Expired);
    }
}
