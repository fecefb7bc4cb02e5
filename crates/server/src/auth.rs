//! Bearer tokens and the middleware guarding every private route.
//!
//! A token is `base64url(json claims) "." base64url(hmac_sha256(claims))`.

use std::fmt;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretSlice};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::Instrument;

use crate::server::ServerState;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token key must not be empty")]
    EmptyKey,
    #[error("malformed token")]
    Malformed,
    #[error("token signature mismatch")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    /// Unix seconds.
    pub exp: i64,
}

/// The caller of a private route, inserted by [`require_user`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

pub struct TokenSigner {
    key: SecretSlice<u8>,
    ttl: Duration,
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("key", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenSigner {
    pub fn new(key: &[u8], ttl_hours: u32) -> Result<Self, TokenError> {
        if key.is_empty() {
            return Err(TokenError::EmptyKey);
        }
        Ok(Self {
            key: SecretSlice::from(key.to_vec()),
            ttl: Duration::hours(i64::from(ttl_hours)),
        })
    }

    /// Issues a token for `user_id` valid for the configured lifetime.
    pub fn issue(&self, user_id: i64, username: &str) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let payload = serde_json::to_vec(claims).map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac()?;
        mac.update(&payload);
        let signature = mac.finalize().into_bytes();
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload),
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    fn verify_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let (payload, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(&payload);
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;
        if claims.exp <= now {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.key.expose_secret()).map_err(|_| TokenError::EmptyKey)
    }
}

/// Rejects requests without a valid bearer token and runs the rest of the
/// request inside a span carrying the caller's id.
pub(crate) async fn require_user(
    State(state): State<ServerState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(StatusCode::UNAUTHORIZED)?;
    let claims = state.signer.verify(bearer.token()).map_err(|err| {
        tracing::debug!(error = %err, "bearer token rejected");
        StatusCode::UNAUTHORIZED
    })?;

    let span = tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        user_id = claims.sub,
        period_code = tracing::field::Empty,
    );
    request.extensions_mut().insert(AuthUser {
        id: claims.sub,
        username: claims.username,
    });
    Ok(next.run(request).instrument(span).await)
}

/// Adds the period being written to the request span.
pub(crate) fn record_period(period_code: &str) {
    tracing::Span::current().record("period_code", period_code);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(b"unit-test-key", 1).unwrap()
    }

    #[test]
    fn issued_token_verifies() {
        let signer = signer();
        let token = signer.issue(7, "alice").unwrap();
        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn token_from_another_key_is_rejected() {
        let token = TokenSigner::new(b"other", 1).unwrap().issue(7, "alice").unwrap();
        assert_eq!(signer().verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn tampered_claims_are_rejected() {
        let signer = signer();
        let token = signer.issue(7, "alice").unwrap();
        let (_, signature) = token.split_once('.').unwrap();
        let forged = Claims {
            sub: 8,
            username: "mallory".to_string(),
            exp: i64::MAX,
        };
        let forged = format!(
            "{}.{signature}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap())
        );
        assert_eq!(signer.verify(&forged), Err(TokenError::BadSignature));
    }

    #[test]
    fn expired_token_is_rejected() {
        let signer = signer();
        let token = signer
            .sign(&Claims {
                sub: 7,
                username: "alice".to_string(),
                exp: 1_000,
            })
            .unwrap();
        assert_eq!(signer.verify_at(&token, 1_000), Err(TokenError::Expired));
        assert!(signer.verify_at(&token, 999).is_ok());
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(signer().verify("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(signer().verify("a.b!"), Err(TokenError::Malformed));
        assert_eq!(TokenSigner::new(b"", 1).unwrap_err(), TokenError::EmptyKey);
    }
}
