//! Password hashing, bearer tokens and the request extractor that attaches the
//! caller's identity and role.
//!
//! Tokens are `base64url(claims json).base64url(hmac-sha256)`, signed with the
//! server secret. There is no server-side session table; a token stays valid
//! until it expires.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

const MAX_TOKEN_LEN: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    /// Lists properties and manages rooms and prices.
    Tenant,
    /// Books rooms.
    Customer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub role: Role,
    pub exp: i64,
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = ulid::Ulid::new().to_string();
    let digest = password_mac(&salt, password)?.finalize().into_bytes();
    Ok(format!("{salt}${}", URL_SAFE_NO_PAD.encode(digest)))
}

/// Checks a password against a stored `salt$digest`. The digest comparison
/// is constant time.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, digest)) = stored.split_once('$') else {
        return false;
    };
    let Ok(expected) = URL_SAFE_NO_PAD.decode(digest) else {
        return false;
    };
    match password_mac(salt, password) {
        Ok(mac) => mac.verify_slice(&expected).is_ok(),
        Err(_) => false,
    }
}

fn password_mac(salt: &str, password: &str) -> Result<HmacSha256, ApiError> {
    let mut mac = HmacSha256::new_from_slice(salt.as_bytes())
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    mac.update(password.as_bytes());
    Ok(mac)
}

#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>, ttl_hours: i64) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            ttl: Duration::hours(ttl_hours),
        }
    }

    fn mac(&self) -> Result<HmacSha256, ApiError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|e| ApiError::Internal(e.to_string()))
    }

    pub fn issue(&self, user_id: i64, role: Role, now: DateTime<Utc>) -> Result<String, ApiError> {
        let claims = Claims {
            sub: user_id,
            role,
            exp: (now + self.ttl).timestamp(),
        };
        let payload = serde_json::to_vec(&claims).map_err(|e| ApiError::Internal(e.to_string()))?;
        let payload_part = URL_SAFE_NO_PAD.encode(payload);

        let mut mac = self.mac()?;
        mac.update(payload_part.as_bytes());
        let sig_part = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{payload_part}.{sig_part}"))
    }

    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, ApiError> {
        const INVALID: ApiError = ApiError::Unauthorized("Invalid token");

        if token.len() > MAX_TOKEN_LEN {
            return Err(INVALID);
        }
        let (payload_part, sig_part) = token.split_once('.').ok_or(INVALID)?;

        let signature = URL_SAFE_NO_PAD.decode(sig_part).map_err(|_| INVALID)?;
        let mut mac = self.mac()?;
        mac.update(payload_part.as_bytes());
        mac.verify_slice(&signature).map_err(|_| INVALID)?;

        let payload = URL_SAFE_NO_PAD.decode(payload_part).map_err(|_| INVALID)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| INVALID)?;

        if claims.exp <= now.timestamp() {
            return Err(ApiError::Unauthorized("Token expired"));
        }
        Ok(claims)
    }
}

/// The authenticated caller. Taking this as a handler argument makes the
/// route require a valid bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
}

impl AuthUser {
    pub fn require(&self, role: Role) -> Result<(), ApiError> {
        if self.role == role {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Insufficient role for this action"))
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, ApiError> {
    let signer = req
        .app_data::<web::Data<TokenSigner>>()
        .ok_or_else(|| ApiError::Internal("token signer not configured".to_string()))?;
    let token = bearer_token(req).ok_or(ApiError::Unauthorized("Missing bearer token"))?;
    let claims = signer.verify(token, Utc::now())?;

    Ok(AuthUser {
        id: claims.sub,
        role: claims.role,
    })
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = authenticate(req);
        if let Err(e) = &result {
            log::debug!("rejected request to {}: {e}", req.path());
        }
        ready(result)
    }
}
