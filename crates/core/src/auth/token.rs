//! HS256 bearer tokens.
//!
//! Standard three-part JWT layout (`header.claims.signature`, base64url, no
//! padding) signed with HMAC-SHA256 over the first two parts. Claims carry
//! the user id, email, and role plus issued-at/expiry timestamps.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::models::Role;
use crate::{ClinicError, ClinicResult};

type HmacSha256 = Hmac<Sha256>;

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Claims embedded in an issued token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Issues a signed token for a user.
///
/// # Errors
///
/// Returns `ClinicError::Serialization` if claim encoding fails (which would
/// indicate a bug rather than bad input).
pub fn issue_token(
    secret: &[u8],
    user_id: Uuid,
    email: &str,
    role: Role,
    ttl_hours: i64,
) -> ClinicResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        role,
        iat: now.timestamp(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
    };

    let header = Header {
        alg: "HS256".into(),
        typ: "JWT".into(),
    };

    let header_json = serde_json::to_vec(&header).map_err(ClinicError::Serialization)?;
    let claims_json = serde_json::to_vec(&claims).map_err(ClinicError::Serialization)?;

    let message = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );

    Ok(format!("{}.{}", message, sign(secret, &message)))
}

/// Verifies a token's signature and expiry and returns its claims.
///
/// # Errors
///
/// Returns `ClinicError::InvalidToken` for structural or signature failures
/// and `ClinicError::TokenExpired` for an expired token.
pub fn verify_token(secret: &[u8], token: &str) -> ClinicResult<Claims> {
    let mut parts = token.split('.');
    let (Some(header), Some(claims), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ClinicError::InvalidToken);
    };

    let message = format!("{header}.{claims}");
    if sign(secret, &message) != signature {
        return Err(ClinicError::InvalidToken);
    }

    let claims_json = URL_SAFE_NO_PAD
        .decode(claims)
        .map_err(|_| ClinicError::InvalidToken)?;
    let claims: Claims =
        serde_json::from_slice(&claims_json).map_err(|_| ClinicError::InvalidToken)?;

    if claims.exp < Utc::now().timestamp() {
        return Err(ClinicError::TokenExpired);
    }

    Ok(claims)
}

fn sign(secret: &[u8], message: &str) -> String {
    // HmacSha256::new_from_slice accepts any key length; unwrap is safe.
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(message.as_bytes());
    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}
