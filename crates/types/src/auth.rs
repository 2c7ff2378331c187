//! Wire types for the auth & token store (C8).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JWT claims issued on login and validated on every authenticated request.
///
/// `bid` pins the token to the server boot that issued it: a process
/// restart invalidates every previously issued token even if its `exp`
/// has not elapsed yet, since the boot id is regenerated on every start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject — the authenticated principal (administrator username).
    pub sub: String,
    /// Expiry, Unix seconds.
    pub exp: i64,
    /// Unique token id, used as the revocation-list key.
    pub jti: String,
    /// Boot id of the server process that issued this token.
    pub bid: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}
