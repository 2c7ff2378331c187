//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! Auth & token store (C8) — JWT issuance/validation and admin credential
//! verification.
//!
//! The token store itself (revocation rows, admin credential row) is kept
//! behind traits so this crate stays free of a database dependency; the
//! platform crate supplies SQLite-backed implementations.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use cloudshell_types::auth::{LoginResponse, TokenClaims};

use crate::error::AuthError;
use crate::secret::Secret;

const MIN_PASSWORD_LEN: usize = 8;

/// Persistent store for revoked token ids, backing §4.7's refresh/logout
/// semantics.
#[async_trait::async_trait]
pub trait RevocationStore: Send + Sync {
    async fn is_revoked(&self, jti: &str) -> Result<bool, AuthError>;
    /// Inserts `jti` with the given expiry; duplicate inserts for the same
    /// `jti` must not create duplicate rows.
    async fn revoke(&self, jti: &str, expires_at: i64) -> Result<(), AuthError>;
    /// Deletes rows whose `expires_at` has passed. Best-effort — callers
    /// ignore failures here rather than let pruning break the hot path.
    async fn prune_expired(&self, now: i64) -> Result<u64, AuthError>;
}

/// Persistent store for the single admin credential row.
#[async_trait::async_trait]
pub trait AdminCredentialStore: Send + Sync {
    async fn get_hash(&self, username: &str) -> Result<Option<String>, AuthError>;
    async fn set_hash(&self, username: &str, hash: &str) -> Result<(), AuthError>;
}

/// Issues and validates bearer tokens for one server process's lifetime.
///
/// `boot_id` is generated fresh each time the process starts: pinning every
/// issued token to it means a restart invalidates all outstanding sessions
/// even before their `exp` elapses.
pub struct TokenService {
    secret: Secret<String>,
    boot_id: String,
    ttl: Duration,
    default_username: String,
    default_password: Secret<String>,
}

impl TokenService {
    pub fn new(secret: String, ttl_hours: i64, default_username: String, default_password: String) -> Self {
        Self {
            secret: Secret::new(secret),
            boot_id: uuid::Uuid::new_v4().to_string(),
            ttl: Duration::hours(ttl_hours),
            default_username,
            default_password: Secret::new(default_password),
        }
    }

    /// Verifies `username`/`password` against the admin credential store,
    /// falling back to the configured default only when no row exists yet.
    pub async fn verify_credentials(
        &self,
        store: &dyn AdminCredentialStore,
        username: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        match store.get_hash(username).await? {
            Some(hash) => {
                if bcrypt::verify(password, &hash).unwrap_or(false) {
                    Ok(())
                } else {
                    Err(AuthError::BadCredentials)
                }
            }
            None => {
                if username == self.default_username && constant_time_eq(password.as_bytes(), self.default_password.expose_secret().as_bytes())
                {
                    Ok(())
                } else {
                    Err(AuthError::BadCredentials)
                }
            }
        }
    }

    /// Issues a fresh token for `principal`.
    pub fn issue(&self, principal: &str) -> Result<LoginResponse, AuthError> {
        let expires_at = Utc::now() + self.ttl;
        let claims = TokenClaims {
            sub: principal.to_string(),
            exp: expires_at.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            bid: self.boot_id.clone(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(|e| AuthError::Validation(e.to_string()))?;

        Ok(LoginResponse {
            access_token: token,
            token_type: "bearer",
            expires_at,
        })
    }

    /// Decodes and fully validates a bearer token: signature, expiry,
    /// required claims, boot id, and revocation. Returns the principal.
    pub async fn validate(&self, revocation: &dyn RevocationStore, token: &str) -> Result<String, AuthError> {
        let claims = self.decode_claims(token)?;

        if claims.sub.is_empty() || claims.jti.is_empty() {
            return Err(AuthError::TokenInvalid);
        }
        if claims.bid != self.boot_id {
            return Err(AuthError::TokenBootMismatch);
        }
        if revocation.is_revoked(&claims.jti).await? {
            return Err(AuthError::TokenRevoked);
        }

        Ok(claims.sub)
    }

    /// Exchanges a still-valid token for a fresh one, revoking the old
    /// `jti` with its original expiry.
    pub async fn refresh(&self, revocation: &dyn RevocationStore, token: &str) -> Result<LoginResponse, AuthError> {
        let claims = self.decode_claims(token)?;
        if claims.bid != self.boot_id {
            return Err(AuthError::TokenBootMismatch);
        }
        if revocation.is_revoked(&claims.jti).await? {
            return Err(AuthError::TokenRevoked);
        }

        revocation.revoke(&claims.jti, claims.exp).await?;
        let _ = revocation.prune_expired(Utc::now().timestamp()).await;

        self.issue(&claims.sub)
    }

    /// Revokes the token's `jti`. An invalid/unparseable token is accepted
    /// silently — logout is always a success from the caller's view.
    pub async fn logout(&self, revocation: &dyn RevocationStore, token: &str) {
        let Ok(claims) = self.decode_claims(token) else {
            return;
        };
        let expires_at = if claims.exp > 0 { claims.exp } else { Utc::now().timestamp() };
        let _ = revocation.revoke(&claims.jti, expires_at).await;
    }

    /// Changes the admin password after re-verifying the current one.
    pub async fn change_password(
        &self,
        store: &dyn AdminCredentialStore,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        self.verify_credentials(store, username, current_password).await?;

        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let hash = bcrypt::hash(new_password, bcrypt::DEFAULT_COST).map_err(|e| AuthError::Validation(e.to_string()))?;
        store.set_hash(username, &hash).await
    }

    /// Returns the expiry of an already-validated token. Callers are
    /// expected to have gone through [`TokenService::validate`] first; this
    /// only re-decodes the claims to read `exp`.
    pub fn expiry_of(&self, token: &str) -> Result<DateTime<Utc>, AuthError> {
        let claims = self.decode_claims(token)?;
        DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::TokenInvalid)
    }

    fn decode_claims(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| AuthError::TokenInvalid)
    }
}

/// Byte-for-byte constant-time comparison, used only for the bootstrap
/// default-password path (once a hash row exists, bcrypt's own comparison
/// is used instead).
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
