//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! SQLite-backed [`RevocationStore`] — the `jti` deny-list.

use sqlx::SqlitePool;

use cloudshell_core::auth::RevocationStore;
use cloudshell_core::error::AuthError;

pub struct SqliteRevocationStore {
    pool: SqlitePool,
}

impl SqliteRevocationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RevocationStore for SqliteRevocationStore {
    async fn is_revoked(&self, jti: &str) -> Result<bool, AuthError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT jti FROM revoked_tokens WHERE jti = ?")
            .bind(jti)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        Ok(row.is_some())
    }

    async fn revoke(&self, jti: &str, expires_at: i64) -> Result<(), AuthError> {
        sqlx::query("INSERT OR IGNORE INTO revoked_tokens (jti, expires_at) VALUES (?, ?)")
            .bind(jti)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        Ok(())
    }

    async fn prune_expired(&self, now: i64) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        Ok(result.rows_affected())
    }
}
