//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! SQLite-backed [`AdminCredentialStore`] — the single admin credential row.

use sqlx::SqlitePool;

use cloudshell_core::auth::AdminCredentialStore;
use cloudshell_core::error::AuthError;

pub struct SqliteAdminCredentialStore {
    pool: SqlitePool,
}

impl SqliteAdminCredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AdminCredentialStore for SqliteAdminCredentialStore {
    async fn get_hash(&self, username: &str) -> Result<Option<String>, AuthError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT password_hash FROM admin_credentials WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        Ok(row.map(|(hash,)| hash))
    }

    async fn set_hash(&self, username: &str, hash: &str) -> Result<(), AuthError> {
        sqlx::query(
            "INSERT INTO admin_credentials (username, password_hash) VALUES (?, ?) \
             ON CONFLICT(username) DO UPDATE SET password_hash = excluded.password_hash",
        )
        .bind(username)
        .bind(hash)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Validation(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::pool::{connect_in_memory, run_migrations};

    async fn store() -> SqliteAdminCredentialStore {
        let pool = connect_in_memory().await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteAdminCredentialStore::new(pool)
    }

    #[tokio::test]
    async fn test_no_row_returns_none() {
        let store = store().await;
        assert_eq!(store.get_hash("admin").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get_round_trip() {
        let store = store().await;
        store.set_hash("admin", "hashed-value").await.unwrap();
        assert_eq!(store.get_hash("admin").await.unwrap(), Some("hashed-value".to_string()));
    }

    #[tokio::test]
    async fn test_set_twice_upserts_rather_than_duplicates() {
        let store = store().await;
        store.set_hash("admin", "first").await.unwrap();
        store.set_hash("admin", "second").await.unwrap();
        assert_eq!(store.get_hash("admin").await.unwrap(), Some("second".to_string()));
    }
}
