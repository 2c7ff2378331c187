//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! Device repository (C2/C13) — SQLite-backed CRUD for the device catalog.
//!
//! Named an opaque external collaborator in the core spec; given a concrete
//! shape here since the gateway has nowhere else to keep host records.
//! Deletion cascades to vault file removal, matching the device-record
//! invariant that a device never outlives its on-disk key material.

use chrono::Utc;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use cloudshell_core::error::DeviceStoreError;
use cloudshell_core::vault::Vault;
use cloudshell_types::device::{AuthType, ConnectionType, Device, DeviceInput};

#[derive(Clone)]
pub struct DeviceRepository {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct Row {
    id: String,
    name: String,
    hostname: String,
    port: i64,
    username: String,
    auth_type: String,
    connection_type: String,
    encrypted_password: Option<String>,
    key_handle: Option<String>,
    created_at: String,
    updated_at: String,
}

impl Row {
    fn into_device(self) -> Result<Device, DeviceStoreError> {
        Ok(Device {
            id: Uuid::parse_str(&self.id).map_err(|e| DeviceStoreError::Database(e.to_string()))?,
            name: self.name,
            hostname: self.hostname,
            port: self.port as u16,
            username: self.username,
            auth_type: parse_auth_type(&self.auth_type)?,
            connection_type: parse_connection_type(&self.connection_type)?,
            encrypted_password: self.encrypted_password,
            key_handle: self.key_handle,
            created_at: self
                .created_at
                .parse()
                .map_err(|_| DeviceStoreError::Database("malformed created_at".to_string()))?,
            updated_at: self
                .updated_at
                .parse()
                .map_err(|_| DeviceStoreError::Database("malformed updated_at".to_string()))?,
        })
    }
}

fn parse_auth_type(s: &str) -> Result<AuthType, DeviceStoreError> {
    match s {
        "password" => Ok(AuthType::Password),
        "key" => Ok(AuthType::Key),
        other => Err(DeviceStoreError::Database(format!("unknown auth_type: {other}"))),
    }
}

fn auth_type_str(a: AuthType) -> &'static str {
    match a {
        AuthType::Password => "password",
        AuthType::Key => "key",
    }
}

fn parse_connection_type(s: &str) -> Result<ConnectionType, DeviceStoreError> {
    match s {
        "shell" => Ok(ConnectionType::Shell),
        "sftp" => Ok(ConnectionType::Sftp),
        other => Err(DeviceStoreError::Database(format!("unknown connection_type: {other}"))),
    }
}

fn connection_type_str(c: ConnectionType) -> &'static str {
    match c {
        ConnectionType::Shell => "shell",
        ConnectionType::Sftp => "sftp",
    }
}

const SELECT_COLUMNS: &str = "id, name, hostname, port, username, auth_type, connection_type, \
    encrypted_password, key_handle, created_at, updated_at";

impl DeviceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Device>, DeviceStoreError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM devices ORDER BY name ASC");
        let rows: Vec<Row> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DeviceStoreError::Database(e.to_string()))?;

        rows.into_iter().map(Row::into_device).collect()
    }

    pub async fn get(&self, id: Uuid) -> Result<Device, DeviceStoreError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM devices WHERE id = ?");
        let row: Option<Row> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DeviceStoreError::Database(e.to_string()))?;

        row.ok_or_else(|| DeviceStoreError::NotFound(id.to_string()))?.into_device()
    }

    /// Creates a device record. `vault` encrypts the plaintext password when
    /// `auth_type` is `Password`; key-auth devices must already carry a
    /// vault-created `key_handle` attached by the keys endpoint beforehand —
    /// this layer only persists the catalog row.
    pub async fn create(&self, input: DeviceInput, vault: &Vault) -> Result<Device, DeviceStoreError> {
        let encrypted_password = match input.auth_type {
            AuthType::Password => {
                let plaintext = input
                    .password
                    .as_deref()
                    .ok_or_else(|| DeviceStoreError::Database("password required for password auth".to_string()))?;
                Some(
                    vault
                        .encrypt(plaintext)
                        .map_err(|e| DeviceStoreError::Database(e.to_string()))?,
                )
            }
            AuthType::Key => None,
        };

        let id = Uuid::new_v4();
        let now_str = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO devices \
               (id, name, hostname, port, username, auth_type, connection_type, \
                encrypted_password, key_handle, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?)",
        )
        .bind(id.to_string())
        .bind(&input.name)
        .bind(&input.hostname)
        .bind(input.port as i64)
        .bind(&input.username)
        .bind(auth_type_str(input.auth_type))
        .bind(connection_type_str(input.connection_type))
        .bind(&encrypted_password)
        .bind(&now_str)
        .bind(&now_str)
        .execute(&self.pool)
        .await
        .map_err(|e| DeviceStoreError::Database(e.to_string()))?;

        self.get(id).await
    }

    pub async fn update(&self, id: Uuid, input: DeviceInput, vault: &Vault) -> Result<Device, DeviceStoreError> {
        let existing = self.get(id).await?;

        let encrypted_password = match input.auth_type {
            AuthType::Password => match &input.password {
                Some(plaintext) => Some(
                    vault
                        .encrypt(plaintext)
                        .map_err(|e| DeviceStoreError::Database(e.to_string()))?,
                ),
                None => existing.encrypted_password,
            },
            AuthType::Key => None,
        };

        let now_str = Utc::now().to_rfc3339();

        sqlx::query(
            "UPDATE devices SET name = ?, hostname = ?, port = ?, username = ?, \
               auth_type = ?, connection_type = ?, encrypted_password = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(&input.name)
        .bind(&input.hostname)
        .bind(input.port as i64)
        .bind(&input.username)
        .bind(auth_type_str(input.auth_type))
        .bind(connection_type_str(input.connection_type))
        .bind(&encrypted_password)
        .bind(&now_str)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| DeviceStoreError::Database(e.to_string()))?;

        self.get(id).await
    }

    /// Deletes the catalog row, then best-effort removes the device's vault
    /// key file, if it had one. The row deletion is authoritative; a failure
    /// to remove the key file is logged, not propagated.
    pub async fn delete(&self, id: Uuid, vault: &Vault) -> Result<(), DeviceStoreError> {
        let existing = self.get(id).await?;

        sqlx::query("DELETE FROM devices WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DeviceStoreError::Database(e.to_string()))?;

        if let Some(handle) = existing.key_handle {
            if let Err(e) = vault.delete_key(&handle) {
                tracing::warn!(error = %e, device_id = %id, "failed to remove vault key file on device delete");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::pool::{connect_in_memory, run_migrations};

    fn vault() -> Vault {
        Vault::new("device-repo-test-secret")
    }

    fn input(name: &str) -> DeviceInput {
        DeviceInput {
            name: name.to_string(),
            hostname: "10.0.0.5".to_string(),
            port: 22,
            username: "deploy".to_string(),
            auth_type: AuthType::Password,
            connection_type: ConnectionType::Shell,
            password: Some("hunter2".to_string()),
        }
    }

    async fn repo() -> DeviceRepository {
        let pool = connect_in_memory().await.unwrap();
        run_migrations(&pool).await.unwrap();
        DeviceRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let repo = repo().await;
        let v = vault();
        let created = repo.create(input("build-box"), &v).await.unwrap();

        let fetched = repo.get(created.id).await.unwrap();
        assert_eq!(fetched.name, "build-box");
        assert_eq!(v.decrypt(fetched.encrypted_password.as_deref().unwrap()).unwrap(), "hunter2");
    }

    #[tokio::test]
    async fn test_list_orders_by_name() {
        let repo = repo().await;
        let v = vault();
        repo.create(input("zebra"), &v).await.unwrap();
        repo.create(input("alpha"), &v).await.unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["alpha", "zebra"]);
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let repo = repo().await;
        let v = vault();
        let created = repo.create(input("gone-soon"), &v).await.unwrap();

        repo.delete(created.id, &v).await.unwrap();
        assert!(matches!(repo.get(created.id).await, Err(DeviceStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let repo = repo().await;
        assert!(matches!(repo.get(Uuid::new_v4()).await, Err(DeviceStoreError::NotFound(_))));
    }
}
