//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! SQLite-backed [`AuditSink`] — the append-only mutation trail.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use cloudshell_core::audit::AuditSink;
use cloudshell_types::audit::{AuditAction, AuditEntry};

pub struct SqliteAuditSink {
    pool: SqlitePool,
}

impl SqliteAuditSink {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns every row, oldest first. Used by tests and by the audit
    /// listing surface an operator dashboard would read from.
    pub async fn list(&self) -> Result<Vec<AuditEntry>, String> {
        let rows: Vec<Row> = sqlx::query_as(
            "SELECT id, action, principal, device_id, detail, source_ip, created_at \
             FROM audit_logs ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.to_string())?;

        rows.into_iter().map(Row::into_entry).collect()
    }
}

#[derive(FromRow)]
struct Row {
    id: String,
    action: String,
    principal: Option<String>,
    device_id: Option<String>,
    detail: Option<String>,
    source_ip: Option<String>,
    created_at: String,
}

impl Row {
    fn into_entry(self) -> Result<AuditEntry, String> {
        Ok(AuditEntry {
            id: self.id.parse().map_err(|_| "malformed audit id".to_string())?,
            action: parse_action(&self.action)?,
            principal: self.principal,
            device_id: self.device_id.map(|d| d.parse()).transpose().map_err(|_| "malformed device_id".to_string())?,
            detail: self.detail,
            source_ip: self.source_ip,
            created_at: self.created_at.parse().map_err(|_| "malformed created_at".to_string())?,
        })
    }
}

fn action_str(a: AuditAction) -> &'static str {
    match a {
        AuditAction::Login => "LOGIN",
        AuditAction::LoginFailed => "LOGIN_FAILED",
        AuditAction::Logout => "LOGOUT",
        AuditAction::SessionStarted => "SESSION_STARTED",
        AuditAction::SessionEnded => "SESSION_ENDED",
        AuditAction::SftpOperation => "SFTP_OPERATION",
        AuditAction::DeviceCreated => "DEVICE_CREATED",
        AuditAction::DeviceUpdated => "DEVICE_UPDATED",
        AuditAction::DeviceDeleted => "DEVICE_DELETED",
    }
}

fn parse_action(s: &str) -> Result<AuditAction, String> {
    match s {
        "LOGIN" => Ok(AuditAction::Login),
        "LOGIN_FAILED" => Ok(AuditAction::LoginFailed),
        "LOGOUT" => Ok(AuditAction::Logout),
        "SESSION_STARTED" => Ok(AuditAction::SessionStarted),
        "SESSION_ENDED" => Ok(AuditAction::SessionEnded),
        "SFTP_OPERATION" => Ok(AuditAction::SftpOperation),
        "DEVICE_CREATED" => Ok(AuditAction::DeviceCreated),
        "DEVICE_UPDATED" => Ok(AuditAction::DeviceUpdated),
        "DEVICE_DELETED" => Ok(AuditAction::DeviceDeleted),
        other => Err(format!("unknown audit action: {other}")),
    }
}

#[async_trait::async_trait]
impl AuditSink for SqliteAuditSink {
    async fn insert(&self, entry: &AuditEntry) -> Result<(), String> {
        sqlx::query(
            "INSERT INTO audit_logs (id, action, principal, device_id, detail, source_ip, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.id.to_string())
        .bind(action_str(entry.action))
        .bind(&entry.principal)
        .bind(entry.device_id.map(|d| d.to_string()))
        .bind(&entry.detail)
        .bind(&entry.source_ip)
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, String> {
        let result = sqlx::query("DELETE FROM audit_logs WHERE created_at < ?")
            .bind(cutoff.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| e.to_string())?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::pool::{connect_in_memory, run_migrations};
    use cloudshell_core::audit;
    use chrono::Duration;
    use uuid::Uuid;

    async fn sink() -> SqliteAuditSink {
        let pool = connect_in_memory().await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteAuditSink::new(pool)
    }

    #[tokio::test]
    async fn test_record_then_list() {
        let sink = sink().await;
        audit::record(&sink, AuditAction::Login, Some("admin"), None, None, Some("127.0.0.1")).await;

        let rows = sink.list().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].action, AuditAction::Login);
        assert_eq!(rows[0].principal.as_deref(), Some("admin"));
    }

    #[tokio::test]
    async fn test_prune_keeps_recent_rows() {
        let sink = sink().await;

        let old = AuditEntry {
            id: Uuid::new_v4(),
            action: AuditAction::SessionStarted,
            principal: Some("admin".to_string()),
            device_id: None,
            detail: None,
            source_ip: None,
            created_at: Utc::now() - Duration::days(30),
        };
        sink.insert(&old).await.unwrap();
        audit::record(&sink, AuditAction::SessionEnded, Some("admin"), None, None, None).await;

        let deleted = audit::prune(&sink, 7).await;
        assert_eq!(deleted, 1);

        let remaining = sink.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].action, AuditAction::SessionEnded);
    }
}
