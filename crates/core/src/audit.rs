//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! Audit log (C9) — best-effort mutation trail.
//!
//! A write failure here is logged and swallowed; losing an audit row is
//! preferable to breaking the operation it describes.

use chrono::Utc;
use uuid::Uuid;

use cloudshell_types::audit::{AuditAction, AuditEntry};

const MAX_IP_LEN: usize = 45;

/// Persistent sink for audit rows. Implemented against SQLite in the
/// platform crate; kept behind a trait so this crate has no database
/// dependency.
#[async_trait::async_trait]
pub trait AuditSink: Send + Sync {
    async fn insert(&self, entry: &AuditEntry) -> Result<(), String>;
    async fn prune_older_than(&self, cutoff: chrono::DateTime<Utc>) -> Result<u64, String>;
}

/// Records one audit row. Never propagates failure — logs a warning and
/// returns.
pub async fn record(
    sink: &dyn AuditSink,
    action: AuditAction,
    principal: Option<&str>,
    device_id: Option<Uuid>,
    detail: Option<&str>,
    source_ip: Option<&str>,
) {
    let entry = AuditEntry {
        id: Uuid::new_v4(),
        action,
        principal: principal.map(str::to_string),
        device_id,
        detail: detail.map(str::to_string),
        source_ip: source_ip.map(|ip| truncate_ip(ip).to_string()),
        created_at: Utc::now(),
    };

    if let Err(e) = sink.insert(&entry).await {
        tracing::warn!(error = %e, action = ?entry.action, "failed to write audit entry");
    }
}

/// Deletes rows older than `retention_days`, returning the count removed.
pub async fn prune(sink: &dyn AuditSink, retention_days: i64) -> u64 {
    let cutoff = Utc::now() - chrono::Duration::days(retention_days);
    match sink.prune_older_than(cutoff).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(error = %e, "failed to prune audit log");
            0
        }
    }
}

fn truncate_ip(ip: &str) -> &str {
    if ip.len() <= MAX_IP_LEN {
        ip
    } else {
        &ip[..MAX_IP_LEN]
    }
}

/// Extracts the client IP from request headers, in order: leftmost
/// `X-Forwarded-For` entry, full `X-Real-IP`, direct peer address.
pub fn extract_ip(forwarded_for: Option<&str>, real_ip: Option<&str>, peer_addr: &str) -> String {
    let candidate = forwarded_for
        .and_then(|h| h.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| real_ip.map(str::trim).filter(|s| !s.is_empty()))
        .unwrap_or(peer_addr);
    truncate_ip(candidate).to_string()
}
