//! Wire types for the audit log (C9).

use serde::{Deserialize, Serialize};

use crate::{DateTime, Utc, Uuid};

/// The set of events the audit log records.
///
/// Variants are deliberately coarse — the audit log is a best-effort trail
/// for operators, not a replayable event sourcing log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Login,
    LoginFailed,
    Logout,
    SessionStarted,
    SessionEnded,
    SftpOperation,
    DeviceCreated,
    DeviceUpdated,
    DeviceDeleted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub action: AuditAction,
    pub principal: Option<String>,
    pub device_id: Option<Uuid>,
    pub detail: Option<String>,
    pub source_ip: Option<String>,
    pub created_at: DateTime<Utc>,
}
