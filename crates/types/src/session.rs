//! In-memory session descriptors tracked by the session registry.

use serde::{Deserialize, Serialize};

use crate::{DateTime, Utc, Uuid};

/// Which back-end protocol a session is bridging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Shell,
    Sftp,
}

/// A registry entry describing one open session.
///
/// The registry itself holds the live SSH/SFTP handles (not serializable);
/// this is the subset of a session's state that crosses the HTTP/WS edge or
/// goes into an audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub device_id: Uuid,
    pub kind: SessionKind,
    pub principal: String,
    pub opened_at: DateTime<Utc>,
}
