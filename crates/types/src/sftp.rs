//! Wire types for the SFTP operation surface (C7).

use serde::{Deserialize, Serialize};

/// One directory-listing entry.
///
/// Listings are sorted directories-first, then lexicographically by name —
/// the ordering the HTTP edge contract guarantees regardless of what order
/// the remote server returns entries in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SftpEntry {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<i64>,
    /// Octal 4-digit string (e.g. `"0755"`), or `None` when the remote
    /// server reported no permission bits.
    pub permissions: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameRequest {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MkdirRequest {
    pub path: String,
}
