//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! SFTP operation surface (C7) — per-session file operations over an
//! already-open SFTP channel.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

use cloudshell_types::sftp::SftpEntry;

use crate::error::{RegistryError, SftpError};
use crate::registry::SessionRegistry;

fn map_registry_err(session_id: Uuid, err: RegistryError) -> SftpError {
    match err {
        RegistryError::NotFound(_) => SftpError::NotFound(session_id.to_string()),
        other => SftpError::OperationFailed(other.to_string()),
    }
}

/// Joins a directory path and a file name without producing a double slash.
fn join_path(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Lists `path`, stripping `.`/`..` and sorting directories before files,
/// then case-insensitively by name.
pub async fn list(registry: &SessionRegistry, session_id: Uuid, path: &str) -> Result<Vec<SftpEntry>, SftpError> {
    let handle = registry.sftp(session_id).await.map_err(|e| map_registry_err(session_id, e))?;
    let client = handle.client();

    let raw = client
        .read_dir(path)
        .await
        .map_err(|e| SftpError::OperationFailed(e.to_string()))?;

    let mut entries: Vec<SftpEntry> = raw
        .into_iter()
        .filter(|e| e.file_name() != "." && e.file_name() != "..")
        .map(|e| {
            let name = e.file_name();
            let attrs = e.metadata();
            SftpEntry {
                path: join_path(path, &name),
                name,
                is_dir: attrs.is_dir(),
                size: attrs.size.unwrap_or(0),
                modified: attrs.mtime.map(i64::from),
                permissions: attrs.permissions.map(|p| format!("{:04o}", p & 0o7777)),
            }
        })
        .collect();

    entries.sort_by(|a, b| match (a.is_dir, b.is_dir) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });

    Ok(entries)
}

/// Reads the whole file at `path` into memory.
pub async fn read(registry: &SessionRegistry, session_id: Uuid, path: &str) -> Result<Vec<u8>, SftpError> {
    let handle = registry.sftp(session_id).await.map_err(|e| map_registry_err(session_id, e))?;
    let client = handle.client();

    let mut file = client
        .open(path)
        .await
        .map_err(|e| SftpError::OperationFailed(e.to_string()))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)
        .await
        .map_err(|e| SftpError::OperationFailed(e.to_string()))?;
    Ok(buf)
}

/// Overwrites (or creates) the file at `path` with `content`.
pub async fn write(registry: &SessionRegistry, session_id: Uuid, path: &str, content: &[u8]) -> Result<(), SftpError> {
    let handle = registry.sftp(session_id).await.map_err(|e| map_registry_err(session_id, e))?;
    let client = handle.client();

    let mut file = client
        .create(path)
        .await
        .map_err(|e| SftpError::OperationFailed(e.to_string()))?;
    file.write_all(content)
        .await
        .map_err(|e| SftpError::OperationFailed(e.to_string()))
}

/// Removes `path`: `rmdir` if `is_dir`, `unlink` otherwise. Never recursive.
pub async fn delete(registry: &SessionRegistry, session_id: Uuid, path: &str, is_dir: bool) -> Result<(), SftpError> {
    let handle = registry.sftp(session_id).await.map_err(|e| map_registry_err(session_id, e))?;
    let client = handle.client();

    let result = if is_dir {
        client.remove_dir(path).await
    } else {
        client.remove_file(path).await
    };
    result.map_err(|e| SftpError::OperationFailed(e.to_string()))
}

/// Renames `from` to `to`.
pub async fn rename(registry: &SessionRegistry, session_id: Uuid, from: &str, to: &str) -> Result<(), SftpError> {
    let handle = registry.sftp(session_id).await.map_err(|e| map_registry_err(session_id, e))?;
    handle
        .client()
        .rename(from, to)
        .await
        .map_err(|e| SftpError::OperationFailed(e.to_string()))
}

/// Creates directory `path`. The parent must already exist — no `-p`
/// behavior.
pub async fn mkdir(registry: &SessionRegistry, session_id: Uuid, path: &str) -> Result<(), SftpError> {
    let handle = registry.sftp(session_id).await.map_err(|e| map_registry_err(session_id, e))?;
    handle
        .client()
        .create_dir(path)
        .await
        .map_err(|e| SftpError::OperationFailed(e.to_string()))
}
