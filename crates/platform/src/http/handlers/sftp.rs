//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! SFTP session lifecycle and per-session file operations.

use axum::extract::{Extension, Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cloudshell_core::audit::{extract_ip, record};
use cloudshell_core::credential::materialize;
use cloudshell_core::error::SftpError;
use cloudshell_core::sftp;
use cloudshell_types::audit::AuditAction;
use cloudshell_types::sftp::{MkdirRequest, RenameRequest, SftpEntry};

use crate::http::auth::Principal;
use crate::http::error::ApiError;
use crate::http::state::AppState;

fn request_ip(headers: &HeaderMap) -> String {
    let forwarded_for = headers.get("x-forwarded-for").and_then(|h| h.to_str().ok());
    let real_ip = headers.get("x-real-ip").and_then(|h| h.to_str().ok());
    extract_ip(forwarded_for, real_ip, "unknown")
}

#[derive(Serialize)]
pub struct SessionResponse {
    session_id: Uuid,
}

/// POST /api/sftp/session/{device_id}.
pub async fn open_sftp_session_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(device_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, ApiError> {
    let device = state.devices.get(device_id).await?;
    let ip = request_ip(&headers);

    let tmp_dir = state.config.data_dir.join("tmp");
    let credential = materialize(&device, &state.vault, &tmp_dir)?;

    let result = state
        .registry
        .open_sftp(&device.name, &device.hostname, device.port, &device.username, &credential, &principal.0, &ip)
        .await;
    credential.cleanup();
    let session_id = result?;

    record(
        state.audit.as_ref(),
        AuditAction::SessionStarted,
        Some(&principal.0),
        Some(device_id),
        Some("sftp"),
        Some(&ip),
    )
    .await;

    Ok(Json(SessionResponse { session_id }))
}

/// DELETE /api/sftp/session/{session_id}.
pub async fn close_sftp_session_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(session_id): Path<Uuid>,
) -> StatusCode {
    let meta = state.registry.meta(session_id).await;
    state.registry.close(session_id).await;

    if !meta.principal.is_empty() {
        record(
            state.audit.as_ref(),
            AuditAction::SessionEnded,
            Some(&principal.0),
            None,
            Some(&meta.device_label),
            Some(&meta.source_ip),
        )
        .await;
    }
    StatusCode::NO_CONTENT
}

#[derive(Deserialize)]
pub struct PathQuery {
    path: String,
}

#[derive(Serialize)]
pub struct ListResponse {
    path: String,
    entries: Vec<SftpEntry>,
}

/// GET /api/sftp/{sid}/list?path=.
pub async fn list_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<PathQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let entries = sftp::list(&state.registry, session_id, &query.path).await?;
    Ok(Json(ListResponse { path: query.path, entries }))
}

/// GET /api/sftp/{sid}/download?path=.
pub async fn download_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<PathQuery>,
) -> Result<Response, ApiError> {
    let content = sftp::read(&state.registry, session_id, &query.path).await?;
    let filename = query.path.rsplit('/').next().unwrap_or(&query.path).to_string();

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        content,
    )
        .into_response())
}

#[derive(Serialize)]
pub struct UploadResponse {
    uploaded: String,
    size: usize,
}

/// POST /api/sftp/{sid}/upload?path=.
///
/// `path` names the destination directory; the uploaded file keeps the
/// name the client's multipart field reported.
pub async fn upload_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<PathQuery>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut field = multipart
        .next_field()
        .await
        .map_err(|e| SftpError::OperationFailed(e.to_string()))?
        .ok_or_else(|| SftpError::OperationFailed("missing file field".to_string()))?;

    let name = field.file_name().unwrap_or("upload").to_string();
    let mut content = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(|e| SftpError::OperationFailed(e.to_string()))? {
        content.extend_from_slice(&chunk);
    }

    let dest = if query.path.ends_with('/') {
        format!("{}{}", query.path, name)
    } else {
        format!("{}/{}", query.path, name)
    };

    sftp::write(&state.registry, session_id, &dest, &content).await?;
    Ok(Json(UploadResponse {
        uploaded: dest,
        size: content.len(),
    }))
}

#[derive(Deserialize)]
pub struct DeleteRequest {
    path: String,
    #[serde(default)]
    is_dir: bool,
}

/// POST /api/sftp/{sid}/delete.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<DeleteRequest>,
) -> Result<StatusCode, ApiError> {
    sftp::delete(&state.registry, session_id, &req.path, req.is_dir).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/sftp/{sid}/rename.
pub async fn rename_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<RenameRequest>,
) -> Result<StatusCode, ApiError> {
    sftp::rename(&state.registry, session_id, &req.from, &req.to).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/sftp/{sid}/mkdir.
pub async fn mkdir_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<MkdirRequest>,
) -> Result<StatusCode, ApiError> {
    sftp::mkdir(&state.registry, session_id, &req.path).await?;
    Ok(StatusCode::NO_CONTENT)
}
