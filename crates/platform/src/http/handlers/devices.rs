//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! Device catalog CRUD.

use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use cloudshell_core::audit::record;
use cloudshell_types::audit::AuditAction;
use cloudshell_types::device::{Device, DeviceInput};

use crate::http::auth::Principal;
use crate::http::error::ApiError;
use crate::http::state::AppState;

pub async fn list_devices_handler(State(state): State<AppState>) -> Result<Json<Vec<Device>>, ApiError> {
    Ok(Json(state.devices.list().await?))
}

pub async fn get_device_handler(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Device>, ApiError> {
    Ok(Json(state.devices.get(id).await?))
}

pub async fn create_device_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<DeviceInput>,
) -> Result<(StatusCode, Json<Device>), ApiError> {
    let device = state.devices.create(input, &state.vault).await?;
    record(
        state.audit.as_ref(),
        AuditAction::DeviceCreated,
        Some(&principal.0),
        Some(device.id),
        None,
        None,
    )
    .await;
    Ok((StatusCode::CREATED, Json(device)))
}

pub async fn update_device_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(input): Json<DeviceInput>,
) -> Result<Json<Device>, ApiError> {
    let device = state.devices.update(id, input, &state.vault).await?;
    record(
        state.audit.as_ref(),
        AuditAction::DeviceUpdated,
        Some(&principal.0),
        Some(device.id),
        None,
        None,
    )
    .await;
    Ok(Json(device))
}

pub async fn delete_device_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.devices.delete(id, &state.vault).await?;
    record(state.audit.as_ref(), AuditAction::DeviceDeleted, Some(&principal.0), Some(id), None, None).await;
    Ok(StatusCode::NO_CONTENT)
}
