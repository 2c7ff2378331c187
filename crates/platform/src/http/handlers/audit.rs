//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

use cloudshell_core::audit::prune;

use crate::http::state::AppState;

#[derive(Serialize)]
pub struct PruneResponse {
    deleted: u64,
    retention_days: i64,
}

/// POST /api/audit/prune — deletes audit rows older than the configured
/// retention window.
pub async fn prune_audit_handler(State(state): State<AppState>) -> Json<PruneResponse> {
    let retention_days = state.config.audit_retention_days;
    let deleted = prune(state.audit.as_ref(), retention_days).await;
    Json(PruneResponse { deleted, retention_days })
}
