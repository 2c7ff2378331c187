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

use crate::http::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: String,
    uptime_seconds: u64,
}

/// GET /api/health — public, no auth required.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}
