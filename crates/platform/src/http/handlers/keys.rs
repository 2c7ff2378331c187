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

use crate::http::error::ApiError;
use crate::http::state::AppState;

#[derive(Serialize)]
pub struct KeypairResponse {
    private_key: String,
    public_key: String,
}

/// POST /api/keys/generate — a fresh RSA-4096 keypair for a device's
/// `key_handle` to be populated from, via the caller's next device write.
pub async fn generate_keypair_handler(State(state): State<AppState>) -> Result<Json<KeypairResponse>, ApiError> {
    let (private_key, public_key) = state.vault.generate_keypair()?;
    Ok(Json(KeypairResponse { private_key, public_key }))
}
