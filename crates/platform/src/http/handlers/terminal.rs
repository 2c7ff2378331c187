//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! Terminal session open and the WebSocket bridge that streams it.

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Extension, Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cloudshell_core::audit::{extract_ip, record};
use cloudshell_core::bridge::{self, ClientChannel};
use cloudshell_core::credential::materialize;
use cloudshell_types::audit::AuditAction;

use crate::http::auth::{validate_query_token, Principal};
use crate::http::error::ApiError;
use crate::http::state::AppState;

#[derive(Serialize)]
pub struct SessionResponse {
    session_id: Uuid,
}

fn request_ip(headers: &HeaderMap) -> String {
    let forwarded_for = headers.get("x-forwarded-for").and_then(|h| h.to_str().ok());
    let real_ip = headers.get("x-real-ip").and_then(|h| h.to_str().ok());
    extract_ip(forwarded_for, real_ip, "unknown")
}

/// POST /api/terminal/session/{device_id}.
pub async fn open_terminal_session_handler(
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
        .open_shell(&device.name, &device.hostname, device.port, &device.username, &credential, &principal.0, &ip)
        .await;
    credential.cleanup();
    let session_id = result?;

    record(
        state.audit.as_ref(),
        AuditAction::SessionStarted,
        Some(&principal.0),
        Some(device_id),
        Some("shell"),
        Some(&ip),
    )
    .await;

    Ok(Json(SessionResponse { session_id }))
}

#[derive(Deserialize)]
pub struct WsTokenQuery {
    token: Option<String>,
}

/// WS /api/terminal/ws/{session_id}?token=….
pub async fn terminal_ws_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<WsTokenQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    match validate_query_token(&state, query.token.as_deref()).await {
        Ok(_principal) => ws.on_upgrade(move |socket| run_bridge(state, session_id, socket)),
        Err(_) => ws.on_upgrade(|socket| async move {
            let mut channel = AxumClientChannel::new(socket);
            channel.close(bridge::close_code::BAD_TOKEN).await;
        }),
    }
    .into_response()
}

async fn run_bridge(state: AppState, session_id: Uuid, socket: WebSocket) {
    let mut channel = AxumClientChannel::new(socket);
    bridge::run(&state.registry, session_id, &mut channel).await;

    let meta = state.registry.meta(session_id).await;
    state.registry.close(session_id).await;

    if !meta.principal.is_empty() {
        record(
            state.audit.as_ref(),
            AuditAction::SessionEnded,
            Some(&meta.principal),
            None,
            Some(&meta.device_label),
            Some(&meta.source_ip),
        )
        .await;
    }
}

/// Adapts an axum [`WebSocket`] to the bridge's transport-agnostic
/// [`ClientChannel`].
struct AxumClientChannel {
    socket: WebSocket,
}

impl AxumClientChannel {
    fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

#[async_trait::async_trait]
impl ClientChannel for AxumClientChannel {
    async fn recv(&mut self) -> Option<Vec<u8>> {
        loop {
            match self.socket.recv().await {
                Some(Ok(Message::Binary(data))) => return Some(data),
                Some(Ok(Message::Text(text))) => return Some(text.into_bytes()),
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return None,
            }
        }
    }

    async fn send(&mut self, frame: Vec<u8>) -> Result<(), String> {
        self.socket.send(Message::Binary(frame)).await.map_err(|e| e.to_string())
    }

    async fn close(&mut self, code: u16) {
        let _ = self
            .socket
            .send(Message::Close(Some(CloseFrame {
                code,
                reason: std::borrow::Cow::Borrowed(""),
            })))
            .await;
    }
}
