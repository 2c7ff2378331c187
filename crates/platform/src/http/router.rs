//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! Axum router composition for the CloudShell gateway HTTP layer.
//!
//! Routes:
//!   POST   /api/auth/token                    — issue a bearer token (public)
//!   POST   /api/auth/refresh                  — refresh a bearer token (public)
//!   POST   /api/auth/logout                   — revoke a bearer token (public)
//!   GET    /api/auth/me                       — current principal
//!   POST   /api/auth/change-password          — change the admin password
//!   GET    /api/health                        — health check (public)
//!   GET    /api/devices                       — list devices
//!   POST   /api/devices                       — create a device
//!   GET    /api/devices/:id                   — get a device
//!   PUT    /api/devices/:id                   — update a device
//!   DELETE /api/devices/:id                   — delete a device
//!   POST   /api/keys/generate                 — generate an SSH keypair
//!   POST   /api/terminal/session/:device_id   — open a shell session
//!   GET    /api/terminal/ws/:session_id        — the terminal's WebSocket bridge
//!   POST   /api/sftp/session/:id              — open an SFTP session (id is a device id)
//!   DELETE /api/sftp/session/:id              — close an SFTP session (id is a session id)
//!   GET    /api/sftp/:sid/list                — list a directory
//!   GET    /api/sftp/:sid/download             — download a file
//!   POST   /api/sftp/:sid/upload               — upload a file
//!   POST   /api/sftp/:sid/delete               — delete a file or directory
//!   POST   /api/sftp/:sid/rename               — rename a file or directory
//!   POST   /api/sftp/:sid/mkdir                — create a directory
//!   POST   /api/audit/prune                    — prune old audit rows
//!
//! All endpoints require bearer auth except `/api/auth/{token,refresh,logout}`
//! and `/api/health` — the login endpoints obviously can't require the token
//! they're about to issue, and health needs to answer before a caller has one.

use axum::http::{header, Method};
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::auth::auth_middleware;
use super::error::fallback_handler;
use super::handlers::{audit, auth as auth_handlers, devices, health, keys, sftp, terminal};
use super::state::AppState;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.is_empty() {
        layer
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(parsed)
    }
}

/// Routes that never require a bearer token.
fn public_router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health::health_handler))
        .route("/api/auth/token", post(auth_handlers::login_handler))
        .route("/api/auth/refresh", post(auth_handlers::refresh_handler))
        .route("/api/auth/logout", post(auth_handlers::logout_handler))
        .route("/api/terminal/ws/:session_id", get(terminal::terminal_ws_handler))
}

/// Routes gated behind [`auth_middleware`].
fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(auth_handlers::me_handler))
        .route("/api/auth/change-password", post(auth_handlers::change_password_handler))
        .route(
            "/api/devices",
            get(devices::list_devices_handler).post(devices::create_device_handler),
        )
        .route(
            "/api/devices/:id",
            get(devices::get_device_handler)
                .put(devices::update_device_handler)
                .delete(devices::delete_device_handler),
        )
        .route("/api/keys/generate", post(keys::generate_keypair_handler))
        .route("/api/terminal/session/:device_id", post(terminal::open_terminal_session_handler))
        .route(
            "/api/sftp/session/:id",
            post(sftp::open_sftp_session_handler).delete(sftp::close_sftp_session_handler),
        )
        .route("/api/sftp/:sid/list", get(sftp::list_handler))
        .route("/api/sftp/:sid/download", get(sftp::download_handler))
        .route("/api/sftp/:sid/upload", post(sftp::upload_handler))
        .route("/api/sftp/:sid/delete", post(sftp::delete_handler))
        .route("/api/sftp/:sid/rename", post(sftp::rename_handler))
        .route("/api/sftp/:sid/mkdir", post(sftp::mkdir_handler))
        .route("/api/audit/prune", post(audit::prune_audit_handler))
}

/// Composes the full router for the gateway service.
///
/// The terminal WebSocket upgrade (`/api/terminal/ws/:session_id`) is public
/// at the router level because the browser's upgrade handshake can't carry
/// an `Authorization` header; it authenticates the connection itself via a
/// `?token=` query parameter instead.
pub fn create_router(state: AppState) -> Router {
    let protected = protected_router().layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let app = public_router().merge(protected).fallback(fallback_handler).with_state(state.clone());

    app.layer(cors_layer(&state.config.cors_origins)).layer(TraceLayer::new_for_http())
}
