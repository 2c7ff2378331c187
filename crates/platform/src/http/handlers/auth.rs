//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! Auth endpoints: token issuance, refresh, logout, current-principal, and
//! password change.

use axum::extract::{Extension, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::Form;
use chrono::{DateTime, Utc};
use serde::Serialize;

use cloudshell_core::audit::{extract_ip, record};
use cloudshell_core::error::AuthError;
use cloudshell_types::audit::AuditAction;
use cloudshell_types::auth::{ChangePasswordRequest, LoginRequest};

use crate::http::auth::Principal;
use crate::http::error::ApiError;
use crate::http::state::AppState;

#[derive(Serialize)]
pub struct TokenResponse {
    access_token: String,
    token_type: &'static str,
    expires_at: DateTime<Utc>,
}

fn request_ip(headers: &HeaderMap) -> String {
    let forwarded_for = headers.get("x-forwarded-for").and_then(|h| h.to_str().ok());
    let real_ip = headers.get("x-real-ip").and_then(|h| h.to_str().ok());
    extract_ip(forwarded_for, real_ip, "unknown")
}

/// POST /api/auth/token — exchanges admin credentials for a bearer token.
///
/// A LOGIN audit row is written only after credential verification
/// succeeds; a failed attempt writes nothing.
pub async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    state
        .tokens
        .verify_credentials(state.admin_credentials.as_ref(), &form.username, &form.password)
        .await?;

    let login = state.tokens.issue(&form.username)?;
    let ip = request_ip(&headers);
    record(state.audit.as_ref(), AuditAction::Login, Some(&form.username), None, None, Some(&ip)).await;

    Ok(Json(TokenResponse {
        access_token: login.access_token,
        token_type: login.token_type,
        expires_at: login.expires_at,
    }))
}

/// POST /api/auth/refresh — exchanges a still-valid token for a fresh one.
pub async fn refresh_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<TokenResponse>, ApiError> {
    let token = bearer_token(&headers).ok_or(AuthError::TokenMissing)?;
    let login = state.tokens.refresh(state.revocations.as_ref(), token).await?;

    Ok(Json(TokenResponse {
        access_token: login.access_token,
        token_type: login.token_type,
        expires_at: login.expires_at,
    }))
}

/// POST /api/auth/logout — revokes the presented token. Always succeeds,
/// including for a missing/invalid token.
pub async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        state.tokens.logout(state.revocations.as_ref(), token).await;
    }
    StatusCode::NO_CONTENT
}

#[derive(Serialize)]
pub struct MeResponse {
    username: String,
    expires_at: DateTime<Utc>,
}

/// GET /api/auth/me — the authenticated principal.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, ApiError> {
    let token = bearer_token(&headers).ok_or(AuthError::TokenMissing)?;
    let expires_at = state.tokens.expiry_of(token)?;
    Ok(Json(MeResponse { username: principal.0, expires_at }))
}

/// POST /api/auth/change-password.
pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .tokens
        .change_password(
            state.admin_credentials.as_ref(),
            &principal.0,
            &req.current_password,
            &req.new_password,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()).and_then(|h| h.strip_prefix("Bearer "))
}
