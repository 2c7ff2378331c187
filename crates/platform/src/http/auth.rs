//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! Bearer token authentication middleware.
//!
//! `auth_middleware` validates the `Authorization: Bearer <token>` header by
//! decoding and verifying it through `TokenService::validate`, then injects
//! the authenticated principal into request extensions for handlers to read.

use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;

use cloudshell_core::error::AuthError;

use super::error::ApiError;
use super::state::AppState;

/// The authenticated principal, injected into request extensions on success.
#[derive(Clone)]
pub struct Principal(pub String);

fn unauthorized(err: AuthError) -> Response {
    let mut response = ApiError::from(err).into_response_inner();
    response
        .headers_mut()
        .insert(WWW_AUTHENTICATE, "Bearer".parse().unwrap());
    response
}

pub async fn auth_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        return unauthorized(AuthError::TokenMissing);
    };

    match state.tokens.validate(state.revocations.as_ref(), token).await {
        Ok(principal) => {
            request.extensions_mut().insert(Principal(principal));
            next.run(request).await
        }
        Err(e) => unauthorized(e),
    }
}

/// Extracts the query-string `token` parameter for the WebSocket upgrade
/// path, which cannot carry an `Authorization` header from the browser.
pub async fn validate_query_token(state: &AppState, token: Option<&str>) -> Result<String, StatusCode> {
    let Some(token) = token else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    state
        .tokens
        .validate(state.revocations.as_ref(), token)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)
}
