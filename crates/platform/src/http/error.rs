//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! Maps the core error hierarchy onto HTTP status codes and the
//! `{detail, type}` JSON envelope every failed request returns.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use cloudshell_core::error::GatewayError;

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Wraps any [`GatewayError`] (or a type it can be built `From`) for use as
/// a handler's error return type.
pub struct ApiError(GatewayError);

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0.kind() {
            "bad-credentials" | "token-missing" | "token-invalid" | "token-revoked" | "token-boot-mismatch"
            | "remote-auth-denied" => StatusCode::UNAUTHORIZED,
            "validation" => StatusCode::UNPROCESSABLE_ENTITY,
            "not-found" => StatusCode::NOT_FOUND,
            "host-key-unverifiable" | "transport-error" | "protocol-error" => StatusCode::BAD_GATEWAY,
            "connection-lost" => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Builds the response without consuming `self` through the
    /// `IntoResponse` trait, so callers (e.g. the auth middleware) can add
    /// headers like `WWW-Authenticate` afterward.
    pub fn into_response_inner(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            detail: self.0.to_string(),
            kind: self.0.kind(),
        };
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_response_inner()
    }
}

impl<E> From<E> for ApiError
where
    GatewayError: From<E>,
{
    fn from(e: E) -> Self {
        ApiError(GatewayError::from(e))
    }
}

/// Catches any panic-free uncaught error that escapes a handler's `Result`
/// chain — logged with method and path, returned as a generic 500 envelope.
pub async fn fallback_handler(uri: axum::http::Uri) -> Response {
    tracing::warn!(path = %uri, "no route matched");
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            detail: "no such route".to_string(),
            kind: "not-found",
        }),
    )
        .into_response()
}
