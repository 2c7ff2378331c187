//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! Integration tests for platform-server startup wiring.
//!
//! Validates: `Config::from_env()` loading, `AppState` construction against
//! an in-memory database, and the router's public health endpoint.
//!
//! NOTE: Tests that manipulate environment variables (SECRET_KEY) share the
//! same process address space. They use a per-process Mutex to run serially
//! and avoid races.

use std::sync::{Arc, Mutex, OnceLock};

use axum::body::Body;
use axum::http::Request;
use tower::ServiceExt;

use cloudshell_platform::database::{connect_in_memory, run_migrations, SqliteAdminCredentialStore, SqliteAuditSink, SqliteRevocationStore};
use cloudshell_platform::http::{create_router, AppState, Config};

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

#[test]
fn test_config_from_env_defaults() {
    let _guard = env_lock().lock().unwrap_or_else(|p| p.into_inner());

    std::env::set_var("SECRET_KEY", "test-secret");
    std::env::remove_var("PORT");
    std::env::remove_var("ADMIN_USER");

    let config = Config::from_env().expect("Config::from_env() should succeed with SECRET_KEY set");

    assert_eq!(config.port, 8080);
    assert_eq!(config.admin_user, "admin");

    std::env::remove_var("SECRET_KEY");
}

async fn test_state() -> AppState {
    let pool = connect_in_memory().await.expect("in-memory pool");
    run_migrations(&pool).await.expect("migrations");

    let admin_credentials = Arc::new(SqliteAdminCredentialStore::new(pool.clone()));
    let revocations = Arc::new(SqliteRevocationStore::new(pool.clone()));
    let audit = Arc::new(SqliteAuditSink::new(pool.clone()));

    let config = Config {
        secret_key: "test-secret".to_string(),
        admin_user: "admin".to_string(),
        admin_password: "admin".to_string(),
        token_ttl_hours: 8,
        audit_retention_days: 7,
        data_dir: std::env::temp_dir(),
        cors_origins: Vec::new(),
        port: 8080,
    };

    AppState::new(pool, config, admin_credentials, revocations, audit)
}

#[tokio::test]
async fn test_appstate_construction_and_router_health() {
    let state = test_state().await;
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .expect("request builder should not fail"),
        )
        .await
        .expect("oneshot should not fail");

    assert_eq!(response.status(), axum::http::StatusCode::OK, "GET /api/health should return HTTP 200");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body should be readable");
    let body_json: serde_json::Value = serde_json::from_slice(&body).expect("body should be valid JSON");

    assert_eq!(body_json["status"], "ok");
    assert!(body_json.get("version").is_some());
    assert!(body_json.get("uptime_seconds").is_some());
}

#[tokio::test]
async fn test_protected_route_without_token_is_unauthorized() {
    let state = test_state().await;
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/devices")
                .body(Body::empty())
                .expect("request builder should not fail"),
        )
        .await
        .expect("oneshot should not fail");

    assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_bad_credentials_is_unauthorized() {
    let state = test_state().await;
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/token")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("username=admin&password=wrong"))
                .expect("request builder should not fail"),
        )
        .await
        .expect("oneshot should not fail");

    assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
}
