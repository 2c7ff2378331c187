//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! HTTP integration tests against the full router, an in-memory SQLite pool,
//! and the real auth/audit stack.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use cloudshell_platform::database::{connect_in_memory, run_migrations, SqliteAdminCredentialStore, SqliteAuditSink, SqliteRevocationStore};
use cloudshell_platform::http::{create_router, AppState, Config};

async fn test_state() -> AppState {
    let pool = connect_in_memory().await.unwrap();
    run_migrations(&pool).await.unwrap();

    let admin_credentials = Arc::new(SqliteAdminCredentialStore::new(pool.clone()));
    let revocations = Arc::new(SqliteRevocationStore::new(pool.clone()));
    let audit = Arc::new(SqliteAuditSink::new(pool.clone()));

    let config = Config {
        secret_key: "integration-test-secret".to_string(),
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

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn login_request() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/token")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("username=admin&password=admin"))
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

/// S1 — login/refresh/logout round trip.
#[tokio::test]
async fn test_login_refresh_logout_round_trip() {
    let state = test_state().await;
    let app = create_router(state);

    let login_response = app.clone().oneshot(login_request()).await.unwrap();
    assert_eq!(login_response.status(), StatusCode::OK);
    let login_body = body_json(login_response).await;
    assert_eq!(login_body["token_type"], "bearer");
    let original_token = login_body["access_token"].as_str().unwrap().to_string();

    let refresh_response = app
        .clone()
        .oneshot(Request::builder().method("POST").uri("/api/auth/refresh").header("authorization", format!("Bearer {original_token}")).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(refresh_response.status(), StatusCode::OK);
    let refresh_body = body_json(refresh_response).await;
    let new_token = refresh_body["access_token"].as_str().unwrap().to_string();
    assert_ne!(new_token, original_token);

    let old_token_me = app.clone().oneshot(authed("GET", "/api/auth/me", &original_token)).await.unwrap();
    assert_eq!(old_token_me.status(), StatusCode::UNAUTHORIZED);

    let first_logout = app.clone().oneshot(authed("POST", "/api/auth/logout", &new_token)).await.unwrap();
    assert_eq!(first_logout.status(), StatusCode::NO_CONTENT);

    let second_logout = app.clone().oneshot(authed("POST", "/api/auth/logout", &new_token)).await.unwrap();
    assert_eq!(second_logout.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_login_with_bad_password_writes_no_audit_row() {
    let state = test_state().await;
    let app = create_router(state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/token")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("username=admin&password=wrong"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let rows = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM audit_logs")
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(rows.0, 0);
}

#[tokio::test]
async fn test_device_crud_requires_auth_and_round_trips() {
    let state = test_state().await;
    let app = create_router(state);

    let unauthenticated = app.clone().oneshot(Request::builder().uri("/api/devices").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);

    let login_body = body_json(app.clone().oneshot(login_request()).await.unwrap()).await;
    let token = login_body["access_token"].as_str().unwrap().to_string();

    let create_body = serde_json::json!({
        "name": "build-box",
        "hostname": "10.0.0.5",
        "port": 22,
        "username": "deploy",
        "auth_type": "password",
        "connection_type": "shell",
        "password": "hunter2",
    });
    let create_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/devices")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(create_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(create_response.status(), StatusCode::CREATED);
    let created = body_json(create_response).await;
    assert_eq!(created["name"], "build-box");
    assert!(created["encrypted_password"].is_string());

    let list_response = app.clone().oneshot(authed("GET", "/api/devices", &token)).await.unwrap();
    assert_eq!(list_response.status(), StatusCode::OK);
    let list = body_json(list_response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

/// S6 — audit prune.
#[tokio::test]
async fn test_audit_prune_keeps_recent_rows() {
    use chrono::{Duration, Utc};
    use cloudshell_types::audit::{AuditAction, AuditEntry};
    use uuid::Uuid;

    let state = test_state().await;

    let old = AuditEntry {
        id: Uuid::new_v4(),
        action: AuditAction::SessionStarted,
        principal: Some("admin".to_string()),
        device_id: None,
        detail: None,
        source_ip: None,
        created_at: Utc::now() - Duration::days(30),
    };
    let recent = AuditEntry {
        id: Uuid::new_v4(),
        action: AuditAction::SessionStarted,
        principal: Some("admin".to_string()),
        device_id: None,
        detail: None,
        source_ip: None,
        created_at: Utc::now() - Duration::days(3),
    };
    cloudshell_core::audit::AuditSink::insert(state.audit.as_ref(), &old).await.unwrap();
    cloudshell_core::audit::AuditSink::insert(state.audit.as_ref(), &recent).await.unwrap();

    let login_body = body_json(create_router(state.clone()).oneshot(login_request()).await.unwrap()).await;
    let token = login_body["access_token"].as_str().unwrap().to_string();

    let app = create_router(state);
    let prune_response = app.oneshot(authed("POST", "/api/audit/prune", &token)).await.unwrap();
    assert_eq!(prune_response.status(), StatusCode::OK);
    let body = body_json(prune_response).await;
    assert_eq!(body["deleted"], 1);
    assert_eq!(body["retention_days"], 7);
}
