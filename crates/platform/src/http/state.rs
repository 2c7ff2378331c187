//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! AppState — shared state for the gateway's HTTP/WebSocket edge.

use std::sync::Arc;
use std::time::Instant;

use sqlx::SqlitePool;

use cloudshell_core::auth::{AdminCredentialStore, RevocationStore, TokenService};
use cloudshell_core::audit::AuditSink;
use cloudshell_core::hostkey::HostKeyPolicy;
use cloudshell_core::registry::SessionRegistry;
use cloudshell_core::vault::Vault;

use crate::database::DeviceRepository;
use crate::http::config::Config;

/// Shared application state for the HTTP/WebSocket layer.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub tokens: Arc<TokenService>,
    pub vault: Arc<Vault>,
    pub host_key_policy: Arc<HostKeyPolicy>,
    pub registry: Arc<SessionRegistry>,
    pub devices: Arc<DeviceRepository>,
    pub admin_credentials: Arc<dyn AdminCredentialStore>,
    pub revocations: Arc<dyn RevocationStore>,
    pub audit: Arc<dyn AuditSink>,
    pub config: Arc<Config>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        config: Config,
        admin_credentials: Arc<dyn AdminCredentialStore>,
        revocations: Arc<dyn RevocationStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let vault = Arc::new(Vault::new(&config.secret_key));
        let host_key_policy = Arc::new(HostKeyPolicy::new(Some(config.data_dir.clone())));
        let registry = Arc::new(SessionRegistry::new(host_key_policy.clone()));
        let tokens = Arc::new(TokenService::new(
            config.secret_key.clone(),
            config.token_ttl_hours,
            config.admin_user.clone(),
            config.admin_password.clone(),
        ));
        let devices = Arc::new(DeviceRepository::new(pool.clone()));

        Self {
            pool,
            tokens,
            vault,
            host_key_policy,
            registry,
            devices,
            admin_credentials,
            revocations,
            audit,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
