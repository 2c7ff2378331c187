//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! Service configuration loaded from environment variables.

use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_TOKEN_TTL_HOURS: i64 = 8;
const DEFAULT_AUDIT_RETENTION_DAYS: i64 = 7;
const DEFAULT_DATA_DIR: &str = "/data";
const DEFAULT_PORT: u16 = 8080;

/// Runtime configuration for the CloudShell gateway.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root key-derivation secret for the vault and the HMAC secret for
    /// token signing. Missing this is startup-fatal, never silently
    /// defaulted.
    pub secret_key: String,
    pub admin_user: String,
    pub admin_password: String,
    pub token_ttl_hours: i64,
    pub audit_retention_days: i64,
    pub data_dir: PathBuf,
    pub cors_origins: Vec<String>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let secret_key = std::env::var("SECRET_KEY")
            .context("SECRET_KEY is required — it derives the vault key and signs bearer tokens")?;

        let admin_user = std::env::var("ADMIN_USER").unwrap_or_else(|_| "admin".to_string());
        let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());

        let token_ttl_hours = std::env::var("TOKEN_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_HOURS);

        let audit_retention_days = std::env::var("AUDIT_RETENTION_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_AUDIT_RETENTION_DAYS);

        let data_dir = std::env::var("DATA_DIR")
            .unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string())
            .into();

        let cors_origins = std::env::var("CORS_ORIGINS")
            .ok()
            .map(|raw| raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
            .unwrap_or_default();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Config {
            secret_key,
            admin_user,
            admin_password,
            token_ttl_hours,
            audit_retention_days,
            data_dir,
            cors_origins,
            port,
        })
    }

    /// Creates `<data_dir>` and `<data_dir>/keys` (mode 0700) if absent.
    pub fn ensure_data_dir(&self) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        std::fs::create_dir_all(self.data_dir.join("keys")).context("failed to create data directory")?;
        std::fs::set_permissions(self.data_dir.join("keys"), std::fs::Permissions::from_mode(0o700))
            .context("failed to set key directory permissions")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    #[test]
    fn test_missing_secret_key_is_fatal() {
        let _guard = env_lock().lock().unwrap_or_else(|p| p.into_inner());
        std::env::remove_var("SECRET_KEY");
        assert!(Config::from_env().is_err());
    }

    #[test]
    fn test_defaults_applied_when_optional_vars_absent() {
        let _guard = env_lock().lock().unwrap_or_else(|p| p.into_inner());
        std::env::set_var("SECRET_KEY", "test-secret");
        std::env::remove_var("TOKEN_TTL_HOURS");
        std::env::remove_var("DATA_DIR");
        std::env::remove_var("PORT");

        let config = Config::from_env().unwrap();
        assert_eq!(config.token_ttl_hours, DEFAULT_TOKEN_TTL_HOURS);
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(config.port, DEFAULT_PORT);

        std::env::remove_var("SECRET_KEY");
    }

    #[test]
    fn test_cors_origins_split_and_trimmed() {
        let _guard = env_lock().lock().unwrap_or_else(|p| p.into_inner());
        std::env::set_var("SECRET_KEY", "test-secret");
        std::env::set_var("CORS_ORIGINS", "http://a.example, http://b.example");

        let config = Config::from_env().unwrap();
        assert_eq!(config.cors_origins, vec!["http://a.example", "http://b.example"]);

        std::env::remove_var("SECRET_KEY");
        std::env::remove_var("CORS_ORIGINS");
    }
}
