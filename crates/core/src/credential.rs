//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! Credential materializer (C3) — turns a device record's stored secret
//! into something a connector can use, for the minimum possible window.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use cloudshell_types::device::{AuthType, Device};

use crate::error::CredentialError;
use crate::secret::Secret;
use crate::vault::Vault;

/// A credential resolved from a device record, ready to hand to the SSH
/// connector.
///
/// For key auth, `key_path` names a temp file holding the decrypted PEM;
/// the caller must call [`ResolvedCredential::cleanup`] on every exit path
/// before leaving the connect routine — success, failure, or panic unwind.
pub enum ResolvedCredential {
    Password(Secret<String>),
    Key { key_path: PathBuf },
}

impl ResolvedCredential {
    /// Removes the ephemeral key file, if any. A no-op for password
    /// credentials. Idempotent.
    pub fn cleanup(&self) {
        if let ResolvedCredential::Key { key_path } = self {
            let _ = fs::remove_file(key_path);
        }
    }
}

/// Resolves a device's stored credential into a connector-ready form.
pub fn materialize(
    device: &Device,
    vault: &Vault,
    tmp_dir: &Path,
) -> Result<ResolvedCredential, CredentialError> {
    match device.auth_type {
        AuthType::Password => {
            let encrypted = device
                .encrypted_password
                .as_deref()
                .ok_or(CredentialError::NoCredential)?;
            let plaintext = vault.decrypt(encrypted)?;
            Ok(ResolvedCredential::Password(Secret::new(plaintext)))
        }
        AuthType::Key => {
            let handle = device.key_handle.as_deref().ok_or(CredentialError::NoCredential)?;
            let pem = vault.load_key(handle)?;

            fs::create_dir_all(tmp_dir)
                .map_err(|e| CredentialError::TempFileFailed(e.to_string()))?;
            let key_path = tmp_dir.join(format!("cloudshell-key-{}", uuid::Uuid::new_v4()));
            fs::write(&key_path, &pem).map_err(|e| CredentialError::TempFileFailed(e.to_string()))?;
            fs::set_permissions(&key_path, fs::Permissions::from_mode(0o600))
                .map_err(|e| CredentialError::TempFileFailed(e.to_string()))?;

            Ok(ResolvedCredential::Key { key_path })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cloudshell_types::device::ConnectionType;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn vault() -> Vault {
        Vault::new("materializer-test-secret")
    }

    fn base_device() -> Device {
        Device {
            id: Uuid::new_v4(),
            name: "d".to_string(),
            hostname: "127.0.0.1".to_string(),
            port: 22,
            username: "user".to_string(),
            auth_type: AuthType::Password,
            connection_type: ConnectionType::Shell,
            encrypted_password: None,
            key_handle: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_materialization() {
        let v = vault();
        let mut device = base_device();
        device.encrypted_password = Some(v.encrypt("hunter2").unwrap());

        let tmp = TempDir::new().unwrap();
        let resolved = materialize(&device, &v, tmp.path()).unwrap();
        match resolved {
            ResolvedCredential::Password(p) => assert_eq!(p.expose_secret(), "hunter2"),
            _ => panic!("expected password credential"),
        }
    }

    #[test]
    fn test_key_materialization_and_cleanup() {
        let v = vault();
        let data_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(data_dir.path().join("keys")).unwrap();
        let handle = v.save_key(data_dir.path(), "dev-x", "fake-pem-body").unwrap();

        let mut device = base_device();
        device.auth_type = AuthType::Key;
        device.key_handle = Some(handle);

        let tmp = TempDir::new().unwrap();
        let resolved = materialize(&device, &v, tmp.path()).unwrap();
        let path = match &resolved {
            ResolvedCredential::Key { key_path } => key_path.clone(),
            _ => panic!("expected key credential"),
        };

        assert!(path.exists());
        let perms = std::fs::metadata(&path).unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fake-pem-body");

        resolved.cleanup();
        assert!(!path.exists());

        // cleanup is safe to call twice
        resolved.cleanup();
    }

    #[test]
    fn test_no_credential_configured() {
        let v = vault();
        let device = base_device();
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            materialize(&device, &v, tmp.path()),
            Err(CredentialError::NoCredential)
        ));
    }
}
