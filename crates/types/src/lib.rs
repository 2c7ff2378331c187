//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! Shared wire types for the CloudShell gateway.
//!
//! This crate provides the canonical type definitions used across the
//! gateway's HTTP/WebSocket edge, device store, and audit log. Types are
//! serializable via serde and carry no business logic of their own.
//!
//! # Quick Start
//!
//! ```rust
//! use cloudshell_types::prelude::*;
//!
//! let kind = SessionKind::Shell;
//! assert_eq!(kind, SessionKind::Shell);
//! ```

pub mod audit;
pub mod auth;
pub mod device;
pub mod session;
pub mod sftp;

// Re-export primitive type aliases — direct re-exports, no newtype wrappers.
pub use chrono::{DateTime, Utc};
pub use uuid::Uuid;

/// Prelude module for convenient glob imports.
pub mod prelude {
    pub use crate::audit::{AuditAction, AuditEntry};
    pub use crate::auth::{ChangePasswordRequest, LoginRequest, LoginResponse, TokenClaims};
    pub use crate::device::{AuthType, ConnectionType, Device, DeviceInput};
    pub use crate::session::{SessionInfo, SessionKind};
    pub use crate::sftp::{MkdirRequest, RenameRequest, SftpEntry};
    pub use crate::{DateTime, Utc, Uuid};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use uuid::Uuid;

    #[test]
    fn test_device_round_trip() {
        let original = Device {
            id: Uuid::new_v4(),
            name: "build-box".to_string(),
            hostname: "10.0.0.5".to_string(),
            port: 22,
            username: "deploy".to_string(),
            auth_type: AuthType::Key,
            connection_type: ConnectionType::Shell,
            encrypted_password: None,
            key_handle: Some("key-01".to_string()),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&original).expect("serialize");
        let deserialized: Device = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(original.id, deserialized.id);
        assert_eq!(original.hostname, deserialized.hostname);
        assert_eq!(original.port, deserialized.port);
        assert_eq!(original.auth_type, deserialized.auth_type);
        assert_eq!(original.key_handle, deserialized.key_handle);
    }

    #[test]
    fn test_token_claims_round_trip() {
        let original = TokenClaims {
            sub: "admin".to_string(),
            exp: 1_700_000_000,
            jti: Uuid::new_v4().to_string(),
            bid: Uuid::new_v4().to_string(),
        };

        let json = serde_json::to_string(&original).expect("serialize");
        let deserialized: TokenClaims = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(original.sub, deserialized.sub);
        assert_eq!(original.exp, deserialized.exp);
        assert_eq!(original.jti, deserialized.jti);
        assert_eq!(original.bid, deserialized.bid);
    }

    #[test]
    fn test_sftp_entry_round_trip() {
        let original = SftpEntry {
            name: "notes.txt".to_string(),
            path: "/home/admin/notes.txt".to_string(),
            is_dir: false,
            size: 1024,
            modified: Some(1_700_000_000),
            permissions: Some("0644".to_string()),
        };

        let json = serde_json::to_string(&original).expect("serialize");
        let deserialized: SftpEntry = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(original.name, deserialized.name);
        assert_eq!(original.is_dir, deserialized.is_dir);
        assert_eq!(original.size, deserialized.size);
    }

    #[test]
    fn test_audit_entry_round_trip() {
        let original = AuditEntry {
            id: Uuid::new_v4(),
            action: AuditAction::SessionStarted,
            principal: Some("admin".to_string()),
            device_id: Some(Uuid::new_v4()),
            detail: Some("shell session opened".to_string()),
            source_ip: Some("10.0.0.1".to_string()),
            created_at: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&original).expect("serialize");
        let deserialized: AuditEntry = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(original.id, deserialized.id);
        assert_eq!(original.action, deserialized.action);
        assert_eq!(original.principal, deserialized.principal);
    }
}
