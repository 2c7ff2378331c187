//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! # CloudShell Gateway Core
//!
//! Domain logic for the browser-based SSH/SFTP gateway: at-rest credential
//! encryption, host-key verification, session transport, the terminal
//! bridge, SFTP operations, and the auth/audit subsystems.
//!
//! This crate has no HTTP or database dependency — the platform crate wires
//! it to axum handlers and SQLite-backed stores.
//!
//! ## Modules
//!
//! - [`vault`] — at-rest encryption for device credentials (C1)
//! - [`credential`] — materializes a device's stored secret for connect time (C3)
//! - [`hostkey`] — accept-new host-key policy (C4)
//! - [`registry`] — process-wide open-session map and SSH transport (C5)
//! - [`bridge`] — WebSocket-to-PTY terminal bridge (C6)
//! - [`sftp`] — per-session SFTP operations (C7)
//! - [`auth`] — JWT issuance/validation and admin credential checks (C8)
//! - [`audit`] — best-effort mutation trail (C9)

pub mod audit;
pub mod auth;
pub mod bridge;
pub mod credential;
pub mod error;
pub mod hostkey;
pub mod registry;
pub mod secret;
pub mod sftp;
pub mod vault;

pub use credential::ResolvedCredential;
pub use error::GatewayError;
pub use hostkey::HostKeyPolicy;
pub use registry::{SessionMeta, SessionRegistry};
pub use secret::Secret;
pub use vault::Vault;
