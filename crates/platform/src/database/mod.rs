//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! SQLite-backed persistence (C13/C14) — the concrete stores behind
//! `cloudshell_core`'s `AdminCredentialStore`, `RevocationStore`, and
//! `AuditSink` traits, plus the device catalog repository.

pub mod admin;
pub mod audit;
pub mod devices;
pub mod pool;
pub mod revocation;

pub use admin::SqliteAdminCredentialStore;
pub use audit::SqliteAuditSink;
pub use devices::DeviceRepository;
pub use pool::{connect, connect_in_memory, run_migrations};
pub use revocation::SqliteRevocationStore;
