//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! HTTP layer — Axum-based REST/WebSocket API for the CloudShell gateway.
//!
//! Provides:
//! - Unified router combining auth, device, terminal, SFTP, key and audit
//!   endpoints
//! - Bearer token auth middleware
//! - `AppState` and `Config` for service wiring

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::Config;
pub use router::create_router;
pub use state::AppState;
