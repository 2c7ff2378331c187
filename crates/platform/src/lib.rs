//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! CloudShell Platform — the gateway's HTTP/WebSocket edge and SQLite
//! persistence layer, built on top of `cloudshell-core`'s connection and
//! session primitives.

pub mod database;
pub mod http;
