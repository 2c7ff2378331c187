//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! HTTP endpoint handlers for the CloudShell gateway.

pub mod audit;
pub mod auth;
pub mod devices;
pub mod health;
pub mod keys;
pub mod sftp;
pub mod terminal;
