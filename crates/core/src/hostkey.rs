//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! Host-key policy (C4) — OpenSSH `StrictHostKeyChecking=accept-new`
//! semantics against a persistent known-hosts file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::HostKeyError;

/// Guards the known-hosts file with a single in-process mutex. Appends
/// across different unknown hosts never corrupt entries; duplicate
/// appends after a race are acceptable (the policy is idempotent).
///
/// `None` data directory disables host-key checking entirely — a conscious
/// development-only downgrade documented at the config boundary, never a
/// silent production default.
pub struct HostKeyPolicy {
    path: Option<PathBuf>,
    lock: Mutex<()>,
}

impl HostKeyPolicy {
    pub fn new(data_dir: Option<PathBuf>) -> Self {
        Self {
            path: data_dir.map(|d| d.join("known_hosts")),
            lock: Mutex::new(()),
        }
    }

    /// Checks a presented key for `(host, addr, port)`, learning it if the
    /// host is unknown and rejecting on mismatch. `presented_key` is the
    /// already-serialized (OpenSSH wire) form of the host key.
    pub fn check(&self, host: &str, addr: &str, port: u16, presented_key: &str) -> Result<(), HostKeyError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let _guard = self.lock.lock().unwrap();
        let entries = read_entries(path);
        let matching: Vec<&KnownHostEntry> = entries
            .iter()
            .filter(|e| e.host == host && e.addr == addr && e.port == port)
            .collect();

        if !matching.is_empty() {
            return if matching.iter().any(|e| e.key == presented_key) {
                Ok(())
            } else {
                Err(HostKeyError::Unverifiable)
            };
        }

        append_entry(path, host, addr, port, presented_key)
    }
}

struct KnownHostEntry {
    host: String,
    addr: String,
    port: u16,
    key: String,
}

/// A line is standard OpenSSH known_hosts syntax: `hostnames keytype
/// base64key`, hostnames comma-separated (`host,addr`) and bracketed with
/// a `:port` suffix when the port is not 22. A parse failure for any one
/// line is treated as "no entry" for that line rather than aborting the
/// read.
fn read_entries(path: &PathBuf) -> Vec<KnownHostEntry> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };

    content.lines().filter_map(parse_line).collect()
}

fn parse_host_token(token: &str) -> Option<(String, u16)> {
    match token.strip_prefix('[') {
        Some(rest) => {
            let (host, port_str) = rest.split_once("]:")?;
            Some((host.to_string(), port_str.parse().ok()?))
        }
        None => Some((token.to_string(), 22)),
    }
}

fn parse_line(line: &str) -> Option<KnownHostEntry> {
    let mut parts = line.splitn(2, ' ');
    let pattern = parts.next()?;
    let key = parts.next()?;

    let mut tokens = pattern.split(',');
    let (host, port) = parse_host_token(tokens.next()?)?;
    let addr = match tokens.next() {
        Some(t) => parse_host_token(t)?.0,
        None => host.clone(),
    };

    Some(KnownHostEntry {
        host,
        addr,
        port,
        key: key.to_string(),
    })
}

/// Builds the comma-separated, optionally `[host]:port`-bracketed hostnames
/// field of a known_hosts line.
fn host_pattern(host: &str, addr: &str, port: u16) -> String {
    let fmt_one = |h: &str| if port == 22 { h.to_string() } else { format!("[{h}]:{port}") };
    if host == addr {
        fmt_one(host)
    } else {
        format!("{},{}", fmt_one(host), fmt_one(addr))
    }
}

fn append_entry(path: &PathBuf, host: &str, addr: &str, port: u16, key: &str) -> Result<(), HostKeyError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| HostKeyError::Io(e.to_string()))?;
    }

    let line = format!("{} {key}\n", host_pattern(host, addr, port));
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| HostKeyError::Io(e.to_string()))?;
    file.write_all(line.as_bytes())
        .map_err(|e| HostKeyError::Io(e.to_string()))?;
    file.sync_all().map_err(|e| HostKeyError::Io(e.to_string()))
}
