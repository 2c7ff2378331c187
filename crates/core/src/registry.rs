//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! Session registry (C5) — a process-wide `session_id -> session` map, and
//! the SSH transport-open routines that feed it.
//!
//! The map itself is guarded by one short-lived lock around lookup/insert/
//! remove; once a caller has a session's `Arc`, it locks only that entry to
//! drive the channel, so one session's long-lived bridge loop never blocks
//! another session's open/close/meta calls.

use std::collections::HashMap;
use std::net::ToSocketAddrs;
use std::sync::Arc;
use std::time::Duration;

use russh::client::{Config, Handle, Handler, Msg};
use russh::keys::PublicKey;
use russh::{ChannelMsg, Disconnect};
use russh_sftp::client::SftpSession;
use tokio::sync::Mutex;
use uuid::Uuid;

use cloudshell_types::session::SessionKind;

use crate::credential::ResolvedCredential;
use crate::error::RegistryError;
use crate::hostkey::HostKeyPolicy;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Metadata kept alongside a live session, read by the bridge's teardown
/// path and by audit logging.
#[derive(Clone)]
pub struct SessionMeta {
    pub device_label: String,
    pub principal: String,
    pub source_ip: String,
}

impl SessionMeta {
    /// The empty sentinel `meta()` returns for an unknown session id, per
    /// spec — never `Option`, so teardown paths don't need to branch.
    pub fn empty() -> Self {
        Self {
            device_label: String::new(),
            principal: String::new(),
            source_ip: String::new(),
        }
    }
}

enum Transport {
    Shell {
        channel: russh::Channel<Msg>,
        pty_open: bool,
    },
    Sftp {
        sftp: SftpSession,
    },
}

struct Entry {
    #[allow(dead_code)] // read via SessionInfo once the device-CRUD edge needs it
    kind: SessionKind,
    handle: Handle<GatewayHandler>,
    transport: Transport,
    meta: SessionMeta,
}

/// Host-key-aware `russh::client::Handler`. One instance per connection
/// attempt; it is handed the policy and the `(host, addr, port)` being
/// dialed so `check_server_key` can call into C4.
struct GatewayHandler {
    policy: Arc<HostKeyPolicy>,
    host: String,
    addr: String,
    port: u16,
}

impl Handler for GatewayHandler {
    type Error = russh::Error;

    async fn check_server_key(&mut self, server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        let presented = server_public_key.to_openssh().unwrap_or_default();
        Ok(self
            .policy
            .check(&self.host, &self.addr, self.port, &presented)
            .is_ok())
    }
}

/// Process-wide map of open sessions.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, Arc<Mutex<Entry>>>>,
    host_key_policy: Arc<HostKeyPolicy>,
}

impl SessionRegistry {
    pub fn new(host_key_policy: Arc<HostKeyPolicy>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            host_key_policy,
        }
    }

    /// Opens an SSH transport to `hostname:port`, authenticating with
    /// `credential`; host keys are validated via the registry's policy. The
    /// PTY is *not* created here — it is deferred until the bridge receives
    /// the client's initial terminal size.
    pub async fn open_shell(
        &self,
        device_label: &str,
        hostname: &str,
        port: u16,
        username: &str,
        credential: &ResolvedCredential,
        principal: &str,
        source_ip: &str,
    ) -> Result<Uuid, RegistryError> {
        let handle = self.connect(hostname, port, username, credential).await?;
        let channel = handle
            .channel_open_session()
            .await
            .map_err(|e| RegistryError::Protocol(e.to_string()))?;

        let entry = Entry {
            kind: SessionKind::Shell,
            handle,
            transport: Transport::Shell {
                channel,
                pty_open: false,
            },
            meta: SessionMeta {
                device_label: device_label.to_string(),
                principal: principal.to_string(),
                source_ip: source_ip.to_string(),
            },
        };

        let id = Uuid::new_v4();
        self.sessions.lock().await.insert(id, Arc::new(Mutex::new(entry)));
        Ok(id)
    }

    /// As [`SessionRegistry::open_shell`], but starts an SFTP subsystem
    /// client on the opened channel instead of handing back a raw PTY
    /// channel.
    pub async fn open_sftp(
        &self,
        device_label: &str,
        hostname: &str,
        port: u16,
        username: &str,
        credential: &ResolvedCredential,
        principal: &str,
        source_ip: &str,
    ) -> Result<Uuid, RegistryError> {
        let handle = self.connect(hostname, port, username, credential).await?;
        let channel = handle
            .channel_open_session()
            .await
            .map_err(|e| RegistryError::Protocol(e.to_string()))?;
        channel
            .request_subsystem(true, "sftp")
            .await
            .map_err(|e| RegistryError::Protocol(e.to_string()))?;
        let sftp = SftpSession::new(channel.into_stream())
            .await
            .map_err(|e| RegistryError::Protocol(e.to_string()))?;

        let entry = Entry {
            kind: SessionKind::Sftp,
            handle,
            transport: Transport::Sftp { sftp },
            meta: SessionMeta {
                device_label: device_label.to_string(),
                principal: principal.to_string(),
                source_ip: source_ip.to_string(),
            },
        };

        let id = Uuid::new_v4();
        self.sessions.lock().await.insert(id, Arc::new(Mutex::new(entry)));
        Ok(id)
    }

    async fn connect(
        &self,
        hostname: &str,
        port: u16,
        username: &str,
        credential: &ResolvedCredential,
    ) -> Result<Handle<GatewayHandler>, RegistryError> {
        let addr = (hostname, port)
            .to_socket_addrs()
            .map_err(|e| RegistryError::Network(e.to_string()))?
            .next()
            .ok_or_else(|| RegistryError::Network(format!("could not resolve {hostname}")))?;

        let handler = GatewayHandler {
            policy: self.host_key_policy.clone(),
            host: hostname.to_string(),
            addr: addr.ip().to_string(),
            port,
        };

        let config = Arc::new(Config::default());
        let mut session = tokio::time::timeout(CONNECT_TIMEOUT, russh::client::connect(config, addr, handler))
            .await
            .map_err(|_| RegistryError::ConnectionLost)?
            .map_err(|e| RegistryError::Network(e.to_string()))?;

        let authenticated = match credential {
            ResolvedCredential::Password(password) => session
                .authenticate_password(username, password.expose_secret())
                .await
                .map_err(|e| RegistryError::Network(e.to_string()))?
                .success(),
            ResolvedCredential::Key { key_path } => {
                let key_pair = russh::keys::load_secret_key(key_path, None)
                    .map_err(|e| RegistryError::Protocol(e.to_string()))?;
                let with_hash_alg = russh::keys::PrivateKeyWithHashAlg::new(Arc::new(key_pair), None);
                session
                    .authenticate_publickey(username, with_hash_alg)
                    .await
                    .map_err(|e| RegistryError::Network(e.to_string()))?
                    .success()
            }
        };

        if !authenticated {
            return Err(RegistryError::AuthenticationDenied);
        }

        Ok(session)
    }

    /// Removes the session entry atomically, then best-effort closes any
    /// PTY/SFTP client and the transport. Closing an unknown id is a no-op.
    pub async fn close(&self, session_id: Uuid) {
        let removed = self.sessions.lock().await.remove(&session_id);
        let Some(entry) = removed else { return };

        let entry = entry.lock().await;
        match &entry.transport {
            Transport::Shell { channel, .. } => {
                let _ = channel.close().await;
            }
            Transport::Sftp { sftp } => {
                let _ = sftp.close().await;
            }
        }
        let _ = entry.handle.disconnect(Disconnect::ByApplication, "", "en").await;
    }

    /// Metadata for `session_id`, or the empty sentinel if unknown. Used by
    /// teardown paths so audit entries remain attributable after the
    /// registry entry has been consumed by [`SessionRegistry::close`].
    pub async fn meta(&self, session_id: Uuid) -> SessionMeta {
        let entry = self.sessions.lock().await.get(&session_id).cloned();
        match entry {
            Some(entry) => entry.lock().await.meta.clone(),
            None => SessionMeta::empty(),
        }
    }

    /// Hands back a handle to drive the shell channel for `session_id`. The
    /// handle holds the per-session lock for its own lifetime, so a single
    /// bridge loop can issue many operations without re-acquiring the
    /// registry-wide map lock, while other sessions stay unaffected.
    pub async fn shell(&self, session_id: Uuid) -> Result<ShellHandle, RegistryError> {
        let entry = self
            .sessions
            .lock()
            .await
            .get(&session_id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(session_id.to_string()))?;

        let guard = entry.lock_owned().await;
        if !matches!(guard.transport, Transport::Shell { .. }) {
            return Err(RegistryError::NotFound(session_id.to_string()));
        }
        Ok(ShellHandle { guard })
    }

    /// Hands back a handle to drive the SFTP client for `session_id`.
    pub async fn sftp(&self, session_id: Uuid) -> Result<SftpHandle, RegistryError> {
        let entry = self
            .sessions
            .lock()
            .await
            .get(&session_id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(session_id.to_string()))?;

        let guard = entry.lock_owned().await;
        if !matches!(guard.transport, Transport::Sftp { .. }) {
            return Err(RegistryError::NotFound(session_id.to_string()));
        }
        Ok(SftpHandle { guard })
    }
}

/// Exclusive access to one shell session's PTY channel, held for as long as
/// the bridge loop runs.
pub struct ShellHandle {
    guard: tokio::sync::OwnedMutexGuard<Entry>,
}

impl ShellHandle {
    fn channel(&self) -> &russh::Channel<Msg> {
        match &self.guard.transport {
            Transport::Shell { channel, .. } => channel,
            Transport::Sftp { .. } => unreachable!("ShellHandle only wraps shell transports"),
        }
    }

    pub async fn request_pty_and_shell(&mut self, cols: u32, rows: u32) -> Result<(), RegistryError> {
        self.channel()
            .request_pty(true, "xterm-256color", cols, rows, 0, 0, &[])
            .await
            .map_err(|e| RegistryError::Protocol(e.to_string()))?;
        self.channel()
            .request_shell(true)
            .await
            .map_err(|e| RegistryError::Protocol(e.to_string()))?;
        if let Transport::Shell { pty_open, .. } = &mut self.guard.transport {
            *pty_open = true;
        }
        Ok(())
    }

    pub async fn resize(&mut self, cols: u32, rows: u32) -> Result<(), RegistryError> {
        self.channel()
            .window_change(cols, rows, 0, 0)
            .await
            .map_err(|e| RegistryError::Protocol(e.to_string()))
    }

    pub async fn write(&mut self, data: &[u8]) -> Result<(), RegistryError> {
        self.channel()
            .data(data)
            .await
            .map_err(|e| RegistryError::Protocol(e.to_string()))
    }

    /// Waits for the next channel event and extracts its output bytes, if
    /// any. `None` on channel EOF/close — the caller treats that as the
    /// remote end hanging up.
    pub async fn recv_output(&mut self) -> Option<Vec<u8>> {
        let channel = match &mut self.guard.transport {
            Transport::Shell { channel, .. } => channel,
            Transport::Sftp { .. } => unreachable!("ShellHandle only wraps shell transports"),
        };
        loop {
            match channel.wait().await? {
                ChannelMsg::Data { data } => return Some(data.to_vec()),
                ChannelMsg::ExtendedData { data, .. } => return Some(data.to_vec()),
                ChannelMsg::Eof | ChannelMsg::Close => return None,
                _ => continue,
            }
        }
    }
}

/// Exclusive access to one SFTP session's client, held for the duration of
/// one SFTP operation.
pub struct SftpHandle {
    guard: tokio::sync::OwnedMutexGuard<Entry>,
}

impl SftpHandle {
    pub fn client(&self) -> &SftpSession {
        match &self.guard.transport {
            Transport::Sftp { sftp } => sftp,
            Transport::Shell { .. } => unreachable!("SftpHandle only wraps sftp transports"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_meta_of_unknown_session_is_empty_sentinel() {
        let registry = SessionRegistry::new(Arc::new(HostKeyPolicy::new(None)));
        let meta = registry.meta(Uuid::new_v4()).await;
        assert_eq!(meta.device_label, "");
        assert_eq!(meta.principal, "");
        assert_eq!(meta.source_ip, "");
    }

    #[tokio::test]
    async fn test_close_unknown_session_is_noop() {
        let registry = SessionRegistry::new(Arc::new(HostKeyPolicy::new(None)));
        registry.close(Uuid::new_v4()).await;
    }

    #[tokio::test]
    async fn test_shell_handle_unknown_session_not_found() {
        let registry = SessionRegistry::new(Arc::new(HostKeyPolicy::new(None)));
        let result = registry.shell(Uuid::new_v4()).await;
        assert!(matches!(result, Err(RegistryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_sftp_handle_unknown_session_not_found() {
        let registry = SessionRegistry::new(Arc::new(HostKeyPolicy::new(None)));
        let result = registry.sftp(Uuid::new_v4()).await;
        assert!(matches!(result, Err(RegistryError::NotFound(_))));
    }
}
