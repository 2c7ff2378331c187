//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! Terminal bridge (C6) — couples one client full-duplex binary channel to
//! one remote PTY.

use std::time::Duration;

use serde::Deserialize;
use uuid::Uuid;

use crate::registry::SessionRegistry;

const INITIAL_FRAME_TIMEOUT: Duration = Duration::from_secs(3);
const FALLBACK_COLS: u32 = 220;
const FALLBACK_ROWS: u32 = 50;

/// WebSocket close codes the bridge may ask the caller to close with.
pub mod close_code {
    pub const NORMAL: u16 = 1000;
    pub const BAD_TOKEN: u16 = 4001;
    pub const UNKNOWN_SESSION: u16 = 4004;
    pub const PTY_OPEN_FAILED: u16 = 4011;
}

#[derive(Debug, Deserialize)]
struct ResizeEnvelope {
    #[serde(rename = "type")]
    kind: String,
    cols: u32,
    rows: u32,
}

/// Parses an inbound frame as a resize control envelope. Any frame not
/// beginning with `{`, or one that fails to parse as the resize schema, is
/// not a control frame — including other JSON-shaped frames, which are
/// written to the PTY verbatim per spec's documented ambiguity.
fn parse_resize(frame: &[u8]) -> Option<(u32, u32)> {
    if frame.first() != Some(&b'{') {
        return None;
    }
    let envelope: ResizeEnvelope = serde_json::from_slice(frame).ok()?;
    if envelope.kind != "resize" {
        return None;
    }
    Some((envelope.cols, envelope.rows))
}

/// Abstraction over the client's full-duplex binary channel (a WebSocket in
/// production, an in-memory channel pair in tests) so the bridge's framing
/// logic can be exercised without a real network socket.
#[async_trait::async_trait]
pub trait ClientChannel: Send {
    async fn recv(&mut self) -> Option<Vec<u8>>;
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), String>;
    async fn close(&mut self, code: u16);
}

/// How the bridge's streaming loop ended. Teardown (meta read, registry
/// close, audit write) happens after this is returned.
#[derive(Debug, PartialEq, Eq)]
pub enum BridgeOutcome {
    Ended,
    UnknownSession,
    PtyFailed,
}

/// Runs the bridge's open sequence and streaming loop for `session_id`
/// against `client`. Returns once either side has ended; the caller is
/// responsible for the teardown sequence (meta read, registry close, audit
/// write) afterward — the bridge itself never acquires metadata or audits,
/// keeping `run` pure framing logic that tests can drive without a store.
pub async fn run(registry: &SessionRegistry, session_id: Uuid, client: &mut dyn ClientChannel) -> BridgeOutcome {
    let initial = tokio::time::timeout(INITIAL_FRAME_TIMEOUT, client.recv()).await;
    let (cols, rows) = match initial {
        Ok(Some(frame)) => parse_resize(&frame).unwrap_or((FALLBACK_COLS, FALLBACK_ROWS)),
        _ => (FALLBACK_COLS, FALLBACK_ROWS),
    };

    let mut shell = match registry.shell(session_id).await {
        Ok(shell) => shell,
        Err(_) => {
            send_error_frame(client, "session not found").await;
            client.close(close_code::UNKNOWN_SESSION).await;
            return BridgeOutcome::UnknownSession;
        }
    };

    if shell.request_pty_and_shell(cols, rows).await.is_err() {
        send_error_frame(client, "failed to open PTY").await;
        client.close(close_code::PTY_OPEN_FAILED).await;
        return BridgeOutcome::PtyFailed;
    }

    stream_loop(shell, client).await
}

async fn stream_loop(mut shell: crate::registry::ShellHandle, client: &mut dyn ClientChannel) -> BridgeOutcome {
    loop {
        tokio::select! {
            inbound = client.recv() => {
                match inbound {
                    Some(frame) => {
                        if let Some((cols, rows)) = parse_resize(&frame) {
                            let _ = shell.resize(cols, rows).await;
                        } else if shell.write(&frame).await.is_err() {
                            client.close(close_code::NORMAL).await;
                            return BridgeOutcome::Ended;
                        }
                    }
                    None => {
                        client.close(close_code::NORMAL).await;
                        return BridgeOutcome::Ended;
                    }
                }
            }
            outbound = shell.recv_output() => {
                match outbound {
                    Some(chunk) => {
                        if client.send(chunk).await.is_err() {
                            return BridgeOutcome::Ended;
                        }
                    }
                    None => {
                        client.close(close_code::NORMAL).await;
                        return BridgeOutcome::Ended;
                    }
                }
            }
        }
    }
}

async fn send_error_frame(client: &mut dyn ClientChannel, message: &str) {
    let frame = format!("\x1b[31m{message}\x1b[0m").into_bytes();
    let _ = client.send(frame).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resize_valid() {
        let frame = br#"{"type":"resize","cols":120,"rows":40}"#;
        assert_eq!(parse_resize(frame), Some((120, 40)));
    }

    #[test]
    fn test_parse_resize_wrong_type_not_consumed() {
        let frame = br#"{"type":"ping"}"#;
        assert_eq!(parse_resize(frame), None);
    }

    #[test]
    fn test_parse_resize_non_json_passthrough() {
        let frame = b"ls -la\n";
        assert_eq!(parse_resize(frame), None);
    }

    #[test]
    fn test_parse_resize_json_shaped_but_invalid_schema_passthrough() {
        let frame = br#"{"foo":"bar"}"#;
        assert_eq!(parse_resize(frame), None);
    }

    #[test]
    fn test_fallback_dimensions_constants() {
        assert_eq!(FALLBACK_COLS, 220);
        assert_eq!(FALLBACK_ROWS, 50);
    }

    #[tokio::test]
    async fn test_run_unknown_session_closes_with_unknown_session_code() {
        use std::sync::Arc;
        use tokio::sync::mpsc;

        struct FakeClient {
            closed: Option<u16>,
            inbound: mpsc::Receiver<Vec<u8>>,
        }

        #[async_trait::async_trait]
        impl ClientChannel for FakeClient {
            async fn recv(&mut self) -> Option<Vec<u8>> {
                self.inbound.recv().await
            }
            async fn send(&mut self, _frame: Vec<u8>) -> Result<(), String> {
                Ok(())
            }
            async fn close(&mut self, code: u16) {
                self.closed = Some(code);
            }
        }

        let (_tx, rx) = mpsc::channel(1);
        let mut client = FakeClient { closed: None, inbound: rx };

        let registry = SessionRegistry::new(Arc::new(crate::hostkey::HostKeyPolicy::new(None)));
        let outcome = run(&registry, Uuid::new_v4(), &mut client).await;

        assert_eq!(outcome, BridgeOutcome::UnknownSession);
        assert_eq!(client.closed, Some(close_code::UNKNOWN_SESSION));
    }
}
