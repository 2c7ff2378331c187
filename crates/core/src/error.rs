//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: cloudshell-gateway — browser-based SSH/SFTP access.
//

//! Unified error hierarchy for the CloudShell gateway core.

use thiserror::Error;

/// Top-level unified error type for gateway operations.
///
/// Kinds mirror the language-neutral list the HTTP edge maps to status
/// codes: lower layers return one of these variants, the edge does the
/// mapping. Internal plumbing errors (I/O, JSON, SQL) are wrapped here too
/// so a handler only ever has one error type to match on.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("vault operation failed")]
    Vault(#[from] VaultError),

    #[error("credential materialization failed")]
    Credential(#[from] CredentialError),

    #[error("host-key policy rejected the connection")]
    HostKey(#[from] HostKeyError),

    #[error("session registry error")]
    Registry(#[from] RegistryError),

    #[error("sftp operation failed")]
    Sftp(#[from] SftpError),

    #[error("authentication error")]
    Auth(#[from] AuthError),

    #[error("device store error")]
    DeviceStore(#[from] DeviceStoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the secret vault (C1).
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("ciphertext failed authentication (tamper)")]
    Tamper,

    #[error("malformed ciphertext: {0}")]
    MalformedInput(String),

    #[error("missing secret key configuration")]
    MissingSecret,

    #[error("key handle not found: {0}")]
    KeyNotFound(String),

    #[error("key generation failed: {0}")]
    KeyGenerationFailed(String),
}

/// Errors from the credential materializer (C3).
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("device has no usable credential configured")]
    NoCredential,

    #[error("failed to materialize ephemeral key file: {0}")]
    TempFileFailed(String),

    #[error(transparent)]
    Vault(#[from] VaultError),
}

/// Errors from the host-key policy (C4).
#[derive(Error, Debug)]
pub enum HostKeyError {
    #[error("presented host key does not match the known-hosts entry")]
    Unverifiable,

    #[error("known-hosts file IO error: {0}")]
    Io(String),
}

/// Errors from the session registry (C5) and the transport it opens.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("session not found: {0}")]
    NotFound(String),

    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("remote host rejected the credential")]
    AuthenticationDenied,

    #[error(transparent)]
    HostKey(#[from] HostKeyError),

    #[error("connection lost")]
    ConnectionLost,

    #[error("network error: {0}")]
    Network(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Errors from the SFTP operation surface (C7).
#[derive(Error, Debug)]
pub enum SftpError {
    #[error("session not found: {0}")]
    NotFound(String),

    #[error("sftp operation failed: {0}")]
    OperationFailed(String),
}

/// Errors from the auth & token store (C8).
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("bad credentials")]
    BadCredentials,

    #[error("token missing")]
    TokenMissing,

    #[error("token invalid")]
    TokenInvalid,

    #[error("token revoked")]
    TokenRevoked,

    #[error("token issued by a different server boot")]
    TokenBootMismatch,

    #[error("validation failed: {0}")]
    Validation(String),
}

/// Errors from the device store (C13).
#[derive(Error, Debug)]
pub enum DeviceStoreError {
    #[error("device not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(String),
}

impl VaultError {
    fn kind(&self) -> &'static str {
        match self {
            VaultError::Tamper => "tamper",
            VaultError::MissingSecret => "missing-secret",
            VaultError::KeyNotFound(_) => "not-found",
            VaultError::MalformedInput(_) | VaultError::KeyGenerationFailed(_) => "internal",
        }
    }
}

impl RegistryError {
    fn kind(&self) -> &'static str {
        match self {
            RegistryError::NotFound(_) | RegistryError::DeviceNotFound(_) => "not-found",
            RegistryError::AuthenticationDenied => "remote-auth-denied",
            RegistryError::HostKey(_) => "host-key-unverifiable",
            RegistryError::ConnectionLost => "connection-lost",
            RegistryError::Network(_) => "transport-error",
            RegistryError::Protocol(_) => "protocol-error",
            RegistryError::Credential(_) => "internal",
        }
    }
}

impl GatewayError {
    /// Stable error kind name, matching spec.md §7's language-neutral list.
    /// The HTTP edge uses this (not the `Display` message) to pick a status
    /// code, keeping the mapping independent of wording changes here.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Vault(e) => e.kind(),
            GatewayError::Credential(CredentialError::Vault(e)) => e.kind(),
            GatewayError::Credential(_) => "internal",
            GatewayError::HostKey(HostKeyError::Unverifiable) => "host-key-unverifiable",
            GatewayError::HostKey(_) => "internal",
            GatewayError::Registry(e) => e.kind(),
            GatewayError::Sftp(SftpError::NotFound(_)) => "not-found",
            GatewayError::Sftp(SftpError::OperationFailed(_)) => "internal",
            GatewayError::Auth(AuthError::BadCredentials) => "bad-credentials",
            GatewayError::Auth(AuthError::TokenMissing) => "token-missing",
            GatewayError::Auth(AuthError::TokenInvalid) => "token-invalid",
            GatewayError::Auth(AuthError::TokenRevoked) => "token-revoked",
            GatewayError::Auth(AuthError::TokenBootMismatch) => "token-boot-mismatch",
            GatewayError::Auth(AuthError::Validation(_)) => "validation",
            GatewayError::DeviceStore(DeviceStoreError::NotFound(_)) => "not-found",
            GatewayError::DeviceStore(_) => "internal",
            GatewayError::Io(_) | GatewayError::Json(_) => "internal",
        }
    }
}
