//! Device records — the catalog of back-end hosts a principal can open a
//! session against.

use serde::{Deserialize, Serialize};

use crate::{DateTime, Utc, Uuid};

/// How a device authenticates the inbound SSH connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    Password,
    Key,
}

/// What the gateway does with a device once a session is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    Shell,
    Sftp,
}

/// A catalog entry describing one reachable back-end host.
///
/// `encrypted_password` holds the vault wire format (base64 of
/// nonce‖ciphertext‖tag) when `auth_type` is `Password`; `key_handle`
/// identifies the stored keypair when `auth_type` is `Key`. Exactly one of
/// the two is populated, matching the device-record invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    pub name: String,
    pub hostname: String,
    pub port: u16,
    pub username: String,
    pub auth_type: AuthType,
    pub connection_type: ConnectionType,
    pub encrypted_password: Option<String>,
    pub key_handle: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or updating a device record.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceInput {
    pub name: String,
    pub hostname: String,
    pub port: u16,
    pub username: String,
    pub auth_type: AuthType,
    pub connection_type: ConnectionType,
    /// Plaintext password, vaulted on write. Required when `auth_type` is `Password`.
    pub password: Option<String>,
}
