//! Client configuration.

use std::time::Duration;

use serde::Deserialize;

/// Connection and pipeline settings for [`IBClient::connect`](crate::IBClient::connect).
///
/// Deserializable so a driver program can load it from whatever format it
/// prefers; every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub client_id: i32,
    /// Appended to the `v100..157` version block of the preamble.
    pub connect_options: String,
    /// Extra START_API field, sent when the server supports it.
    pub optional_capabilities: String,
    /// How long to wait for NEXT_VALID_ID and MANAGED_ACCTS after START_API.
    pub handshake_timeout_ms: u64,
    /// Outbound frame queue (callers -> writer task).
    pub outbound_capacity: usize,
    /// Inbound frame queue (reader task -> decoder task).
    pub frame_capacity: usize,
    /// Notice queue (any task -> decoder task).
    pub notice_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7497,
            client_id: 0,
            connect_options: String::new(),
            optional_capabilities: String::new(),
            handshake_timeout_ms: 10_000,
            outbound_capacity: 10,
            frame_capacity: 100,
            notice_capacity: 10,
        }
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16, client_id: i32) -> Self {
        Self {
            host: host.into(),
            port,
            client_id,
            ..Self::default()
        }
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub(crate) fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
