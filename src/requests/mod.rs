//! Typed encoders for every outbound request kind.
//!
//! [`RequestEncoder`] captures the negotiated server version and turns a
//! request plus its parameters into one complete frame. Before writing a
//! frame it checks that the peer supports every feature the parameters use;
//! an unsupported feature yields `IBApiError::Client` with code 503 and no
//! frame.

mod account;
mod contracts;
mod historical;
mod market_data;
mod misc;
mod orders;

pub use historical::HistoricalDataRequest;
pub use orders::{OrderGate, PLACE_ORDER_GATES};

use crate::encoder::MessageEncoder;
use crate::errors::{IBApiError, Result};
use crate::protocol::client_errors::UPDATE_TWS;
use crate::protocol::supports;

/// Version-aware request encoder.
///
/// Cheap to copy; the client keeps one per connection.
#[derive(Debug, Clone, Copy)]
pub struct RequestEncoder {
    server_version: i32,
}

impl RequestEncoder {
    pub fn new(server_version: i32) -> Self {
        Self { server_version }
    }

    pub fn server_version(&self) -> i32 {
        self.server_version
    }

    #[inline]
    fn supports(&self, min: i32) -> bool {
        supports(self.server_version, min)
    }

    /// Start a frame with the message kind code.
    fn message(&self, kind: i32) -> MessageEncoder {
        let mut enc = MessageEncoder::new(self.server_version);
        enc.field(kind);
        enc
    }

    /// Reject the request when the server is older than `min`.
    fn require(&self, req_id: i32, min: i32, feature: &str) -> Result<()> {
        if self.supports(min) {
            Ok(())
        } else {
            Err(unsupported(req_id, feature))
        }
    }

    /// Reject the request when `used` is set and the server is older than `min`.
    fn require_if(&self, used: bool, req_id: i32, min: i32, feature: &str) -> Result<()> {
        if used {
            self.require(req_id, min, feature)
        } else {
            Ok(())
        }
    }
}

fn unsupported(req_id: i32, feature: &str) -> IBApiError {
    IBApiError::client(req_id, UPDATE_TWS, &format!("It does not support {feature}."))
}

/// `"k1=v1;k2=v2;"` form of a tag/value list.
fn tag_value_string(tags: &[crate::models::common::TagValue]) -> String {
    tags.iter()
        .map(|tv| format!("{}={};", tv.tag, tv.value))
        .collect()
}

#[cfg(test)]
pub(crate) fn payload_fields(frame: &[u8]) -> Vec<String> {
    use crate::protocol::HEADER_LEN;

    let declared = u32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
    let payload = &frame[HEADER_LEN..];
    assert_eq!(declared, payload.len(), "length prefix must match payload");
    let mut fields: Vec<String> = payload
        .split(|&b| b == 0)
        .map(|f| String::from_utf8_lossy(f).into_owned())
        .collect();
    assert_eq!(fields.pop().as_deref(), Some(""), "payload must end with NUL");
    fields
}
