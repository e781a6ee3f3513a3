//! Outbound framer.
//!
//! Builds one length-prefixed frame of NUL-terminated textual fields. Typed
//! values are turned into field text through [`WireField`]; `Option` values
//! and the integer/float unset sentinels encode as an empty field.

use bytes::{BufMut, BytesMut};
use rust_decimal::Decimal;

use crate::errors::{IBApiError, Result};
use crate::models::common::TagValue;
use crate::models::contract::Contract;
use crate::protocol::{API_SIGN, HEADER_LEN, MAX_CLIENT_VER, MAX_MSG_LEN, MIN_CLIENT_VER, UNSET_DOUBLE, UNSET_INTEGER};

/// A value that can be written as the text of one wire field.
pub trait WireField {
    /// Append the field text (without the terminating NUL).
    fn write_text(&self, buf: &mut BytesMut);

    /// Whether this value is the unset sentinel and must encode empty.
    fn is_unset(&self) -> bool {
        false
    }
}

impl<T: WireField + ?Sized> WireField for &T {
    fn write_text(&self, buf: &mut BytesMut) {
        (**self).write_text(buf)
    }

    fn is_unset(&self) -> bool {
        (**self).is_unset()
    }
}

impl<T: WireField> WireField for Option<T> {
    fn write_text(&self, buf: &mut BytesMut) {
        if let Some(v) = self {
            if !v.is_unset() {
                v.write_text(buf);
            }
        }
    }
}

macro_rules! integer_field {
    ($($ty:ty),+) => {
        $(impl WireField for $ty {
            fn write_text(&self, buf: &mut BytesMut) {
                buf.extend_from_slice(self.to_string().as_bytes());
            }
        })+
    };
}

integer_field!(i64, u32, usize);

impl WireField for i32 {
    fn write_text(&self, buf: &mut BytesMut) {
        buf.extend_from_slice(self.to_string().as_bytes());
    }

    fn is_unset(&self) -> bool {
        *self == UNSET_INTEGER
    }
}

impl WireField for f64 {
    fn write_text(&self, buf: &mut BytesMut) {
        if self.is_infinite() && self.is_sign_positive() {
            buf.extend_from_slice(b"Infinity");
        } else {
            buf.extend_from_slice(self.to_string().as_bytes());
        }
    }

    fn is_unset(&self) -> bool {
        *self == UNSET_DOUBLE
    }
}

impl WireField for bool {
    fn write_text(&self, buf: &mut BytesMut) {
        buf.put_u8(if *self { b'1' } else { b'0' });
    }
}

impl WireField for str {
    fn write_text(&self, buf: &mut BytesMut) {
        buf.extend_from_slice(self.as_bytes());
    }
}

impl WireField for String {
    fn write_text(&self, buf: &mut BytesMut) {
        buf.extend_from_slice(self.as_bytes());
    }
}

impl WireField for Decimal {
    fn write_text(&self, buf: &mut BytesMut) {
        buf.extend_from_slice(self.normalize().to_string().as_bytes());
    }
}

/// Printable ASCII plus tab, LF and CR.
fn is_ascii_printable(s: &[u8]) -> bool {
    s.iter()
        .all(|&b| (32..127).contains(&b) || b == 9 || b == 10 || b == 13)
}

// ============================================================================
// MessageEncoder
// ============================================================================

/// Builds a single outbound frame.
///
/// The first four bytes are reserved for the big-endian payload length and
/// filled in by [`finish`](MessageEncoder::finish).
pub struct MessageEncoder {
    buf: BytesMut,
    server_version: i32,
    embedded_nul: bool,
}

impl MessageEncoder {
    pub fn new(server_version: i32) -> Self {
        let mut buf = BytesMut::with_capacity(256);
        buf.put_bytes(0, HEADER_LEN);
        Self {
            buf,
            server_version,
            embedded_nul: false,
        }
    }

    pub fn server_version(&self) -> i32 {
        self.server_version
    }

    /// Append one field and its NUL terminator.
    pub fn field<T: WireField>(&mut self, value: T) -> &mut Self {
        let start = self.buf.len();
        if !value.is_unset() {
            value.write_text(&mut self.buf);
        }
        let text = &self.buf[start..];
        if text.contains(&0) {
            self.embedded_nul = true;
        } else if !text.is_empty() && !is_ascii_printable(text) {
            tracing::warn!(
                field = %String::from_utf8_lossy(text),
                "non-printable characters in outbound field"
            );
        }
        self.buf.put_u8(0);
        self
    }

    /// Append an empty field.
    pub fn empty(&mut self) -> &mut Self {
        self.buf.put_u8(0);
        self
    }

    /// Encode a tag/value list in its single-string form, `"k1=v1;k2=v2;"`.
    pub fn tag_values(&mut self, tags: &[TagValue]) -> &mut Self {
        let mut combined = String::new();
        for tv in tags {
            combined.push_str(&tv.tag);
            combined.push('=');
            combined.push_str(&tv.value);
            combined.push(';');
        }
        self.field(combined.as_str())
    }

    /// Encode a tag/value list in its count-prefixed form: `n, k1, v1, ...`.
    pub fn tag_value_pairs(&mut self, tags: &[TagValue]) -> &mut Self {
        self.field(tags.len());
        for tv in tags {
            self.field(tv.tag.as_str()).field(tv.value.as_str());
        }
        self
    }

    /// The common thirteen-field contract block.
    pub fn contract(&mut self, c: &Contract) -> &mut Self {
        self.field(c.con_id)
            .field(c.symbol.as_str())
            .field(c.sec_type.as_ref())
            .field(c.last_trade_date_or_contract_month.as_str())
            .field(c.strike)
            .field(c.right.as_ref())
            .field(c.multiplier.as_str())
            .field(c.exchange.as_str())
            .field(c.primary_exchange.as_str())
            .field(c.currency.as_str())
            .field(c.local_symbol.as_str())
            .field(c.trading_class.as_str())
            .field(c.include_expired)
    }

    /// Write the length prefix and hand back the complete frame.
    pub fn finish(mut self) -> Result<BytesMut> {
        if self.embedded_nul {
            return Err(IBApiError::Encoding("field contains an embedded NUL byte".into()));
        }
        let len = self.buf.len() - HEADER_LEN;
        if len > MAX_MSG_LEN {
            return Err(IBApiError::Encoding(format!(
                "message too long: {len} bytes (max {MAX_MSG_LEN})"
            )));
        }
        self.buf[..HEADER_LEN].copy_from_slice(&(len as u32).to_be_bytes());
        Ok(self.buf)
    }
}

// ============================================================================
// Handshake preamble
// ============================================================================

/// `API\0`, then a length-prefixed `v100..157[ options]` block with no NUL.
pub fn build_connect_request(connect_options: &str) -> Result<BytesMut> {
    let mut body = format!("v{MIN_CLIENT_VER}..{MAX_CLIENT_VER}");
    if !connect_options.is_empty() {
        body.push(' ');
        body.push_str(connect_options);
    }
    if body.len() > MAX_MSG_LEN {
        return Err(IBApiError::Encoding("connect request too long".into()));
    }

    let mut buf = BytesMut::with_capacity(API_SIGN.len() + HEADER_LEN + body.len());
    buf.extend_from_slice(API_SIGN);
    buf.put_u32(body.len() as u32);
    buf.extend_from_slice(body.as_bytes());
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{Right, SecType};
    use std::str::FromStr;

    fn encode_body(f: impl FnOnce(&mut MessageEncoder)) -> Vec<u8> {
        let mut enc = MessageEncoder::new(157);
        f(&mut enc);
        let buf = enc.finish().unwrap();
        buf[HEADER_LEN..].to_vec()
    }

    #[test]
    fn scalar_fields() {
        let body = encode_body(|enc| {
            enc.field(42).field(-7).field(1234567890123_i64).field(true).field(false);
        });
        assert_eq!(body, b"42\0-7\01234567890123\01\00\0");
    }

    #[test]
    fn floats_use_shortest_form() {
        let body = encode_body(|enc| {
            enc.field(10.5).field(100.0).field(f64::INFINITY);
        });
        assert_eq!(body, b"10.5\0100\0Infinity\0");
    }

    #[test]
    fn unset_sentinels_encode_empty() {
        let body = encode_body(|enc| {
            enc.field(None::<f64>)
                .field(Some(UNSET_DOUBLE))
                .field(UNSET_DOUBLE)
                .field(None::<i32>)
                .field(UNSET_INTEGER)
                .field(Some(3));
        });
        assert_eq!(body, b"\0\0\0\0\03\0");
    }

    #[test]
    fn strings_and_decimals() {
        let body = encode_body(|enc| {
            enc.field("AAPL")
                .field("")
                .field(&Decimal::from_str("100.50").unwrap())
                .field(Decimal::from(100));
        });
        assert_eq!(body, b"AAPL\0\0100.5\0100\0");
    }

    #[test]
    fn tag_value_forms_differ() {
        let tags = vec![TagValue::new("a", "1"), TagValue::new("b", "2")];
        let string_form = encode_body(|enc| {
            enc.tag_values(&tags);
        });
        assert_eq!(string_form, b"a=1;b=2;\0");

        let pair_form = encode_body(|enc| {
            enc.tag_value_pairs(&tags);
        });
        assert_eq!(pair_form, b"2\0a\01\0b\02\0");
    }

    #[test]
    fn contract_block() {
        let c = Contract {
            con_id: 265598,
            symbol: "AAPL".into(),
            sec_type: Some(SecType::Option),
            last_trade_date_or_contract_month: "20250117".into(),
            strike: Some(150.0),
            right: Some(Right::Call),
            multiplier: "100".into(),
            exchange: "SMART".into(),
            currency: "USD".into(),
            ..Default::default()
        };
        let body = encode_body(|enc| {
            enc.contract(&c);
        });
        assert_eq!(
            body,
            b"265598\0AAPL\0OPT\020250117\0150\0C\0100\0SMART\0\0USD\0\0\00\0"
        );
    }

    #[test]
    fn length_prefix_matches_payload() {
        let mut enc = MessageEncoder::new(157);
        enc.field(49).field(1);
        let frame = enc.finish().unwrap();
        assert_eq!(&frame[..], b"\x00\x00\x00\x0549\x001\x00");
    }

    #[test]
    fn embedded_nul_is_rejected() {
        let mut enc = MessageEncoder::new(157);
        enc.field("bad\0field");
        assert!(matches!(enc.finish(), Err(IBApiError::Encoding(_))));
    }

    #[test]
    fn connect_request() {
        let buf = build_connect_request("").unwrap();
        assert_eq!(&buf[..4], b"API\0");
        assert_eq!(&buf[4..8], &9u32.to_be_bytes());
        assert_eq!(&buf[8..], b"v100..157");

        let buf = build_connect_request("+PACEAPI").unwrap();
        assert_eq!(&buf[8..], b"v100..157 +PACEAPI");
    }
}
