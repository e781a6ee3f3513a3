//! Tick attributes and market-depth descriptors.

use serde::{Deserialize, Serialize};

/// Flags unpacked from the attribute mask of a TICK_PRICE record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickAttrib {
    pub can_auto_execute: bool,
    pub past_limit: bool,
    pub pre_open: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickAttribBidAsk {
    pub bid_past_low: bool,
    pub ask_past_high: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickAttribLast {
    pub past_limit: bool,
    pub unreported: bool,
}

impl TickAttribBidAsk {
    /// Bit 0 = bid past low, bit 1 = ask past high.
    pub fn from_mask(mask: i32) -> Self {
        Self {
            bid_past_low: mask & 1 != 0,
            ask_past_high: mask & 2 != 0,
        }
    }
}

impl TickAttribLast {
    /// Bit 0 = past limit, bit 1 = unreported.
    pub fn from_mask(mask: i32) -> Self {
        Self {
            past_limit: mask & 1 != 0,
            unreported: mask & 2 != 0,
        }
    }
}

/// An exchange offering market depth, from MKT_DEPTH_EXCHANGES.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthMktDataDescription {
    pub exchange: String,
    pub sec_type: String,
    pub listing_exch: String,
    pub service_data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agg_group: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_unpack_bits() {
        let ba = TickAttribBidAsk::from_mask(2);
        assert!(!ba.bid_past_low);
        assert!(ba.ask_past_high);

        let last = TickAttribLast::from_mask(3);
        assert!(last.past_limit && last.unreported);
    }
}
