//! Bars and historical ticks.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::market_data::{TickAttribBidAsk, TickAttribLast};

// ============================================================================
// Bar
// ============================================================================

/// One OHLCV bar from HISTORICAL_DATA or HISTORICAL_DATA_UPDATE.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    /// Bar start, formatted per the request's `formatDate`.
    pub time: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Decimal,
    pub wap: Decimal,
    pub count: i32,
}

/// Five-second bar from REAL_TIME_BARS.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealTimeBar {
    /// Epoch seconds.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Decimal,
    pub wap: Decimal,
    pub count: i32,
}

// ============================================================================
// Historical ticks
// ============================================================================

/// A MIDPOINT/TRADES historical tick without attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalTick {
    pub time: i64,
    pub price: f64,
    pub size: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalTickBidAsk {
    pub time: i64,
    pub attrib: TickAttribBidAsk,
    pub price_bid: f64,
    pub price_ask: f64,
    pub size_bid: Decimal,
    pub size_ask: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalTickLast {
    pub time: i64,
    pub attrib: TickAttribLast,
    pub price: f64,
    pub size: Decimal,
    pub exchange: String,
    pub special_conditions: String,
}
