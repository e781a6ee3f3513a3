//! Small records shared by several message kinds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// TagValue
// ============================================================================

/// Key/value option used by algo parameters, misc options and chart options.
///
/// Depending on the request kind the list travels either as one
/// `"k1=v1;k2=v2;"` string or as a count followed by tag and value fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagValue {
    pub tag: String,
    pub value: String,
}

impl TagValue {
    pub fn new(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            value: value.into(),
        }
    }
}

// ============================================================================
// SoftDollarTier
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftDollarTier {
    pub name: String,
    pub value: String,
    pub display_name: String,
}

// ============================================================================
// Reference data
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyCode {
    pub account_id: String,
    pub family_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsProvider {
    pub code: String,
    pub name: String,
}

/// One bucket of a HISTOGRAM_DATA reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramEntry {
    pub price: f64,
    pub size: Decimal,
}

/// Minimum tick above `low_edge`, from a MARKET_RULE reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceIncrement {
    pub low_edge: f64,
    pub increment: f64,
}

/// Exchange behind one bit of a SMART routing mask.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartComponent {
    pub bit_number: i32,
    pub exchange: String,
    pub exchange_letter: String,
}
