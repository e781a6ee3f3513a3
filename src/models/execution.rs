//! Fills, execution filters and commission reports.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One fill, as reported by EXECUTION_DATA.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub exec_id: String,
    pub time: String,
    pub acct_number: String,
    pub exchange: String,
    /// "BOT" or "SLD".
    pub side: String,
    pub shares: Decimal,
    pub price: f64,
    pub perm_id: i64,
    pub client_id: i32,
    pub order_id: i32,
    pub liquidation: i32,
    pub cum_qty: Decimal,
    pub avg_price: f64,
    pub order_ref: String,
    pub ev_rule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ev_multiplier: Option<f64>,
    pub model_code: String,
    pub last_liquidity: i32,
}

/// Narrows a REQ_EXECUTIONS request. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExecutionFilter {
    pub client_id: i32,
    pub acct_code: String,
    /// "yyyymmdd hh:mm:ss"; executions after this time.
    pub time: String,
    pub symbol: String,
    pub sec_type: String,
    pub exchange: String,
    pub side: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionReport {
    pub exec_id: String,
    pub commission: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realized_pnl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#yield: Option<f64>,
    /// YYYYMMDD, zero when absent.
    pub yield_redemption_date: i32,
}
