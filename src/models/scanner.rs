//! Market scanner subscription and results.

use serde::{Deserialize, Serialize};

use super::contract::ContractDetails;

/// Parameters of a REQ_SCANNER_SUBSCRIPTION request.
///
/// Unset numeric filters are sent as empty fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScannerSubscription {
    /// -1 lets the server pick.
    pub number_of_rows: i32,
    pub instrument: String,
    pub location_code: String,
    pub scan_code: String,
    pub above_price: Option<f64>,
    pub below_price: Option<f64>,
    pub above_volume: Option<i32>,
    pub market_cap_above: Option<f64>,
    pub market_cap_below: Option<f64>,
    pub moody_rating_above: String,
    pub moody_rating_below: String,
    pub sp_rating_above: String,
    pub sp_rating_below: String,
    pub maturity_date_above: String,
    pub maturity_date_below: String,
    pub coupon_rate_above: Option<f64>,
    pub coupon_rate_below: Option<f64>,
    pub exclude_convertible: bool,
    pub average_option_volume_above: Option<i32>,
    pub scanner_setting_pairs: String,
    pub stock_type_filter: String,
}

impl Default for ScannerSubscription {
    fn default() -> Self {
        Self {
            number_of_rows: -1,
            instrument: String::new(),
            location_code: String::new(),
            scan_code: String::new(),
            above_price: None,
            below_price: None,
            above_volume: None,
            market_cap_above: None,
            market_cap_below: None,
            moody_rating_above: String::new(),
            moody_rating_below: String::new(),
            sp_rating_above: String::new(),
            sp_rating_below: String::new(),
            maturity_date_above: String::new(),
            maturity_date_below: String::new(),
            coupon_rate_above: None,
            coupon_rate_below: None,
            exclude_convertible: false,
            average_option_volume_above: None,
            scanner_setting_pairs: String::new(),
            stock_type_filter: String::new(),
        }
    }
}

/// One ranked row of a SCANNER_DATA reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerDataItem {
    pub rank: i32,
    pub contract_details: ContractDetails,
    pub distance: String,
    pub benchmark: String,
    pub projection: String,
    pub legs_str: String,
}
