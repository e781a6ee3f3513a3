//! Instrument definitions and the contract-details reply.

use serde::{Deserialize, Serialize};

use super::common::TagValue;
use super::enums::*;

// ============================================================================
// ComboLeg
// ============================================================================

/// One leg of a `BAG` contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboLeg {
    pub con_id: i32,
    pub ratio: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    pub exchange: String,
    pub open_close: LegOpenClose,
    /// 1 = clearing broker, 2 = third party.
    pub short_sale_slot: i32,
    pub designated_location: String,
    pub exempt_code: i32,
}

impl Default for ComboLeg {
    fn default() -> Self {
        Self {
            con_id: 0,
            ratio: 0,
            action: None,
            exchange: String::new(),
            open_close: LegOpenClose::Same,
            short_sale_slot: 0,
            designated_location: String::new(),
            exempt_code: -1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaNeutralContract {
    pub con_id: i32,
    pub delta: f64,
    pub price: f64,
}

// ============================================================================
// Contract
// ============================================================================

/// A tradable instrument as the server identifies it.
///
/// `con_id` alone is enough for most requests; the symbolic fields are used
/// when it is zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub con_id: i32,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sec_type: Option<SecType>,
    pub last_trade_date_or_contract_month: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<Right>,
    pub multiplier: String,
    pub exchange: String,
    pub primary_exchange: String,
    pub currency: String,
    pub local_symbol: String,
    pub trading_class: String,
    pub include_expired: bool,
    /// "CUSIP", "SEDOL", "ISIN" or "RIC".
    pub sec_id_type: String,
    pub sec_id: String,
    pub combo_legs_descrip: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub combo_legs: Vec<ComboLeg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_neutral_contract: Option<DeltaNeutralContract>,
}

impl Contract {
    /// A SMART-routed stock.
    pub fn stock(symbol: &str, currency: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            sec_type: Some(SecType::Stock),
            exchange: "SMART".to_string(),
            currency: currency.to_string(),
            ..Default::default()
        }
    }

    pub fn is_combo(&self) -> bool {
        self.sec_type == Some(SecType::Combo)
    }

    pub fn is_bond(&self) -> bool {
        self.sec_type == Some(SecType::Bond)
    }
}

// ============================================================================
// ContractDetails
// ============================================================================

/// Reply to a contract-details request; bond replies fill the bond section
/// and leave the equity/derivative descriptors empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDetails {
    pub contract: Contract,
    pub market_name: String,
    pub min_tick: f64,
    pub order_types: String,
    pub valid_exchanges: String,
    pub price_magnifier: i32,
    pub under_con_id: i32,
    pub long_name: String,
    pub contract_month: String,
    pub industry: String,
    pub category: String,
    pub subcategory: String,
    pub time_zone_id: String,
    pub trading_hours: String,
    pub liquid_hours: String,
    pub ev_rule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ev_multiplier: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md_size_multiplier: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agg_group: Option<i32>,
    pub under_symbol: String,
    pub under_sec_type: String,
    pub market_rule_ids: String,
    pub real_expiration_date: String,
    pub last_trade_time: String,
    pub stock_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sec_id_list: Vec<TagValue>,

    // ----- Bond fields -----
    pub cusip: String,
    pub ratings: String,
    pub desc_append: String,
    pub bond_type: String,
    pub coupon_type: String,
    pub callable: bool,
    pub putable: bool,
    pub coupon: f64,
    pub convertible: bool,
    pub maturity: String,
    pub issue_date: String,
    pub next_option_date: String,
    pub next_option_type: String,
    pub next_option_partial: bool,
    pub notes: String,
}

/// A MATCHING_SYMBOLS entry: the contract plus the derivative security
/// types available on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDescription {
    pub contract: Contract,
    pub derivative_sec_types: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combo_leg_defaults_exempt_code() {
        assert_eq!(ComboLeg::default().exempt_code, -1);
    }

    #[test]
    fn stock_helper() {
        let c = Contract::stock("AAPL", "USD");
        assert_eq!(c.sec_type, Some(SecType::Stock));
        assert_eq!(c.exchange, "SMART");
        assert!(!c.is_combo());
    }

    #[test]
    fn serializes_camel_case_and_skips_unset() {
        let c = Contract::stock("IBM", "USD");
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["secType"], "STK");
        assert!(json.get("strike").is_none());
        assert!(json.get("comboLegs").is_none());
    }
}
