//! Orders, order state and order conditions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::{SoftDollarTier, TagValue};
use super::enums::*;

// ============================================================================
// OrderCondition
// ============================================================================

/// A condition attached to an order.
///
/// `conjunction` is true when the condition is AND-ed with the next one
/// (`"a"` on the wire) and false for OR (`"o"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OrderCondition {
    Price {
        conjunction: bool,
        is_more: bool,
        price: f64,
        con_id: i32,
        exchange: String,
        trigger_method: TriggerMethod,
    },
    Time {
        conjunction: bool,
        is_more: bool,
        time: String,
    },
    Margin {
        conjunction: bool,
        is_more: bool,
        percent: i32,
    },
    Execution {
        conjunction: bool,
        sec_type: String,
        exchange: String,
        symbol: String,
    },
    Volume {
        conjunction: bool,
        is_more: bool,
        volume: i32,
        con_id: i32,
        exchange: String,
    },
    PercentChange {
        conjunction: bool,
        is_more: bool,
        change_percent: f64,
        con_id: i32,
        exchange: String,
    },
}

impl OrderCondition {
    pub fn condition_type(&self) -> OrderConditionType {
        match self {
            OrderCondition::Price { .. } => OrderConditionType::Price,
            OrderCondition::Time { .. } => OrderConditionType::Time,
            OrderCondition::Margin { .. } => OrderConditionType::Margin,
            OrderCondition::Execution { .. } => OrderConditionType::Execution,
            OrderCondition::Volume { .. } => OrderConditionType::Volume,
            OrderCondition::PercentChange { .. } => OrderConditionType::PercentChange,
        }
    }

    pub fn conjunction(&self) -> bool {
        match self {
            OrderCondition::Price { conjunction, .. }
            | OrderCondition::Time { conjunction, .. }
            | OrderCondition::Margin { conjunction, .. }
            | OrderCondition::Execution { conjunction, .. }
            | OrderCondition::Volume { conjunction, .. }
            | OrderCondition::PercentChange { conjunction, .. } => *conjunction,
        }
    }
}

/// Per-leg limit price of a combo order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderComboLeg {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

// ============================================================================
// Order
// ============================================================================

/// Everything a PLACE_ORDER request can carry, and what OPEN_ORDER and
/// COMPLETED_ORDER report back.
///
/// Numeric fields that may be left unset are `Option`; they go out as empty
/// fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Order {
    // ----- Identification -----
    pub order_id: i32,
    pub client_id: i32,
    pub perm_id: i64,
    pub parent_id: i32,

    // ----- Main fields -----
    pub action: Option<Action>,
    pub total_quantity: Decimal,
    pub order_type: Option<OrderType>,
    pub lmt_price: Option<f64>,
    pub aux_price: Option<f64>,

    // ----- Extended fields -----
    pub tif: Option<TimeInForce>,
    pub active_start_time: String,
    pub active_stop_time: String,
    pub oca_group: String,
    pub oca_type: i32,
    pub order_ref: String,
    pub transmit: bool,
    pub block_order: bool,
    pub sweep_to_fill: bool,
    pub display_size: Option<i32>,
    pub trigger_method: TriggerMethod,
    pub outside_rth: bool,
    pub hidden: bool,
    pub good_after_time: String,
    pub good_till_date: String,
    pub rule_80a: String,
    pub all_or_none: bool,
    pub min_qty: Option<i32>,
    pub percent_offset: Option<f64>,
    pub override_percentage_constraints: bool,
    pub trail_stop_price: Option<f64>,
    pub trailing_percent: Option<f64>,

    // ----- Financial advisors -----
    pub fa_group: String,
    pub fa_method: String,
    pub fa_percentage: String,

    // ----- Institutional -----
    pub open_close: String,
    pub origin: Origin,
    pub short_sale_slot: i32,
    pub designated_location: String,
    pub exempt_code: i32,

    // ----- SMART routing -----
    pub discretionary_amt: f64,
    pub opt_out_smart_routing: bool,

    // ----- BOX exchange -----
    pub auction_strategy: i32,
    pub starting_price: Option<f64>,
    pub stock_ref_price: Option<f64>,
    pub delta: Option<f64>,

    // ----- Pegged to stock / VOL -----
    pub stock_range_lower: Option<f64>,
    pub stock_range_upper: Option<f64>,
    pub randomize_size: bool,
    pub randomize_price: bool,

    // ----- Volatility -----
    pub volatility: Option<f64>,
    pub volatility_type: Option<i32>,
    pub delta_neutral_order_type: String,
    pub delta_neutral_aux_price: Option<f64>,
    pub delta_neutral_con_id: i32,
    pub delta_neutral_settling_firm: String,
    pub delta_neutral_clearing_account: String,
    pub delta_neutral_clearing_intent: String,
    pub delta_neutral_open_close: String,
    pub delta_neutral_short_sale: bool,
    pub delta_neutral_short_sale_slot: i32,
    pub delta_neutral_designated_location: String,
    pub continuous_update: bool,
    pub reference_price_type: Option<i32>,

    // ----- Combos -----
    pub basis_points: Option<f64>,
    pub basis_points_type: Option<i32>,
    pub order_combo_legs: Vec<OrderComboLeg>,
    pub smart_combo_routing_params: Vec<TagValue>,

    // ----- Scale -----
    pub scale_init_level_size: Option<i32>,
    pub scale_subs_level_size: Option<i32>,
    pub scale_price_increment: Option<f64>,
    pub scale_price_adjust_value: Option<f64>,
    pub scale_price_adjust_interval: Option<i32>,
    pub scale_profit_offset: Option<f64>,
    pub scale_auto_reset: bool,
    pub scale_init_position: Option<i32>,
    pub scale_init_fill_qty: Option<i32>,
    pub scale_random_percent: bool,
    pub scale_table: String,

    // ----- Hedge -----
    pub hedge_type: String,
    pub hedge_param: String,

    // ----- Clearing -----
    pub account: String,
    pub settling_firm: String,
    pub clearing_account: String,
    pub clearing_intent: String,

    // ----- Algo -----
    pub algo_strategy: String,
    pub algo_params: Vec<TagValue>,
    pub algo_id: String,

    pub what_if: bool,
    pub not_held: bool,
    pub solicited: bool,
    pub model_code: String,
    pub order_misc_options: Vec<TagValue>,

    // ----- Pegged to benchmark and adjustments -----
    pub reference_contract_id: i32,
    pub pegged_change_amount: f64,
    pub is_pegged_change_amount_decrease: bool,
    pub reference_change_amount: f64,
    pub reference_exchange_id: String,
    pub adjusted_order_type: String,
    pub trigger_price: Option<f64>,
    pub lmt_price_offset: Option<f64>,
    pub adjusted_stop_price: Option<f64>,
    pub adjusted_stop_limit_price: Option<f64>,
    pub adjusted_trailing_amount: Option<f64>,
    pub adjustable_trailing_unit: i32,

    // ----- Conditions -----
    pub conditions: Vec<OrderCondition>,
    pub conditions_ignore_rth: bool,
    pub conditions_cancel_order: bool,

    pub ext_operator: String,
    pub soft_dollar_tier: SoftDollarTier,
    pub cash_qty: Option<f64>,

    // ----- MiFID II -----
    pub mifid2_decision_maker: String,
    pub mifid2_decision_algo: String,
    pub mifid2_execution_trader: String,
    pub mifid2_execution_algo: String,

    pub dont_use_auto_price_for_hedge: bool,
    pub is_oms_container: bool,
    pub discretionary_up_to_limit_price: bool,
    pub use_price_mgmt_algo: Option<bool>,

    // ----- Reported by COMPLETED_ORDER only -----
    pub auto_cancel_date: String,
    pub filled_quantity: Option<Decimal>,
    pub ref_futures_con_id: i32,
    pub auto_cancel_parent: bool,
    pub shareholder: String,
    pub imbalance_only: bool,
    pub route_marketable_to_bbo: bool,
    pub parent_perm_id: i64,
}

impl Default for Order {
    fn default() -> Self {
        Self {
            order_id: 0,
            client_id: 0,
            perm_id: 0,
            parent_id: 0,
            action: None,
            total_quantity: Decimal::ZERO,
            order_type: None,
            lmt_price: None,
            aux_price: None,
            tif: None,
            active_start_time: String::new(),
            active_stop_time: String::new(),
            oca_group: String::new(),
            oca_type: 0,
            order_ref: String::new(),
            transmit: true,
            block_order: false,
            sweep_to_fill: false,
            display_size: None,
            trigger_method: TriggerMethod::Default,
            outside_rth: false,
            hidden: false,
            good_after_time: String::new(),
            good_till_date: String::new(),
            rule_80a: String::new(),
            all_or_none: false,
            min_qty: None,
            percent_offset: None,
            override_percentage_constraints: false,
            trail_stop_price: None,
            trailing_percent: None,
            fa_group: String::new(),
            fa_method: String::new(),
            fa_percentage: String::new(),
            open_close: String::new(),
            origin: Origin::Customer,
            short_sale_slot: 0,
            designated_location: String::new(),
            exempt_code: -1,
            discretionary_amt: 0.0,
            opt_out_smart_routing: false,
            auction_strategy: 0,
            starting_price: None,
            stock_ref_price: None,
            delta: None,
            stock_range_lower: None,
            stock_range_upper: None,
            randomize_size: false,
            randomize_price: false,
            volatility: None,
            volatility_type: None,
            delta_neutral_order_type: String::new(),
            delta_neutral_aux_price: None,
            delta_neutral_con_id: 0,
            delta_neutral_settling_firm: String::new(),
            delta_neutral_clearing_account: String::new(),
            delta_neutral_clearing_intent: String::new(),
            delta_neutral_open_close: String::new(),
            delta_neutral_short_sale: false,
            delta_neutral_short_sale_slot: 0,
            delta_neutral_designated_location: String::new(),
            continuous_update: false,
            reference_price_type: None,
            basis_points: None,
            basis_points_type: None,
            order_combo_legs: Vec::new(),
            smart_combo_routing_params: Vec::new(),
            scale_init_level_size: None,
            scale_subs_level_size: None,
            scale_price_increment: None,
            scale_price_adjust_value: None,
            scale_price_adjust_interval: None,
            scale_profit_offset: None,
            scale_auto_reset: false,
            scale_init_position: None,
            scale_init_fill_qty: None,
            scale_random_percent: false,
            scale_table: String::new(),
            hedge_type: String::new(),
            hedge_param: String::new(),
            account: String::new(),
            settling_firm: String::new(),
            clearing_account: String::new(),
            clearing_intent: String::new(),
            algo_strategy: String::new(),
            algo_params: Vec::new(),
            algo_id: String::new(),
            what_if: false,
            not_held: false,
            solicited: false,
            model_code: String::new(),
            order_misc_options: Vec::new(),
            reference_contract_id: 0,
            pegged_change_amount: 0.0,
            is_pegged_change_amount_decrease: false,
            reference_change_amount: 0.0,
            reference_exchange_id: String::new(),
            adjusted_order_type: String::new(),
            trigger_price: None,
            lmt_price_offset: None,
            adjusted_stop_price: None,
            adjusted_stop_limit_price: None,
            adjusted_trailing_amount: None,
            adjustable_trailing_unit: 0,
            conditions: Vec::new(),
            conditions_ignore_rth: false,
            conditions_cancel_order: false,
            ext_operator: String::new(),
            soft_dollar_tier: SoftDollarTier::default(),
            cash_qty: None,
            mifid2_decision_maker: String::new(),
            mifid2_decision_algo: String::new(),
            mifid2_execution_trader: String::new(),
            mifid2_execution_algo: String::new(),
            dont_use_auto_price_for_hedge: false,
            is_oms_container: false,
            discretionary_up_to_limit_price: false,
            use_price_mgmt_algo: None,
            auto_cancel_date: String::new(),
            filled_quantity: None,
            ref_futures_con_id: 0,
            auto_cancel_parent: false,
            shareholder: String::new(),
            imbalance_only: false,
            route_marketable_to_bbo: false,
            parent_perm_id: 0,
        }
    }
}

impl Order {
    pub fn limit(action: Action, quantity: Decimal, price: f64) -> Self {
        Self {
            action: Some(action),
            total_quantity: quantity,
            order_type: Some(OrderType::Limit),
            lmt_price: Some(price),
            ..Default::default()
        }
    }

    pub fn market(action: Action, quantity: Decimal) -> Self {
        Self {
            action: Some(action),
            total_quantity: quantity,
            order_type: Some(OrderType::Market),
            ..Default::default()
        }
    }

    /// True when the scale fields beyond the increment are meaningful.
    pub fn has_scale_extension(&self) -> bool {
        matches!(self.scale_price_increment, Some(inc) if inc > 0.0 && inc != crate::protocol::UNSET_DOUBLE)
    }
}

// ============================================================================
// OrderState
// ============================================================================

/// Status and what-if margin/commission preview carried with OPEN_ORDER.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderState {
    pub status: String,

    pub init_margin_before: String,
    pub maint_margin_before: String,
    pub equity_with_loan_before: String,
    pub init_margin_change: String,
    pub maint_margin_change: String,
    pub equity_with_loan_change: String,
    pub init_margin_after: String,
    pub maint_margin_after: String,
    pub equity_with_loan_after: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_commission: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_commission: Option<f64>,
    pub commission_currency: String,
    pub warning_text: String,

    pub completed_time: String,
    pub completed_status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_defaults() {
        let order = Order::default();
        assert!(order.transmit);
        assert_eq!(order.origin, Origin::Customer);
        assert_eq!(order.exempt_code, -1);
        assert!(order.lmt_price.is_none());
        assert!(order.use_price_mgmt_algo.is_none());
        assert!(order.conditions.is_empty());
    }

    #[test]
    fn scale_extension_requires_positive_increment() {
        let mut order = Order::default();
        assert!(!order.has_scale_extension());
        order.scale_price_increment = Some(0.0);
        assert!(!order.has_scale_extension());
        order.scale_price_increment = Some(0.05);
        assert!(order.has_scale_extension());
    }

    #[test]
    fn condition_serde_is_tagged() {
        let cond = OrderCondition::Margin {
            conjunction: true,
            is_more: false,
            percent: 30,
        };
        let json = serde_json::to_value(&cond).unwrap();
        assert_eq!(json["type"], "margin");
        let back: OrderCondition = serde_json::from_value(json).unwrap();
        assert_eq!(back, cond);
        assert_eq!(back.condition_type(), OrderConditionType::Margin);
    }

    #[test]
    fn partial_order_json_keeps_defaults() {
        let order: Order =
            serde_json::from_str(r#"{"action":"BUY","orderType":"LMT","lmtPrice":10.5}"#).unwrap();
        assert_eq!(order.order_type, Some(OrderType::Limit));
        assert!(order.transmit);
        assert_eq!(order.exempt_code, -1);
    }
}
