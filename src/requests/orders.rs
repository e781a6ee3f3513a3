//! Order placement, cancellation and order queries.
//!
//! PLACE_ORDER is the largest outbound record. Its pre-send checks live in
//! [`PLACE_ORDER_GATES`], an ordered table of (minimum version, feature,
//! predicate) rows. The first row whose feature is used by the order but not
//! supported by the server rejects the request.

use bytes::BytesMut;
use rust_decimal::prelude::ToPrimitive;

use super::market_data::write_delta_neutral;
use super::RequestEncoder;
use crate::encoder::MessageEncoder;
use crate::errors::Result;
use crate::models::contract::Contract;
use crate::models::enums::OrderType;
use crate::models::order::{Order, OrderCondition};
use crate::protocol::{outgoing, server_version as sv, NO_VALID_ID, UNSET_DOUBLE, UNSET_INTEGER};

/// One pre-send check for PLACE_ORDER.
pub struct OrderGate {
    pub min_version: i32,
    /// Completes "It does not support ...".
    pub feature: &'static str,
    pub uses: fn(&Contract, &Order) -> bool,
}

fn set_f64(v: Option<f64>) -> bool {
    matches!(v, Some(x) if x != UNSET_DOUBLE)
}

fn set_i32(v: Option<i32>) -> bool {
    matches!(v, Some(x) if x != UNSET_INTEGER)
}

pub static PLACE_ORDER_GATES: &[OrderGate] = &[
    OrderGate {
        min_version: sv::SCALE_ORDERS,
        feature: "Scale orders",
        uses: |_, o| set_i32(o.scale_init_level_size) || set_f64(o.scale_price_increment),
    },
    OrderGate {
        min_version: sv::SSHORT_COMBO_LEGS,
        feature: "SSHORT flag for combo legs",
        uses: |c, _| {
            c.combo_legs
                .iter()
                .any(|leg| leg.short_sale_slot != 0 || !leg.designated_location.is_empty())
        },
    },
    OrderGate {
        min_version: sv::WHAT_IF_ORDERS,
        feature: "what-if orders",
        uses: |_, o| o.what_if,
    },
    OrderGate {
        min_version: sv::DELTA_NEUTRAL,
        feature: "delta-neutral orders",
        uses: |c, _| c.delta_neutral_contract.is_some(),
    },
    OrderGate {
        min_version: sv::SCALE_ORDERS2,
        feature: "Subsequent Level Size for Scale orders",
        uses: |_, o| set_i32(o.scale_subs_level_size),
    },
    OrderGate {
        min_version: sv::ALGO_ORDERS,
        feature: "algo orders",
        uses: |_, o| !o.algo_strategy.is_empty(),
    },
    OrderGate {
        min_version: sv::NOT_HELD,
        feature: "notHeld parameter",
        uses: |_, o| o.not_held,
    },
    OrderGate {
        min_version: sv::SEC_ID_TYPE,
        feature: "secIdType and secId parameters",
        uses: |c, _| !c.sec_id_type.is_empty() || !c.sec_id.is_empty(),
    },
    OrderGate {
        min_version: sv::PLACE_ORDER_CONID,
        feature: "conId parameter",
        uses: |c, _| c.con_id > 0,
    },
    OrderGate {
        min_version: sv::SSHORTX,
        feature: "exemptCode parameter",
        uses: |c, o| o.exempt_code != -1 || c.combo_legs.iter().any(|leg| leg.exempt_code != -1),
    },
    OrderGate {
        min_version: sv::HEDGE_ORDERS,
        feature: "hedge orders",
        uses: |_, o| !o.hedge_type.is_empty(),
    },
    OrderGate {
        min_version: sv::OPT_OUT_SMART_ROUTING,
        feature: "optOutSmartRouting parameter",
        uses: |_, o| o.opt_out_smart_routing,
    },
    OrderGate {
        min_version: sv::DELTA_NEUTRAL_CONID,
        feature: "deltaNeutral parameters: ConId, SettlingFirm, ClearingAccount, ClearingIntent",
        uses: |_, o| {
            o.delta_neutral_con_id > 0
                || !o.delta_neutral_settling_firm.is_empty()
                || !o.delta_neutral_clearing_account.is_empty()
                || !o.delta_neutral_clearing_intent.is_empty()
        },
    },
    OrderGate {
        min_version: sv::SCALE_ORDERS3,
        feature: "Scale order parameters: PriceAdjustValue, PriceAdjustInterval, ProfitOffset, \
                  AutoReset, InitPosition, InitFillQty and RandomPercent",
        uses: |_, o| {
            o.has_scale_extension()
                && (set_f64(o.scale_price_adjust_value)
                    || set_i32(o.scale_price_adjust_interval)
                    || set_f64(o.scale_profit_offset)
                    || o.scale_auto_reset
                    || set_i32(o.scale_init_position)
                    || set_i32(o.scale_init_fill_qty)
                    || o.scale_random_percent)
        },
    },
    OrderGate {
        min_version: sv::ORDER_COMBO_LEGS_PRICE,
        feature: "per-leg prices for order combo legs",
        uses: |c, o| c.is_combo() && o.order_combo_legs.iter().any(|leg| set_f64(leg.price)),
    },
    OrderGate {
        min_version: sv::TRAILING_PERCENT,
        feature: "trailing percent parameter",
        uses: |_, o| set_f64(o.trailing_percent),
    },
    OrderGate {
        min_version: sv::DELTA_NEUTRAL_OPEN_CLOSE,
        feature: "deltaNeutral parameters: OpenClose, ShortSale, ShortSaleSlot, DesignatedLocation",
        uses: |_, o| {
            !o.delta_neutral_open_close.is_empty()
                || o.delta_neutral_short_sale
                || o.delta_neutral_short_sale_slot > 0
                || !o.delta_neutral_designated_location.is_empty()
        },
    },
    OrderGate {
        min_version: sv::TRADING_CLASS,
        feature: "tradingClass parameter in placeOrder",
        uses: |c, _| !c.trading_class.is_empty(),
    },
    OrderGate {
        min_version: sv::SCALE_TABLE,
        feature: "scaleTable, activeStartTime and activeStopTime parameters",
        uses: |_, o| {
            !o.scale_table.is_empty()
                || !o.active_start_time.is_empty()
                || !o.active_stop_time.is_empty()
        },
    },
    OrderGate {
        min_version: sv::ALGO_ID,
        feature: "algoId parameter",
        uses: |_, o| !o.algo_id.is_empty(),
    },
    OrderGate {
        min_version: sv::ORDER_SOLICITED,
        feature: "order solicited parameter",
        uses: |_, o| o.solicited,
    },
    OrderGate {
        min_version: sv::RANDOMIZE_SIZE_AND_PRICE,
        feature: "randomizing size and price",
        uses: |_, o| o.randomize_size || o.randomize_price,
    },
    OrderGate {
        min_version: sv::PEGGED_TO_BENCHMARK,
        feature: "conditional and pegged-to-benchmark orders",
        uses: |_, o| {
            !o.conditions.is_empty()
                || o.order_type == Some(OrderType::PeggedToBenchmark)
                || !o.adjusted_order_type.is_empty()
        },
    },
    OrderGate {
        min_version: sv::MODELS_SUPPORT,
        feature: "model code parameter",
        uses: |_, o| !o.model_code.is_empty(),
    },
    OrderGate {
        min_version: sv::EXT_OPERATOR,
        feature: "ext operator parameter",
        uses: |_, o| !o.ext_operator.is_empty(),
    },
    OrderGate {
        min_version: sv::SOFT_DOLLAR_TIER,
        feature: "soft dollar tier",
        uses: |_, o| !o.soft_dollar_tier.name.is_empty() || !o.soft_dollar_tier.value.is_empty(),
    },
    OrderGate {
        min_version: sv::CASH_QTY,
        feature: "cash quantity parameter",
        uses: |_, o| set_f64(o.cash_qty),
    },
    OrderGate {
        min_version: sv::DECISION_MAKER,
        feature: "MIFID II decision maker parameters",
        uses: |_, o| !o.mifid2_decision_maker.is_empty() || !o.mifid2_decision_algo.is_empty(),
    },
    OrderGate {
        min_version: sv::MIFID_EXECUTION,
        feature: "MIFID II execution parameters",
        uses: |_, o| !o.mifid2_execution_trader.is_empty() || !o.mifid2_execution_algo.is_empty(),
    },
    OrderGate {
        min_version: sv::AUTO_PRICE_FOR_HEDGE,
        feature: "dontUseAutoPriceForHedge parameter",
        uses: |_, o| o.dont_use_auto_price_for_hedge,
    },
    OrderGate {
        min_version: sv::ORDER_CONTAINER,
        feature: "oms container parameter",
        uses: |_, o| o.is_oms_container,
    },
    OrderGate {
        min_version: sv::D_PEG_ORDERS,
        feature: "D-Peg orders",
        uses: |_, o| o.discretionary_up_to_limit_price,
    },
    OrderGate {
        min_version: sv::PRICE_MGMT_ALGO,
        feature: "Use price management algo requests",
        uses: |_, o| o.use_price_mgmt_algo.is_some(),
    },
];

impl RequestEncoder {
    /// First gate the order trips at this server version, if any.
    pub fn place_order_gate(&self, contract: &Contract, order: &Order) -> Option<&'static OrderGate> {
        PLACE_ORDER_GATES
            .iter()
            .find(|g| !self.supports(g.min_version) && (g.uses)(contract, order))
    }

    pub fn place_order(&self, id: i32, contract: &Contract, order: &Order) -> Result<BytesMut> {
        if let Some(gate) = self.place_order_gate(contract, order) {
            return Err(super::unsupported(id, gate.feature));
        }

        let mut enc = self.message(outgoing::PLACE_ORDER);
        if !self.supports(sv::ORDER_CONTAINER) {
            enc.field(if self.supports(sv::NOT_HELD) { 45 } else { 27 });
        }
        enc.field(id);

        // contract
        if self.supports(sv::PLACE_ORDER_CONID) {
            enc.field(contract.con_id);
        }
        enc.field(contract.symbol.as_str())
            .field(contract.sec_type.as_ref())
            .field(contract.last_trade_date_or_contract_month.as_str())
            .field(contract.strike)
            .field(contract.right.as_ref())
            .field(contract.multiplier.as_str())
            .field(contract.exchange.as_str())
            .field(contract.primary_exchange.as_str())
            .field(contract.currency.as_str())
            .field(contract.local_symbol.as_str());
        if self.supports(sv::TRADING_CLASS) {
            enc.field(contract.trading_class.as_str());
        }
        if self.supports(sv::SEC_ID_TYPE) {
            enc.field(contract.sec_id_type.as_str())
                .field(contract.sec_id.as_str());
        }

        // main order fields
        enc.field(order.action.as_ref());
        if self.supports(sv::FRACTIONAL_POSITIONS) {
            enc.field(order.total_quantity);
        } else {
            enc.field(order.total_quantity.trunc().to_i64().unwrap_or_default());
        }
        enc.field(order.order_type.as_ref());
        if self.supports(sv::ORDER_COMBO_LEGS_PRICE) {
            enc.field(order.lmt_price);
        } else {
            enc.field(order.lmt_price.unwrap_or(0.0));
        }
        if self.supports(sv::TRAILING_PERCENT) {
            enc.field(order.aux_price);
        } else {
            enc.field(order.aux_price.unwrap_or(0.0));
        }

        // extended order fields
        enc.field(order.tif.as_ref())
            .field(order.oca_group.as_str())
            .field(order.account.as_str())
            .field(order.open_close.as_str())
            .field(order.origin)
            .field(order.order_ref.as_str())
            .field(order.transmit)
            .field(order.parent_id)
            .field(order.block_order)
            .field(order.sweep_to_fill)
            .field(order.display_size.unwrap_or(0))
            .field(order.trigger_method)
            .field(order.outside_rth)
            .field(order.hidden);

        if contract.is_combo() {
            self.write_combo_sections(&mut enc, contract, order);
        }

        enc.empty() // shares allocation, deprecated
            .field(order.discretionary_amt)
            .field(order.good_after_time.as_str())
            .field(order.good_till_date.as_str())
            .field(order.fa_group.as_str())
            .field(order.fa_method.as_str())
            .field(order.fa_percentage.as_str())
            .empty(); // fa profile, deprecated
        if self.supports(sv::MODELS_SUPPORT) {
            enc.field(order.model_code.as_str());
        }

        // institutional short sale
        enc.field(order.short_sale_slot)
            .field(order.designated_location.as_str());
        if self.supports(sv::SSHORTX_OLD) {
            enc.field(order.exempt_code);
        }

        enc.field(order.oca_type)
            .field(order.rule_80a.as_str())
            .field(order.settling_firm.as_str())
            .field(order.all_or_none)
            .field(order.min_qty)
            .field(order.percent_offset)
            .field(false) // e-trade only
            .field(false) // firm quote only
            .empty() // nbbo price cap
            .field(order.auction_strategy)
            .field(order.starting_price)
            .field(order.stock_ref_price)
            .field(order.delta)
            .field(order.stock_range_lower)
            .field(order.stock_range_upper)
            .field(order.override_percentage_constraints);

        // volatility orders
        enc.field(order.volatility)
            .field(order.volatility_type)
            .field(order.delta_neutral_order_type.as_str())
            .field(order.delta_neutral_aux_price);
        let has_dn_order = !order.delta_neutral_order_type.is_empty();
        if self.supports(sv::DELTA_NEUTRAL_CONID) && has_dn_order {
            enc.field(order.delta_neutral_con_id)
                .field(order.delta_neutral_settling_firm.as_str())
                .field(order.delta_neutral_clearing_account.as_str())
                .field(order.delta_neutral_clearing_intent.as_str());
        }
        if self.supports(sv::DELTA_NEUTRAL_OPEN_CLOSE) && has_dn_order {
            enc.field(order.delta_neutral_open_close.as_str())
                .field(order.delta_neutral_short_sale)
                .field(order.delta_neutral_short_sale_slot)
                .field(order.delta_neutral_designated_location.as_str());
        }
        enc.field(order.continuous_update)
            .field(order.reference_price_type);

        enc.field(order.trail_stop_price);
        if self.supports(sv::TRAILING_PERCENT) {
            enc.field(order.trailing_percent);
        }

        self.write_scale_fields(&mut enc, order);

        if self.supports(sv::HEDGE_ORDERS) {
            enc.field(order.hedge_type.as_str());
            if !order.hedge_type.is_empty() {
                enc.field(order.hedge_param.as_str());
            }
        }
        if self.supports(sv::OPT_OUT_SMART_ROUTING) {
            enc.field(order.opt_out_smart_routing);
        }
        if self.supports(sv::PTA_ORDERS) {
            enc.field(order.clearing_account.as_str())
                .field(order.clearing_intent.as_str());
        }
        if self.supports(sv::NOT_HELD) {
            enc.field(order.not_held);
        }
        if self.supports(sv::DELTA_NEUTRAL) {
            write_delta_neutral(&mut enc, contract);
        }
        if self.supports(sv::ALGO_ORDERS) {
            enc.field(order.algo_strategy.as_str());
            if !order.algo_strategy.is_empty() {
                enc.tag_value_pairs(&order.algo_params);
            }
        }
        if self.supports(sv::ALGO_ID) {
            enc.field(order.algo_id.as_str());
        }
        if self.supports(sv::WHAT_IF_ORDERS) {
            enc.field(order.what_if);
        }
        if self.supports(sv::LINKING) {
            enc.tag_values(&order.order_misc_options);
        }
        if self.supports(sv::ORDER_SOLICITED) {
            enc.field(order.solicited);
        }
        if self.supports(sv::RANDOMIZE_SIZE_AND_PRICE) {
            enc.field(order.randomize_size).field(order.randomize_price);
        }

        if self.supports(sv::PEGGED_TO_BENCHMARK) {
            if order.order_type == Some(OrderType::PeggedToBenchmark) {
                enc.field(order.reference_contract_id)
                    .field(order.is_pegged_change_amount_decrease)
                    .field(order.pegged_change_amount)
                    .field(order.reference_change_amount)
                    .field(order.reference_exchange_id.as_str());
            }
            write_conditions(&mut enc, order);
            enc.field(order.adjusted_order_type.as_str())
                .field(order.trigger_price)
                .field(order.lmt_price_offset)
                .field(order.adjusted_stop_price)
                .field(order.adjusted_stop_limit_price)
                .field(order.adjusted_trailing_amount)
                .field(order.adjustable_trailing_unit);
        }

        if self.supports(sv::EXT_OPERATOR) {
            enc.field(order.ext_operator.as_str());
        }
        if self.supports(sv::SOFT_DOLLAR_TIER) {
            enc.field(order.soft_dollar_tier.name.as_str())
                .field(order.soft_dollar_tier.value.as_str());
        }
        if self.supports(sv::CASH_QTY) {
            enc.field(order.cash_qty);
        }
        if self.supports(sv::DECISION_MAKER) {
            enc.field(order.mifid2_decision_maker.as_str())
                .field(order.mifid2_decision_algo.as_str());
        }
        if self.supports(sv::MIFID_EXECUTION) {
            enc.field(order.mifid2_execution_trader.as_str())
                .field(order.mifid2_execution_algo.as_str());
        }
        if self.supports(sv::AUTO_PRICE_FOR_HEDGE) {
            enc.field(order.dont_use_auto_price_for_hedge);
        }
        if self.supports(sv::ORDER_CONTAINER) {
            enc.field(order.is_oms_container);
        }
        if self.supports(sv::D_PEG_ORDERS) {
            enc.field(order.discretionary_up_to_limit_price);
        }
        if self.supports(sv::PRICE_MGMT_ALGO) {
            enc.field(order.use_price_mgmt_algo);
        }
        enc.finish()
    }

    /// Legs, per-leg prices and routing params of a BAG order.
    fn write_combo_sections(&self, enc: &mut MessageEncoder, contract: &Contract, order: &Order) {
        enc.field(contract.combo_legs.len());
        for leg in &contract.combo_legs {
            enc.field(leg.con_id)
                .field(leg.ratio)
                .field(leg.action.as_ref())
                .field(leg.exchange.as_str())
                .field(leg.open_close)
                .field(leg.short_sale_slot)
                .field(leg.designated_location.as_str());
            if self.supports(sv::SSHORTX_OLD) {
                enc.field(leg.exempt_code);
            }
        }
        if self.supports(sv::ORDER_COMBO_LEGS_PRICE) {
            enc.field(order.order_combo_legs.len());
            for leg in &order.order_combo_legs {
                enc.field(leg.price);
            }
        }
        if self.supports(sv::SMART_COMBO_ROUTING_PARAMS) {
            enc.tag_value_pairs(&order.smart_combo_routing_params);
        }
    }

    fn write_scale_fields(&self, enc: &mut MessageEncoder, order: &Order) {
        if self.supports(sv::SCALE_ORDERS2) {
            enc.field(order.scale_init_level_size)
                .field(order.scale_subs_level_size);
        } else {
            enc.empty() // scale num components
                .field(order.scale_init_level_size);
        }
        enc.field(order.scale_price_increment);
        if self.supports(sv::SCALE_ORDERS3) && order.has_scale_extension() {
            enc.field(order.scale_price_adjust_value)
                .field(order.scale_price_adjust_interval)
                .field(order.scale_profit_offset)
                .field(order.scale_auto_reset)
                .field(order.scale_init_position)
                .field(order.scale_init_fill_qty)
                .field(order.scale_random_percent);
        }
        if self.supports(sv::SCALE_TABLE) {
            enc.field(order.scale_table.as_str())
                .field(order.active_start_time.as_str())
                .field(order.active_stop_time.as_str());
        }
    }

    pub fn cancel_order(&self, id: i32) -> Result<BytesMut> {
        let mut enc = self.message(outgoing::CANCEL_ORDER);
        enc.field(1).field(id);
        enc.finish()
    }

    pub fn req_open_orders(&self) -> Result<BytesMut> {
        let mut enc = self.message(outgoing::REQ_OPEN_ORDERS);
        enc.field(1);
        enc.finish()
    }

    pub fn req_auto_open_orders(&self, auto_bind: bool) -> Result<BytesMut> {
        let mut enc = self.message(outgoing::REQ_AUTO_OPEN_ORDERS);
        enc.field(1).field(auto_bind);
        enc.finish()
    }

    pub fn req_all_open_orders(&self) -> Result<BytesMut> {
        let mut enc = self.message(outgoing::REQ_ALL_OPEN_ORDERS);
        enc.field(1);
        enc.finish()
    }

    pub fn req_global_cancel(&self) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::REQ_GLOBAL_CANCEL, "globalCancel requests")?;
        let mut enc = self.message(outgoing::REQ_GLOBAL_CANCEL);
        enc.field(1);
        enc.finish()
    }

    pub fn req_completed_orders(&self, api_only: bool) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::COMPLETED_ORDERS, "completed orders requests")?;
        let mut enc = self.message(outgoing::REQ_COMPLETED_ORDERS);
        enc.field(api_only);
        enc.finish()
    }

    pub fn req_ids(&self, num_ids: i32) -> Result<BytesMut> {
        let mut enc = self.message(outgoing::REQ_IDS);
        enc.field(1).field(num_ids);
        enc.finish()
    }

    /// `exercise_action`: 1 = exercise, 2 = lapse.
    pub fn exercise_options(
        &self,
        ticker_id: i32,
        contract: &Contract,
        exercise_action: i32,
        exercise_quantity: i32,
        account: &str,
        override_: bool,
    ) -> Result<BytesMut> {
        self.require_if(
            !contract.trading_class.is_empty() || contract.con_id > 0,
            ticker_id,
            sv::TRADING_CLASS,
            "conId, multiplier, tradingClass parameter in exerciseOptions",
        )?;

        let mut enc = self.message(outgoing::EXERCISE_OPTIONS);
        enc.field(2).field(ticker_id);
        if self.supports(sv::TRADING_CLASS) {
            enc.field(contract.con_id);
        }
        enc.field(contract.symbol.as_str())
            .field(contract.sec_type.as_ref())
            .field(contract.last_trade_date_or_contract_month.as_str())
            .field(contract.strike)
            .field(contract.right.as_ref())
            .field(contract.multiplier.as_str())
            .field(contract.exchange.as_str())
            .field(contract.currency.as_str())
            .field(contract.local_symbol.as_str());
        if self.supports(sv::TRADING_CLASS) {
            enc.field(contract.trading_class.as_str());
        }
        enc.field(exercise_action)
            .field(exercise_quantity)
            .field(account)
            .field(override_);
        enc.finish()
    }
}

/// Condition count, each condition, then the two trailing flags when any
/// condition was written.
fn write_conditions(enc: &mut MessageEncoder, order: &Order) {
    enc.field(order.conditions.len());
    if order.conditions.is_empty() {
        return;
    }
    for cond in &order.conditions {
        enc.field(cond.condition_type())
            .field(if cond.conjunction() { "a" } else { "o" });
        match cond {
            OrderCondition::Price {
                is_more,
                price,
                con_id,
                exchange,
                trigger_method,
                ..
            } => {
                enc.field(*is_more)
                    .field(*price)
                    .field(*con_id)
                    .field(exchange.as_str())
                    .field(*trigger_method);
            }
            OrderCondition::Time { is_more, time, .. } => {
                enc.field(*is_more).field(time.as_str());
            }
            OrderCondition::Margin { is_more, percent, .. } => {
                enc.field(*is_more).field(*percent);
            }
            OrderCondition::Execution {
                sec_type,
                exchange,
                symbol,
                ..
            } => {
                enc.field(sec_type.as_str())
                    .field(exchange.as_str())
                    .field(symbol.as_str());
            }
            OrderCondition::Volume {
                is_more,
                volume,
                con_id,
                exchange,
                ..
            } => {
                enc.field(*is_more)
                    .field(*volume)
                    .field(*con_id)
                    .field(exchange.as_str());
            }
            OrderCondition::PercentChange {
                is_more,
                change_percent,
                con_id,
                exchange,
                ..
            } => {
                enc.field(*is_more)
                    .field(*change_percent)
                    .field(*con_id)
                    .field(exchange.as_str());
            }
        }
    }
    enc.field(order.conditions_ignore_rth)
        .field(order.conditions_cancel_order);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{Action, TriggerMethod};
    use crate::requests::payload_fields;
    use rust_decimal::Decimal;

    fn limit_order() -> Order {
        Order::limit(Action::Buy, Decimal::from(100), 150.25)
    }

    #[test]
    fn current_version_omits_legacy_marker() {
        let enc = RequestEncoder::new(157);
        let fields = payload_fields(&enc.place_order(42, &Contract::stock("AAPL", "USD"), &limit_order()).unwrap());
        assert_eq!(&fields[..3], ["3", "42", "0"]);
        // after the 14 contract fields: action, qty, type, lmt, aux
        assert_eq!(&fields[16..21], ["BUY", "100", "LMT", "150.25", ""]);
        assert_eq!(fields.last().map(String::as_str), Some(""), "usePriceMgmtAlgo unset");
    }

    #[test]
    fn older_version_writes_marker() {
        let enc = RequestEncoder::new(144);
        let fields = payload_fields(&enc.place_order(1, &Contract::stock("AAPL", "USD"), &limit_order()).unwrap());
        assert_eq!(&fields[..3], ["3", "45", "1"]);
    }

    #[test]
    fn unset_limit_price_is_empty() {
        let enc = RequestEncoder::new(157);
        let mut order = limit_order();
        order.lmt_price = Some(UNSET_DOUBLE);
        let fields = payload_fields(&enc.place_order(1, &Contract::stock("AAPL", "USD"), &order).unwrap());
        assert_eq!(fields[19], "");
        assert!(!fields.iter().any(|f| f.contains("1.7976931348623157e308")));
    }

    #[test]
    fn gate_rejects_first_unsupported_feature() {
        let enc = RequestEncoder::new(140);
        let mut order = limit_order();
        order.dont_use_auto_price_for_hedge = true;
        order.is_oms_container = true;
        let err = enc.place_order(8, &Contract::stock("AAPL", "USD"), &order).unwrap_err();
        match err {
            crate::IBApiError::Client { req_id, code, message } => {
                assert_eq!((req_id, code), (8, 503));
                assert!(message.ends_with("It does not support dontUseAutoPriceForHedge parameter."));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn gate_table_is_ordered_by_version() {
        let versions: Vec<i32> = PLACE_ORDER_GATES.iter().map(|g| g.min_version).collect();
        let mut sorted = versions.clone();
        sorted.sort();
        assert_eq!(versions, sorted);
    }

    #[test]
    fn supported_features_pass_gates() {
        let enc = RequestEncoder::new(157);
        let mut order = limit_order();
        order.use_price_mgmt_algo = Some(true);
        order.cash_qty = Some(1000.0);
        assert!(enc.place_order_gate(&Contract::stock("AAPL", "USD"), &order).is_none());
        let fields = payload_fields(&enc.place_order(2, &Contract::stock("AAPL", "USD"), &order).unwrap());
        assert_eq!(fields.last().map(String::as_str), Some("1"));
    }

    #[test]
    fn scale_extension_follows_increment() {
        let enc = RequestEncoder::new(157);
        let mut order = limit_order();
        order.scale_init_level_size = Some(100);
        order.scale_subs_level_size = Some(50);
        order.scale_price_increment = Some(0.1);
        order.scale_auto_reset = true;
        let with_ext = payload_fields(&enc.place_order(3, &Contract::stock("AAPL", "USD"), &order).unwrap());

        order.scale_price_increment = Some(0.0);
        let without_ext = payload_fields(&enc.place_order(3, &Contract::stock("AAPL", "USD"), &order).unwrap());
        assert_eq!(with_ext.len(), without_ext.len() + 7);
    }

    #[test]
    fn conditions_block_layout() {
        let enc = RequestEncoder::new(157);
        let mut order = limit_order();
        order.conditions = vec![
            OrderCondition::Price {
                conjunction: true,
                is_more: true,
                price: 200.0,
                con_id: 265598,
                exchange: "SMART".into(),
                trigger_method: TriggerMethod::Last,
            },
            OrderCondition::Time {
                conjunction: false,
                is_more: false,
                time: "20250101 10:00:00".into(),
            },
        ];
        order.conditions_cancel_order = true;
        let fields = payload_fields(&enc.place_order(4, &Contract::stock("AAPL", "USD"), &order).unwrap());
        let start = fields.windows(2).position(|w| w == ["2", "1"]).unwrap();
        assert_eq!(
            &fields[start..start + 14],
            [
                "2", "1", "a", "1", "200", "265598", "SMART", "2", "3", "o", "0",
                "20250101 10:00:00", "0", "1"
            ]
        );
    }

    #[test]
    fn combo_order_sections() {
        use crate::models::contract::ComboLeg;
        use crate::models::enums::SecType;
        use crate::models::order::OrderComboLeg;

        let enc = RequestEncoder::new(157);
        let contract = Contract {
            symbol: "SPY".into(),
            sec_type: Some(SecType::Combo),
            exchange: "SMART".into(),
            currency: "USD".into(),
            combo_legs: vec![ComboLeg { con_id: 1, ratio: 1, action: Some(Action::Buy), exchange: "SMART".into(), ..Default::default() }],
            ..Default::default()
        };
        let mut order = limit_order();
        order.order_combo_legs = vec![OrderComboLeg { price: None }];
        let fields = payload_fields(&enc.place_order(5, &contract, &order).unwrap());
        // hidden flag is the last extended field, at index 34
        assert_eq!(
            &fields[35..47],
            ["1", "1", "1", "BUY", "SMART", "0", "0", "", "-1", "1", "", "0"]
        );
    }
}
