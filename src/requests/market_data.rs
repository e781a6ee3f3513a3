//! Streaming market data: top of book, depth, tick-by-tick.

use bytes::BytesMut;

use super::RequestEncoder;
use crate::encoder::MessageEncoder;
use crate::errors::Result;
use crate::models::common::TagValue;
use crate::models::contract::Contract;
use crate::models::enums::MarketDataType;
use crate::protocol::{outgoing, server_version as sv, NO_VALID_ID};

impl RequestEncoder {
    pub fn req_mkt_data(
        &self,
        ticker_id: i32,
        contract: &Contract,
        generic_ticks: &str,
        snapshot: bool,
        regulatory_snapshot: bool,
        options: &[TagValue],
    ) -> Result<BytesMut> {
        self.require_if(
            contract.delta_neutral_contract.is_some(),
            ticker_id,
            sv::DELTA_NEUTRAL,
            "delta-neutral orders",
        )?;
        self.require_if(contract.con_id > 0, ticker_id, sv::REQ_MKT_DATA_CONID, "conId parameter")?;
        self.require_if(
            !contract.trading_class.is_empty(),
            ticker_id,
            sv::TRADING_CLASS,
            "tradingClass parameter in reqMktData",
        )?;

        let mut enc = self.message(outgoing::REQ_MKT_DATA);
        enc.field(11).field(ticker_id);
        if self.supports(sv::REQ_MKT_DATA_CONID) {
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

        if contract.is_combo() {
            enc.field(contract.combo_legs.len());
            for leg in &contract.combo_legs {
                enc.field(leg.con_id)
                    .field(leg.ratio)
                    .field(leg.action.as_ref())
                    .field(leg.exchange.as_str());
            }
        }

        if self.supports(sv::DELTA_NEUTRAL) {
            write_delta_neutral(&mut enc, contract);
        }

        enc.field(generic_ticks).field(snapshot);
        if self.supports(sv::REQ_SMART_COMPONENTS) {
            enc.field(regulatory_snapshot);
        }
        if self.supports(sv::LINKING) {
            enc.tag_values(options);
        }
        enc.finish()
    }

    pub fn cancel_mkt_data(&self, ticker_id: i32) -> Result<BytesMut> {
        let mut enc = self.message(outgoing::CANCEL_MKT_DATA);
        enc.field(2).field(ticker_id);
        enc.finish()
    }

    pub fn req_mkt_depth(
        &self,
        ticker_id: i32,
        contract: &Contract,
        num_rows: i32,
        is_smart_depth: bool,
        options: &[TagValue],
    ) -> Result<BytesMut> {
        self.require_if(
            !contract.trading_class.is_empty() || contract.con_id > 0,
            ticker_id,
            sv::TRADING_CLASS,
            "conId and tradingClass parameters in reqMktDepth",
        )?;
        self.require_if(is_smart_depth, ticker_id, sv::SMART_DEPTH, "SMART depth request")?;
        self.require_if(
            !contract.primary_exchange.is_empty(),
            ticker_id,
            sv::MKT_DEPTH_PRIM_EXCHANGE,
            "primaryExchange parameter in reqMktDepth",
        )?;

        let mut enc = self.message(outgoing::REQ_MKT_DEPTH);
        enc.field(5).field(ticker_id);
        if self.supports(sv::TRADING_CLASS) {
            enc.field(contract.con_id);
        }
        enc.field(contract.symbol.as_str())
            .field(contract.sec_type.as_ref())
            .field(contract.last_trade_date_or_contract_month.as_str())
            .field(contract.strike)
            .field(contract.right.as_ref())
            .field(contract.multiplier.as_str())
            .field(contract.exchange.as_str());
        if self.supports(sv::MKT_DEPTH_PRIM_EXCHANGE) {
            enc.field(contract.primary_exchange.as_str());
        }
        enc.field(contract.currency.as_str())
            .field(contract.local_symbol.as_str());
        if self.supports(sv::TRADING_CLASS) {
            enc.field(contract.trading_class.as_str());
        }
        enc.field(num_rows);
        if self.supports(sv::SMART_DEPTH) {
            enc.field(is_smart_depth);
        }
        if self.supports(sv::LINKING) {
            enc.tag_values(options);
        }
        enc.finish()
    }

    pub fn cancel_mkt_depth(&self, ticker_id: i32, is_smart_depth: bool) -> Result<BytesMut> {
        self.require_if(is_smart_depth, ticker_id, sv::SMART_DEPTH, "SMART depth cancel")?;
        let mut enc = self.message(outgoing::CANCEL_MKT_DEPTH);
        enc.field(1).field(ticker_id);
        if self.supports(sv::SMART_DEPTH) {
            enc.field(is_smart_depth);
        }
        enc.finish()
    }

    pub fn req_market_data_type(&self, market_data_type: MarketDataType) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::REQ_MARKET_DATA_TYPE, "market data type requests")?;
        let mut enc = self.message(outgoing::REQ_MARKET_DATA_TYPE);
        enc.field(1).field(market_data_type);
        enc.finish()
    }

    /// Tick-by-tick stream. `tick_type` is "Last", "AllLast", "BidAsk" or
    /// "MidPoint".
    pub fn req_tick_by_tick_data(
        &self,
        req_id: i32,
        contract: &Contract,
        tick_type: &str,
        number_of_ticks: i32,
        ignore_size: bool,
    ) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::TICK_BY_TICK, "tick-by-tick data requests")?;
        self.require_if(
            number_of_ticks != 0 || ignore_size,
            NO_VALID_ID,
            sv::TICK_BY_TICK_IGNORE_SIZE,
            "ignoreSize and numberOfTicks parameters in tick-by-tick data requests",
        )?;

        let mut enc = self.message(outgoing::REQ_TICK_BY_TICK_DATA);
        enc.field(req_id)
            .field(contract.con_id)
            .field(contract.symbol.as_str())
            .field(contract.sec_type.as_ref())
            .field(contract.last_trade_date_or_contract_month.as_str())
            .field(contract.strike)
            .field(contract.right.as_ref())
            .field(contract.multiplier.as_str())
            .field(contract.exchange.as_str())
            .field(contract.primary_exchange.as_str())
            .field(contract.currency.as_str())
            .field(contract.local_symbol.as_str())
            .field(contract.trading_class.as_str())
            .field(tick_type);
        if self.supports(sv::TICK_BY_TICK_IGNORE_SIZE) {
            enc.field(number_of_ticks).field(ignore_size);
        }
        enc.finish()
    }

    pub fn cancel_tick_by_tick_data(&self, req_id: i32) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::TICK_BY_TICK, "tick-by-tick data cancels")?;
        let mut enc = self.message(outgoing::CANCEL_TICK_BY_TICK_DATA);
        enc.field(req_id);
        enc.finish()
    }

    pub fn req_smart_components(&self, req_id: i32, bbo_exchange: &str) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::REQ_SMART_COMPONENTS, "smart components request")?;
        let mut enc = self.message(outgoing::REQ_SMART_COMPONENTS);
        enc.field(req_id).field(bbo_exchange);
        enc.finish()
    }

    pub fn req_mkt_depth_exchanges(&self) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::REQ_MKT_DEPTH_EXCHANGES, "market depth exchanges request")?;
        self.message(outgoing::REQ_MKT_DEPTH_EXCHANGES).finish()
    }
}

/// Presence flag, then conId/delta/price when a delta-neutral contract is set.
pub(super) fn write_delta_neutral(enc: &mut MessageEncoder, contract: &Contract) {
    match &contract.delta_neutral_contract {
        Some(dn) => {
            enc.field(true).field(dn.con_id).field(dn.delta).field(dn.price);
        }
        None => {
            enc.field(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contract::{ComboLeg, DeltaNeutralContract};
    use crate::models::enums::{Action, SecType};
    use crate::requests::payload_fields;

    #[test]
    fn mkt_data_stock_at_current_version() {
        let enc = RequestEncoder::new(157);
        let c = Contract::stock("AAPL", "USD");
        let frame = enc.req_mkt_data(5, &c, "233", false, false, &[]).unwrap();
        assert_eq!(
            payload_fields(&frame),
            [
                "1", "11", "5", "0", "AAPL", "STK", "", "", "", "", "SMART", "", "USD", "", "",
                "0", "233", "0", "0", ""
            ]
        );
    }

    #[test]
    fn mkt_data_combo_and_delta_neutral() {
        let enc = RequestEncoder::new(157);
        let c = Contract {
            symbol: "SPX".into(),
            sec_type: Some(SecType::Combo),
            combo_legs: vec![ComboLeg {
                con_id: 11,
                ratio: 1,
                action: Some(Action::Buy),
                exchange: "CBOE".into(),
                ..Default::default()
            }],
            delta_neutral_contract: Some(DeltaNeutralContract {
                con_id: 7,
                delta: 0.5,
                price: 12.25,
            }),
            ..Default::default()
        };
        let fields = payload_fields(&enc.req_mkt_data(1, &c, "", true, false, &[]).unwrap());
        let legs = fields.iter().position(|f| f == "BAG").unwrap() + 10;
        assert_eq!(&fields[legs..legs + 5], ["1", "11", "1", "BUY", "CBOE"]);
        assert_eq!(&fields[legs + 5..legs + 9], ["1", "7", "0.5", "12.25"]);
    }

    #[test]
    fn depth_gates_smart_depth() {
        let enc = RequestEncoder::new(145);
        let c = Contract::stock("AAPL", "USD");
        let err = enc.req_mkt_depth(3, &c, 5, true, &[]).unwrap_err();
        assert_eq!(err.code(), Some(503));
        let fields = payload_fields(&enc.req_mkt_depth(3, &c, 5, false, &[]).unwrap());
        assert_eq!(fields[..3], ["10", "5", "3"]);
        assert_eq!(fields.last().map(String::as_str), Some(""));
    }

    #[test]
    fn tick_by_tick_spreads_every_parameter() {
        let enc = RequestEncoder::new(157);
        let c = Contract::stock("MSFT", "USD");
        let fields = payload_fields(&enc.req_tick_by_tick_data(9, &c, "BidAsk", 10, true).unwrap());
        assert_eq!(fields.len(), 17);
        assert_eq!(fields[0], "97");
        assert_eq!(&fields[14..], ["BidAsk", "10", "1"]);
    }

    #[test]
    fn tick_by_tick_rejected_on_old_server() {
        let enc = RequestEncoder::new(120);
        let err = enc
            .req_tick_by_tick_data(9, &Contract::stock("MSFT", "USD"), "Last", 0, false)
            .unwrap_err();
        match err {
            crate::IBApiError::Client { req_id, code, message } => {
                assert_eq!(req_id, NO_VALID_ID);
                assert_eq!(code, 503);
                assert!(message.contains("tick-by-tick data"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn market_data_type_code() {
        let enc = RequestEncoder::new(157);
        let frame = enc.req_market_data_type(MarketDataType::Delayed).unwrap();
        assert_eq!(payload_fields(&frame), ["59", "1", "3"]);
    }
}
