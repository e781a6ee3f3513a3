//! Contract lookups: details, symbol search, option chains, market rules.

use bytes::BytesMut;

use super::RequestEncoder;
use crate::errors::Result;
use crate::models::contract::Contract;
use crate::protocol::{outgoing, server_version as sv, NO_VALID_ID};

impl RequestEncoder {
    pub fn req_contract_details(&self, req_id: i32, contract: &Contract) -> Result<BytesMut> {
        self.require_if(
            !contract.sec_id_type.is_empty() || !contract.sec_id.is_empty(),
            req_id,
            sv::SEC_ID_TYPE,
            "secIdType and secId parameters",
        )?;
        self.require_if(
            !contract.trading_class.is_empty(),
            req_id,
            sv::TRADING_CLASS,
            "tradingClass parameter in reqContractDetails",
        )?;
        self.require_if(
            !contract.primary_exchange.is_empty(),
            req_id,
            sv::LINKING,
            "primaryExchange parameter in reqContractDetails",
        )?;

        let mut enc = self.message(outgoing::REQ_CONTRACT_DATA);
        enc.field(8);
        if self.supports(sv::CONTRACT_DATA_CHAIN) {
            enc.field(req_id);
        }
        if self.supports(sv::CONTRACT_CONID) {
            enc.field(contract.con_id);
        }
        enc.field(contract.symbol.as_str())
            .field(contract.sec_type.as_ref())
            .field(contract.last_trade_date_or_contract_month.as_str())
            .field(contract.strike)
            .field(contract.right.as_ref())
            .field(contract.multiplier.as_str());

        if self.supports(sv::PRIMARYEXCH) {
            enc.field(contract.exchange.as_str())
                .field(contract.primary_exchange.as_str());
        } else if !contract.primary_exchange.is_empty()
            && (contract.exchange == "BEST" || contract.exchange == "SMART")
        {
            enc.field(format!("{}:{}", contract.exchange, contract.primary_exchange));
        } else {
            enc.field(contract.exchange.as_str());
        }

        enc.field(contract.currency.as_str())
            .field(contract.local_symbol.as_str());
        if self.supports(sv::TRADING_CLASS) {
            enc.field(contract.trading_class.as_str());
        }
        enc.field(contract.include_expired);
        if self.supports(sv::SEC_ID_TYPE) {
            enc.field(contract.sec_id_type.as_str())
                .field(contract.sec_id.as_str());
        }
        enc.finish()
    }

    pub fn req_matching_symbols(&self, req_id: i32, pattern: &str) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::REQ_MATCHING_SYMBOLS, "matching symbols request")?;
        let mut enc = self.message(outgoing::REQ_MATCHING_SYMBOLS);
        enc.field(req_id).field(pattern);
        enc.finish()
    }

    pub fn req_sec_def_opt_params(
        &self,
        req_id: i32,
        underlying_symbol: &str,
        fut_fop_exchange: &str,
        underlying_sec_type: &str,
        underlying_con_id: i32,
    ) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::SEC_DEF_OPT_PARAMS_REQ, "security definition option request")?;
        let mut enc = self.message(outgoing::REQ_SEC_DEF_OPT_PARAMS);
        enc.field(req_id)
            .field(underlying_symbol)
            .field(fut_fop_exchange)
            .field(underlying_sec_type)
            .field(underlying_con_id);
        enc.finish()
    }

    pub fn req_market_rule(&self, market_rule_id: i32) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::MARKET_RULES, "market rule requests")?;
        let mut enc = self.message(outgoing::REQ_MARKET_RULE);
        enc.field(market_rule_id);
        enc.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests::payload_fields;

    #[test]
    fn contract_details_current_layout() {
        let enc = RequestEncoder::new(157);
        let mut c = Contract::stock("AAPL", "USD");
        c.primary_exchange = "NASDAQ".into();
        assert_eq!(
            payload_fields(&enc.req_contract_details(4, &c).unwrap()),
            ["9", "8", "4", "0", "AAPL", "STK", "", "", "", "", "SMART", "NASDAQ", "USD", "", "", "0", "", ""]
        );
    }

    #[test]
    fn contract_details_joins_primary_exchange_before_primaryexch() {
        let enc = RequestEncoder::new(74);
        let mut c = Contract::stock("AAPL", "USD");
        c.primary_exchange = "NASDAQ".into();
        let fields = payload_fields(&enc.req_contract_details(4, &c).unwrap());
        assert!(fields.contains(&"SMART:NASDAQ".to_string()));
    }

    #[test]
    fn market_rule_uses_outbound_code() {
        let enc = RequestEncoder::new(157);
        assert_eq!(payload_fields(&enc.req_market_rule(26).unwrap()), ["91", "26"]);
    }
}
