//! Session, scanner, option analytics, fundamentals, news, FA, display
//! groups and verification requests.

use bytes::BytesMut;

use super::{tag_value_string, RequestEncoder};
use crate::errors::Result;
use crate::models::common::TagValue;
use crate::models::contract::Contract;
use crate::models::enums::FaDataType;
use crate::models::scanner::ScannerSubscription;
use crate::protocol::{outgoing, server_version as sv, NO_VALID_ID};

impl RequestEncoder {
    // ========================================================================
    // Session
    // ========================================================================

    /// First request after the handshake.
    pub fn start_api(&self, client_id: i32, optional_capabilities: &str) -> Result<BytesMut> {
        let mut enc = self.message(outgoing::START_API);
        enc.field(2).field(client_id);
        if self.supports(sv::OPTIONAL_CAPABILITIES) {
            enc.field(optional_capabilities);
        }
        enc.finish()
    }

    pub fn req_current_time(&self) -> Result<BytesMut> {
        let mut enc = self.message(outgoing::REQ_CURRENT_TIME);
        enc.field(1);
        enc.finish()
    }

    /// 1 (system) through 5 (detail).
    pub fn set_server_log_level(&self, level: i32) -> Result<BytesMut> {
        let mut enc = self.message(outgoing::SET_SERVER_LOGLEVEL);
        enc.field(1).field(level);
        enc.finish()
    }

    // ========================================================================
    // Scanner
    // ========================================================================

    pub fn req_scanner_parameters(&self) -> Result<BytesMut> {
        let mut enc = self.message(outgoing::REQ_SCANNER_PARAMETERS);
        enc.field(1);
        enc.finish()
    }

    pub fn req_scanner_subscription(
        &self,
        ticker_id: i32,
        subscription: &ScannerSubscription,
        filter_options: &[TagValue],
        options: &[TagValue],
    ) -> Result<BytesMut> {
        self.require_if(
            !filter_options.is_empty(),
            ticker_id,
            sv::SCANNER_GENERIC_OPTS,
            "API scanner subscription generic filter options",
        )?;

        let s = subscription;
        let mut enc = self.message(outgoing::REQ_SCANNER_SUBSCRIPTION);
        if !self.supports(sv::SCANNER_GENERIC_OPTS) {
            enc.field(4);
        }
        enc.field(ticker_id)
            .field(s.number_of_rows)
            .field(s.instrument.as_str())
            .field(s.location_code.as_str())
            .field(s.scan_code.as_str())
            .field(s.above_price)
            .field(s.below_price)
            .field(s.above_volume)
            .field(s.market_cap_above)
            .field(s.market_cap_below)
            .field(s.moody_rating_above.as_str())
            .field(s.moody_rating_below.as_str())
            .field(s.sp_rating_above.as_str())
            .field(s.sp_rating_below.as_str())
            .field(s.maturity_date_above.as_str())
            .field(s.maturity_date_below.as_str())
            .field(s.coupon_rate_above)
            .field(s.coupon_rate_below)
            .field(s.exclude_convertible)
            .field(s.average_option_volume_above)
            .field(s.scanner_setting_pairs.as_str())
            .field(s.stock_type_filter.as_str());
        if self.supports(sv::SCANNER_GENERIC_OPTS) {
            enc.tag_values(filter_options);
        }
        if self.supports(sv::LINKING) {
            enc.tag_values(options);
        }
        enc.finish()
    }

    pub fn cancel_scanner_subscription(&self, ticker_id: i32) -> Result<BytesMut> {
        let mut enc = self.message(outgoing::CANCEL_SCANNER_SUBSCRIPTION);
        enc.field(1).field(ticker_id);
        enc.finish()
    }

    // ========================================================================
    // Option analytics
    // ========================================================================

    pub fn calculate_implied_volatility(
        &self,
        req_id: i32,
        contract: &Contract,
        option_price: f64,
        under_price: f64,
        options: &[TagValue],
    ) -> Result<BytesMut> {
        self.require(req_id, sv::REQ_CALC_IMPLIED_VOLAT, "calculateImpliedVolatility req")?;
        self.require_if(
            !contract.trading_class.is_empty(),
            req_id,
            sv::TRADING_CLASS,
            "tradingClass parameter in calculateImpliedVolatility",
        )?;
        self.option_calculation(
            outgoing::REQ_CALC_IMPLIED_VOLAT,
            req_id,
            contract,
            option_price,
            under_price,
            options,
        )
    }

    pub fn calculate_option_price(
        &self,
        req_id: i32,
        contract: &Contract,
        volatility: f64,
        under_price: f64,
        options: &[TagValue],
    ) -> Result<BytesMut> {
        self.require(req_id, sv::REQ_CALC_OPTION_PRICE, "calculateOptionPrice req")?;
        self.require_if(
            !contract.trading_class.is_empty(),
            req_id,
            sv::TRADING_CLASS,
            "tradingClass parameter in calculateOptionPrice",
        )?;
        self.option_calculation(
            outgoing::REQ_CALC_OPTION_PRICE,
            req_id,
            contract,
            volatility,
            under_price,
            options,
        )
    }

    /// Both option calculators share one layout; options travel as a count
    /// followed by the joined string.
    fn option_calculation(
        &self,
        kind: i32,
        req_id: i32,
        contract: &Contract,
        input: f64,
        under_price: f64,
        options: &[TagValue],
    ) -> Result<BytesMut> {
        let mut enc = self.message(kind);
        enc.field(3)
            .field(req_id)
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
            .field(contract.local_symbol.as_str());
        if self.supports(sv::TRADING_CLASS) {
            enc.field(contract.trading_class.as_str());
        }
        enc.field(input).field(under_price);
        if self.supports(sv::LINKING) {
            enc.field(options.len()).field(tag_value_string(options));
        }
        enc.finish()
    }

    pub fn cancel_calculate_implied_volatility(&self, req_id: i32) -> Result<BytesMut> {
        self.require(req_id, sv::CANCEL_CALC_IMPLIED_VOLAT, "calculateImpliedVolatility req")?;
        let mut enc = self.message(outgoing::CANCEL_CALC_IMPLIED_VOLAT);
        enc.field(1).field(req_id);
        enc.finish()
    }

    pub fn cancel_calculate_option_price(&self, req_id: i32) -> Result<BytesMut> {
        self.require(req_id, sv::CANCEL_CALC_OPTION_PRICE, "calculateOptionPrice req")?;
        let mut enc = self.message(outgoing::CANCEL_CALC_OPTION_PRICE);
        enc.field(1).field(req_id);
        enc.finish()
    }

    // ========================================================================
    // Fundamentals
    // ========================================================================

    /// `report_type` like `"ReportsFinSummary"` or `"RESC"`.
    pub fn req_fundamental_data(
        &self,
        req_id: i32,
        contract: &Contract,
        report_type: &str,
        options: &[TagValue],
    ) -> Result<BytesMut> {
        self.require(req_id, sv::FUNDAMENTAL_DATA, "fundamental data request")?;
        self.require_if(
            contract.con_id > 0,
            req_id,
            sv::TRADING_CLASS,
            "conId parameter in reqFundamentalData",
        )?;

        let mut enc = self.message(outgoing::REQ_FUNDAMENTAL_DATA);
        enc.field(2).field(req_id);
        if self.supports(sv::TRADING_CLASS) {
            enc.field(contract.con_id);
        }
        enc.field(contract.symbol.as_str())
            .field(contract.sec_type.as_ref())
            .field(contract.exchange.as_str())
            .field(contract.primary_exchange.as_str())
            .field(contract.currency.as_str())
            .field(contract.local_symbol.as_str())
            .field(report_type);
        if self.supports(sv::LINKING) {
            enc.field(options.len()).field(tag_value_string(options));
        }
        enc.finish()
    }

    pub fn cancel_fundamental_data(&self, req_id: i32) -> Result<BytesMut> {
        self.require(req_id, sv::FUNDAMENTAL_DATA, "fundamental data request")?;
        let mut enc = self.message(outgoing::CANCEL_FUNDAMENTAL_DATA);
        enc.field(1).field(req_id);
        enc.finish()
    }

    // ========================================================================
    // News
    // ========================================================================

    pub fn req_news_bulletins(&self, all_msgs: bool) -> Result<BytesMut> {
        let mut enc = self.message(outgoing::REQ_NEWS_BULLETINS);
        enc.field(1).field(all_msgs);
        enc.finish()
    }

    pub fn cancel_news_bulletins(&self) -> Result<BytesMut> {
        let mut enc = self.message(outgoing::CANCEL_NEWS_BULLETINS);
        enc.field(1);
        enc.finish()
    }

    pub fn req_news_providers(&self) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::REQ_NEWS_PROVIDERS, "news providers request")?;
        self.message(outgoing::REQ_NEWS_PROVIDERS).finish()
    }

    pub fn req_news_article(
        &self,
        req_id: i32,
        provider_code: &str,
        article_id: &str,
        options: &[TagValue],
    ) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::REQ_NEWS_ARTICLE, "news article request")?;
        let mut enc = self.message(outgoing::REQ_NEWS_ARTICLE);
        enc.field(req_id).field(provider_code).field(article_id);
        if self.supports(sv::NEWS_QUERY_ORIGINS) {
            enc.tag_values(options);
        }
        enc.finish()
    }

    /// `provider_codes` is a `+`-joined list such as `"BZ+FLY"`.
    pub fn req_historical_news(
        &self,
        req_id: i32,
        con_id: i32,
        provider_codes: &str,
        start_date_time: &str,
        end_date_time: &str,
        total_results: i32,
        options: &[TagValue],
    ) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::REQ_HISTORICAL_NEWS, "historical news request")?;
        let mut enc = self.message(outgoing::REQ_HISTORICAL_NEWS);
        enc.field(req_id)
            .field(con_id)
            .field(provider_codes)
            .field(start_date_time)
            .field(end_date_time)
            .field(total_results);
        if self.supports(sv::NEWS_QUERY_ORIGINS) {
            enc.tag_values(options);
        }
        enc.finish()
    }

    // ========================================================================
    // Financial advisor
    // ========================================================================

    pub fn request_fa(&self, fa_data_type: FaDataType) -> Result<BytesMut> {
        let mut enc = self.message(outgoing::REQ_FA);
        enc.field(1).field(fa_data_type);
        enc.finish()
    }

    pub fn replace_fa(&self, req_id: i32, fa_data_type: FaDataType, xml: &str) -> Result<BytesMut> {
        let mut enc = self.message(outgoing::REPLACE_FA);
        enc.field(1).field(fa_data_type).field(xml);
        if self.supports(sv::REPLACE_FA_END) {
            enc.field(req_id);
        }
        enc.finish()
    }

    // ========================================================================
    // Display groups
    // ========================================================================

    pub fn query_display_groups(&self, req_id: i32) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::LINKING, "queryDisplayGroups request")?;
        let mut enc = self.message(outgoing::QUERY_DISPLAY_GROUPS);
        enc.field(1).field(req_id);
        enc.finish()
    }

    pub fn subscribe_to_group_events(&self, req_id: i32, group_id: i32) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::LINKING, "subscribeToGroupEvents request")?;
        let mut enc = self.message(outgoing::SUBSCRIBE_TO_GROUP_EVENTS);
        enc.field(1).field(req_id).field(group_id);
        enc.finish()
    }

    /// `contract_info` is `"conId@exchange"`, `"none"` or `"combo"`.
    pub fn update_display_group(&self, req_id: i32, contract_info: &str) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::LINKING, "updateDisplayGroup request")?;
        let mut enc = self.message(outgoing::UPDATE_DISPLAY_GROUP);
        enc.field(1).field(req_id).field(contract_info);
        enc.finish()
    }

    pub fn unsubscribe_from_group_events(&self, req_id: i32) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::LINKING, "unsubscribeFromGroupEvents request")?;
        let mut enc = self.message(outgoing::UNSUBSCRIBE_FROM_GROUP_EVENTS);
        enc.field(1).field(req_id);
        enc.finish()
    }

    // ========================================================================
    // Verification
    // ========================================================================

    pub fn verify_request(&self, api_name: &str, api_version: &str) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::LINKING, "verification request")?;
        let mut enc = self.message(outgoing::VERIFY_REQUEST);
        enc.field(1).field(api_name).field(api_version);
        enc.finish()
    }

    pub fn verify_message(&self, api_data: &str) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::LINKING, "verification message sending")?;
        let mut enc = self.message(outgoing::VERIFY_MESSAGE);
        enc.field(1).field(api_data);
        enc.finish()
    }

    pub fn verify_and_auth_request(
        &self,
        api_name: &str,
        api_version: &str,
        opaque_isv_key: &str,
    ) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::LINKING_AUTH, "verification and authentication request")?;
        let mut enc = self.message(outgoing::VERIFY_AND_AUTH_REQUEST);
        enc.field(1).field(api_name).field(api_version).field(opaque_isv_key);
        enc.finish()
    }

    pub fn verify_and_auth_message(&self, api_data: &str, xyz_response: &str) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::LINKING_AUTH, "verification and authentication message")?;
        let mut enc = self.message(outgoing::VERIFY_AND_AUTH_MESSAGE);
        enc.field(1).field(api_data).field(xyz_response);
        enc.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests::payload_fields;

    #[test]
    fn start_api_carries_capabilities() {
        let frame = RequestEncoder::new(157).start_api(0, "").unwrap();
        assert_eq!(payload_fields(&frame), ["71", "2", "0", ""]);
        let frame = RequestEncoder::new(71).start_api(7, "x").unwrap();
        assert_eq!(payload_fields(&frame), ["71", "2", "7"]);
    }

    #[test]
    fn current_time() {
        let frame = RequestEncoder::new(157).req_current_time().unwrap();
        assert_eq!(&frame[..], b"\x00\x00\x00\x0549\x001\x00");
    }

    #[test]
    fn scanner_generic_filters() {
        let sub = ScannerSubscription {
            number_of_rows: 10,
            instrument: "STK".into(),
            location_code: "STK.US.MAJOR".into(),
            scan_code: "TOP_PERC_GAIN".into(),
            above_price: Some(5.0),
            ..Default::default()
        };
        let filters = [TagValue::new("marketCapAbove1e6", "10000")];

        let fields = payload_fields(
            &RequestEncoder::new(157)
                .req_scanner_subscription(3, &sub, &filters, &[])
                .unwrap(),
        );
        assert_eq!(fields[..7], ["22", "3", "10", "STK", "STK.US.MAJOR", "TOP_PERC_GAIN", "5"]);
        assert_eq!(fields[fields.len() - 2..], ["marketCapAbove1e6=10000;", ""]);

        let err = RequestEncoder::new(142)
            .req_scanner_subscription(3, &sub, &filters, &[])
            .unwrap_err();
        assert_eq!(err.code(), Some(503));

        let fields = payload_fields(
            &RequestEncoder::new(142)
                .req_scanner_subscription(3, &sub, &[], &[])
                .unwrap(),
        );
        assert_eq!(fields[..3], ["22", "4", "3"]);
    }

    #[test]
    fn option_calculation_options_are_counted() {
        let c = Contract::stock("IBM", "USD");
        let opts = [TagValue::new("a", "1")];
        let fields = payload_fields(
            &RequestEncoder::new(157)
                .calculate_option_price(5, &c, 0.25, 140.0, &opts)
                .unwrap(),
        );
        assert_eq!(fields[..3], ["55", "3", "5"]);
        assert_eq!(fields[fields.len() - 4..], ["0.25", "140", "1", "a=1;"]);
    }

    #[test]
    fn replace_fa_adds_req_id() {
        let frame = RequestEncoder::new(157)
            .replace_fa(12, FaDataType::Groups, "<xml/>")
            .unwrap();
        assert_eq!(payload_fields(&frame), ["19", "1", "1", "<xml/>", "12"]);
        let frame = RequestEncoder::new(156)
            .replace_fa(12, FaDataType::Groups, "<xml/>")
            .unwrap();
        assert_eq!(payload_fields(&frame), ["19", "1", "1", "<xml/>"]);
    }

    #[test]
    fn display_groups_require_linking() {
        assert!(RequestEncoder::new(69).query_display_groups(1).is_err());
        let frame = RequestEncoder::new(70).subscribe_to_group_events(1, 4).unwrap();
        assert_eq!(payload_fields(&frame), ["68", "1", "1", "4"]);
    }
}
