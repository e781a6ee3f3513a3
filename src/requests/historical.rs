//! Historical bars, head timestamps, histograms, historical ticks and
//! real-time bars.

use bytes::BytesMut;

use super::RequestEncoder;
use crate::errors::Result;
use crate::models::common::TagValue;
use crate::models::contract::Contract;
use crate::protocol::{outgoing, server_version as sv, NO_VALID_ID};

/// Parameters of a REQ_HISTORICAL_DATA request besides the contract.
#[derive(Debug, Clone, Default)]
pub struct HistoricalDataRequest {
    /// `"yyyymmdd hh:mm:ss [tz]"`; empty means now.
    pub end_date_time: String,
    pub duration: String,
    pub bar_size: String,
    pub what_to_show: String,
    pub use_rth: bool,
    /// 1 for text dates, 2 for epoch seconds.
    pub format_date: i32,
    pub keep_up_to_date: bool,
    pub chart_options: Vec<TagValue>,
}

impl RequestEncoder {
    pub fn req_historical_data(
        &self,
        ticker_id: i32,
        contract: &Contract,
        params: &HistoricalDataRequest,
    ) -> Result<BytesMut> {
        self.require_if(
            !contract.trading_class.is_empty() || contract.con_id > 0,
            ticker_id,
            sv::TRADING_CLASS,
            "conId and tradingClass parameters in reqHistoricalData",
        )?;
        self.require_if(
            params.keep_up_to_date,
            ticker_id,
            sv::SYNT_REALTIME_BARS,
            "keepUpToDate parameter in reqHistoricalData",
        )?;

        let mut enc = self.message(outgoing::REQ_HISTORICAL_DATA);
        if !self.supports(sv::SYNT_REALTIME_BARS) {
            enc.field(6);
        }
        enc.field(ticker_id);
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
            .field(contract.primary_exchange.as_str())
            .field(contract.currency.as_str())
            .field(contract.local_symbol.as_str());
        if self.supports(sv::TRADING_CLASS) {
            enc.field(contract.trading_class.as_str());
        }
        enc.field(contract.include_expired)
            .field(params.end_date_time.as_str())
            .field(params.bar_size.as_str())
            .field(params.duration.as_str())
            .field(params.use_rth)
            .field(params.what_to_show.as_str())
            .field(params.format_date);

        if contract.is_combo() {
            enc.field(contract.combo_legs.len());
            for leg in &contract.combo_legs {
                enc.field(leg.con_id)
                    .field(leg.ratio)
                    .field(leg.action.as_ref())
                    .field(leg.exchange.as_str());
            }
        }

        if self.supports(sv::SYNT_REALTIME_BARS) {
            enc.field(params.keep_up_to_date);
        }
        if self.supports(sv::LINKING) {
            enc.tag_values(&params.chart_options);
        }
        enc.finish()
    }

    pub fn cancel_historical_data(&self, ticker_id: i32) -> Result<BytesMut> {
        let mut enc = self.message(outgoing::CANCEL_HISTORICAL_DATA);
        enc.field(1).field(ticker_id);
        enc.finish()
    }

    pub fn req_head_timestamp(
        &self,
        ticker_id: i32,
        contract: &Contract,
        what_to_show: &str,
        use_rth: bool,
        format_date: i32,
    ) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::REQ_HEAD_TIMESTAMP, "head time stamp requests")?;
        let mut enc = self.message(outgoing::REQ_HEAD_TIMESTAMP);
        enc.field(ticker_id)
            .contract(contract)
            .field(use_rth)
            .field(what_to_show)
            .field(format_date);
        enc.finish()
    }

    pub fn cancel_head_timestamp(&self, ticker_id: i32) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::CANCEL_HEADTIMESTAMP, "head time stamp requests")?;
        let mut enc = self.message(outgoing::CANCEL_HEAD_TIMESTAMP);
        enc.field(ticker_id);
        enc.finish()
    }

    /// `period` like `"3 days"`.
    pub fn req_histogram_data(
        &self,
        req_id: i32,
        contract: &Contract,
        use_rth: bool,
        period: &str,
    ) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::REQ_HISTOGRAM, "histogram requests")?;
        let mut enc = self.message(outgoing::REQ_HISTOGRAM_DATA);
        enc.field(req_id).contract(contract).field(use_rth).field(period);
        enc.finish()
    }

    pub fn cancel_histogram_data(&self, req_id: i32) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::REQ_HISTOGRAM, "histogram requests")?;
        let mut enc = self.message(outgoing::CANCEL_HISTOGRAM_DATA);
        enc.field(req_id);
        enc.finish()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn req_historical_ticks(
        &self,
        req_id: i32,
        contract: &Contract,
        start_date_time: &str,
        end_date_time: &str,
        number_of_ticks: i32,
        what_to_show: &str,
        use_rth: bool,
        ignore_size: bool,
        misc_options: &[TagValue],
    ) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::HISTORICAL_TICKS, "historical ticks requests")?;
        let mut enc = self.message(outgoing::REQ_HISTORICAL_TICKS);
        enc.field(req_id)
            .contract(contract)
            .field(start_date_time)
            .field(end_date_time)
            .field(number_of_ticks)
            .field(what_to_show)
            .field(use_rth)
            .field(ignore_size)
            .tag_values(misc_options);
        enc.finish()
    }

    /// Five-second bars. `bar_size` is ignored by the server but still sent.
    pub fn req_real_time_bars(
        &self,
        ticker_id: i32,
        contract: &Contract,
        bar_size: i32,
        what_to_show: &str,
        use_rth: bool,
        options: &[TagValue],
    ) -> Result<BytesMut> {
        self.require_if(
            !contract.trading_class.is_empty() || contract.con_id > 0,
            ticker_id,
            sv::TRADING_CLASS,
            "conId and tradingClass parameter in reqRealTimeBars",
        )?;

        let mut enc = self.message(outgoing::REQ_REAL_TIME_BARS);
        enc.field(3).field(ticker_id);
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
            .field(contract.primary_exchange.as_str())
            .field(contract.currency.as_str())
            .field(contract.local_symbol.as_str());
        if self.supports(sv::TRADING_CLASS) {
            enc.field(contract.trading_class.as_str());
        }
        enc.field(bar_size).field(what_to_show).field(use_rth);
        if self.supports(sv::LINKING) {
            enc.tag_values(options);
        }
        enc.finish()
    }

    pub fn cancel_real_time_bars(&self, ticker_id: i32) -> Result<BytesMut> {
        let mut enc = self.message(outgoing::CANCEL_REAL_TIME_BARS);
        enc.field(1).field(ticker_id);
        enc.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests::payload_fields;

    fn daily_bars() -> HistoricalDataRequest {
        HistoricalDataRequest {
            end_date_time: "20240102 16:00:00 US/Eastern".into(),
            duration: "5 D".into(),
            bar_size: "1 day".into(),
            what_to_show: "TRADES".into(),
            use_rth: true,
            format_date: 1,
            ..Default::default()
        }
    }

    #[test]
    fn historical_data_drops_version_on_new_servers() {
        let c = Contract::stock("IBM", "USD");
        let fields = payload_fields(
            &RequestEncoder::new(157)
                .req_historical_data(4001, &c, &daily_bars())
                .unwrap(),
        );
        assert_eq!(fields[..3], ["20", "4001", "0"]);
        assert_eq!(
            fields[15..],
            ["20240102 16:00:00 US/Eastern", "1 day", "5 D", "1", "TRADES", "1", "0", ""]
        );

        let fields = payload_fields(
            &RequestEncoder::new(123)
                .req_historical_data(4001, &c, &daily_bars())
                .unwrap(),
        );
        assert_eq!(fields[..3], ["20", "6", "4001"]);
        assert_eq!(fields.last().map(String::as_str), Some(""));
    }

    #[test]
    fn keep_up_to_date_needs_synthetic_bars() {
        let params = HistoricalDataRequest {
            keep_up_to_date: true,
            ..daily_bars()
        };
        let err = RequestEncoder::new(120)
            .req_historical_data(1, &Contract::stock("IBM", "USD"), &params)
            .unwrap_err();
        assert_eq!(err.code(), Some(503));
    }

    #[test]
    fn historical_ticks_layout() {
        let c = Contract::stock("IBM", "USD");
        let frame = RequestEncoder::new(157)
            .req_historical_ticks(7, &c, "20240102 09:30:00", "", 100, "TRADES", true, false, &[])
            .unwrap();
        let fields = payload_fields(&frame);
        assert_eq!(fields.len(), 2 + 13 + 7);
        assert_eq!(fields[..2], ["96", "7"]);
        assert_eq!(fields[15..], ["20240102 09:30:00", "", "100", "TRADES", "1", "0", ""]);
    }

    #[test]
    fn head_timestamp_gate() {
        let c = Contract::stock("IBM", "USD");
        assert!(RequestEncoder::new(117).req_head_timestamp(1, &c, "TRADES", true, 1).is_err());
        let fields = payload_fields(
            &RequestEncoder::new(118)
                .req_head_timestamp(1, &c, "TRADES", true, 1)
                .unwrap(),
        );
        assert_eq!(fields[15..], ["1", "TRADES", "1"]);
    }
}
