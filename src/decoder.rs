//! Inbound record decoder.
//!
//! A frame payload is a run of NUL-terminated text fields. [`MessageDecoder`]
//! walks them with a cursor; [`decode_frame`] reads the leading message kind
//! and hands the cursor to the matching parser, which turns the record into
//! zero or more [`IBEvent`]s.
//!
//! Every parser must consume the whole payload. Leftover fields mean the
//! layout and the negotiated server version disagree, and the frame is
//! rejected rather than half-delivered.

// Parsers assign record fields one wire field at a time.
#![allow(clippy::field_reassign_with_default)]

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use crate::errors::{IBApiError, Result};
use crate::models::bar::{Bar, HistoricalTick, HistoricalTickBidAsk, HistoricalTickLast, RealTimeBar};
use crate::models::common::{
    FamilyCode, HistogramEntry, NewsProvider, PriceIncrement, SmartComponent, SoftDollarTier, TagValue,
};
use crate::models::contract::{
    ComboLeg, Contract, ContractDescription, ContractDetails, DeltaNeutralContract,
};
use crate::models::enums::*;
use crate::models::execution::{CommissionReport, Execution};
use crate::models::market_data::{DepthMktDataDescription, TickAttrib, TickAttribBidAsk, TickAttribLast};
use crate::models::order::{Order, OrderComboLeg, OrderCondition, OrderState};
use crate::models::scanner::ScannerDataItem;
use crate::protocol::{
    incoming, server_version as sv, TickType, UNSET_DOUBLE, UNSET_INTEGER, UNSET_LONG,
};
use crate::wrapper::IBEvent;

// ============================================================================
// MessageDecoder
// ============================================================================

/// Field cursor over one frame payload (length prefix already stripped).
///
/// Plain decoders map an empty field to zero. The `_max` variants map an
/// empty field, or the wire's unset sentinel, to `None`.
pub struct MessageDecoder<'a> {
    data: &'a [u8],
    pos: usize,
    server_version: i32,
}

impl<'a> MessageDecoder<'a> {
    pub fn new(data: &'a [u8], server_version: i32) -> Self {
        Self {
            data,
            pos: 0,
            server_version,
        }
    }

    pub fn server_version(&self) -> i32 {
        self.server_version
    }

    pub fn has_remaining(&self) -> bool {
        self.pos < self.data.len()
    }

    /// Fails if any field is left unread.
    pub fn finish(&self) -> Result<()> {
        if self.has_remaining() {
            return Err(IBApiError::Decoding(format!(
                "{} unread bytes at end of record",
                self.data.len() - self.pos
            )));
        }
        Ok(())
    }

    fn read_field_str(&mut self) -> Result<&'a str> {
        if !self.has_remaining() {
            return Err(IBApiError::Decoding("unexpected end of message".into()));
        }
        let rest = &self.data[self.pos..];
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| IBApiError::Decoding("field not null-terminated".into()))?;
        let field = std::str::from_utf8(&rest[..len])
            .map_err(|e| IBApiError::Decoding(format!("invalid UTF-8: {e}")))?;
        self.pos += len + 1;
        Ok(field)
    }

    // ========================================================================
    // Scalars
    // ========================================================================

    pub fn decode_string(&mut self) -> Result<String> {
        self.read_field_str().map(str::to_string)
    }

    pub fn decode_i32(&mut self) -> Result<i32> {
        let s = self.read_field_str()?;
        if s.is_empty() {
            return Ok(0);
        }
        s.parse::<i32>()
            .map_err(|e| IBApiError::Decoding(format!("invalid i32 '{s}': {e}")))
    }

    pub fn decode_i64(&mut self) -> Result<i64> {
        let s = self.read_field_str()?;
        if s.is_empty() {
            return Ok(0);
        }
        s.parse::<i64>()
            .map_err(|e| IBApiError::Decoding(format!("invalid i64 '{s}': {e}")))
    }

    /// Accepts `"Infinity"` as well as ordinary decimal text.
    pub fn decode_f64(&mut self) -> Result<f64> {
        let s = self.read_field_str()?;
        parse_f64(s).map(|v| v.unwrap_or(0.0))
    }

    /// Integer field, `> 0` is true.
    pub fn decode_bool(&mut self) -> Result<bool> {
        self.decode_i32().map(|v| v > 0)
    }

    pub fn decode_decimal(&mut self) -> Result<Decimal> {
        let s = self.read_field_str()?;
        parse_decimal(s).map(|v| v.unwrap_or(Decimal::ZERO))
    }

    // ========================================================================
    // Unset-aware decoders
    // ========================================================================

    pub fn decode_i32_max(&mut self) -> Result<Option<i32>> {
        let s = self.read_field_str()?;
        if s.is_empty() {
            return Ok(None);
        }
        let v = s
            .parse::<i32>()
            .map_err(|e| IBApiError::Decoding(format!("invalid i32 '{s}': {e}")))?;
        Ok((v != UNSET_INTEGER).then_some(v))
    }

    pub fn decode_f64_max(&mut self) -> Result<Option<f64>> {
        let s = self.read_field_str()?;
        Ok(parse_f64(s)?.filter(|v| *v != UNSET_DOUBLE))
    }

    /// Decimal quantities may carry any of the integer or double sentinels.
    pub fn decode_decimal_max(&mut self) -> Result<Option<Decimal>> {
        let s = self.read_field_str()?;
        if is_unset_text(s) {
            return Ok(None);
        }
        parse_decimal(s)
    }

    // ========================================================================
    // Enums and lists
    // ========================================================================

    /// Empty field decodes to `None`.
    pub fn decode_enum_opt<T: FromStr>(&mut self) -> Result<Option<T>>
    where
        T::Err: fmt::Display,
    {
        let s = self.read_field_str()?;
        if s.is_empty() {
            return Ok(None);
        }
        s.parse::<T>()
            .map(Some)
            .map_err(|e| IBApiError::Decoding(format!("invalid enum value '{s}': {e}")))
    }

    /// A list length. Each entry needs at least one byte, so a count larger
    /// than what is left in the frame is rejected before anything is
    /// allocated.
    pub fn decode_count(&mut self) -> Result<usize> {
        let n = self.decode_i32()?;
        let n = usize::try_from(n)
            .map_err(|_| IBApiError::Decoding(format!("negative item count {n}")))?;
        if n > self.data.len() - self.pos {
            return Err(IBApiError::Decoding(format!("item count {n} exceeds record")));
        }
        Ok(n)
    }

    /// Count-prefixed `tag, value` pairs.
    pub fn decode_tag_values(&mut self) -> Result<Vec<TagValue>> {
        let n = self.decode_count()?;
        let mut list = Vec::with_capacity(n);
        for _ in 0..n {
            list.push(TagValue {
                tag: self.decode_string()?,
                value: self.decode_string()?,
            });
        }
        Ok(list)
    }

    pub fn skip_field(&mut self) -> Result<()> {
        self.read_field_str().map(|_| ())
    }

    pub fn skip_fields(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.skip_field()?;
        }
        Ok(())
    }
}

fn parse_f64(s: &str) -> Result<Option<f64>> {
    match s {
        "" => Ok(None),
        "Infinity" => Ok(Some(f64::INFINITY)),
        "-Infinity" => Ok(Some(f64::NEG_INFINITY)),
        _ => s
            .parse::<f64>()
            .map(Some)
            .map_err(|e| IBApiError::Decoding(format!("invalid f64 '{s}': {e}"))),
    }
}

fn is_unset_text(s: &str) -> bool {
    s.parse::<i32>().is_ok_and(|v| v == UNSET_INTEGER)
        || s.parse::<i64>().is_ok_and(|v| v == UNSET_LONG)
        || s.parse::<f64>().is_ok_and(|v| v == UNSET_DOUBLE)
}

fn parse_decimal(s: &str) -> Result<Option<Decimal>> {
    if s.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map(Some)
        .map_err(|e| IBApiError::Decoding(format!("invalid Decimal '{s}': {e}")))
}

// ============================================================================
// Dispatch
// ============================================================================

/// Decode one frame payload into the events it carries.
///
/// Unknown message kinds are logged and yield no events. Malformed records
/// return an error; the caller drops the frame and carries on.
pub fn decode_frame(payload: &[u8], server_version: i32) -> Result<Vec<IBEvent>> {
    let mut dec = MessageDecoder::new(payload, server_version);
    let kind = dec.decode_i32()?;
    let events = decode_record(kind, &mut dec)?;
    dec.finish()
        .map_err(|e| IBApiError::Decoding(format!("message kind {kind}: {e}")))?;
    Ok(events)
}

fn one(event: IBEvent) -> Result<Vec<IBEvent>> {
    Ok(vec![event])
}

fn decode_record(kind: i32, dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    match kind {
        // Connection & Error
        incoming::ERR_MSG => decode_err_msg(dec),
        incoming::NEXT_VALID_ID => decode_next_valid_id(dec),
        incoming::MANAGED_ACCTS => decode_managed_accts(dec),
        incoming::CURRENT_TIME => decode_current_time(dec),
        // Market data
        incoming::TICK_PRICE => decode_tick_price(dec),
        incoming::TICK_SIZE => decode_tick_size(dec),
        incoming::TICK_OPTION_COMPUTATION => decode_tick_option_computation(dec),
        incoming::TICK_GENERIC => decode_tick_generic(dec),
        incoming::TICK_STRING => decode_tick_string(dec),
        incoming::TICK_EFP => decode_tick_efp(dec),
        incoming::TICK_SNAPSHOT_END => decode_versioned_req_id(dec, |req_id| IBEvent::TickSnapshotEnd { req_id }),
        incoming::TICK_REQ_PARAMS => decode_tick_req_params(dec),
        incoming::TICK_NEWS => decode_tick_news(dec),
        incoming::MARKET_DATA_TYPE => decode_market_data_type(dec),
        incoming::TICK_BY_TICK => decode_tick_by_tick(dec),
        incoming::MARKET_DEPTH => decode_market_depth(dec),
        incoming::MARKET_DEPTH_L2 => decode_market_depth_l2(dec),
        incoming::MKT_DEPTH_EXCHANGES => decode_mkt_depth_exchanges(dec),
        incoming::SMART_COMPONENTS => decode_smart_components(dec),
        incoming::REROUTE_MKT_DATA_REQ => decode_reroute(dec, false),
        incoming::REROUTE_MKT_DEPTH_REQ => decode_reroute(dec, true),
        incoming::DELTA_NEUTRAL_VALIDATION => decode_delta_neutral_validation(dec),
        // Orders & executions
        incoming::ORDER_STATUS => decode_order_status(dec),
        incoming::OPEN_ORDER => decode_open_order(dec),
        incoming::OPEN_ORDER_END => {
            dec.skip_field()?;
            one(IBEvent::OpenOrderEnd)
        }
        incoming::COMPLETED_ORDER => decode_completed_order(dec),
        incoming::COMPLETED_ORDERS_END => one(IBEvent::CompletedOrdersEnd),
        incoming::ORDER_BOUND => decode_order_bound(dec),
        incoming::EXECUTION_DATA => decode_execution_data(dec),
        incoming::EXECUTION_DATA_END => decode_versioned_req_id(dec, |req_id| IBEvent::ExecDetailsEnd { req_id }),
        incoming::COMMISSION_REPORT => decode_commission_report(dec),
        // Account & portfolio
        incoming::ACCT_VALUE => decode_acct_value(dec),
        incoming::PORTFOLIO_VALUE => decode_portfolio_value(dec),
        incoming::ACCT_UPDATE_TIME => decode_acct_update_time(dec),
        incoming::ACCT_DOWNLOAD_END => decode_acct_download_end(dec),
        incoming::ACCOUNT_SUMMARY => decode_account_summary(dec),
        incoming::ACCOUNT_SUMMARY_END => decode_versioned_req_id(dec, |req_id| IBEvent::AccountSummaryEnd { req_id }),
        incoming::POSITION_DATA => decode_position_data(dec),
        incoming::POSITION_END => {
            dec.skip_field()?;
            one(IBEvent::PositionEnd)
        }
        incoming::POSITION_MULTI => decode_position_multi(dec),
        incoming::POSITION_MULTI_END => decode_versioned_req_id(dec, |req_id| IBEvent::PositionMultiEnd { req_id }),
        incoming::ACCOUNT_UPDATE_MULTI => decode_account_update_multi(dec),
        incoming::ACCOUNT_UPDATE_MULTI_END => {
            decode_versioned_req_id(dec, |req_id| IBEvent::AccountUpdateMultiEnd { req_id })
        }
        incoming::PNL => decode_pnl(dec),
        incoming::PNL_SINGLE => decode_pnl_single(dec),
        incoming::FAMILY_CODES => decode_family_codes(dec),
        incoming::SOFT_DOLLAR_TIERS => decode_soft_dollar_tiers(dec),
        // Contracts
        incoming::CONTRACT_DATA => decode_contract_data(dec),
        incoming::BOND_CONTRACT_DATA => decode_bond_contract_data(dec),
        incoming::CONTRACT_DATA_END => decode_versioned_req_id(dec, |req_id| IBEvent::ContractDetailsEnd { req_id }),
        incoming::SYMBOL_SAMPLES => decode_symbol_samples(dec),
        incoming::SECURITY_DEFINITION_OPTION_PARAMETER => decode_sec_def_opt_params(dec),
        incoming::SECURITY_DEFINITION_OPTION_PARAMETER_END => {
            let req_id = dec.decode_i32()?;
            one(IBEvent::SecurityDefinitionOptionalParameterEnd { req_id })
        }
        incoming::MARKET_RULE => decode_market_rule(dec),
        // Historical & real-time bars
        incoming::HISTORICAL_DATA => decode_historical_data(dec),
        incoming::HISTORICAL_DATA_UPDATE => decode_historical_data_update(dec),
        incoming::HEAD_TIMESTAMP => decode_head_timestamp(dec),
        incoming::HISTOGRAM_DATA => decode_histogram_data(dec),
        incoming::HISTORICAL_TICKS => decode_historical_ticks(dec),
        incoming::HISTORICAL_TICKS_BID_ASK => decode_historical_ticks_bid_ask(dec),
        incoming::HISTORICAL_TICKS_LAST => decode_historical_ticks_last(dec),
        incoming::REAL_TIME_BARS => decode_real_time_bar(dec),
        // Scanner & fundamentals
        incoming::SCANNER_PARAMETERS => {
            dec.skip_field()?;
            one(IBEvent::ScannerParameters { xml: dec.decode_string()? })
        }
        incoming::SCANNER_DATA => decode_scanner_data(dec),
        incoming::FUNDAMENTAL_DATA => decode_fundamental_data(dec),
        // News
        incoming::NEWS_BULLETINS => decode_news_bulletin(dec),
        incoming::NEWS_ARTICLE => decode_news_article(dec),
        incoming::NEWS_PROVIDERS => decode_news_providers(dec),
        incoming::HISTORICAL_NEWS => decode_historical_news(dec),
        incoming::HISTORICAL_NEWS_END => {
            let req_id = dec.decode_i32()?;
            let has_more = dec.decode_bool()?;
            one(IBEvent::HistoricalNewsEnd { req_id, has_more })
        }
        // Financial advisor
        incoming::RECEIVE_FA => decode_receive_fa(dec),
        incoming::REPLACE_FA_END => {
            let req_id = dec.decode_i32()?;
            let text = dec.decode_string()?;
            one(IBEvent::ReplaceFaEnd { req_id, text })
        }
        // Display groups & verification
        incoming::DISPLAY_GROUP_LIST => decode_display_group(dec, false),
        incoming::DISPLAY_GROUP_UPDATED => decode_display_group(dec, true),
        incoming::VERIFY_MESSAGE_API => {
            dec.skip_field()?;
            one(IBEvent::VerifyMessageApi { api_data: dec.decode_string()? })
        }
        incoming::VERIFY_COMPLETED => decode_verify_completed(dec, false),
        incoming::VERIFY_AND_AUTH_MESSAGE_API => {
            dec.skip_field()?;
            let api_data = dec.decode_string()?;
            let xyz_challenge = dec.decode_string()?;
            one(IBEvent::VerifyAndAuthMessageApi { api_data, xyz_challenge })
        }
        incoming::VERIFY_AND_AUTH_COMPLETED => decode_verify_completed(dec, true),
        other => {
            tracing::warn!(kind = other, "unknown inbound message kind, record discarded");
            while dec.has_remaining() {
                dec.skip_field()?;
            }
            Ok(Vec::new())
        }
    }
}

/// `version, reqId` records such as the various `*_END` markers.
fn decode_versioned_req_id(
    dec: &mut MessageDecoder,
    event: impl FnOnce(i32) -> IBEvent,
) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    let req_id = dec.decode_i32()?;
    one(event(req_id))
}

fn decode_tick_type(dec: &mut MessageDecoder) -> Result<TickType> {
    let raw = dec.decode_i32()?;
    TickType::try_from(raw).map_err(|_| IBApiError::Decoding(format!("unknown tick type {raw}")))
}

/// Splits `"yyyymmdd[ hh:mm:ss[ tz]]"` into its date, time and zone parts.
fn split_last_trade(raw: &str) -> (String, String, String) {
    let mut parts = raw.split_whitespace();
    let date = parts.next().unwrap_or_default().to_string();
    let time = parts.next().unwrap_or_default().to_string();
    let zone = parts.next().unwrap_or_default().to_string();
    (date, time, zone)
}

// ============================================================================
// Connection & Error
// ============================================================================

fn decode_err_msg(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let version = dec.decode_i32()?;
    if version < 2 {
        let message = dec.decode_string()?;
        return one(IBEvent::Error {
            req_id: -1,
            code: 0,
            message,
        });
    }
    let req_id = dec.decode_i32()?;
    let code = dec.decode_i32()?;
    let message = dec.decode_string()?;
    one(IBEvent::Error { req_id, code, message })
}

fn decode_next_valid_id(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    let order_id = dec.decode_i32()?;
    one(IBEvent::NextValidId { order_id })
}

/// The account list arrives comma-separated.
fn decode_managed_accts(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    let accounts = dec
        .decode_string()?
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect();
    one(IBEvent::ManagedAccounts { accounts })
}

fn decode_current_time(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    let time = dec.decode_i64()?;
    one(IBEvent::CurrentTime { time })
}

// ============================================================================
// Market Data
// ============================================================================

/// TICK_PRICE carries the paired size too; a TickSize event follows the
/// TickPrice event for bid, ask and last ticks.
fn decode_tick_price(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let server_version = dec.server_version();
    let version = dec.decode_i32()?;
    let req_id = dec.decode_i32()?;
    let tick_type = decode_tick_type(dec)?;
    let price = dec.decode_f64()?;
    let size = if version >= 2 { dec.decode_decimal()? } else { Decimal::ZERO };
    let mask = if version >= 3 { dec.decode_i32()? } else { 0 };

    let mut attrib = TickAttrib {
        can_auto_execute: mask == 1,
        ..Default::default()
    };
    if server_version >= sv::PAST_LIMIT {
        attrib.can_auto_execute = mask & 1 != 0;
        attrib.past_limit = mask & 2 != 0;
        if server_version >= sv::PRE_OPEN_BID_ASK {
            attrib.pre_open = mask & 4 != 0;
        }
    }

    let mut events = vec![IBEvent::TickPrice {
        req_id,
        tick_type,
        price,
        attrib,
    }];
    if version >= 2 {
        if let Some(size_type) = tick_type.size_tick() {
            events.push(IBEvent::TickSize {
                req_id,
                tick_type: size_type,
                size,
            });
        }
    }
    Ok(events)
}

fn decode_tick_size(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    let req_id = dec.decode_i32()?;
    let tick_type = decode_tick_type(dec)?;
    let size = dec.decode_decimal()?;
    one(IBEvent::TickSize { req_id, tick_type, size })
}

/// The server marks missing price-like values with -1 and missing greeks
/// with -2; both become `None`.
fn decode_tick_option_computation(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let server_version = dec.server_version();
    let version = if server_version < sv::PRICE_BASED_VOLATILITY {
        dec.decode_i32()?
    } else {
        i32::MAX
    };
    let req_id = dec.decode_i32()?;
    let tick_type = decode_tick_type(dec)?;
    let tick_attrib = if server_version >= sv::PRICE_BASED_VOLATILITY {
        dec.decode_i32()?
    } else {
        0
    };

    let price_like = |v: f64| (v != -1.0 && v != UNSET_DOUBLE).then_some(v);
    let greek = |v: f64| (v != -2.0 && v != UNSET_DOUBLE).then_some(v);

    let implied_vol = price_like(dec.decode_f64()?);
    let delta = greek(dec.decode_f64()?);

    let is_model = matches!(
        tick_type,
        TickType::ModelOption | TickType::DelayedModelOptionComputation
    );
    let (mut opt_price, mut pv_dividend) = (None, None);
    if version >= 6 || is_model {
        opt_price = price_like(dec.decode_f64()?);
        pv_dividend = price_like(dec.decode_f64()?);
    }
    let (mut gamma, mut vega, mut theta, mut und_price) = (None, None, None, None);
    if version >= 6 {
        gamma = greek(dec.decode_f64()?);
        vega = greek(dec.decode_f64()?);
        theta = greek(dec.decode_f64()?);
        und_price = price_like(dec.decode_f64()?);
    }

    one(IBEvent::TickOptionComputation {
        req_id,
        tick_type,
        tick_attrib,
        implied_vol,
        delta,
        opt_price,
        pv_dividend,
        gamma,
        vega,
        theta,
        und_price,
    })
}

fn decode_tick_generic(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    let req_id = dec.decode_i32()?;
    let tick_type = decode_tick_type(dec)?;
    let value = dec.decode_f64()?;
    one(IBEvent::TickGeneric { req_id, tick_type, value })
}

fn decode_tick_string(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    let req_id = dec.decode_i32()?;
    let tick_type = decode_tick_type(dec)?;
    let value = dec.decode_string()?;
    one(IBEvent::TickString { req_id, tick_type, value })
}

fn decode_tick_efp(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    let req_id = dec.decode_i32()?;
    let tick_type = decode_tick_type(dec)?;
    one(IBEvent::TickEfp {
        req_id,
        tick_type,
        basis_points: dec.decode_f64()?,
        formatted_basis_points: dec.decode_string()?,
        implied_futures_price: dec.decode_f64()?,
        hold_days: dec.decode_i32()?,
        future_last_trade_date: dec.decode_string()?,
        dividend_impact: dec.decode_f64()?,
        dividends_to_last_trade_date: dec.decode_f64()?,
    })
}

fn decode_tick_req_params(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    one(IBEvent::TickReqParams {
        req_id: dec.decode_i32()?,
        min_tick: dec.decode_f64()?,
        bbo_exchange: dec.decode_string()?,
        snapshot_permissions: dec.decode_i32()?,
    })
}

fn decode_tick_news(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    one(IBEvent::TickNews {
        req_id: dec.decode_i32()?,
        time_stamp: dec.decode_i64()?,
        provider_code: dec.decode_string()?,
        article_id: dec.decode_string()?,
        headline: dec.decode_string()?,
        extra_data: dec.decode_string()?,
    })
}

fn decode_market_data_type(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    let req_id = dec.decode_i32()?;
    let market_data_type = dec.decode_i32()?;
    one(IBEvent::MarketDataType { req_id, market_data_type })
}

/// The tick type selects the layout: 1/2 last trades, 3 bid/ask, 4 midpoint.
fn decode_tick_by_tick(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let req_id = dec.decode_i32()?;
    let tick_type = dec.decode_i32()?;
    let time = dec.decode_i64()?;

    match tick_type {
        1 | 2 => {
            let price = dec.decode_f64()?;
            let size = dec.decode_decimal()?;
            let attrib = TickAttribLast::from_mask(dec.decode_i32()?);
            let exchange = dec.decode_string()?;
            let special_conditions = dec.decode_string()?;
            one(IBEvent::TickByTickAllLast {
                req_id,
                tick_type,
                time,
                price,
                size,
                attrib,
                exchange,
                special_conditions,
            })
        }
        3 => {
            let bid_price = dec.decode_f64()?;
            let ask_price = dec.decode_f64()?;
            let bid_size = dec.decode_decimal()?;
            let ask_size = dec.decode_decimal()?;
            let attrib = TickAttribBidAsk::from_mask(dec.decode_i32()?);
            one(IBEvent::TickByTickBidAsk {
                req_id,
                time,
                bid_price,
                ask_price,
                bid_size,
                ask_size,
                attrib,
            })
        }
        4 => {
            let mid_point = dec.decode_f64()?;
            one(IBEvent::TickByTickMidPoint { req_id, time, mid_point })
        }
        _ => Ok(Vec::new()),
    }
}

fn decode_market_depth(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    one(IBEvent::UpdateMktDepth {
        req_id: dec.decode_i32()?,
        position: dec.decode_i32()?,
        operation: dec.decode_i32()?,
        side: dec.decode_i32()?,
        price: dec.decode_f64()?,
        size: dec.decode_decimal()?,
    })
}

fn decode_market_depth_l2(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    let req_id = dec.decode_i32()?;
    let position = dec.decode_i32()?;
    let market_maker = dec.decode_string()?;
    let operation = dec.decode_i32()?;
    let side = dec.decode_i32()?;
    let price = dec.decode_f64()?;
    let size = dec.decode_decimal()?;
    let is_smart_depth = if dec.server_version() >= sv::SMART_DEPTH {
        dec.decode_bool()?
    } else {
        false
    };
    one(IBEvent::UpdateMktDepthL2 {
        req_id,
        position,
        market_maker,
        operation,
        side,
        price,
        size,
        is_smart_depth,
    })
}

fn decode_mkt_depth_exchanges(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let n = dec.decode_count()?;
    let mut descriptions = Vec::with_capacity(n);
    for _ in 0..n {
        let mut d = DepthMktDataDescription::default();
        if dec.server_version() >= sv::SERVICE_DATA_TYPE {
            d.exchange = dec.decode_string()?;
            d.sec_type = dec.decode_string()?;
            d.listing_exch = dec.decode_string()?;
            d.service_data_type = dec.decode_string()?;
            d.agg_group = dec.decode_i32_max()?;
        } else {
            d.exchange = dec.decode_string()?;
            d.sec_type = dec.decode_string()?;
            d.service_data_type = if dec.decode_bool()? { "Deep2" } else { "Deep" }.to_string();
        }
        descriptions.push(d);
    }
    one(IBEvent::MktDepthExchanges { descriptions })
}

fn decode_smart_components(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let req_id = dec.decode_i32()?;
    let n = dec.decode_count()?;
    let mut components = Vec::with_capacity(n);
    for _ in 0..n {
        components.push(SmartComponent {
            bit_number: dec.decode_i32()?,
            exchange: dec.decode_string()?,
            exchange_letter: dec.decode_string()?,
        });
    }
    one(IBEvent::SmartComponents { req_id, components })
}

fn decode_reroute(dec: &mut MessageDecoder, depth: bool) -> Result<Vec<IBEvent>> {
    let req_id = dec.decode_i32()?;
    let con_id = dec.decode_i32()?;
    let exchange = dec.decode_string()?;
    one(if depth {
        IBEvent::RerouteMktDepthReq { req_id, con_id, exchange }
    } else {
        IBEvent::RerouteMktDataReq { req_id, con_id, exchange }
    })
}

fn decode_delta_neutral_validation(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    let req_id = dec.decode_i32()?;
    let contract = DeltaNeutralContract {
        con_id: dec.decode_i32()?,
        delta: dec.decode_f64()?,
        price: dec.decode_f64()?,
    };
    one(IBEvent::DeltaNeutralValidation { req_id, contract })
}

// ============================================================================
// Orders & Executions
// ============================================================================

fn decode_order_status(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let server_version = dec.server_version();
    let version = if server_version < sv::MARKET_CAP_PRICE {
        dec.decode_i32()?
    } else {
        i32::MAX
    };
    let order_id = dec.decode_i32()?;
    let status = dec.decode_string()?;
    let filled = dec.decode_decimal()?;
    let remaining = dec.decode_decimal()?;
    let avg_fill_price = dec.decode_f64()?;
    let perm_id = if version >= 2 { dec.decode_i64()? } else { 0 };
    let parent_id = if version >= 3 { dec.decode_i32()? } else { 0 };
    let last_fill_price = if version >= 4 { dec.decode_f64()? } else { 0.0 };
    let client_id = if version >= 5 { dec.decode_i32()? } else { 0 };
    let why_held = if version >= 6 { dec.decode_string()? } else { String::new() };
    let mkt_cap_price = if server_version >= sv::MARKET_CAP_PRICE {
        dec.decode_f64()?
    } else {
        0.0
    };
    one(IBEvent::OrderStatus {
        order_id,
        status,
        filled,
        remaining,
        avg_fill_price,
        perm_id,
        parent_id,
        last_fill_price,
        client_id,
        why_held,
        mkt_cap_price,
    })
}

fn decode_order_bound(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    one(IBEvent::OrderBound {
        order_id: dec.decode_i64()?,
        api_client_id: dec.decode_i32()?,
        api_order_id: dec.decode_i32()?,
    })
}

fn decode_open_order(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let server_version = dec.server_version();
    let version = if server_version < sv::ORDER_CONTAINER {
        dec.decode_i32()?
    } else {
        server_version
    };
    let mut r = OrderReader::new(dec, version);

    r.order.order_id = r.dec.decode_i32()?;
    r.contract_fields()?;
    r.main_fields()?;
    r.tif_through_order_ref()?;
    if r.version >= 3 {
        r.order.client_id = r.dec.decode_i32()?;
    }
    r.perm_id_through_good_after_time()?;
    if r.version >= 6 {
        r.dec.skip_field()?; // shares allocation
    }
    r.fa_params()?;
    r.model_code_through_settling_firm()?;
    r.short_sale_params()?;
    if r.version >= 9 {
        r.order.auction_strategy = r.dec.decode_i32()?;
    }
    r.box_and_peg_to_stock()?;
    if r.version >= 9 {
        r.order.display_size = r.dec.decode_i32_max()?;
        if r.version < 18 {
            r.dec.skip_field()?; // old-style outside RTH flag
        }
        r.order.block_order = r.dec.decode_bool()?;
    }
    r.sweep_through_oca_type()?;
    if r.version >= 9 {
        r.dec.skip_fields(3)?; // eTradeOnly, firmQuoteOnly, nbboPriceCap
    }
    if r.version >= 10 {
        r.order.parent_id = r.dec.decode_i32()?;
        r.order.trigger_method = decode_trigger_method(r.dec)?;
    }
    r.volatility_params(true)?;
    r.trail_params()?;
    if r.version >= 14 {
        r.order.basis_points = r.dec.decode_f64_max()?;
        r.order.basis_points_type = r.dec.decode_i32_max()?;
    }
    r.combo_legs()?;
    r.smart_combo_routing_params()?;
    r.scale_params()?;
    r.hedge_params()?;
    if r.version >= 25 {
        r.order.opt_out_smart_routing = r.dec.decode_bool()?;
    }
    r.clearing_through_solicited()?;
    if r.version >= 16 {
        r.order.what_if = r.dec.decode_bool()?;
        r.state.status = r.dec.decode_string()?;
        r.margin_and_commission()?;
    }
    r.randomize_flags()?;
    r.peg_to_benchmark()?;
    r.conditions()?;
    if r.sv() >= sv::PEGGED_TO_BENCHMARK {
        r.order.adjusted_order_type = r.dec.decode_string()?;
        r.order.trigger_price = r.dec.decode_f64_max()?;
        r.order.trail_stop_price = r.dec.decode_f64_max()?;
        r.order.lmt_price_offset = r.dec.decode_f64_max()?;
        r.order.adjusted_stop_price = r.dec.decode_f64_max()?;
        r.order.adjusted_stop_limit_price = r.dec.decode_f64_max()?;
        r.order.adjusted_trailing_amount = r.dec.decode_f64_max()?;
        r.order.adjustable_trailing_unit = r.dec.decode_i32()?;
    }
    if r.sv() >= sv::SOFT_DOLLAR_TIER {
        r.order.soft_dollar_tier = SoftDollarTier {
            name: r.dec.decode_string()?,
            value: r.dec.decode_string()?,
            display_name: r.dec.decode_string()?,
        };
    }
    r.cash_qty_through_oms()?;
    if r.sv() >= sv::D_PEG_ORDERS {
        r.order.discretionary_up_to_limit_price = r.dec.decode_bool()?;
    }
    if r.sv() >= sv::PRICE_MGMT_ALGO {
        r.order.use_price_mgmt_algo = r.dec.decode_i32_max()?.map(|v| v != 0);
    }

    let order_id = r.order.order_id;
    let (contract, order, order_state) = r.into_parts();
    one(IBEvent::OpenOrder {
        order_id,
        contract,
        order,
        order_state,
    })
}

/// COMPLETED_ORDER has no version marker and no order id; it reuses the
/// OPEN_ORDER sections at their newest layout, minus the live-order fields.
fn decode_completed_order(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let mut r = OrderReader::new(dec, i32::MAX);

    r.contract_fields()?;
    r.main_fields()?;
    r.tif_through_order_ref()?;
    r.perm_id_through_good_after_time()?;
    r.fa_params()?;
    r.model_code_through_settling_firm()?;
    r.short_sale_params()?;
    r.box_and_peg_to_stock()?;
    r.order.display_size = r.dec.decode_i32_max()?;
    r.sweep_through_oca_type()?;
    r.order.trigger_method = decode_trigger_method(r.dec)?;
    r.volatility_params(false)?;
    r.trail_params()?;
    r.combo_legs()?;
    r.smart_combo_routing_params()?;
    r.scale_params()?;
    r.hedge_params()?;
    r.clearing_through_solicited()?;
    r.state.status = r.dec.decode_string()?;
    r.randomize_flags()?;
    r.peg_to_benchmark()?;
    r.conditions()?;
    r.order.trail_stop_price = r.dec.decode_f64_max()?;
    r.order.lmt_price_offset = r.dec.decode_f64_max()?;
    r.cash_qty_through_oms()?;

    r.order.auto_cancel_date = r.dec.decode_string()?;
    r.order.filled_quantity = r.dec.decode_decimal_max()?;
    r.order.ref_futures_con_id = r.dec.decode_i32()?;
    r.order.auto_cancel_parent = r.dec.decode_bool()?;
    r.order.shareholder = r.dec.decode_string()?;
    r.order.imbalance_only = r.dec.decode_bool()?;
    r.order.route_marketable_to_bbo = r.dec.decode_bool()?;
    r.order.parent_perm_id = r.dec.decode_i64()?;
    r.state.completed_time = r.dec.decode_string()?;
    r.state.completed_status = r.dec.decode_string()?;

    let (contract, order, order_state) = r.into_parts();
    one(IBEvent::CompletedOrder {
        contract,
        order,
        order_state,
    })
}

fn decode_trigger_method(dec: &mut MessageDecoder) -> Result<TriggerMethod> {
    let raw = dec.decode_i32()?;
    Ok(TriggerMethod::try_from(raw).unwrap_or_else(|other| {
        tracing::debug!(trigger_method = other, "unrecognised trigger method");
        TriggerMethod::Default
    }))
}

/// Section readers shared by OPEN_ORDER and COMPLETED_ORDER.
///
/// `version` is the record's legacy version marker, or `i32::MAX` when the
/// record has none.
struct OrderReader<'d, 'a> {
    dec: &'d mut MessageDecoder<'a>,
    version: i32,
    contract: Contract,
    order: Order,
    state: OrderState,
}

impl<'d, 'a> OrderReader<'d, 'a> {
    fn new(dec: &'d mut MessageDecoder<'a>, version: i32) -> Self {
        Self {
            dec,
            version,
            contract: Contract::default(),
            order: Order::default(),
            state: OrderState::default(),
        }
    }

    fn sv(&self) -> i32 {
        self.dec.server_version()
    }

    fn into_parts(self) -> (Box<Contract>, Box<Order>, Box<OrderState>) {
        (Box::new(self.contract), Box::new(self.order), Box::new(self.state))
    }

    fn contract_fields(&mut self) -> Result<()> {
        let (dec, c, v) = (&mut *self.dec, &mut self.contract, self.version);
        if v >= 17 {
            c.con_id = dec.decode_i32()?;
        }
        c.symbol = dec.decode_string()?;
        c.sec_type = dec.decode_enum_opt()?;
        c.last_trade_date_or_contract_month = dec.decode_string()?;
        c.strike = dec.decode_f64_max()?;
        c.right = dec.decode_enum_opt()?;
        if v >= 32 {
            c.multiplier = dec.decode_string()?;
        }
        c.exchange = dec.decode_string()?;
        c.currency = dec.decode_string()?;
        if v >= 2 {
            c.local_symbol = dec.decode_string()?;
        }
        if v >= 32 {
            c.trading_class = dec.decode_string()?;
        }
        Ok(())
    }

    fn main_fields(&mut self) -> Result<()> {
        let o = &mut self.order;
        o.action = self.dec.decode_enum_opt()?;
        o.total_quantity = self.dec.decode_decimal()?;
        o.order_type = self.dec.decode_enum_opt()?;
        if self.version < 29 {
            o.lmt_price = Some(self.dec.decode_f64()?);
            o.aux_price = Some(self.dec.decode_f64()?);
        } else {
            o.lmt_price = self.dec.decode_f64_max()?;
            o.aux_price = self.dec.decode_f64_max()?;
        }
        Ok(())
    }

    fn tif_through_order_ref(&mut self) -> Result<()> {
        let o = &mut self.order;
        o.tif = self.dec.decode_enum_opt()?;
        o.oca_group = self.dec.decode_string()?;
        o.account = self.dec.decode_string()?;
        o.open_close = self.dec.decode_string()?;
        o.origin = Origin::try_from(self.dec.decode_i32()?).unwrap_or(Origin::Customer);
        o.order_ref = self.dec.decode_string()?;
        Ok(())
    }

    fn perm_id_through_good_after_time(&mut self) -> Result<()> {
        let o = &mut self.order;
        if self.version >= 4 {
            o.perm_id = self.dec.decode_i64()?;
            if self.version < 18 {
                self.dec.skip_field()?; // ignoreRth, superseded by outsideRth
            } else {
                o.outside_rth = self.dec.decode_bool()?;
            }
            o.hidden = self.dec.decode_bool()?;
            o.discretionary_amt = self.dec.decode_f64()?;
        }
        if self.version >= 5 {
            o.good_after_time = self.dec.decode_string()?;
        }
        Ok(())
    }

    fn fa_params(&mut self) -> Result<()> {
        if self.version >= 7 {
            self.order.fa_group = self.dec.decode_string()?;
            self.order.fa_method = self.dec.decode_string()?;
            self.order.fa_percentage = self.dec.decode_string()?;
            self.dec.skip_field()?; // faProfile
        }
        Ok(())
    }

    fn model_code_through_settling_firm(&mut self) -> Result<()> {
        let o = &mut self.order;
        if self.dec.server_version() >= sv::MODELS_SUPPORT {
            o.model_code = self.dec.decode_string()?;
        }
        if self.version >= 8 {
            o.good_till_date = self.dec.decode_string()?;
        }
        if self.version >= 9 {
            o.rule_80a = self.dec.decode_string()?;
            o.percent_offset = self.dec.decode_f64_max()?;
            o.settling_firm = self.dec.decode_string()?;
        }
        Ok(())
    }

    fn short_sale_params(&mut self) -> Result<()> {
        if self.version < 9 {
            return Ok(());
        }
        self.order.short_sale_slot = self.dec.decode_i32()?;
        self.order.designated_location = self.dec.decode_string()?;
        if self.sv() == sv::SSHORTX_OLD {
            self.dec.skip_field()?;
        } else if self.version >= 23 {
            self.order.exempt_code = self.dec.decode_i32()?;
        }
        Ok(())
    }

    fn box_and_peg_to_stock(&mut self) -> Result<()> {
        if self.version >= 9 {
            let o = &mut self.order;
            o.starting_price = self.dec.decode_f64_max()?;
            o.stock_ref_price = self.dec.decode_f64_max()?;
            o.delta = self.dec.decode_f64_max()?;
            o.stock_range_lower = self.dec.decode_f64_max()?;
            o.stock_range_upper = self.dec.decode_f64_max()?;
        }
        Ok(())
    }

    fn sweep_through_oca_type(&mut self) -> Result<()> {
        if self.version >= 9 {
            let o = &mut self.order;
            o.sweep_to_fill = self.dec.decode_bool()?;
            o.all_or_none = self.dec.decode_bool()?;
            o.min_qty = self.dec.decode_i32_max()?;
            o.oca_type = self.dec.decode_i32()?;
        }
        Ok(())
    }

    /// `open_order_attribs` adds the clearing and open/close fields of the
    /// delta-neutral leg, which COMPLETED_ORDER leaves out.
    fn volatility_params(&mut self, open_order_attribs: bool) -> Result<()> {
        if self.version < 11 {
            return Ok(());
        }
        let (dec, o, v) = (&mut *self.dec, &mut self.order, self.version);
        o.volatility = dec.decode_f64_max()?;
        o.volatility_type = dec.decode_i32_max()?;
        if v == 11 {
            let legacy = dec.decode_i32()?;
            o.delta_neutral_order_type = if legacy == 0 { "NONE" } else { "MKT" }.to_string();
        } else {
            o.delta_neutral_order_type = dec.decode_string()?;
            o.delta_neutral_aux_price = dec.decode_f64_max()?;
            let has_leg = !o.delta_neutral_order_type.is_empty();
            if v >= 27 && has_leg {
                o.delta_neutral_con_id = dec.decode_i32()?;
                if open_order_attribs {
                    o.delta_neutral_settling_firm = dec.decode_string()?;
                    o.delta_neutral_clearing_account = dec.decode_string()?;
                    o.delta_neutral_clearing_intent = dec.decode_string()?;
                }
            }
            if v >= 31 && has_leg {
                if open_order_attribs {
                    o.delta_neutral_open_close = dec.decode_string()?;
                }
                o.delta_neutral_short_sale = dec.decode_bool()?;
                o.delta_neutral_short_sale_slot = dec.decode_i32()?;
                o.delta_neutral_designated_location = dec.decode_string()?;
            }
        }
        o.continuous_update = dec.decode_bool()?;
        if dec.server_version() == 26 {
            o.stock_range_lower = Some(dec.decode_f64()?);
            o.stock_range_upper = Some(dec.decode_f64()?);
        }
        o.reference_price_type = dec.decode_i32_max()?;
        Ok(())
    }

    fn trail_params(&mut self) -> Result<()> {
        if self.version >= 13 {
            self.order.trail_stop_price = self.dec.decode_f64_max()?;
        }
        if self.version >= 30 {
            self.order.trailing_percent = self.dec.decode_f64_max()?;
        }
        Ok(())
    }

    fn combo_legs(&mut self) -> Result<()> {
        if self.version >= 14 {
            self.contract.combo_legs_descrip = self.dec.decode_string()?;
        }
        if self.version < 29 {
            return Ok(());
        }
        let n = self.dec.decode_count()?;
        let mut legs = Vec::with_capacity(n);
        for _ in 0..n {
            legs.push(ComboLeg {
                con_id: self.dec.decode_i32()?,
                ratio: self.dec.decode_i32()?,
                action: self.dec.decode_enum_opt()?,
                exchange: self.dec.decode_string()?,
                open_close: LegOpenClose::try_from(self.dec.decode_i32()?)
                    .unwrap_or(LegOpenClose::Unknown),
                short_sale_slot: self.dec.decode_i32()?,
                designated_location: self.dec.decode_string()?,
                exempt_code: self.dec.decode_i32()?,
            });
        }
        self.contract.combo_legs = legs;

        let n = self.dec.decode_count()?;
        let mut prices = Vec::with_capacity(n);
        for _ in 0..n {
            prices.push(OrderComboLeg {
                price: self.dec.decode_f64_max()?,
            });
        }
        self.order.order_combo_legs = prices;
        Ok(())
    }

    fn smart_combo_routing_params(&mut self) -> Result<()> {
        if self.version >= 26 {
            self.order.smart_combo_routing_params = self.dec.decode_tag_values()?;
        }
        Ok(())
    }

    /// The seven extension fields follow only a positive price increment.
    fn scale_params(&mut self) -> Result<()> {
        if self.version < 15 {
            return Ok(());
        }
        let (dec, o) = (&mut *self.dec, &mut self.order);
        if self.version >= 20 {
            o.scale_init_level_size = dec.decode_i32_max()?;
            o.scale_subs_level_size = dec.decode_i32_max()?;
        } else {
            dec.skip_field()?; // scaleNumComponents
            o.scale_init_level_size = dec.decode_i32_max()?;
        }
        o.scale_price_increment = dec.decode_f64_max()?;
        if self.version >= 28 && o.has_scale_extension() {
            o.scale_price_adjust_value = dec.decode_f64_max()?;
            o.scale_price_adjust_interval = dec.decode_i32_max()?;
            o.scale_profit_offset = dec.decode_f64_max()?;
            o.scale_auto_reset = dec.decode_bool()?;
            o.scale_init_position = dec.decode_i32_max()?;
            o.scale_init_fill_qty = dec.decode_i32_max()?;
            o.scale_random_percent = dec.decode_bool()?;
        }
        Ok(())
    }

    fn hedge_params(&mut self) -> Result<()> {
        if self.version >= 24 {
            self.order.hedge_type = self.dec.decode_string()?;
            if !self.order.hedge_type.is_empty() {
                self.order.hedge_param = self.dec.decode_string()?;
            }
        }
        Ok(())
    }

    fn clearing_through_solicited(&mut self) -> Result<()> {
        let v = self.version;
        if v >= 19 {
            self.order.clearing_account = self.dec.decode_string()?;
            self.order.clearing_intent = self.dec.decode_string()?;
        }
        if v >= 22 {
            self.order.not_held = self.dec.decode_bool()?;
        }
        if v >= 20 && self.dec.decode_bool()? {
            self.contract.delta_neutral_contract = Some(DeltaNeutralContract {
                con_id: self.dec.decode_i32()?,
                delta: self.dec.decode_f64()?,
                price: self.dec.decode_f64()?,
            });
        }
        if v >= 21 {
            self.order.algo_strategy = self.dec.decode_string()?;
            if !self.order.algo_strategy.is_empty() {
                self.order.algo_params = self.dec.decode_tag_values()?;
            }
        }
        if v >= 33 {
            self.order.solicited = self.dec.decode_bool()?;
        }
        Ok(())
    }

    fn margin_and_commission(&mut self) -> Result<()> {
        let (dec, s) = (&mut *self.dec, &mut self.state);
        if dec.server_version() >= sv::WHAT_IF_EXT_FIELDS {
            s.init_margin_before = dec.decode_string()?;
            s.maint_margin_before = dec.decode_string()?;
            s.equity_with_loan_before = dec.decode_string()?;
            s.init_margin_change = dec.decode_string()?;
            s.maint_margin_change = dec.decode_string()?;
            s.equity_with_loan_change = dec.decode_string()?;
        }
        s.init_margin_after = dec.decode_string()?;
        s.maint_margin_after = dec.decode_string()?;
        s.equity_with_loan_after = dec.decode_string()?;
        s.commission = dec.decode_f64_max()?;
        s.min_commission = dec.decode_f64_max()?;
        s.max_commission = dec.decode_f64_max()?;
        s.commission_currency = dec.decode_string()?;
        s.warning_text = dec.decode_string()?;
        Ok(())
    }

    fn randomize_flags(&mut self) -> Result<()> {
        if self.version >= 34 {
            self.order.randomize_size = self.dec.decode_bool()?;
            self.order.randomize_price = self.dec.decode_bool()?;
        }
        Ok(())
    }

    fn peg_to_benchmark(&mut self) -> Result<()> {
        if self.sv() >= sv::PEGGED_TO_BENCHMARK
            && self.order.order_type == Some(OrderType::PeggedToBenchmark)
        {
            let o = &mut self.order;
            o.reference_contract_id = self.dec.decode_i32()?;
            o.is_pegged_change_amount_decrease = self.dec.decode_bool()?;
            o.pegged_change_amount = self.dec.decode_f64()?;
            o.reference_change_amount = self.dec.decode_f64()?;
            o.reference_exchange_id = self.dec.decode_string()?;
        }
        Ok(())
    }

    /// The two trailing flags are present only when at least one condition
    /// was sent.
    fn conditions(&mut self) -> Result<()> {
        if self.sv() < sv::PEGGED_TO_BENCHMARK {
            return Ok(());
        }
        let n = self.dec.decode_count()?;
        if n == 0 {
            return Ok(());
        }
        let mut conditions = Vec::with_capacity(n);
        for _ in 0..n {
            conditions.push(decode_order_condition(self.dec)?);
        }
        self.order.conditions = conditions;
        self.order.conditions_ignore_rth = self.dec.decode_bool()?;
        self.order.conditions_cancel_order = self.dec.decode_bool()?;
        Ok(())
    }

    fn cash_qty_through_oms(&mut self) -> Result<()> {
        if self.sv() >= sv::CASH_QTY {
            self.order.cash_qty = self.dec.decode_f64_max()?;
        }
        if self.sv() >= sv::AUTO_PRICE_FOR_HEDGE {
            self.order.dont_use_auto_price_for_hedge = self.dec.decode_bool()?;
        }
        if self.sv() >= sv::ORDER_CONTAINER {
            self.order.is_oms_container = self.dec.decode_bool()?;
        }
        Ok(())
    }
}

/// Type tag, `"a"`/`"o"` conjunction, then the variant's fixed fields.
fn decode_order_condition(dec: &mut MessageDecoder) -> Result<OrderCondition> {
    let raw = dec.decode_i32()?;
    let kind = OrderConditionType::try_from(raw)
        .map_err(|t| IBApiError::Decoding(format!("unknown order condition type {t}")))?;
    let conjunction = dec.decode_string()?.eq_ignore_ascii_case("a");

    Ok(match kind {
        OrderConditionType::Price => OrderCondition::Price {
            conjunction,
            is_more: dec.decode_bool()?,
            price: dec.decode_f64()?,
            con_id: dec.decode_i32()?,
            exchange: dec.decode_string()?,
            trigger_method: decode_trigger_method(dec)?,
        },
        OrderConditionType::Time => OrderCondition::Time {
            conjunction,
            is_more: dec.decode_bool()?,
            time: dec.decode_string()?,
        },
        OrderConditionType::Margin => OrderCondition::Margin {
            conjunction,
            is_more: dec.decode_bool()?,
            percent: dec.decode_i32()?,
        },
        OrderConditionType::Execution => OrderCondition::Execution {
            conjunction,
            sec_type: dec.decode_string()?,
            exchange: dec.decode_string()?,
            symbol: dec.decode_string()?,
        },
        OrderConditionType::Volume => OrderCondition::Volume {
            conjunction,
            is_more: dec.decode_bool()?,
            volume: dec.decode_i32()?,
            con_id: dec.decode_i32()?,
            exchange: dec.decode_string()?,
        },
        OrderConditionType::PercentChange => OrderCondition::PercentChange {
            conjunction,
            is_more: dec.decode_bool()?,
            change_percent: dec.decode_f64()?,
            con_id: dec.decode_i32()?,
            exchange: dec.decode_string()?,
        },
    })
}

fn decode_execution_data(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let server_version = dec.server_version();
    let version = if server_version < sv::LAST_LIQUIDITY {
        dec.decode_i32()?
    } else {
        server_version
    };
    let req_id = if version >= 7 { dec.decode_i32()? } else { -1 };
    let order_id = dec.decode_i32()?;

    let mut c = Contract::default();
    if version >= 5 {
        c.con_id = dec.decode_i32()?;
    }
    c.symbol = dec.decode_string()?;
    c.sec_type = dec.decode_enum_opt()?;
    c.last_trade_date_or_contract_month = dec.decode_string()?;
    c.strike = dec.decode_f64_max()?;
    c.right = dec.decode_enum_opt()?;
    if version >= 9 {
        c.multiplier = dec.decode_string()?;
    }
    c.exchange = dec.decode_string()?;
    c.currency = dec.decode_string()?;
    c.local_symbol = dec.decode_string()?;
    if version >= 10 {
        c.trading_class = dec.decode_string()?;
    }

    let mut e = Execution::default();
    e.order_id = order_id;
    e.exec_id = dec.decode_string()?;
    e.time = dec.decode_string()?;
    e.acct_number = dec.decode_string()?;
    e.exchange = dec.decode_string()?;
    e.side = dec.decode_string()?;
    e.shares = dec.decode_decimal()?;
    e.price = dec.decode_f64()?;
    if version >= 2 {
        e.perm_id = dec.decode_i64()?;
    }
    if version >= 3 {
        e.client_id = dec.decode_i32()?;
    }
    if version >= 4 {
        e.liquidation = dec.decode_i32()?;
    }
    if version >= 6 {
        e.cum_qty = dec.decode_decimal()?;
        e.avg_price = dec.decode_f64()?;
    }
    if version >= 8 {
        e.order_ref = dec.decode_string()?;
    }
    if version >= 9 {
        e.ev_rule = dec.decode_string()?;
        e.ev_multiplier = dec.decode_f64_max()?;
    }
    if server_version >= sv::MODELS_SUPPORT {
        e.model_code = dec.decode_string()?;
    }
    if server_version >= sv::LAST_LIQUIDITY {
        e.last_liquidity = dec.decode_i32()?;
    }

    one(IBEvent::ExecDetails {
        req_id,
        contract: Box::new(c),
        execution: Box::new(e),
    })
}

fn decode_commission_report(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    let report = CommissionReport {
        exec_id: dec.decode_string()?,
        commission: dec.decode_f64()?,
        currency: dec.decode_string()?,
        realized_pnl: dec.decode_f64_max()?,
        r#yield: dec.decode_f64_max()?,
        yield_redemption_date: dec.decode_i32()?,
    };
    one(IBEvent::CommissionReport { report })
}

// ============================================================================
// Account & Portfolio
// ============================================================================

fn decode_acct_value(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let version = dec.decode_i32()?;
    let key = dec.decode_string()?;
    let value = dec.decode_string()?;
    let currency = dec.decode_string()?;
    let account_name = if version >= 2 { dec.decode_string()? } else { String::new() };
    one(IBEvent::UpdateAccountValue {
        key,
        value,
        currency,
        account_name,
    })
}

fn decode_portfolio_value(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let version = dec.decode_i32()?;

    let mut c = Contract::default();
    if version >= 6 {
        c.con_id = dec.decode_i32()?;
    }
    c.symbol = dec.decode_string()?;
    c.sec_type = dec.decode_enum_opt()?;
    c.last_trade_date_or_contract_month = dec.decode_string()?;
    c.strike = dec.decode_f64_max()?;
    c.right = dec.decode_enum_opt()?;
    if version >= 7 {
        c.multiplier = dec.decode_string()?;
        c.primary_exchange = dec.decode_string()?;
    }
    c.currency = dec.decode_string()?;
    if version >= 2 {
        c.local_symbol = dec.decode_string()?;
    }
    if version >= 8 {
        c.trading_class = dec.decode_string()?;
    }

    let position = dec.decode_decimal()?;
    let market_price = dec.decode_f64()?;
    let market_value = dec.decode_f64()?;
    let (mut average_cost, mut unrealized_pnl, mut realized_pnl) = (0.0, 0.0, 0.0);
    if version >= 3 {
        average_cost = dec.decode_f64()?;
        unrealized_pnl = dec.decode_f64()?;
        realized_pnl = dec.decode_f64()?;
    }
    let account_name = if version >= 4 { dec.decode_string()? } else { String::new() };

    one(IBEvent::UpdatePortfolio {
        contract: Box::new(c),
        position,
        market_price,
        market_value,
        average_cost,
        unrealized_pnl,
        realized_pnl,
        account_name,
    })
}

fn decode_acct_update_time(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    one(IBEvent::UpdateAccountTime {
        time_stamp: dec.decode_string()?,
    })
}

fn decode_acct_download_end(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    one(IBEvent::AccountDownloadEnd {
        account: dec.decode_string()?,
    })
}

fn decode_account_summary(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    one(IBEvent::AccountSummary {
        req_id: dec.decode_i32()?,
        account: dec.decode_string()?,
        tag: dec.decode_string()?,
        value: dec.decode_string()?,
        currency: dec.decode_string()?,
    })
}

/// conId through tradingClass, as POSITION_DATA and POSITION_MULTI send it.
fn decode_position_contract(dec: &mut MessageDecoder, with_trading_class: bool) -> Result<Contract> {
    let mut c = Contract::default();
    c.con_id = dec.decode_i32()?;
    c.symbol = dec.decode_string()?;
    c.sec_type = dec.decode_enum_opt()?;
    c.last_trade_date_or_contract_month = dec.decode_string()?;
    c.strike = dec.decode_f64_max()?;
    c.right = dec.decode_enum_opt()?;
    c.multiplier = dec.decode_string()?;
    c.exchange = dec.decode_string()?;
    c.currency = dec.decode_string()?;
    c.local_symbol = dec.decode_string()?;
    if with_trading_class {
        c.trading_class = dec.decode_string()?;
    }
    Ok(c)
}

fn decode_position_data(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let version = dec.decode_i32()?;
    let account = dec.decode_string()?;
    let contract = decode_position_contract(dec, version >= 2)?;
    let position = dec.decode_decimal()?;
    let avg_cost = if version >= 3 { dec.decode_f64()? } else { 0.0 };
    one(IBEvent::Position {
        account,
        contract: Box::new(contract),
        position,
        avg_cost,
    })
}

fn decode_position_multi(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    let req_id = dec.decode_i32()?;
    let account = dec.decode_string()?;
    let contract = decode_position_contract(dec, true)?;
    let position = dec.decode_decimal()?;
    let avg_cost = dec.decode_f64()?;
    let model_code = dec.decode_string()?;
    one(IBEvent::PositionMulti {
        req_id,
        account,
        model_code,
        contract: Box::new(contract),
        position,
        avg_cost,
    })
}

fn decode_account_update_multi(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    one(IBEvent::AccountUpdateMulti {
        req_id: dec.decode_i32()?,
        account: dec.decode_string()?,
        model_code: dec.decode_string()?,
        key: dec.decode_string()?,
        value: dec.decode_string()?,
        currency: dec.decode_string()?,
    })
}

fn decode_pnl(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let req_id = dec.decode_i32()?;
    let daily_pnl = dec.decode_f64()?;
    let unrealized_pnl = if dec.server_version() >= sv::UNREALIZED_PNL {
        dec.decode_f64_max()?
    } else {
        None
    };
    let realized_pnl = if dec.server_version() >= sv::REALIZED_PNL {
        dec.decode_f64_max()?
    } else {
        None
    };
    one(IBEvent::Pnl {
        req_id,
        daily_pnl,
        unrealized_pnl,
        realized_pnl,
    })
}

fn decode_pnl_single(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let req_id = dec.decode_i32()?;
    let position = dec.decode_decimal()?;
    let daily_pnl = dec.decode_f64()?;
    let unrealized_pnl = if dec.server_version() >= sv::UNREALIZED_PNL {
        dec.decode_f64_max()?
    } else {
        None
    };
    let realized_pnl = if dec.server_version() >= sv::REALIZED_PNL {
        dec.decode_f64_max()?
    } else {
        None
    };
    let value = dec.decode_f64()?;
    one(IBEvent::PnlSingle {
        req_id,
        position,
        daily_pnl,
        unrealized_pnl,
        realized_pnl,
        value,
    })
}

fn decode_family_codes(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let n = dec.decode_count()?;
    let mut codes = Vec::with_capacity(n);
    for _ in 0..n {
        codes.push(FamilyCode {
            account_id: dec.decode_string()?,
            family_code: dec.decode_string()?,
        });
    }
    one(IBEvent::FamilyCodes { codes })
}

fn decode_soft_dollar_tiers(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let req_id = dec.decode_i32()?;
    let n = dec.decode_count()?;
    let mut tiers = Vec::with_capacity(n);
    for _ in 0..n {
        tiers.push(SoftDollarTier {
            name: dec.decode_string()?,
            value: dec.decode_string()?,
            display_name: dec.decode_string()?,
        });
    }
    one(IBEvent::SoftDollarTiers { req_id, tiers })
}

// ============================================================================
// Contracts
// ============================================================================

fn decode_contract_data(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let server_version = dec.server_version();
    let version = dec.decode_i32()?;
    let req_id = if version >= 3 { dec.decode_i32()? } else { -1 };

    let mut d = ContractDetails::default();
    d.contract.symbol = dec.decode_string()?;
    d.contract.sec_type = dec.decode_enum_opt()?;
    let (date, time, _) = split_last_trade(&dec.decode_string()?);
    d.contract.last_trade_date_or_contract_month = date;
    d.last_trade_time = time;
    d.contract.strike = dec.decode_f64_max()?;
    d.contract.right = dec.decode_enum_opt()?;
    d.contract.exchange = dec.decode_string()?;
    d.contract.currency = dec.decode_string()?;
    d.contract.local_symbol = dec.decode_string()?;
    d.market_name = dec.decode_string()?;
    d.contract.trading_class = dec.decode_string()?;
    d.contract.con_id = dec.decode_i32()?;
    d.min_tick = dec.decode_f64()?;
    if server_version >= sv::MD_SIZE_MULTIPLIER {
        d.md_size_multiplier = dec.decode_i32_max()?;
    }
    d.contract.multiplier = dec.decode_string()?;
    d.order_types = dec.decode_string()?;
    d.valid_exchanges = dec.decode_string()?;
    if version >= 2 {
        d.price_magnifier = dec.decode_i32()?;
    }
    if version >= 4 {
        d.under_con_id = dec.decode_i32()?;
    }
    if version >= 5 {
        d.long_name = dec.decode_string()?;
        d.contract.primary_exchange = dec.decode_string()?;
    }
    if version >= 6 {
        d.contract_month = dec.decode_string()?;
        d.industry = dec.decode_string()?;
        d.category = dec.decode_string()?;
        d.subcategory = dec.decode_string()?;
        d.time_zone_id = dec.decode_string()?;
        d.trading_hours = dec.decode_string()?;
        d.liquid_hours = dec.decode_string()?;
    }
    if version >= 8 {
        d.ev_rule = dec.decode_string()?;
        d.ev_multiplier = dec.decode_f64_max()?;
    }
    if version >= 7 {
        d.sec_id_list = dec.decode_tag_values()?;
    }
    if server_version >= sv::AGG_GROUP {
        d.agg_group = dec.decode_i32_max()?;
    }
    if server_version >= sv::UNDERLYING_INFO {
        d.under_symbol = dec.decode_string()?;
        d.under_sec_type = dec.decode_string()?;
    }
    if server_version >= sv::MARKET_RULES {
        d.market_rule_ids = dec.decode_string()?;
    }
    if server_version >= sv::REAL_EXPIRATION_DATE {
        d.real_expiration_date = dec.decode_string()?;
    }
    if server_version >= sv::STOCK_TYPE {
        d.stock_type = dec.decode_string()?;
    }

    one(IBEvent::ContractDetails {
        req_id,
        details: Box::new(d),
    })
}

/// The maturity field may carry a time and a time zone after the date.
fn decode_bond_contract_data(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let server_version = dec.server_version();
    let version = dec.decode_i32()?;
    let req_id = if version >= 3 { dec.decode_i32()? } else { -1 };

    let mut d = ContractDetails::default();
    d.contract.symbol = dec.decode_string()?;
    d.contract.sec_type = dec.decode_enum_opt()?;
    d.cusip = dec.decode_string()?;
    d.coupon = dec.decode_f64()?;
    let (date, time, zone) = split_last_trade(&dec.decode_string()?);
    d.maturity = date;
    d.last_trade_time = time;
    if !zone.is_empty() {
        d.time_zone_id = zone;
    }
    d.issue_date = dec.decode_string()?;
    d.ratings = dec.decode_string()?;
    d.bond_type = dec.decode_string()?;
    d.coupon_type = dec.decode_string()?;
    d.convertible = dec.decode_bool()?;
    d.callable = dec.decode_bool()?;
    d.putable = dec.decode_bool()?;
    d.desc_append = dec.decode_string()?;
    d.contract.exchange = dec.decode_string()?;
    d.contract.currency = dec.decode_string()?;
    d.market_name = dec.decode_string()?;
    d.contract.trading_class = dec.decode_string()?;
    d.contract.con_id = dec.decode_i32()?;
    d.min_tick = dec.decode_f64()?;
    if server_version >= sv::MD_SIZE_MULTIPLIER {
        d.md_size_multiplier = dec.decode_i32_max()?;
    }
    d.order_types = dec.decode_string()?;
    d.valid_exchanges = dec.decode_string()?;
    if version >= 2 {
        d.next_option_date = dec.decode_string()?;
        d.next_option_type = dec.decode_string()?;
        d.next_option_partial = dec.decode_bool()?;
        d.notes = dec.decode_string()?;
    }
    if version >= 4 {
        d.long_name = dec.decode_string()?;
    }
    if version >= 6 {
        d.ev_rule = dec.decode_string()?;
        d.ev_multiplier = dec.decode_f64_max()?;
    }
    if version >= 5 {
        d.sec_id_list = dec.decode_tag_values()?;
    }
    if server_version >= sv::AGG_GROUP {
        d.agg_group = dec.decode_i32_max()?;
    }
    if server_version >= sv::MARKET_RULES {
        d.market_rule_ids = dec.decode_string()?;
    }

    one(IBEvent::BondContractDetails {
        req_id,
        details: Box::new(d),
    })
}

fn decode_symbol_samples(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let req_id = dec.decode_i32()?;
    let n = dec.decode_count()?;
    let mut descriptions = Vec::with_capacity(n);
    for _ in 0..n {
        let mut contract = Contract::default();
        contract.con_id = dec.decode_i32()?;
        contract.symbol = dec.decode_string()?;
        contract.sec_type = dec.decode_enum_opt()?;
        contract.primary_exchange = dec.decode_string()?;
        contract.currency = dec.decode_string()?;

        let k = dec.decode_count()?;
        let mut derivative_sec_types = Vec::with_capacity(k);
        for _ in 0..k {
            derivative_sec_types.push(dec.decode_string()?);
        }
        descriptions.push(ContractDescription {
            contract,
            derivative_sec_types,
        });
    }
    one(IBEvent::SymbolSamples { req_id, descriptions })
}

fn decode_sec_def_opt_params(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let req_id = dec.decode_i32()?;
    let exchange = dec.decode_string()?;
    let underlying_con_id = dec.decode_i32()?;
    let trading_class = dec.decode_string()?;
    let multiplier = dec.decode_string()?;

    let n = dec.decode_count()?;
    let mut expirations = Vec::with_capacity(n);
    for _ in 0..n {
        expirations.push(dec.decode_string()?);
    }
    let n = dec.decode_count()?;
    let mut strikes = Vec::with_capacity(n);
    for _ in 0..n {
        strikes.push(dec.decode_f64()?);
    }

    one(IBEvent::SecurityDefinitionOptionalParameter {
        req_id,
        exchange,
        underlying_con_id,
        trading_class,
        multiplier,
        expirations,
        strikes,
    })
}

fn decode_market_rule(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let market_rule_id = dec.decode_i32()?;
    let n = dec.decode_count()?;
    let mut price_increments = Vec::with_capacity(n);
    for _ in 0..n {
        price_increments.push(PriceIncrement {
            low_edge: dec.decode_f64()?,
            increment: dec.decode_f64()?,
        });
    }
    one(IBEvent::MarketRule {
        market_rule_id,
        price_increments,
    })
}

// ============================================================================
// Historical & Real-time Bars
// ============================================================================

/// One HistoricalData event per bar, then HistoricalDataEnd.
fn decode_historical_data(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let server_version = dec.server_version();
    let version = if server_version < sv::SYNT_REALTIME_BARS {
        dec.decode_i32()?
    } else {
        i32::MAX
    };
    let req_id = dec.decode_i32()?;
    let (mut start, mut end) = (String::new(), String::new());
    if version >= 2 {
        start = dec.decode_string()?;
        end = dec.decode_string()?;
    }

    let n = dec.decode_count()?;
    let mut events = Vec::with_capacity(n + 1);
    for _ in 0..n {
        let mut bar = Bar::default();
        bar.time = dec.decode_string()?;
        bar.open = dec.decode_f64()?;
        bar.high = dec.decode_f64()?;
        bar.low = dec.decode_f64()?;
        bar.close = dec.decode_f64()?;
        bar.volume = dec.decode_decimal()?;
        bar.wap = dec.decode_decimal()?;
        if server_version < sv::SYNT_REALTIME_BARS {
            dec.skip_field()?; // hasGaps
        }
        bar.count = if version >= 3 { dec.decode_i32()? } else { -1 };
        events.push(IBEvent::HistoricalData { req_id, bar });
    }
    events.push(IBEvent::HistoricalDataEnd { req_id, start, end });
    Ok(events)
}

fn decode_historical_data_update(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let req_id = dec.decode_i32()?;
    let mut bar = Bar::default();
    bar.count = dec.decode_i32()?;
    bar.time = dec.decode_string()?;
    bar.open = dec.decode_f64()?;
    bar.close = dec.decode_f64()?;
    bar.high = dec.decode_f64()?;
    bar.low = dec.decode_f64()?;
    bar.wap = dec.decode_decimal()?;
    bar.volume = dec.decode_decimal()?;
    one(IBEvent::HistoricalDataUpdate { req_id, bar })
}

fn decode_head_timestamp(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    one(IBEvent::HeadTimestamp {
        req_id: dec.decode_i32()?,
        head_timestamp: dec.decode_string()?,
    })
}

fn decode_histogram_data(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let req_id = dec.decode_i32()?;
    let n = dec.decode_count()?;
    let mut items = Vec::with_capacity(n);
    for _ in 0..n {
        items.push(HistogramEntry {
            price: dec.decode_f64()?,
            size: dec.decode_decimal()?,
        });
    }
    one(IBEvent::HistogramData { req_id, items })
}

fn decode_historical_ticks(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let req_id = dec.decode_i32()?;
    let n = dec.decode_count()?;
    let mut ticks = Vec::with_capacity(n);
    for _ in 0..n {
        let time = dec.decode_i64()?;
        dec.skip_field()?; // unused
        ticks.push(HistoricalTick {
            time,
            price: dec.decode_f64()?,
            size: dec.decode_decimal()?,
        });
    }
    let done = dec.decode_bool()?;
    one(IBEvent::HistoricalTicks { req_id, ticks, done })
}

fn decode_historical_ticks_bid_ask(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let req_id = dec.decode_i32()?;
    let n = dec.decode_count()?;
    let mut ticks = Vec::with_capacity(n);
    for _ in 0..n {
        ticks.push(HistoricalTickBidAsk {
            time: dec.decode_i64()?,
            attrib: TickAttribBidAsk::from_mask(dec.decode_i32()?),
            price_bid: dec.decode_f64()?,
            price_ask: dec.decode_f64()?,
            size_bid: dec.decode_decimal()?,
            size_ask: dec.decode_decimal()?,
        });
    }
    let done = dec.decode_bool()?;
    one(IBEvent::HistoricalTicksBidAsk { req_id, ticks, done })
}

fn decode_historical_ticks_last(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let req_id = dec.decode_i32()?;
    let n = dec.decode_count()?;
    let mut ticks = Vec::with_capacity(n);
    for _ in 0..n {
        ticks.push(HistoricalTickLast {
            time: dec.decode_i64()?,
            attrib: TickAttribLast::from_mask(dec.decode_i32()?),
            price: dec.decode_f64()?,
            size: dec.decode_decimal()?,
            exchange: dec.decode_string()?,
            special_conditions: dec.decode_string()?,
        });
    }
    let done = dec.decode_bool()?;
    one(IBEvent::HistoricalTicksLast { req_id, ticks, done })
}

fn decode_real_time_bar(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    let req_id = dec.decode_i32()?;
    let bar = RealTimeBar {
        time: dec.decode_i64()?,
        open: dec.decode_f64()?,
        high: dec.decode_f64()?,
        low: dec.decode_f64()?,
        close: dec.decode_f64()?,
        volume: dec.decode_decimal()?,
        wap: dec.decode_decimal()?,
        count: dec.decode_i32()?,
    };
    one(IBEvent::RealtimeBar { req_id, bar })
}

// ============================================================================
// Scanner & Fundamentals
// ============================================================================

/// One ScannerData event per row, then ScannerDataEnd.
fn decode_scanner_data(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let version = dec.decode_i32()?;
    let req_id = dec.decode_i32()?;
    let n = dec.decode_count()?;
    let mut events = Vec::with_capacity(n + 1);
    for _ in 0..n {
        let mut item = ScannerDataItem::default();
        item.rank = dec.decode_i32()?;
        let d = &mut item.contract_details;
        if version >= 3 {
            d.contract.con_id = dec.decode_i32()?;
        }
        d.contract.symbol = dec.decode_string()?;
        d.contract.sec_type = dec.decode_enum_opt()?;
        d.contract.last_trade_date_or_contract_month = dec.decode_string()?;
        d.contract.strike = dec.decode_f64_max()?;
        d.contract.right = dec.decode_enum_opt()?;
        d.contract.exchange = dec.decode_string()?;
        d.contract.currency = dec.decode_string()?;
        d.contract.local_symbol = dec.decode_string()?;
        d.market_name = dec.decode_string()?;
        d.contract.trading_class = dec.decode_string()?;
        item.distance = dec.decode_string()?;
        item.benchmark = dec.decode_string()?;
        item.projection = dec.decode_string()?;
        if version >= 2 {
            item.legs_str = dec.decode_string()?;
        }
        events.push(IBEvent::ScannerData {
            req_id,
            item: Box::new(item),
        });
    }
    events.push(IBEvent::ScannerDataEnd { req_id });
    Ok(events)
}

fn decode_fundamental_data(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    one(IBEvent::FundamentalData {
        req_id: dec.decode_i32()?,
        data: dec.decode_string()?,
    })
}

// ============================================================================
// News
// ============================================================================

fn decode_news_bulletin(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    one(IBEvent::UpdateNewsBulletin {
        msg_id: dec.decode_i32()?,
        msg_type: dec.decode_i32()?,
        message: dec.decode_string()?,
        orig_exchange: dec.decode_string()?,
    })
}

fn decode_news_article(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    one(IBEvent::NewsArticle {
        req_id: dec.decode_i32()?,
        article_type: dec.decode_i32()?,
        article_text: dec.decode_string()?,
    })
}

fn decode_news_providers(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    let n = dec.decode_count()?;
    let mut providers = Vec::with_capacity(n);
    for _ in 0..n {
        providers.push(NewsProvider {
            code: dec.decode_string()?,
            name: dec.decode_string()?,
        });
    }
    one(IBEvent::NewsProviders { providers })
}

fn decode_historical_news(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    one(IBEvent::HistoricalNews {
        req_id: dec.decode_i32()?,
        time: dec.decode_string()?,
        provider_code: dec.decode_string()?,
        article_id: dec.decode_string()?,
        headline: dec.decode_string()?,
    })
}

// ============================================================================
// Financial Advisor, Display Groups, Verification
// ============================================================================

fn decode_receive_fa(dec: &mut MessageDecoder) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    one(IBEvent::ReceiveFa {
        fa_data_type: dec.decode_i32()?,
        xml: dec.decode_string()?,
    })
}

fn decode_display_group(dec: &mut MessageDecoder, updated: bool) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    let req_id = dec.decode_i32()?;
    let text = dec.decode_string()?;
    one(if updated {
        IBEvent::DisplayGroupUpdated {
            req_id,
            contract_info: text,
        }
    } else {
        IBEvent::DisplayGroupList { req_id, groups: text }
    })
}

/// The success flag is the literal text `"true"`.
fn decode_verify_completed(dec: &mut MessageDecoder, auth: bool) -> Result<Vec<IBEvent>> {
    dec.skip_field()?;
    let is_successful = dec.decode_string()?.eq_ignore_ascii_case("true");
    let error_text = dec.decode_string()?;
    one(if auth {
        IBEvent::VerifyAndAuthCompleted {
            is_successful,
            error_text,
        }
    } else {
        IBEvent::VerifyCompleted {
            is_successful,
            error_text,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::MessageEncoder;
    use crate::protocol::HEADER_LEN;

    fn payload(fields: &[&str]) -> Vec<u8> {
        let mut out = Vec::new();
        for f in fields {
            out.extend_from_slice(f.as_bytes());
            out.push(0);
        }
        out
    }

    fn decode(fields: &[&str], server_version: i32) -> Vec<IBEvent> {
        decode_frame(&payload(fields), server_version).unwrap()
    }

    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    #[test]
    fn plain_decoders_map_empty_to_zero() {
        let data = payload(&["", "", "", "", "abc"]);
        let mut dec = MessageDecoder::new(&data, 157);
        assert_eq!(dec.decode_i32().unwrap(), 0);
        assert_eq!(dec.decode_f64().unwrap(), 0.0);
        assert_eq!(dec.decode_decimal().unwrap(), Decimal::ZERO);
        assert!(!dec.decode_bool().unwrap());
        assert_eq!(dec.decode_string().unwrap(), "abc");
        assert!(dec.finish().is_ok());
    }

    #[test]
    fn max_decoders_map_empty_and_sentinels_to_none() {
        let data = payload(&["", "2147483647", "7", "", "1.7976931348623157E308", "2.5", "", "12.5"]);
        let mut dec = MessageDecoder::new(&data, 157);
        assert_eq!(dec.decode_i32_max().unwrap(), None);
        assert_eq!(dec.decode_i32_max().unwrap(), None);
        assert_eq!(dec.decode_i32_max().unwrap(), Some(7));
        assert_eq!(dec.decode_f64_max().unwrap(), None);
        assert_eq!(dec.decode_f64_max().unwrap(), None);
        assert_eq!(dec.decode_f64_max().unwrap(), Some(2.5));
        assert_eq!(dec.decode_decimal_max().unwrap(), None);
        assert_eq!(dec.decode_decimal_max().unwrap(), Some(Decimal::new(125, 1)));
    }

    #[test]
    fn decimal_max_maps_every_sentinel_to_none() {
        let data = payload(&[
            "",
            "2147483647",
            "9223372036854775807",
            "1.7976931348623157E308",
            "1.7976931348623157e308",
            "2147483646",
            "0",
        ]);
        let mut dec = MessageDecoder::new(&data, 157);
        for _ in 0..5 {
            assert_eq!(dec.decode_decimal_max().unwrap(), None);
        }
        assert_eq!(dec.decode_decimal_max().unwrap(), Some(Decimal::from(2147483646)));
        assert_eq!(dec.decode_decimal_max().unwrap(), Some(Decimal::ZERO));
        dec.finish().unwrap();
    }

    #[test]
    fn encoded_sentinels_decode_as_unset() {
        let mut enc = MessageEncoder::new(157);
        enc.field(UNSET_INTEGER).field(UNSET_DOUBLE).field(42).field(0.25);
        let frame = enc.finish().unwrap();
        let mut dec = MessageDecoder::new(&frame[HEADER_LEN..], 157);
        assert_eq!(dec.decode_i32_max().unwrap(), None);
        assert_eq!(dec.decode_f64_max().unwrap(), None);
        assert_eq!(dec.decode_i32_max().unwrap(), Some(42));
        assert_eq!(dec.decode_f64().unwrap(), 0.25);
    }

    #[test]
    fn infinity_and_malformed_numbers() {
        let data = payload(&["Infinity", "abc"]);
        let mut dec = MessageDecoder::new(&data, 157);
        assert_eq!(dec.decode_f64().unwrap(), f64::INFINITY);
        assert!(matches!(dec.decode_i32(), Err(IBApiError::Decoding(_))));
    }

    #[test]
    fn truncated_field_is_an_error() {
        let mut dec = MessageDecoder::new(b"12", 157);
        assert!(dec.decode_i32().is_err());
        let mut dec = MessageDecoder::new(b"", 157);
        assert!(dec.decode_string().is_err());
    }

    #[test]
    fn absurd_counts_are_rejected() {
        let data = payload(&["1000000", "x"]);
        let mut dec = MessageDecoder::new(&data, 157);
        assert!(dec.decode_count().is_err());
        let data = payload(&["-1"]);
        let mut dec = MessageDecoder::new(&data, 157);
        assert!(dec.decode_count().is_err());
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    #[test]
    fn unknown_kind_yields_nothing() {
        assert!(decode(&["999", "a", "b"], 157).is_empty());
    }

    #[test]
    fn leftover_fields_fail_the_frame() {
        let err = decode_frame(&payload(&["49", "1", "1700000000", "extra"]), 157).unwrap_err();
        assert!(matches!(err, IBApiError::Decoding(_)));
    }

    #[test]
    fn current_time() {
        assert_eq!(
            decode(&["49", "2", "1700000000"], 157),
            [IBEvent::CurrentTime { time: 1_700_000_000 }]
        );
    }

    #[test]
    fn error_message_versions() {
        assert_eq!(
            decode(&["4", "2", "-1", "2104", "Market data farm connection is OK:usfarm"], 157),
            [IBEvent::Error {
                req_id: -1,
                code: 2104,
                message: "Market data farm connection is OK:usfarm".into(),
            }]
        );
        assert_eq!(
            decode(&["4", "1", "legacy text"], 157),
            [IBEvent::Error {
                req_id: -1,
                code: 0,
                message: "legacy text".into(),
            }]
        );
    }

    #[test]
    fn managed_accounts_are_split() {
        assert_eq!(
            decode(&["15", "1", "DU111,DU222,"], 157),
            [IBEvent::ManagedAccounts {
                accounts: vec!["DU111".into(), "DU222".into()],
            }]
        );
    }

    #[test]
    fn tick_price_synthesizes_tick_size() {
        let events = decode(&["1", "6", "9", "1", "10.5", "100", "0"], 157);
        assert_eq!(
            events,
            [
                IBEvent::TickPrice {
                    req_id: 9,
                    tick_type: TickType::Bid,
                    price: 10.5,
                    attrib: TickAttrib::default(),
                },
                IBEvent::TickSize {
                    req_id: 9,
                    tick_type: TickType::BidSize,
                    size: Decimal::from(100),
                },
            ]
        );
    }

    #[test]
    fn tick_price_without_size_pair() {
        let events = decode(&["1", "6", "9", "6", "11.25", "0", "2"], 157);
        assert_eq!(events.len(), 1);
        match &events[0] {
            IBEvent::TickPrice { tick_type, attrib, .. } => {
                assert_eq!(*tick_type, TickType::High);
                assert!(attrib.past_limit);
                assert!(!attrib.can_auto_execute);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn tick_price_mask_before_past_limit() {
        let events = decode(&["1", "6", "9", "2", "10", "5", "1"], 100);
        match &events[0] {
            IBEvent::TickPrice { attrib, .. } => {
                assert!(attrib.can_auto_execute);
                assert!(!attrib.past_limit);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn tick_option_sentinels_become_unset() {
        // sv 157: no version marker, tickAttrib present
        let events = decode(
            &["21", "5", "13", "1", "0.25", "-2", "-1", "-1", "0.01", "-2", "0.02", "101.5"],
            157,
        );
        assert_eq!(
            events,
            [IBEvent::TickOptionComputation {
                req_id: 5,
                tick_type: TickType::ModelOption,
                tick_attrib: 1,
                implied_vol: Some(0.25),
                delta: None,
                opt_price: None,
                pv_dividend: None,
                gamma: Some(0.01),
                vega: None,
                theta: Some(0.02),
                und_price: Some(101.5),
            }]
        );
    }

    #[test]
    fn tick_option_legacy_layout() {
        // version 5 with a non-model tick stops after delta
        let events = decode(&["21", "5", "5", "10", "0.3", "0.5"], 150);
        match &events[0] {
            IBEvent::TickOptionComputation {
                implied_vol,
                delta,
                opt_price,
                und_price,
                ..
            } => {
                assert_eq!(*implied_vol, Some(0.3));
                assert_eq!(*delta, Some(0.5));
                assert_eq!(*opt_price, None);
                assert_eq!(*und_price, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn tick_by_tick_bid_ask() {
        let events = decode(&["99", "3", "3", "1700000000", "10.1", "10.2", "300", "400", "2"], 157);
        assert_eq!(
            events,
            [IBEvent::TickByTickBidAsk {
                req_id: 3,
                time: 1_700_000_000,
                bid_price: 10.1,
                ask_price: 10.2,
                bid_size: Decimal::from(300),
                ask_size: Decimal::from(400),
                attrib: TickAttribBidAsk {
                    bid_past_low: false,
                    ask_past_high: true,
                },
            }]
        );
    }

    #[test]
    fn order_status_current_layout() {
        let events = decode(
            &["3", "12", "Filled", "100", "0", "150.25", "987654", "0", "150.25", "7", "", "0"],
            157,
        );
        match &events[0] {
            IBEvent::OrderStatus {
                order_id,
                status,
                filled,
                perm_id,
                client_id,
                ..
            } => {
                assert_eq!(*order_id, 12);
                assert_eq!(status, "Filled");
                assert_eq!(*filled, Decimal::from(100));
                assert_eq!(*perm_id, 987654);
                assert_eq!(*client_id, 7);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn historical_data_emits_bars_then_end() {
        let events = decode(
            &[
                "17", "4001", "20240101 00:00:00", "20240105 00:00:00", "2",
                "20240102", "10", "11", "9", "10.5", "1000", "10.2", "50",
                "20240103", "10.5", "12", "10", "11.5", "2000", "11.1", "70",
            ],
            157,
        );
        assert_eq!(events.len(), 3);
        match &events[1] {
            IBEvent::HistoricalData { req_id, bar } => {
                assert_eq!(*req_id, 4001);
                assert_eq!(bar.time, "20240103");
                assert_eq!(bar.close, 11.5);
                assert_eq!(bar.volume, Decimal::from(2000));
                assert_eq!(bar.count, 70);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            events[2],
            IBEvent::HistoricalDataEnd {
                req_id: 4001,
                start: "20240101 00:00:00".into(),
                end: "20240105 00:00:00".into(),
            }
        );
    }

    #[test]
    fn historical_data_legacy_has_gaps_field() {
        let events = decode(
            &["17", "3", "1", "s", "e", "1", "20240102", "1", "2", "0.5", "1.5", "10", "1.2", "false", "4"],
            120,
        );
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn contract_details_split_last_trade() {
        let events = decode(
            &[
                "10", "8", "7", "ES", "FUT", "20240315 09:30:00", "0", "", "CME", "USD", "ESH4",
                "ES", "ES", "495512563", "0.25", "1", "50", "LMT,MKT", "CME", "1", "11004968",
                "E-mini S&P 500", "", "202403", "", "", "", "US/Central", "trading", "liquid", "", "",
                "1", "CUSIP", "X", "2", "ES", "IND", "67", "20240315", "",
            ],
            157,
        );
        match &events[0] {
            IBEvent::ContractDetails { req_id, details } => {
                assert_eq!(*req_id, 7);
                assert_eq!(details.contract.last_trade_date_or_contract_month, "20240315");
                assert_eq!(details.last_trade_time, "09:30:00");
                assert_eq!(details.contract.con_id, 495512563);
                assert_eq!(details.md_size_multiplier, Some(1));
                assert_eq!(details.sec_id_list, [TagValue::new("CUSIP", "X")]);
                assert_eq!(details.agg_group, Some(2));
                assert_eq!(details.market_rule_ids, "67");
                assert_eq!(details.ev_multiplier, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn scanner_rows_then_end() {
        let events = decode(
            &[
                "20", "3", "11", "1",
                "0", "265598", "AAPL", "STK", "", "0", "", "SMART", "USD", "AAPL", "NMS", "NMS",
                "", "", "", "",
            ],
            157,
        );
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], IBEvent::ScannerDataEnd { req_id: 11 });
    }

    #[test]
    fn pnl_gates() {
        assert_eq!(
            decode(&["94", "1", "12.5", "", "3"], 157),
            [IBEvent::Pnl {
                req_id: 1,
                daily_pnl: 12.5,
                unrealized_pnl: None,
                realized_pnl: Some(3.0),
            }]
        );
        assert_eq!(
            decode(&["94", "1", "12.5"], 128),
            [IBEvent::Pnl {
                req_id: 1,
                daily_pnl: 12.5,
                unrealized_pnl: None,
                realized_pnl: None,
            }]
        );
    }

    #[test]
    fn verify_completed_reads_text_flag() {
        assert_eq!(
            decode(&["66", "1", "true", ""], 157),
            [IBEvent::VerifyCompleted {
                is_successful: true,
                error_text: String::new(),
            }]
        );
    }

    /// An OPEN_ORDER record at server version 157 with one price condition.
    fn open_order_fields() -> Vec<&'static str> {
        let mut f = vec!["5", "42"];
        // contract
        f.extend(["265598", "AAPL", "STK", "", "0", "", "", "SMART", "USD", "AAPL", "NMS"]);
        // action .. aux
        f.extend(["BUY", "100", "LMT", "150.5", ""]);
        // tif .. goodAfterTime
        f.extend(["DAY", "", "DU123", "", "0", "", "7", "123456", "0", "0", "0", ""]);
        f.push(""); // shares allocation
        f.extend(["", "", "", ""]); // FA
        f.push(""); // model code
        f.extend(["", "", "", ""]); // gtd, rule80A, percentOffset, settlingFirm
        f.extend(["0", "", "-1"]); // short sale
        f.push("0"); // auction strategy
        f.extend(["", "", "", "", ""]); // box + peg to stock
        f.extend(["", "0", "0", "0", "", "3"]); // displaySize, block, sweep, aon, minQty, ocaType
        f.extend(["0", "0", ""]); // eTrade, firmQuote, nbbo
        f.extend(["0", "0"]); // parentId, triggerMethod
        f.extend(["", "", "", "", "0", ""]); // volatility block
        f.extend(["", ""]); // trail
        f.extend(["", ""]); // basis points
        f.extend(["", "0", "0"]); // combo legs
        f.push("0"); // smart combo params
        f.extend(["", "", ""]); // scale
        f.push(""); // hedge type
        f.push("0"); // opt out
        f.extend(["", ""]); // clearing
        f.push("0"); // not held
        f.push("0"); // delta-neutral contract
        f.push(""); // algo strategy
        f.push("0"); // solicited
        f.extend(["0", "Submitted"]); // whatIf, status
        f.extend(["", "", "", "", "", "", "", "", ""]); // margins
        f.extend(["", "", "", "", ""]); // commission .. warning
        f.extend(["0", "0"]); // randomize
        f.extend(["1", "1", "a", "1", "200", "265598", "SMART", "2", "0", "1"]); // conditions
        f.extend(["", "", "", "", "", "", "", "0"]); // adjusted
        f.extend(["", "", ""]); // soft dollar tier
        f.extend(["", "0", "0", "0", ""]); // cashQty, dontUseAuto, oms, dPeg, priceMgmt
        f
    }

    #[test]
    fn open_order_with_condition() {
        let events = decode(&open_order_fields(), 157);
        match &events[0] {
            IBEvent::OpenOrder {
                order_id,
                contract,
                order,
                order_state,
            } => {
                assert_eq!(*order_id, 42);
                assert_eq!(contract.symbol, "AAPL");
                assert_eq!(contract.trading_class, "NMS");
                assert_eq!(order.action, Some(Action::Buy));
                assert_eq!(order.order_type, Some(OrderType::Limit));
                assert_eq!(order.lmt_price, Some(150.5));
                assert_eq!(order.aux_price, None);
                assert_eq!(order.client_id, 7);
                assert_eq!(order.perm_id, 123456);
                assert_eq!(order.oca_type, 3);
                assert_eq!(order.exempt_code, -1);
                assert_eq!(order_state.status, "Submitted");
                assert_eq!(
                    order.conditions,
                    [OrderCondition::Price {
                        conjunction: true,
                        is_more: true,
                        price: 200.0,
                        con_id: 265598,
                        exchange: "SMART".into(),
                        trigger_method: TriggerMethod::Last,
                    }]
                );
                assert!(!order.conditions_ignore_rth);
                assert!(order.conditions_cancel_order);
                assert_eq!(order.use_price_mgmt_algo, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn open_order_truncated_is_an_error() {
        let mut fields = open_order_fields();
        fields.pop();
        assert!(decode_frame(&payload(&fields), 157).is_err());
    }

    #[test]
    fn completed_order_tail() {
        let mut f = vec!["101"];
        f.extend(["265598", "AAPL", "STK", "", "0", "", "", "SMART", "USD", "AAPL", "NMS"]);
        f.extend(["SELL", "50", "MKT", "", ""]);
        f.extend(["DAY", "", "DU123", "", "0", ""]);
        f.extend(["555", "0", "0", "0", ""]); // permId, outsideRth, hidden, discAmt, goodAfter
        f.extend(["", "", "", ""]); // FA
        f.push(""); // model code
        f.extend(["", "", "", ""]);
        f.extend(["0", "", "-1"]);
        f.extend(["", "", "", "", ""]);
        f.push(""); // display size
        f.extend(["0", "0", "", "0"]); // sweep, aon, minQty, ocaType
        f.push("0"); // trigger method
        f.extend(["", "", "", "", "0", ""]); // volatility
        f.extend(["", ""]); // trail
        f.extend(["", "0", "0"]); // combo legs
        f.push("0"); // smart combo
        f.extend(["", "", ""]); // scale
        f.push(""); // hedge
        f.extend(["", ""]); // clearing
        f.push("0"); // not held
        f.push("0"); // dn contract
        f.push(""); // algo
        f.push("0"); // solicited
        f.push("Filled"); // status
        f.extend(["0", "0"]); // randomize
        f.push("0"); // conditions
        f.extend(["", ""]); // trailStopPrice, lmtPriceOffset
        f.extend(["", "0", "0"]); // cashQty, dontUseAuto, oms
        f.extend(["", "50", "0", "0", "", "0", "0", "0"]);
        f.extend(["20240102 10:00:00", "Filled"]);

        let events = decode(&f, 157);
        match &events[0] {
            IBEvent::CompletedOrder { order, order_state, .. } => {
                assert_eq!(order.perm_id, 555);
                assert_eq!(order.action, Some(Action::Sell));
                assert_eq!(order.filled_quantity, Some(Decimal::from(50)));
                assert_eq!(order_state.status, "Filled");
                assert_eq!(order_state.completed_time, "20240102 10:00:00");
                assert_eq!(order_state.completed_status, "Filled");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn execution_details() {
        let events = decode(
            &[
                "11", "77", "12", "265598", "AAPL", "STK", "", "0", "", "", "ISLAND", "USD", "AAPL", "NMS",
                "0001f4e8.65a1.01.01", "20240102 10:00:00", "DU123", "ISLAND", "BOT", "100", "150.25",
                "987654", "7", "0", "100", "150.25", "", "", "", "", "1",
            ],
            157,
        );
        match &events[0] {
            IBEvent::ExecDetails { req_id, contract, execution } => {
                assert_eq!(*req_id, 77);
                assert_eq!(contract.con_id, 265598);
                assert_eq!(execution.order_id, 12);
                assert_eq!(execution.shares, Decimal::from(100));
                assert_eq!(execution.ev_multiplier, None);
                assert_eq!(execution.last_liquidity, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn commission_report_unset_values() {
        let events = decode(
            &["59", "1", "exec1", "1.25", "USD", "1.7976931348623157E308", "", "0"],
            157,
        );
        assert_eq!(
            events,
            [IBEvent::CommissionReport {
                report: CommissionReport {
                    exec_id: "exec1".into(),
                    commission: 1.25,
                    currency: "USD".into(),
                    realized_pnl: None,
                    r#yield: None,
                    yield_redemption_date: 0,
                },
            }]
        );
    }

    #[test]
    fn depth_exchanges_legacy_flag() {
        let events = decode(&["80", "1", "ISLAND", "STK", "1"], 119);
        match &events[0] {
            IBEvent::MktDepthExchanges { descriptions } => {
                assert_eq!(descriptions[0].service_data_type, "Deep2");
                assert_eq!(descriptions[0].agg_group, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
