//! Observer interface.
//!
//! Every decoded inbound record becomes an [`IBEvent`]. The pipeline hands
//! each event to [`Wrapper::on_event`], whose default implementation routes
//! it to the matching typed callback through [`dispatch`]. All callbacks
//! have logging defaults, so an implementation only overrides what it needs.
//!
//! [`ChannelWrapper`] is a ready-made observer that forwards events into an
//! unbounded channel instead.

use rust_decimal::Decimal;
use tokio::sync::mpsc;

use crate::models::bar::{Bar, HistoricalTick, HistoricalTickBidAsk, HistoricalTickLast, RealTimeBar};
use crate::models::common::{
    FamilyCode, HistogramEntry, NewsProvider, PriceIncrement, SmartComponent, SoftDollarTier,
};
use crate::models::contract::{Contract, ContractDescription, ContractDetails, DeltaNeutralContract};
use crate::models::execution::{CommissionReport, Execution};
use crate::models::market_data::{DepthMktDataDescription, TickAttrib, TickAttribBidAsk, TickAttribLast};
use crate::models::order::{Order, OrderState};
use crate::models::scanner::ScannerDataItem;
use crate::protocol::TickType;

// ============================================================================
// IBEvent
// ============================================================================

/// One callback-worthy record from the server, or a connection lifecycle
/// notification.
///
/// Large payloads are boxed to keep the enum small.
#[derive(Debug, Clone, PartialEq)]
pub enum IBEvent {
    // ========================================================================
    // Connection & Error
    // ========================================================================
    /// Handshake warmup finished; the link is usable.
    ConnectAck,

    /// The socket closed or failed.
    ConnectionClosed,

    /// `req_id` is -1 for connection-scope errors and notices.
    Error {
        req_id: i32,
        code: i32,
        message: String,
    },

    NextValidId {
        order_id: i32,
    },

    ManagedAccounts {
        accounts: Vec<String>,
    },

    CurrentTime {
        time: i64,
    },

    // ========================================================================
    // Market Data
    // ========================================================================
    TickPrice {
        req_id: i32,
        tick_type: TickType,
        price: f64,
        attrib: TickAttrib,
    },

    TickSize {
        req_id: i32,
        tick_type: TickType,
        size: Decimal,
    },

    /// Greeks and model values. `None` means the server did not compute the
    /// value.
    TickOptionComputation {
        req_id: i32,
        tick_type: TickType,
        /// 0 return-based, 1 price-based. Zero before price-based volatility.
        tick_attrib: i32,
        implied_vol: Option<f64>,
        delta: Option<f64>,
        opt_price: Option<f64>,
        pv_dividend: Option<f64>,
        gamma: Option<f64>,
        vega: Option<f64>,
        theta: Option<f64>,
        und_price: Option<f64>,
    },

    TickGeneric {
        req_id: i32,
        tick_type: TickType,
        value: f64,
    },

    TickString {
        req_id: i32,
        tick_type: TickType,
        value: String,
    },

    TickEfp {
        req_id: i32,
        tick_type: TickType,
        basis_points: f64,
        formatted_basis_points: String,
        implied_futures_price: f64,
        hold_days: i32,
        future_last_trade_date: String,
        dividend_impact: f64,
        dividends_to_last_trade_date: f64,
    },

    TickSnapshotEnd {
        req_id: i32,
    },

    TickReqParams {
        req_id: i32,
        min_tick: f64,
        bbo_exchange: String,
        snapshot_permissions: i32,
    },

    TickNews {
        req_id: i32,
        time_stamp: i64,
        provider_code: String,
        article_id: String,
        headline: String,
        extra_data: String,
    },

    MarketDataType {
        req_id: i32,
        market_data_type: i32,
    },

    /// Tick type 1 (Last) or 2 (AllLast).
    TickByTickAllLast {
        req_id: i32,
        tick_type: i32,
        time: i64,
        price: f64,
        size: Decimal,
        attrib: TickAttribLast,
        exchange: String,
        special_conditions: String,
    },

    TickByTickBidAsk {
        req_id: i32,
        time: i64,
        bid_price: f64,
        ask_price: f64,
        bid_size: Decimal,
        ask_size: Decimal,
        attrib: TickAttribBidAsk,
    },

    TickByTickMidPoint {
        req_id: i32,
        time: i64,
        mid_point: f64,
    },

    UpdateMktDepth {
        req_id: i32,
        position: i32,
        operation: i32,
        side: i32,
        price: f64,
        size: Decimal,
    },

    UpdateMktDepthL2 {
        req_id: i32,
        position: i32,
        market_maker: String,
        operation: i32,
        side: i32,
        price: f64,
        size: Decimal,
        is_smart_depth: bool,
    },

    MktDepthExchanges {
        descriptions: Vec<DepthMktDataDescription>,
    },

    SmartComponents {
        req_id: i32,
        components: Vec<SmartComponent>,
    },

    RerouteMktDataReq {
        req_id: i32,
        con_id: i32,
        exchange: String,
    },

    RerouteMktDepthReq {
        req_id: i32,
        con_id: i32,
        exchange: String,
    },

    DeltaNeutralValidation {
        req_id: i32,
        contract: DeltaNeutralContract,
    },

    // ========================================================================
    // Orders & Executions
    // ========================================================================
    OrderStatus {
        order_id: i32,
        status: String,
        filled: Decimal,
        remaining: Decimal,
        avg_fill_price: f64,
        perm_id: i64,
        parent_id: i32,
        last_fill_price: f64,
        client_id: i32,
        why_held: String,
        mkt_cap_price: f64,
    },

    OpenOrder {
        order_id: i32,
        contract: Box<Contract>,
        order: Box<Order>,
        order_state: Box<OrderState>,
    },

    OpenOrderEnd,

    CompletedOrder {
        contract: Box<Contract>,
        order: Box<Order>,
        order_state: Box<OrderState>,
    },

    CompletedOrdersEnd,

    OrderBound {
        order_id: i64,
        api_client_id: i32,
        api_order_id: i32,
    },

    ExecDetails {
        req_id: i32,
        contract: Box<Contract>,
        execution: Box<Execution>,
    },

    ExecDetailsEnd {
        req_id: i32,
    },

    CommissionReport {
        report: CommissionReport,
    },

    // ========================================================================
    // Account & Portfolio
    // ========================================================================
    UpdateAccountValue {
        key: String,
        value: String,
        currency: String,
        account_name: String,
    },

    UpdatePortfolio {
        contract: Box<Contract>,
        position: Decimal,
        market_price: f64,
        market_value: f64,
        average_cost: f64,
        unrealized_pnl: f64,
        realized_pnl: f64,
        account_name: String,
    },

    UpdateAccountTime {
        time_stamp: String,
    },

    AccountDownloadEnd {
        account: String,
    },

    AccountSummary {
        req_id: i32,
        account: String,
        tag: String,
        value: String,
        currency: String,
    },

    AccountSummaryEnd {
        req_id: i32,
    },

    Position {
        account: String,
        contract: Box<Contract>,
        position: Decimal,
        avg_cost: f64,
    },

    PositionEnd,

    PositionMulti {
        req_id: i32,
        account: String,
        model_code: String,
        contract: Box<Contract>,
        position: Decimal,
        avg_cost: f64,
    },

    PositionMultiEnd {
        req_id: i32,
    },

    AccountUpdateMulti {
        req_id: i32,
        account: String,
        model_code: String,
        key: String,
        value: String,
        currency: String,
    },

    AccountUpdateMultiEnd {
        req_id: i32,
    },

    Pnl {
        req_id: i32,
        daily_pnl: f64,
        unrealized_pnl: Option<f64>,
        realized_pnl: Option<f64>,
    },

    PnlSingle {
        req_id: i32,
        position: Decimal,
        daily_pnl: f64,
        unrealized_pnl: Option<f64>,
        realized_pnl: Option<f64>,
        value: f64,
    },

    FamilyCodes {
        codes: Vec<FamilyCode>,
    },

    SoftDollarTiers {
        req_id: i32,
        tiers: Vec<SoftDollarTier>,
    },

    // ========================================================================
    // Contracts
    // ========================================================================
    ContractDetails {
        req_id: i32,
        details: Box<ContractDetails>,
    },

    BondContractDetails {
        req_id: i32,
        details: Box<ContractDetails>,
    },

    ContractDetailsEnd {
        req_id: i32,
    },

    SymbolSamples {
        req_id: i32,
        descriptions: Vec<ContractDescription>,
    },

    SecurityDefinitionOptionalParameter {
        req_id: i32,
        exchange: String,
        underlying_con_id: i32,
        trading_class: String,
        multiplier: String,
        expirations: Vec<String>,
        strikes: Vec<f64>,
    },

    SecurityDefinitionOptionalParameterEnd {
        req_id: i32,
    },

    MarketRule {
        market_rule_id: i32,
        price_increments: Vec<PriceIncrement>,
    },

    // ========================================================================
    // Historical & Real-time Bars
    // ========================================================================
    HistoricalData {
        req_id: i32,
        bar: Bar,
    },

    HistoricalDataEnd {
        req_id: i32,
        start: String,
        end: String,
    },

    HistoricalDataUpdate {
        req_id: i32,
        bar: Bar,
    },

    HeadTimestamp {
        req_id: i32,
        head_timestamp: String,
    },

    HistogramData {
        req_id: i32,
        items: Vec<HistogramEntry>,
    },

    HistoricalTicks {
        req_id: i32,
        ticks: Vec<HistoricalTick>,
        done: bool,
    },

    HistoricalTicksBidAsk {
        req_id: i32,
        ticks: Vec<HistoricalTickBidAsk>,
        done: bool,
    },

    HistoricalTicksLast {
        req_id: i32,
        ticks: Vec<HistoricalTickLast>,
        done: bool,
    },

    RealtimeBar {
        req_id: i32,
        bar: RealTimeBar,
    },

    // ========================================================================
    // Scanner & Fundamentals
    // ========================================================================
    ScannerParameters {
        xml: String,
    },

    ScannerData {
        req_id: i32,
        item: Box<ScannerDataItem>,
    },

    ScannerDataEnd {
        req_id: i32,
    },

    FundamentalData {
        req_id: i32,
        data: String,
    },

    // ========================================================================
    // News
    // ========================================================================
    UpdateNewsBulletin {
        msg_id: i32,
        msg_type: i32,
        message: String,
        orig_exchange: String,
    },

    NewsArticle {
        req_id: i32,
        article_type: i32,
        article_text: String,
    },

    NewsProviders {
        providers: Vec<NewsProvider>,
    },

    HistoricalNews {
        req_id: i32,
        time: String,
        provider_code: String,
        article_id: String,
        headline: String,
    },

    HistoricalNewsEnd {
        req_id: i32,
        has_more: bool,
    },

    // ========================================================================
    // Financial Advisor
    // ========================================================================
    ReceiveFa {
        fa_data_type: i32,
        xml: String,
    },

    ReplaceFaEnd {
        req_id: i32,
        text: String,
    },

    // ========================================================================
    // Display Groups & Verification
    // ========================================================================
    DisplayGroupList {
        req_id: i32,
        groups: String,
    },

    DisplayGroupUpdated {
        req_id: i32,
        contract_info: String,
    },

    VerifyMessageApi {
        api_data: String,
    },

    VerifyCompleted {
        is_successful: bool,
        error_text: String,
    },

    VerifyAndAuthMessageApi {
        api_data: String,
        xyz_challenge: String,
    },

    VerifyAndAuthCompleted {
        is_successful: bool,
        error_text: String,
    },
}

// ============================================================================
// Wrapper
// ============================================================================

/// The consumer-supplied sink for decoded events.
///
/// Callbacks run on the decoder task, except `error` for requests rejected
/// before sending, which runs on the caller's task. Implementations must not
/// block for long: the decoder stops draining frames while a callback runs.
///
/// To issue a request from inside a callback use
/// [`IBClient::try_request`](crate::IBClient::try_request); the async request
/// methods need a spawned task, and each spawned task orders its frames
/// independently of the others.
#[allow(unused_variables)]
pub trait Wrapper: Send + Sync {
    /// Entry point for every event. Override to intercept events wholesale.
    fn on_event(&self, event: &IBEvent) {
        dispatch(self, event);
    }

    // Connection & Error

    fn connect_ack(&self) {
        tracing::debug!("connect ack");
    }

    fn connection_closed(&self) {
        tracing::debug!("connection closed");
    }

    fn error(&self, req_id: i32, code: i32, message: &str) {
        tracing::warn!(req_id, code, message, "error");
    }

    fn next_valid_id(&self, order_id: i32) {
        tracing::debug!(order_id, "next valid id");
    }

    fn managed_accounts(&self, accounts: &[String]) {
        tracing::debug!(?accounts, "managed accounts");
    }

    fn current_time(&self, time: i64) {
        tracing::debug!(time, "current time");
    }

    // Market Data

    fn tick_price(&self, req_id: i32, tick_type: TickType, price: f64, attrib: TickAttrib) {
        tracing::debug!(req_id, ?tick_type, price, ?attrib, "tick price");
    }

    fn tick_size(&self, req_id: i32, tick_type: TickType, size: Decimal) {
        tracing::debug!(req_id, ?tick_type, %size, "tick size");
    }

    #[allow(clippy::too_many_arguments)]
    fn tick_option_computation(
        &self,
        req_id: i32,
        tick_type: TickType,
        tick_attrib: i32,
        implied_vol: Option<f64>,
        delta: Option<f64>,
        opt_price: Option<f64>,
        pv_dividend: Option<f64>,
        gamma: Option<f64>,
        vega: Option<f64>,
        theta: Option<f64>,
        und_price: Option<f64>,
    ) {
        tracing::debug!(req_id, ?tick_type, ?implied_vol, ?delta, ?opt_price, "tick option computation");
    }

    fn tick_generic(&self, req_id: i32, tick_type: TickType, value: f64) {
        tracing::debug!(req_id, ?tick_type, value, "tick generic");
    }

    fn tick_string(&self, req_id: i32, tick_type: TickType, value: &str) {
        tracing::debug!(req_id, ?tick_type, value, "tick string");
    }

    #[allow(clippy::too_many_arguments)]
    fn tick_efp(
        &self,
        req_id: i32,
        tick_type: TickType,
        basis_points: f64,
        formatted_basis_points: &str,
        implied_futures_price: f64,
        hold_days: i32,
        future_last_trade_date: &str,
        dividend_impact: f64,
        dividends_to_last_trade_date: f64,
    ) {
        tracing::debug!(req_id, ?tick_type, basis_points, "tick efp");
    }

    fn tick_snapshot_end(&self, req_id: i32) {
        tracing::debug!(req_id, "tick snapshot end");
    }

    fn tick_req_params(&self, req_id: i32, min_tick: f64, bbo_exchange: &str, snapshot_permissions: i32) {
        tracing::debug!(req_id, min_tick, bbo_exchange, snapshot_permissions, "tick req params");
    }

    fn tick_news(
        &self,
        req_id: i32,
        time_stamp: i64,
        provider_code: &str,
        article_id: &str,
        headline: &str,
        extra_data: &str,
    ) {
        tracing::debug!(req_id, time_stamp, provider_code, article_id, "tick news");
    }

    fn market_data_type(&self, req_id: i32, market_data_type: i32) {
        tracing::debug!(req_id, market_data_type, "market data type");
    }

    #[allow(clippy::too_many_arguments)]
    fn tick_by_tick_all_last(
        &self,
        req_id: i32,
        tick_type: i32,
        time: i64,
        price: f64,
        size: Decimal,
        attrib: TickAttribLast,
        exchange: &str,
        special_conditions: &str,
    ) {
        tracing::debug!(req_id, tick_type, time, price, %size, "tick-by-tick last");
    }

    #[allow(clippy::too_many_arguments)]
    fn tick_by_tick_bid_ask(
        &self,
        req_id: i32,
        time: i64,
        bid_price: f64,
        ask_price: f64,
        bid_size: Decimal,
        ask_size: Decimal,
        attrib: TickAttribBidAsk,
    ) {
        tracing::debug!(req_id, time, bid_price, ask_price, "tick-by-tick bid/ask");
    }

    fn tick_by_tick_mid_point(&self, req_id: i32, time: i64, mid_point: f64) {
        tracing::debug!(req_id, time, mid_point, "tick-by-tick midpoint");
    }

    fn update_mkt_depth(
        &self,
        req_id: i32,
        position: i32,
        operation: i32,
        side: i32,
        price: f64,
        size: Decimal,
    ) {
        tracing::debug!(req_id, position, operation, side, price, %size, "market depth");
    }

    #[allow(clippy::too_many_arguments)]
    fn update_mkt_depth_l2(
        &self,
        req_id: i32,
        position: i32,
        market_maker: &str,
        operation: i32,
        side: i32,
        price: f64,
        size: Decimal,
        is_smart_depth: bool,
    ) {
        tracing::debug!(req_id, position, market_maker, operation, side, price, %size, "market depth L2");
    }

    fn mkt_depth_exchanges(&self, descriptions: &[DepthMktDataDescription]) {
        tracing::debug!(count = descriptions.len(), "market depth exchanges");
    }

    fn smart_components(&self, req_id: i32, components: &[SmartComponent]) {
        tracing::debug!(req_id, count = components.len(), "smart components");
    }

    fn reroute_mkt_data_req(&self, req_id: i32, con_id: i32, exchange: &str) {
        tracing::debug!(req_id, con_id, exchange, "reroute market data");
    }

    fn reroute_mkt_depth_req(&self, req_id: i32, con_id: i32, exchange: &str) {
        tracing::debug!(req_id, con_id, exchange, "reroute market depth");
    }

    fn delta_neutral_validation(&self, req_id: i32, contract: &DeltaNeutralContract) {
        tracing::debug!(req_id, ?contract, "delta neutral validation");
    }

    // Orders & Executions

    #[allow(clippy::too_many_arguments)]
    fn order_status(
        &self,
        order_id: i32,
        status: &str,
        filled: Decimal,
        remaining: Decimal,
        avg_fill_price: f64,
        perm_id: i64,
        parent_id: i32,
        last_fill_price: f64,
        client_id: i32,
        why_held: &str,
        mkt_cap_price: f64,
    ) {
        tracing::debug!(order_id, status, %filled, %remaining, avg_fill_price, "order status");
    }

    fn open_order(&self, order_id: i32, contract: &Contract, order: &Order, order_state: &OrderState) {
        tracing::debug!(order_id, symbol = %contract.symbol, status = %order_state.status, "open order");
    }

    fn open_order_end(&self) {
        tracing::debug!("open order end");
    }

    fn completed_order(&self, contract: &Contract, order: &Order, order_state: &OrderState) {
        tracing::debug!(perm_id = order.perm_id, symbol = %contract.symbol, status = %order_state.status, "completed order");
    }

    fn completed_orders_end(&self) {
        tracing::debug!("completed orders end");
    }

    fn order_bound(&self, order_id: i64, api_client_id: i32, api_order_id: i32) {
        tracing::debug!(order_id, api_client_id, api_order_id, "order bound");
    }

    fn exec_details(&self, req_id: i32, contract: &Contract, execution: &Execution) {
        tracing::debug!(req_id, symbol = %contract.symbol, exec_id = %execution.exec_id, "execution");
    }

    fn exec_details_end(&self, req_id: i32) {
        tracing::debug!(req_id, "execution end");
    }

    fn commission_report(&self, report: &CommissionReport) {
        tracing::debug!(exec_id = %report.exec_id, commission = report.commission, "commission report");
    }

    // Account & Portfolio

    fn update_account_value(&self, key: &str, value: &str, currency: &str, account_name: &str) {
        tracing::debug!(key, value, currency, account_name, "account value");
    }

    #[allow(clippy::too_many_arguments)]
    fn update_portfolio(
        &self,
        contract: &Contract,
        position: Decimal,
        market_price: f64,
        market_value: f64,
        average_cost: f64,
        unrealized_pnl: f64,
        realized_pnl: f64,
        account_name: &str,
    ) {
        tracing::debug!(symbol = %contract.symbol, %position, market_value, account_name, "portfolio");
    }

    fn update_account_time(&self, time_stamp: &str) {
        tracing::debug!(time_stamp, "account time");
    }

    fn account_download_end(&self, account: &str) {
        tracing::debug!(account, "account download end");
    }

    fn account_summary(&self, req_id: i32, account: &str, tag: &str, value: &str, currency: &str) {
        tracing::debug!(req_id, account, tag, value, currency, "account summary");
    }

    fn account_summary_end(&self, req_id: i32) {
        tracing::debug!(req_id, "account summary end");
    }

    fn position(&self, account: &str, contract: &Contract, position: Decimal, avg_cost: f64) {
        tracing::debug!(account, symbol = %contract.symbol, %position, avg_cost, "position");
    }

    fn position_end(&self) {
        tracing::debug!("position end");
    }

    fn position_multi(
        &self,
        req_id: i32,
        account: &str,
        model_code: &str,
        contract: &Contract,
        position: Decimal,
        avg_cost: f64,
    ) {
        tracing::debug!(req_id, account, model_code, symbol = %contract.symbol, %position, "position multi");
    }

    fn position_multi_end(&self, req_id: i32) {
        tracing::debug!(req_id, "position multi end");
    }

    fn account_update_multi(
        &self,
        req_id: i32,
        account: &str,
        model_code: &str,
        key: &str,
        value: &str,
        currency: &str,
    ) {
        tracing::debug!(req_id, account, model_code, key, value, "account update multi");
    }

    fn account_update_multi_end(&self, req_id: i32) {
        tracing::debug!(req_id, "account update multi end");
    }

    fn pnl(&self, req_id: i32, daily_pnl: f64, unrealized_pnl: Option<f64>, realized_pnl: Option<f64>) {
        tracing::debug!(req_id, daily_pnl, ?unrealized_pnl, ?realized_pnl, "pnl");
    }

    fn pnl_single(
        &self,
        req_id: i32,
        position: Decimal,
        daily_pnl: f64,
        unrealized_pnl: Option<f64>,
        realized_pnl: Option<f64>,
        value: f64,
    ) {
        tracing::debug!(req_id, %position, daily_pnl, value, "pnl single");
    }

    fn family_codes(&self, codes: &[FamilyCode]) {
        tracing::debug!(count = codes.len(), "family codes");
    }

    fn soft_dollar_tiers(&self, req_id: i32, tiers: &[SoftDollarTier]) {
        tracing::debug!(req_id, count = tiers.len(), "soft dollar tiers");
    }

    // Contracts

    fn contract_details(&self, req_id: i32, details: &ContractDetails) {
        tracing::debug!(req_id, symbol = %details.contract.symbol, con_id = details.contract.con_id, "contract details");
    }

    fn bond_contract_details(&self, req_id: i32, details: &ContractDetails) {
        tracing::debug!(req_id, cusip = %details.cusip, "bond contract details");
    }

    fn contract_details_end(&self, req_id: i32) {
        tracing::debug!(req_id, "contract details end");
    }

    fn symbol_samples(&self, req_id: i32, descriptions: &[ContractDescription]) {
        tracing::debug!(req_id, count = descriptions.len(), "symbol samples");
    }

    #[allow(clippy::too_many_arguments)]
    fn security_definition_optional_parameter(
        &self,
        req_id: i32,
        exchange: &str,
        underlying_con_id: i32,
        trading_class: &str,
        multiplier: &str,
        expirations: &[String],
        strikes: &[f64],
    ) {
        tracing::debug!(req_id, exchange, underlying_con_id, expirations = expirations.len(), strikes = strikes.len(), "option chain");
    }

    fn security_definition_optional_parameter_end(&self, req_id: i32) {
        tracing::debug!(req_id, "option chain end");
    }

    fn market_rule(&self, market_rule_id: i32, price_increments: &[PriceIncrement]) {
        tracing::debug!(market_rule_id, count = price_increments.len(), "market rule");
    }

    // Historical & Real-time Bars

    fn historical_data(&self, req_id: i32, bar: &Bar) {
        tracing::debug!(req_id, time = %bar.time, close = bar.close, "historical bar");
    }

    fn historical_data_end(&self, req_id: i32, start: &str, end: &str) {
        tracing::debug!(req_id, start, end, "historical data end");
    }

    fn historical_data_update(&self, req_id: i32, bar: &Bar) {
        tracing::debug!(req_id, time = %bar.time, close = bar.close, "historical bar update");
    }

    fn head_timestamp(&self, req_id: i32, head_timestamp: &str) {
        tracing::debug!(req_id, head_timestamp, "head timestamp");
    }

    fn histogram_data(&self, req_id: i32, items: &[HistogramEntry]) {
        tracing::debug!(req_id, count = items.len(), "histogram");
    }

    fn historical_ticks(&self, req_id: i32, ticks: &[HistoricalTick], done: bool) {
        tracing::debug!(req_id, count = ticks.len(), done, "historical ticks");
    }

    fn historical_ticks_bid_ask(&self, req_id: i32, ticks: &[HistoricalTickBidAsk], done: bool) {
        tracing::debug!(req_id, count = ticks.len(), done, "historical bid/ask ticks");
    }

    fn historical_ticks_last(&self, req_id: i32, ticks: &[HistoricalTickLast], done: bool) {
        tracing::debug!(req_id, count = ticks.len(), done, "historical last ticks");
    }

    fn realtime_bar(&self, req_id: i32, bar: &RealTimeBar) {
        tracing::debug!(req_id, time = bar.time, close = bar.close, "real-time bar");
    }

    // Scanner & Fundamentals

    fn scanner_parameters(&self, xml: &str) {
        tracing::debug!(len = xml.len(), "scanner parameters");
    }

    fn scanner_data(&self, req_id: i32, item: &ScannerDataItem) {
        tracing::debug!(req_id, rank = item.rank, symbol = %item.contract_details.contract.symbol, "scanner data");
    }

    fn scanner_data_end(&self, req_id: i32) {
        tracing::debug!(req_id, "scanner data end");
    }

    fn fundamental_data(&self, req_id: i32, data: &str) {
        tracing::debug!(req_id, len = data.len(), "fundamental data");
    }

    // News

    fn update_news_bulletin(&self, msg_id: i32, msg_type: i32, message: &str, orig_exchange: &str) {
        tracing::debug!(msg_id, msg_type, orig_exchange, "news bulletin");
    }

    fn news_article(&self, req_id: i32, article_type: i32, article_text: &str) {
        tracing::debug!(req_id, article_type, len = article_text.len(), "news article");
    }

    fn news_providers(&self, providers: &[NewsProvider]) {
        tracing::debug!(count = providers.len(), "news providers");
    }

    fn historical_news(
        &self,
        req_id: i32,
        time: &str,
        provider_code: &str,
        article_id: &str,
        headline: &str,
    ) {
        tracing::debug!(req_id, time, provider_code, article_id, "historical news");
    }

    fn historical_news_end(&self, req_id: i32, has_more: bool) {
        tracing::debug!(req_id, has_more, "historical news end");
    }

    // Financial Advisor

    fn receive_fa(&self, fa_data_type: i32, xml: &str) {
        tracing::debug!(fa_data_type, len = xml.len(), "FA configuration");
    }

    fn replace_fa_end(&self, req_id: i32, text: &str) {
        tracing::debug!(req_id, text, "replace FA end");
    }

    // Display Groups & Verification

    fn display_group_list(&self, req_id: i32, groups: &str) {
        tracing::debug!(req_id, groups, "display groups");
    }

    fn display_group_updated(&self, req_id: i32, contract_info: &str) {
        tracing::debug!(req_id, contract_info, "display group updated");
    }

    fn verify_message_api(&self, api_data: &str) {
        tracing::debug!(api_data, "verify message");
    }

    fn verify_completed(&self, is_successful: bool, error_text: &str) {
        tracing::debug!(is_successful, error_text, "verify completed");
    }

    fn verify_and_auth_message_api(&self, api_data: &str, xyz_challenge: &str) {
        tracing::debug!(api_data, xyz_challenge, "verify and auth message");
    }

    fn verify_and_auth_completed(&self, is_successful: bool, error_text: &str) {
        tracing::debug!(is_successful, error_text, "verify and auth completed");
    }
}

/// Route one event to its typed callback.
pub fn dispatch<W: Wrapper + ?Sized>(w: &W, event: &IBEvent) {
    use IBEvent as E;

    match event {
        E::ConnectAck => w.connect_ack(),
        E::ConnectionClosed => w.connection_closed(),
        E::Error { req_id, code, message } => w.error(*req_id, *code, message),
        E::NextValidId { order_id } => w.next_valid_id(*order_id),
        E::ManagedAccounts { accounts } => w.managed_accounts(accounts),
        E::CurrentTime { time } => w.current_time(*time),

        E::TickPrice { req_id, tick_type, price, attrib } => {
            w.tick_price(*req_id, *tick_type, *price, *attrib)
        }
        E::TickSize { req_id, tick_type, size } => w.tick_size(*req_id, *tick_type, *size),
        E::TickOptionComputation {
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
        } => w.tick_option_computation(
            *req_id,
            *tick_type,
            *tick_attrib,
            *implied_vol,
            *delta,
            *opt_price,
            *pv_dividend,
            *gamma,
            *vega,
            *theta,
            *und_price,
        ),
        E::TickGeneric { req_id, tick_type, value } => w.tick_generic(*req_id, *tick_type, *value),
        E::TickString { req_id, tick_type, value } => w.tick_string(*req_id, *tick_type, value),
        E::TickEfp {
            req_id,
            tick_type,
            basis_points,
            formatted_basis_points,
            implied_futures_price,
            hold_days,
            future_last_trade_date,
            dividend_impact,
            dividends_to_last_trade_date,
        } => w.tick_efp(
            *req_id,
            *tick_type,
            *basis_points,
            formatted_basis_points,
            *implied_futures_price,
            *hold_days,
            future_last_trade_date,
            *dividend_impact,
            *dividends_to_last_trade_date,
        ),
        E::TickSnapshotEnd { req_id } => w.tick_snapshot_end(*req_id),
        E::TickReqParams {
            req_id,
            min_tick,
            bbo_exchange,
            snapshot_permissions,
        } => w.tick_req_params(*req_id, *min_tick, bbo_exchange, *snapshot_permissions),
        E::TickNews {
            req_id,
            time_stamp,
            provider_code,
            article_id,
            headline,
            extra_data,
        } => w.tick_news(*req_id, *time_stamp, provider_code, article_id, headline, extra_data),
        E::MarketDataType { req_id, market_data_type } => {
            w.market_data_type(*req_id, *market_data_type)
        }
        E::TickByTickAllLast {
            req_id,
            tick_type,
            time,
            price,
            size,
            attrib,
            exchange,
            special_conditions,
        } => w.tick_by_tick_all_last(
            *req_id,
            *tick_type,
            *time,
            *price,
            *size,
            *attrib,
            exchange,
            special_conditions,
        ),
        E::TickByTickBidAsk {
            req_id,
            time,
            bid_price,
            ask_price,
            bid_size,
            ask_size,
            attrib,
        } => w.tick_by_tick_bid_ask(*req_id, *time, *bid_price, *ask_price, *bid_size, *ask_size, *attrib),
        E::TickByTickMidPoint { req_id, time, mid_point } => {
            w.tick_by_tick_mid_point(*req_id, *time, *mid_point)
        }
        E::UpdateMktDepth {
            req_id,
            position,
            operation,
            side,
            price,
            size,
        } => w.update_mkt_depth(*req_id, *position, *operation, *side, *price, *size),
        E::UpdateMktDepthL2 {
            req_id,
            position,
            market_maker,
            operation,
            side,
            price,
            size,
            is_smart_depth,
        } => w.update_mkt_depth_l2(
            *req_id,
            *position,
            market_maker,
            *operation,
            *side,
            *price,
            *size,
            *is_smart_depth,
        ),
        E::MktDepthExchanges { descriptions } => w.mkt_depth_exchanges(descriptions),
        E::SmartComponents { req_id, components } => w.smart_components(*req_id, components),
        E::RerouteMktDataReq { req_id, con_id, exchange } => {
            w.reroute_mkt_data_req(*req_id, *con_id, exchange)
        }
        E::RerouteMktDepthReq { req_id, con_id, exchange } => {
            w.reroute_mkt_depth_req(*req_id, *con_id, exchange)
        }
        E::DeltaNeutralValidation { req_id, contract } => w.delta_neutral_validation(*req_id, contract),

        E::OrderStatus {
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
        } => w.order_status(
            *order_id,
            status,
            *filled,
            *remaining,
            *avg_fill_price,
            *perm_id,
            *parent_id,
            *last_fill_price,
            *client_id,
            why_held,
            *mkt_cap_price,
        ),
        E::OpenOrder {
            order_id,
            contract,
            order,
            order_state,
        } => w.open_order(*order_id, contract, order, order_state),
        E::OpenOrderEnd => w.open_order_end(),
        E::CompletedOrder {
            contract,
            order,
            order_state,
        } => w.completed_order(contract, order, order_state),
        E::CompletedOrdersEnd => w.completed_orders_end(),
        E::OrderBound {
            order_id,
            api_client_id,
            api_order_id,
        } => w.order_bound(*order_id, *api_client_id, *api_order_id),
        E::ExecDetails {
            req_id,
            contract,
            execution,
        } => w.exec_details(*req_id, contract, execution),
        E::ExecDetailsEnd { req_id } => w.exec_details_end(*req_id),
        E::CommissionReport { report } => w.commission_report(report),

        E::UpdateAccountValue {
            key,
            value,
            currency,
            account_name,
        } => w.update_account_value(key, value, currency, account_name),
        E::UpdatePortfolio {
            contract,
            position,
            market_price,
            market_value,
            average_cost,
            unrealized_pnl,
            realized_pnl,
            account_name,
        } => w.update_portfolio(
            contract,
            *position,
            *market_price,
            *market_value,
            *average_cost,
            *unrealized_pnl,
            *realized_pnl,
            account_name,
        ),
        E::UpdateAccountTime { time_stamp } => w.update_account_time(time_stamp),
        E::AccountDownloadEnd { account } => w.account_download_end(account),
        E::AccountSummary {
            req_id,
            account,
            tag,
            value,
            currency,
        } => w.account_summary(*req_id, account, tag, value, currency),
        E::AccountSummaryEnd { req_id } => w.account_summary_end(*req_id),
        E::Position {
            account,
            contract,
            position,
            avg_cost,
        } => w.position(account, contract, *position, *avg_cost),
        E::PositionEnd => w.position_end(),
        E::PositionMulti {
            req_id,
            account,
            model_code,
            contract,
            position,
            avg_cost,
        } => w.position_multi(*req_id, account, model_code, contract, *position, *avg_cost),
        E::PositionMultiEnd { req_id } => w.position_multi_end(*req_id),
        E::AccountUpdateMulti {
            req_id,
            account,
            model_code,
            key,
            value,
            currency,
        } => w.account_update_multi(*req_id, account, model_code, key, value, currency),
        E::AccountUpdateMultiEnd { req_id } => w.account_update_multi_end(*req_id),
        E::Pnl {
            req_id,
            daily_pnl,
            unrealized_pnl,
            realized_pnl,
        } => w.pnl(*req_id, *daily_pnl, *unrealized_pnl, *realized_pnl),
        E::PnlSingle {
            req_id,
            position,
            daily_pnl,
            unrealized_pnl,
            realized_pnl,
            value,
        } => w.pnl_single(*req_id, *position, *daily_pnl, *unrealized_pnl, *realized_pnl, *value),
        E::FamilyCodes { codes } => w.family_codes(codes),
        E::SoftDollarTiers { req_id, tiers } => w.soft_dollar_tiers(*req_id, tiers),

        E::ContractDetails { req_id, details } => w.contract_details(*req_id, details),
        E::BondContractDetails { req_id, details } => w.bond_contract_details(*req_id, details),
        E::ContractDetailsEnd { req_id } => w.contract_details_end(*req_id),
        E::SymbolSamples { req_id, descriptions } => w.symbol_samples(*req_id, descriptions),
        E::SecurityDefinitionOptionalParameter {
            req_id,
            exchange,
            underlying_con_id,
            trading_class,
            multiplier,
            expirations,
            strikes,
        } => w.security_definition_optional_parameter(
            *req_id,
            exchange,
            *underlying_con_id,
            trading_class,
            multiplier,
            expirations,
            strikes,
        ),
        E::SecurityDefinitionOptionalParameterEnd { req_id } => {
            w.security_definition_optional_parameter_end(*req_id)
        }
        E::MarketRule {
            market_rule_id,
            price_increments,
        } => w.market_rule(*market_rule_id, price_increments),

        E::HistoricalData { req_id, bar } => w.historical_data(*req_id, bar),
        E::HistoricalDataEnd { req_id, start, end } => w.historical_data_end(*req_id, start, end),
        E::HistoricalDataUpdate { req_id, bar } => w.historical_data_update(*req_id, bar),
        E::HeadTimestamp { req_id, head_timestamp } => w.head_timestamp(*req_id, head_timestamp),
        E::HistogramData { req_id, items } => w.histogram_data(*req_id, items),
        E::HistoricalTicks { req_id, ticks, done } => w.historical_ticks(*req_id, ticks, *done),
        E::HistoricalTicksBidAsk { req_id, ticks, done } => {
            w.historical_ticks_bid_ask(*req_id, ticks, *done)
        }
        E::HistoricalTicksLast { req_id, ticks, done } => {
            w.historical_ticks_last(*req_id, ticks, *done)
        }
        E::RealtimeBar { req_id, bar } => w.realtime_bar(*req_id, bar),

        E::ScannerParameters { xml } => w.scanner_parameters(xml),
        E::ScannerData { req_id, item } => w.scanner_data(*req_id, item),
        E::ScannerDataEnd { req_id } => w.scanner_data_end(*req_id),
        E::FundamentalData { req_id, data } => w.fundamental_data(*req_id, data),

        E::UpdateNewsBulletin {
            msg_id,
            msg_type,
            message,
            orig_exchange,
        } => w.update_news_bulletin(*msg_id, *msg_type, message, orig_exchange),
        E::NewsArticle {
            req_id,
            article_type,
            article_text,
        } => w.news_article(*req_id, *article_type, article_text),
        E::NewsProviders { providers } => w.news_providers(providers),
        E::HistoricalNews {
            req_id,
            time,
            provider_code,
            article_id,
            headline,
        } => w.historical_news(*req_id, time, provider_code, article_id, headline),
        E::HistoricalNewsEnd { req_id, has_more } => w.historical_news_end(*req_id, *has_more),

        E::ReceiveFa { fa_data_type, xml } => w.receive_fa(*fa_data_type, xml),
        E::ReplaceFaEnd { req_id, text } => w.replace_fa_end(*req_id, text),

        E::DisplayGroupList { req_id, groups } => w.display_group_list(*req_id, groups),
        E::DisplayGroupUpdated { req_id, contract_info } => {
            w.display_group_updated(*req_id, contract_info)
        }
        E::VerifyMessageApi { api_data } => w.verify_message_api(api_data),
        E::VerifyCompleted {
            is_successful,
            error_text,
        } => w.verify_completed(*is_successful, error_text),
        E::VerifyAndAuthMessageApi {
            api_data,
            xyz_challenge,
        } => w.verify_and_auth_message_api(api_data, xyz_challenge),
        E::VerifyAndAuthCompleted {
            is_successful,
            error_text,
        } => w.verify_and_auth_completed(*is_successful, error_text),
    }
}

// ============================================================================
// ChannelWrapper
// ============================================================================

/// Observer that forwards every event into an unbounded channel.
///
/// ```rust,ignore
/// let (wrapper, mut rx) = ChannelWrapper::new();
/// let client = IBClient::connect(ClientConfig::default(), Arc::new(wrapper)).await?;
/// while let Some(event) = rx.recv().await {
///     if let IBEvent::CurrentTime { time } = event {
///         println!("server time {time}");
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ChannelWrapper {
    tx: mpsc::UnboundedSender<IBEvent>,
}

impl ChannelWrapper {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<IBEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Wrapper for ChannelWrapper {
    fn on_event(&self, event: &IBEvent) {
        if self.tx.send(event.clone()).is_err() {
            tracing::debug!("event receiver dropped");
        }
    }
}
