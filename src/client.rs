//! IB TWS API client.
//!
//! `IBClient` is the entry point: it dials TWS/Gateway, negotiates the server
//! version, starts the writer/reader/decoder tasks and waits for the handshake
//! warmup. Afterwards every request method encodes one frame for the
//! negotiated version and queues it for the writer task. Responses reach the
//! [`Wrapper`] passed to [`IBClient::connect`].

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use bytes::BytesMut;
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::errors::{IBApiError, Result};
use crate::models::common::TagValue;
use crate::models::contract::Contract;
use crate::models::enums::{FaDataType, MarketDataType};
use crate::models::execution::ExecutionFilter;
use crate::models::order::Order;
use crate::models::scanner::ScannerSubscription;
use crate::pipeline::{error_event, run_reader, run_writer, DecoderTask, Warmup};
use crate::protocol::client_errors::{ALREADY_CONNECTED, NOT_CONNECTED};
use crate::protocol::NO_VALID_ID;
use crate::requests::{HistoricalDataRequest, RequestEncoder};
use crate::transport::{handshake, ConnState, Connection, IoStats, IoStatsSnapshot, ServerInfo, SharedState};
use crate::wrapper::Wrapper;

// ============================================================================
// IBClient
// ============================================================================

/// Async IB TWS API client.
///
/// Cheap to clone; clones share the connection. Request methods take `&self`
/// and may be called from any number of tasks; frames from one caller are
/// written in the order that caller queued them.
///
/// ## Usage
///
/// ```rust,ignore
/// let (wrapper, mut events) = ChannelWrapper::new();
/// let client = IBClient::connect(ClientConfig::new("127.0.0.1", 4002, 0), Arc::new(wrapper)).await?;
///
/// client.req_current_time().await?;
///
/// while let Some(event) = events.recv().await {
///     match event {
///         IBEvent::CurrentTime { time } => println!("Server time: {time}"),
///         IBEvent::Error { code, message, .. } => eprintln!("Error {code}: {message}"),
///         _ => {}
///     }
/// }
/// ```
#[derive(Clone)]
pub struct IBClient {
    inner: Arc<Inner>,
}

struct Inner {
    client_id: i32,
    server: ServerInfo,
    encoder: RequestEncoder,
    state: Arc<SharedState>,
    next_id: Arc<AtomicI32>,
    outbound: mpsc::Sender<BytesMut>,
    shutdown: broadcast::Sender<()>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    stats: Arc<IoStats>,
    wrapper: Arc<dyn Wrapper>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
    }
}

impl IBClient {
    /// Connect, handshake, send START_API and wait for the warmup messages.
    ///
    /// Returns once NEXT_VALID_ID and MANAGED_ACCTS have both arrived and
    /// `connect_ack` has been delivered. If they do not arrive within
    /// `config.handshake_timeout_ms`, every task is stopped and the call
    /// fails with ALREADY_CONNECTED (501).
    pub async fn connect(config: ClientConfig, wrapper: Arc<dyn Wrapper>) -> Result<Self> {
        let addr = config.addr();
        tracing::info!(%addr, client_id = config.client_id, "connecting");

        let state = Arc::new(SharedState::new(ConnState::Disconnected));
        let conn = Connection::connect(&addr).await?;
        state.set(ConnState::Connecting);
        let stats = conn.stats();
        let (mut reader, mut writer) = conn.into_split();

        let server = handshake(&mut reader, &mut writer, &config.connect_options).await?;
        let encoder = RequestEncoder::new(server.server_version);
        let start_api = encoder.start_api(config.client_id, &config.optional_capabilities)?;
        writer.write_frame(&start_api).await?;

        let (shutdown, _) = broadcast::channel(1);
        let (outbound_tx, outbound_rx) = mpsc::channel(config.outbound_capacity.max(1));
        let (frames_tx, frames_rx) = mpsc::channel(config.frame_capacity.max(1));
        let (notices_tx, notices_rx) = mpsc::channel(config.notice_capacity.max(1));
        let (ready_tx, ready_rx) = oneshot::channel();
        let next_id = Arc::new(AtomicI32::new(0));

        let decoder = DecoderTask {
            frames: frames_rx,
            notices: notices_rx,
            shutdown: shutdown.subscribe(),
            wrapper: Arc::clone(&wrapper),
            state: Arc::clone(&state),
            next_id: Arc::clone(&next_id),
            server_version: server.server_version,
            warmup: Some(Warmup::new(ready_tx)),
        };
        let tasks = vec![
            tokio::spawn(run_writer(
                writer,
                outbound_rx,
                shutdown.subscribe(),
                notices_tx,
                Arc::clone(&state),
            )),
            tokio::spawn(run_reader(
                reader,
                frames_tx,
                shutdown.subscribe(),
                Arc::clone(&state),
            )),
            tokio::spawn(decoder.run()),
        ];

        let client = Self {
            inner: Arc::new(Inner {
                client_id: config.client_id,
                server,
                encoder,
                state,
                next_id,
                outbound: outbound_tx,
                shutdown,
                tasks: Mutex::new(tasks),
                stats,
                wrapper,
            }),
        };

        match tokio::time::timeout(config.handshake_timeout(), ready_rx).await {
            Ok(Ok(())) => Ok(client),
            Ok(Err(_)) => {
                client.disconnect().await;
                Err(IBApiError::Disconnected(
                    "connection closed before the handshake completed".into(),
                ))
            }
            Err(_) => {
                tracing::error!(
                    timeout_ms = config.handshake_timeout_ms,
                    "handshake warmup timed out"
                );
                client.disconnect().await;
                Err(IBApiError::client(
                    NO_VALID_ID,
                    ALREADY_CONNECTED,
                    "timed out waiting for NEXT_VALID_ID and MANAGED_ACCTS",
                ))
            }
        }
    }

    /// Stop all tasks and close the socket.
    ///
    /// Frames still queued may or may not have been written. Idempotent.
    pub async fn disconnect(&self) {
        let tasks = std::mem::take(&mut *self.inner.tasks.lock().await);
        let prev = self.inner.state.replace(ConnState::Disconnected);
        if tasks.is_empty() {
            return;
        }

        tracing::info!(?prev, "disconnecting");
        let _ = self.inner.shutdown.send(());
        for task in tasks {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "pipeline task panicked");
            }
        }
        tracing::info!("disconnected");
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Negotiated server version.
    pub fn server_version(&self) -> i32 {
        self.inner.server.server_version
    }

    /// Connection time string from the handshake reply.
    pub fn connection_time(&self) -> &str {
        &self.inner.server.connection_time
    }

    pub fn client_id(&self) -> i32 {
        self.inner.client_id
    }

    pub fn state(&self) -> ConnState {
        self.inner.state.get()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnState::Connected
    }

    pub fn io_stats(&self) -> IoStatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// The version-aware encoder used for every request on this connection.
    pub fn encoder(&self) -> RequestEncoder {
        self.inner.encoder
    }

    /// Take the next id from the sequence seeded by NEXT_VALID_ID.
    ///
    /// Usable for both order ids and request ids.
    pub fn next_req_id(&self) -> i32 {
        self.inner.next_id.fetch_add(1, Ordering::AcqRel)
    }

    // ========================================================================
    // Message Sending
    // ========================================================================

    /// Queue a frame built elsewhere (for example with
    /// [`MessageEncoder`](crate::encoder::MessageEncoder)).
    pub async fn send_raw(&self, frame: BytesMut) -> Result<()> {
        self.send_request(NO_VALID_ID, |_| Ok(frame)).await
    }

    /// Build a frame and queue it for the writer task.
    ///
    /// Failures are reported to the wrapper as an `Error` event before being
    /// returned; in that case nothing is written.
    async fn send_request(
        &self,
        req_id: i32,
        build: impl FnOnce(&RequestEncoder) -> Result<BytesMut>,
    ) -> Result<()> {
        if !self.is_connected() {
            return Err(self.reject(IBApiError::client(req_id, NOT_CONNECTED, "")));
        }
        let frame = build(&self.inner.encoder).map_err(|e| self.reject(e))?;
        self.inner
            .outbound
            .send(frame)
            .await
            .map_err(|_| self.reject(IBApiError::client(req_id, NOT_CONNECTED, "writer stopped")))
    }

    /// Build a frame and queue it without waiting.
    ///
    /// Wrapper callbacks run on the decoder task and cannot `.await`; this is
    /// the request path for them. Calls made from one callback keep their
    /// order on the wire. A full outbound queue fails with
    /// [`IBApiError::QueueFull`], which is returned to the caller but not
    /// reported to the wrapper; every other rejection is reported as with the
    /// async methods.
    ///
    /// A wrapper that keeps a clone of the client forms a reference cycle, so
    /// call [`disconnect`](Self::disconnect) explicitly in that setup.
    pub fn try_request(
        &self,
        req_id: i32,
        build: impl FnOnce(&RequestEncoder) -> Result<BytesMut>,
    ) -> Result<()> {
        if !self.is_connected() {
            return Err(self.reject(IBApiError::client(req_id, NOT_CONNECTED, "")));
        }
        let frame = build(&self.inner.encoder).map_err(|e| self.reject(e))?;
        self.inner.outbound.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                tracing::warn!(req_id, "outbound queue full");
                IBApiError::QueueFull
            }
            mpsc::error::TrySendError::Closed(_) => {
                self.reject(IBApiError::client(req_id, NOT_CONNECTED, "writer stopped"))
            }
        })
    }

    fn reject(&self, err: IBApiError) -> IBApiError {
        tracing::warn!(error = %err, "request rejected");
        self.inner.wrapper.on_event(&error_event(&err));
        err
    }

    // ========================================================================
    // Utility Requests
    // ========================================================================

    /// Request the current server time.
    /// Response: `IBEvent::CurrentTime`.
    pub async fn req_current_time(&self) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.req_current_time()).await
    }

    /// Request a block of order ids.
    /// Response: `IBEvent::NextValidId`.
    pub async fn req_ids(&self, num_ids: i32) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.req_ids(num_ids)).await
    }

    /// Set the server log level (1 = system .. 5 = detail).
    pub async fn set_server_log_level(&self, level: i32) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.set_server_log_level(level)).await
    }

    /// Response: `IBEvent::ManagedAccounts`.
    pub async fn req_managed_accts(&self) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.req_managed_accts()).await
    }

    /// Response: `IBEvent::FamilyCodes`.
    pub async fn req_family_codes(&self) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.req_family_codes()).await
    }

    // ========================================================================
    // Market Data
    // ========================================================================

    /// Subscribe to streaming top-of-book data.
    /// Response: `TickPrice`, `TickSize`, `TickString`, `TickGeneric`,
    /// `TickOptionComputation`, `TickReqParams` and, for snapshots,
    /// `TickSnapshotEnd`.
    pub async fn req_mkt_data(
        &self,
        ticker_id: i32,
        contract: &Contract,
        generic_ticks: &str,
        snapshot: bool,
        regulatory_snapshot: bool,
        options: &[TagValue],
    ) -> Result<()> {
        self.send_request(ticker_id, |e| {
            e.req_mkt_data(ticker_id, contract, generic_ticks, snapshot, regulatory_snapshot, options)
        })
        .await
    }

    pub async fn cancel_mkt_data(&self, ticker_id: i32) -> Result<()> {
        self.send_request(ticker_id, |e| e.cancel_mkt_data(ticker_id)).await
    }

    /// Switch between live, frozen, delayed and delayed-frozen data.
    /// Response: `IBEvent::MarketDataType`.
    pub async fn req_market_data_type(&self, market_data_type: MarketDataType) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.req_market_data_type(market_data_type))
            .await
    }

    /// Response: `IBEvent::SmartComponents`.
    pub async fn req_smart_components(&self, req_id: i32, bbo_exchange: &str) -> Result<()> {
        self.send_request(req_id, |e| e.req_smart_components(req_id, bbo_exchange))
            .await
    }

    // ========================================================================
    // Market Depth
    // ========================================================================

    /// Response: `IBEvent::UpdateMktDepth`.
    pub async fn req_mkt_depth(
        &self,
        ticker_id: i32,
        contract: &Contract,
        num_rows: i32,
        is_smart_depth: bool,
        options: &[TagValue],
    ) -> Result<()> {
        self.send_request(ticker_id, |e| {
            e.req_mkt_depth(ticker_id, contract, num_rows, is_smart_depth, options)
        })
        .await
    }

    pub async fn cancel_mkt_depth(&self, ticker_id: i32, is_smart_depth: bool) -> Result<()> {
        self.send_request(ticker_id, |e| e.cancel_mkt_depth(ticker_id, is_smart_depth))
            .await
    }

    /// Response: `IBEvent::MktDepthExchanges`.
    pub async fn req_mkt_depth_exchanges(&self) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.req_mkt_depth_exchanges()).await
    }

    // ========================================================================
    // Tick-by-Tick
    // ========================================================================

    /// `tick_type` is one of `"Last"`, `"AllLast"`, `"BidAsk"`, `"MidPoint"`.
    /// Response: `TickByTickAllLast`, `TickByTickBidAsk` or `TickByTickMidPoint`.
    pub async fn req_tick_by_tick_data(
        &self,
        req_id: i32,
        contract: &Contract,
        tick_type: &str,
        number_of_ticks: i32,
        ignore_size: bool,
    ) -> Result<()> {
        self.send_request(req_id, |e| {
            e.req_tick_by_tick_data(req_id, contract, tick_type, number_of_ticks, ignore_size)
        })
        .await
    }

    pub async fn cancel_tick_by_tick_data(&self, req_id: i32) -> Result<()> {
        self.send_request(req_id, |e| e.cancel_tick_by_tick_data(req_id)).await
    }

    // ========================================================================
    // Historical Data
    // ========================================================================

    /// Response: `HistoricalData` followed by `HistoricalDataEnd`, then
    /// `HistoricalDataUpdate` when `keep_up_to_date` is set.
    pub async fn req_historical_data(
        &self,
        ticker_id: i32,
        contract: &Contract,
        params: &HistoricalDataRequest,
    ) -> Result<()> {
        self.send_request(ticker_id, |e| e.req_historical_data(ticker_id, contract, params))
            .await
    }

    pub async fn cancel_historical_data(&self, ticker_id: i32) -> Result<()> {
        self.send_request(ticker_id, |e| e.cancel_historical_data(ticker_id))
            .await
    }

    /// Earliest available data point.
    /// Response: `IBEvent::HeadTimestamp`.
    pub async fn req_head_timestamp(
        &self,
        ticker_id: i32,
        contract: &Contract,
        what_to_show: &str,
        use_rth: bool,
        format_date: i32,
    ) -> Result<()> {
        self.send_request(ticker_id, |e| {
            e.req_head_timestamp(ticker_id, contract, what_to_show, use_rth, format_date)
        })
        .await
    }

    pub async fn cancel_head_timestamp(&self, ticker_id: i32) -> Result<()> {
        self.send_request(ticker_id, |e| e.cancel_head_timestamp(ticker_id))
            .await
    }

    /// Response: `IBEvent::HistogramData`.
    pub async fn req_histogram_data(
        &self,
        req_id: i32,
        contract: &Contract,
        use_rth: bool,
        period: &str,
    ) -> Result<()> {
        self.send_request(req_id, |e| e.req_histogram_data(req_id, contract, use_rth, period))
            .await
    }

    pub async fn cancel_histogram_data(&self, req_id: i32) -> Result<()> {
        self.send_request(req_id, |e| e.cancel_histogram_data(req_id)).await
    }

    /// Response: `HistoricalTicks`, `HistoricalTicksBidAsk` or
    /// `HistoricalTicksLast` depending on `what_to_show`.
    #[allow(clippy::too_many_arguments)]
    pub async fn req_historical_ticks(
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
    ) -> Result<()> {
        self.send_request(req_id, |e| {
            e.req_historical_ticks(
                req_id,
                contract,
                start_date_time,
                end_date_time,
                number_of_ticks,
                what_to_show,
                use_rth,
                ignore_size,
                misc_options,
            )
        })
        .await
    }

    // ========================================================================
    // Real-Time Bars
    // ========================================================================

    /// Five-second bars. Response: `IBEvent::RealtimeBar`.
    pub async fn req_real_time_bars(
        &self,
        ticker_id: i32,
        contract: &Contract,
        bar_size: i32,
        what_to_show: &str,
        use_rth: bool,
        options: &[TagValue],
    ) -> Result<()> {
        self.send_request(ticker_id, |e| {
            e.req_real_time_bars(ticker_id, contract, bar_size, what_to_show, use_rth, options)
        })
        .await
    }

    pub async fn cancel_real_time_bars(&self, ticker_id: i32) -> Result<()> {
        self.send_request(ticker_id, |e| e.cancel_real_time_bars(ticker_id))
            .await
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// Place or modify an order.
    ///
    /// Every order attribute is checked against the server version before
    /// anything is sent; the first unsupported one is reported as
    /// UPDATE_TWS (503) for `id`.
    /// Response: `OrderStatus`, `OpenOrder`, `ExecDetails`.
    pub async fn place_order(&self, id: i32, contract: &Contract, order: &Order) -> Result<()> {
        self.send_request(id, |e| e.place_order(id, contract, order)).await
    }

    pub async fn cancel_order(&self, id: i32) -> Result<()> {
        self.send_request(id, |e| e.cancel_order(id)).await
    }

    /// Open orders placed by this client.
    /// Response: `OpenOrder`, `OrderStatus`, then `OpenOrderEnd`.
    pub async fn req_open_orders(&self) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.req_open_orders()).await
    }

    /// Only valid for client id 0: bind future TWS orders to this client.
    pub async fn req_auto_open_orders(&self, auto_bind: bool) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.req_auto_open_orders(auto_bind))
            .await
    }

    pub async fn req_all_open_orders(&self) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.req_all_open_orders()).await
    }

    pub async fn req_global_cancel(&self) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.req_global_cancel()).await
    }

    /// Response: `CompletedOrder`, then `CompletedOrdersEnd`.
    pub async fn req_completed_orders(&self, api_only: bool) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.req_completed_orders(api_only))
            .await
    }

    /// `exercise_action` is 1 to exercise, 2 to lapse.
    pub async fn exercise_options(
        &self,
        ticker_id: i32,
        contract: &Contract,
        exercise_action: i32,
        exercise_quantity: i32,
        account: &str,
        override_: bool,
    ) -> Result<()> {
        self.send_request(ticker_id, |e| {
            e.exercise_options(
                ticker_id,
                contract,
                exercise_action,
                exercise_quantity,
                account,
                override_,
            )
        })
        .await
    }

    // ========================================================================
    // Account & Portfolio
    // ========================================================================

    /// Response: `UpdateAccountValue`, `UpdatePortfolio`, `UpdateAccountTime`,
    /// `AccountDownloadEnd`.
    pub async fn req_account_updates(&self, subscribe: bool, acct_code: &str) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.req_account_updates(subscribe, acct_code))
            .await
    }

    /// Response: `AccountSummary`, then `AccountSummaryEnd`.
    pub async fn req_account_summary(&self, req_id: i32, group: &str, tags: &str) -> Result<()> {
        self.send_request(req_id, |e| e.req_account_summary(req_id, group, tags))
            .await
    }

    pub async fn cancel_account_summary(&self, req_id: i32) -> Result<()> {
        self.send_request(req_id, |e| e.cancel_account_summary(req_id)).await
    }

    /// Response: `AccountUpdateMulti`, then `AccountUpdateMultiEnd`.
    pub async fn req_account_updates_multi(
        &self,
        req_id: i32,
        account: &str,
        model_code: &str,
        ledger_and_nlv: bool,
    ) -> Result<()> {
        self.send_request(req_id, |e| {
            e.req_account_updates_multi(req_id, account, model_code, ledger_and_nlv)
        })
        .await
    }

    pub async fn cancel_account_updates_multi(&self, req_id: i32) -> Result<()> {
        self.send_request(req_id, |e| e.cancel_account_updates_multi(req_id))
            .await
    }

    // ========================================================================
    // Positions
    // ========================================================================

    /// Response: `Position`, then `PositionEnd`.
    pub async fn req_positions(&self) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.req_positions()).await
    }

    pub async fn cancel_positions(&self) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.cancel_positions()).await
    }

    /// Response: `PositionMulti`, then `PositionMultiEnd`.
    pub async fn req_positions_multi(&self, req_id: i32, account: &str, model_code: &str) -> Result<()> {
        self.send_request(req_id, |e| e.req_positions_multi(req_id, account, model_code))
            .await
    }

    pub async fn cancel_positions_multi(&self, req_id: i32) -> Result<()> {
        self.send_request(req_id, |e| e.cancel_positions_multi(req_id)).await
    }

    // ========================================================================
    // PnL
    // ========================================================================

    /// Response: `IBEvent::Pnl`.
    pub async fn req_pnl(&self, req_id: i32, account: &str, model_code: &str) -> Result<()> {
        self.send_request(req_id, |e| e.req_pnl(req_id, account, model_code))
            .await
    }

    pub async fn cancel_pnl(&self, req_id: i32) -> Result<()> {
        self.send_request(req_id, |e| e.cancel_pnl(req_id)).await
    }

    /// Response: `IBEvent::PnlSingle`.
    pub async fn req_pnl_single(
        &self,
        req_id: i32,
        account: &str,
        model_code: &str,
        con_id: i32,
    ) -> Result<()> {
        self.send_request(req_id, |e| e.req_pnl_single(req_id, account, model_code, con_id))
            .await
    }

    pub async fn cancel_pnl_single(&self, req_id: i32) -> Result<()> {
        self.send_request(req_id, |e| e.cancel_pnl_single(req_id)).await
    }

    // ========================================================================
    // Executions
    // ========================================================================

    /// Response: `ExecDetails`, `CommissionReport`, then `ExecDetailsEnd`.
    pub async fn req_executions(&self, req_id: i32, filter: &ExecutionFilter) -> Result<()> {
        self.send_request(req_id, |e| e.req_executions(req_id, filter)).await
    }

    /// Response: `IBEvent::SoftDollarTiers`.
    pub async fn req_soft_dollar_tiers(&self, req_id: i32) -> Result<()> {
        self.send_request(req_id, |e| e.req_soft_dollar_tiers(req_id)).await
    }

    // ========================================================================
    // Contract Details
    // ========================================================================

    /// Response: `ContractDetails` or `BondContractDetails`, then
    /// `ContractDetailsEnd`.
    pub async fn req_contract_details(&self, req_id: i32, contract: &Contract) -> Result<()> {
        self.send_request(req_id, |e| e.req_contract_details(req_id, contract))
            .await
    }

    /// Response: `IBEvent::SymbolSamples`.
    pub async fn req_matching_symbols(&self, req_id: i32, pattern: &str) -> Result<()> {
        self.send_request(req_id, |e| e.req_matching_symbols(req_id, pattern))
            .await
    }

    /// Option chain parameters.
    /// Response: `SecurityDefinitionOptionalParameter`, then
    /// `SecurityDefinitionOptionalParameterEnd`.
    pub async fn req_sec_def_opt_params(
        &self,
        req_id: i32,
        underlying_symbol: &str,
        fut_fop_exchange: &str,
        underlying_sec_type: &str,
        underlying_con_id: i32,
    ) -> Result<()> {
        self.send_request(req_id, |e| {
            e.req_sec_def_opt_params(
                req_id,
                underlying_symbol,
                fut_fop_exchange,
                underlying_sec_type,
                underlying_con_id,
            )
        })
        .await
    }

    /// Response: `IBEvent::MarketRule`.
    pub async fn req_market_rule(&self, market_rule_id: i32) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.req_market_rule(market_rule_id))
            .await
    }

    // ========================================================================
    // Scanner
    // ========================================================================

    /// Response: `IBEvent::ScannerParameters` (XML).
    pub async fn req_scanner_parameters(&self) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.req_scanner_parameters()).await
    }

    /// Response: `ScannerData` per row, then `ScannerDataEnd`.
    pub async fn req_scanner_subscription(
        &self,
        ticker_id: i32,
        subscription: &ScannerSubscription,
        filter_options: &[TagValue],
        options: &[TagValue],
    ) -> Result<()> {
        self.send_request(ticker_id, |e| {
            e.req_scanner_subscription(ticker_id, subscription, filter_options, options)
        })
        .await
    }

    pub async fn cancel_scanner_subscription(&self, ticker_id: i32) -> Result<()> {
        self.send_request(ticker_id, |e| e.cancel_scanner_subscription(ticker_id))
            .await
    }

    // ========================================================================
    // Option Calculations
    // ========================================================================

    /// Response: `TickOptionComputation` with the custom computation tick.
    pub async fn calculate_implied_volatility(
        &self,
        req_id: i32,
        contract: &Contract,
        option_price: f64,
        under_price: f64,
        options: &[TagValue],
    ) -> Result<()> {
        self.send_request(req_id, |e| {
            e.calculate_implied_volatility(req_id, contract, option_price, under_price, options)
        })
        .await
    }

    pub async fn cancel_calculate_implied_volatility(&self, req_id: i32) -> Result<()> {
        self.send_request(req_id, |e| e.cancel_calculate_implied_volatility(req_id))
            .await
    }

    pub async fn calculate_option_price(
        &self,
        req_id: i32,
        contract: &Contract,
        volatility: f64,
        under_price: f64,
        options: &[TagValue],
    ) -> Result<()> {
        self.send_request(req_id, |e| {
            e.calculate_option_price(req_id, contract, volatility, under_price, options)
        })
        .await
    }

    pub async fn cancel_calculate_option_price(&self, req_id: i32) -> Result<()> {
        self.send_request(req_id, |e| e.cancel_calculate_option_price(req_id))
            .await
    }

    // ========================================================================
    // Fundamentals
    // ========================================================================

    /// Response: `IBEvent::FundamentalData` (XML).
    pub async fn req_fundamental_data(
        &self,
        req_id: i32,
        contract: &Contract,
        report_type: &str,
        options: &[TagValue],
    ) -> Result<()> {
        self.send_request(req_id, |e| {
            e.req_fundamental_data(req_id, contract, report_type, options)
        })
        .await
    }

    pub async fn cancel_fundamental_data(&self, req_id: i32) -> Result<()> {
        self.send_request(req_id, |e| e.cancel_fundamental_data(req_id)).await
    }

    // ========================================================================
    // News
    // ========================================================================

    /// Response: `IBEvent::UpdateNewsBulletin`.
    pub async fn req_news_bulletins(&self, all_msgs: bool) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.req_news_bulletins(all_msgs))
            .await
    }

    pub async fn cancel_news_bulletins(&self) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.cancel_news_bulletins()).await
    }

    /// Response: `IBEvent::NewsProviders`.
    pub async fn req_news_providers(&self) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.req_news_providers()).await
    }

    /// Response: `IBEvent::NewsArticle`.
    pub async fn req_news_article(
        &self,
        req_id: i32,
        provider_code: &str,
        article_id: &str,
        options: &[TagValue],
    ) -> Result<()> {
        self.send_request(req_id, |e| {
            e.req_news_article(req_id, provider_code, article_id, options)
        })
        .await
    }

    /// Response: `HistoricalNews`, then `HistoricalNewsEnd`.
    #[allow(clippy::too_many_arguments)]
    pub async fn req_historical_news(
        &self,
        req_id: i32,
        con_id: i32,
        provider_codes: &str,
        start_date_time: &str,
        end_date_time: &str,
        total_results: i32,
        options: &[TagValue],
    ) -> Result<()> {
        self.send_request(req_id, |e| {
            e.req_historical_news(
                req_id,
                con_id,
                provider_codes,
                start_date_time,
                end_date_time,
                total_results,
                options,
            )
        })
        .await
    }

    // ========================================================================
    // Financial Advisors
    // ========================================================================

    /// Response: `IBEvent::ReceiveFa`.
    pub async fn request_fa(&self, fa_data_type: FaDataType) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.request_fa(fa_data_type)).await
    }

    /// Response: `IBEvent::ReplaceFaEnd`.
    pub async fn replace_fa(&self, req_id: i32, fa_data_type: FaDataType, xml: &str) -> Result<()> {
        self.send_request(req_id, |e| e.replace_fa(req_id, fa_data_type, xml))
            .await
    }

    // ========================================================================
    // Display Groups
    // ========================================================================

    /// Response: `IBEvent::DisplayGroupList`.
    pub async fn query_display_groups(&self, req_id: i32) -> Result<()> {
        self.send_request(req_id, |e| e.query_display_groups(req_id)).await
    }

    /// Response: `IBEvent::DisplayGroupUpdated`.
    pub async fn subscribe_to_group_events(&self, req_id: i32, group_id: i32) -> Result<()> {
        self.send_request(req_id, |e| e.subscribe_to_group_events(req_id, group_id))
            .await
    }

    pub async fn update_display_group(&self, req_id: i32, contract_info: &str) -> Result<()> {
        self.send_request(req_id, |e| e.update_display_group(req_id, contract_info))
            .await
    }

    pub async fn unsubscribe_from_group_events(&self, req_id: i32) -> Result<()> {
        self.send_request(req_id, |e| e.unsubscribe_from_group_events(req_id))
            .await
    }

    // ========================================================================
    // Verification
    // ========================================================================

    /// Response: `VerifyMessageApi`, then `VerifyCompleted`.
    pub async fn verify_request(&self, api_name: &str, api_version: &str) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.verify_request(api_name, api_version))
            .await
    }

    pub async fn verify_message(&self, api_data: &str) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.verify_message(api_data)).await
    }

    /// Response: `VerifyAndAuthMessageApi`, then `VerifyAndAuthCompleted`.
    pub async fn verify_and_auth_request(
        &self,
        api_name: &str,
        api_version: &str,
        opaque_isv_key: &str,
    ) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| {
            e.verify_and_auth_request(api_name, api_version, opaque_isv_key)
        })
        .await
    }

    pub async fn verify_and_auth_message(&self, api_data: &str, xyz_response: &str) -> Result<()> {
        self.send_request(NO_VALID_ID, |e| e.verify_and_auth_message(api_data, xyz_response))
            .await
    }
}

impl std::fmt::Debug for IBClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IBClient")
            .field("client_id", &self.inner.client_id)
            .field("server_version", &self.inner.server.server_version)
            .field("state", &self.state())
            .finish()
    }
}
