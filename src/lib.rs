//! ibwire -- async client core for the Interactive Brokers TWS/Gateway API.
//!
//! Speaks the length-prefixed, NUL-delimited text protocol used by TWS and
//! IB Gateway: version handshake, a version-aware encoder for every request,
//! and a decoder that turns each inbound frame into typed [`IBEvent`]s.
//!
//! ## Modules
//!
//! - [`models`] -- Typed records (Contract, Order, Execution, Bar, ...)
//! - [`protocol`] -- Message codes, server version thresholds, tick types, client error catalog
//! - [`errors`] -- Error types for the library
//! - [`config`] -- Connection and queue settings
//! - [`encoder`] -- Field-level frame builder
//! - [`requests`] -- Version-gated encoders for each outbound request
//! - [`decoder`] -- Field cursor and per-message parsers
//! - [`transport`] -- TCP framing and the version handshake
//! - [`wrapper`] -- IBEvent enum and the `Wrapper` callback trait
//! - [`client`] -- IBClient (main API entry point)

pub mod client;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod errors;
pub mod models;
mod pipeline;
pub mod protocol;
pub mod requests;
pub mod transport;
pub mod wrapper;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use errors::{IBApiError, Result};

// Contract types
pub use models::contract::{
    ComboLeg, Contract, ContractDescription, ContractDetails, DeltaNeutralContract,
};

// Order types
pub use models::order::{Order, OrderComboLeg, OrderCondition, OrderState};

// Execution types
pub use models::execution::{CommissionReport, Execution, ExecutionFilter};

// Bar / historical data types
pub use models::bar::{Bar, HistoricalTick, HistoricalTickBidAsk, HistoricalTickLast};

// Market data types
pub use models::market_data::{DepthMktDataDescription, TickAttrib, TickAttribBidAsk, TickAttribLast};

// Scanner
pub use models::scanner::{ScannerDataItem, ScannerSubscription};

// Common types
pub use models::common::{
    FamilyCode, HistogramEntry, NewsProvider, PriceIncrement, SmartComponent, SoftDollarTier,
    TagValue,
};

// Enums
pub use models::enums::*;

// Protocol
pub use protocol::TickType;

// Encoder / Decoder / Transport
pub use decoder::MessageDecoder;
pub use encoder::MessageEncoder;
pub use requests::{HistoricalDataRequest, RequestEncoder};
pub use transport::{ConnState, IoStatsSnapshot};

// Client / Events
pub use client::IBClient;
pub use config::ClientConfig;
pub use wrapper::{ChannelWrapper, IBEvent, Wrapper};
