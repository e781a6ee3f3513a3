//! Wire protocol registry.
//!
//! Message codes in both directions, the minimum server version for every
//! optional wire feature, tick types and the client error catalog. Everything
//! here is a compile-time constant; the only runtime input is the server
//! version negotiated at handshake, checked through [`supports`].

use serde::{Deserialize, Serialize};

// ============================================================================
// Client / Protocol Constants
// ============================================================================

/// Lowest protocol version this client offers during the handshake.
pub const MIN_CLIENT_VER: i32 = 100;

/// Highest protocol version this client offers (`REPLACE_FA_END`).
pub const MAX_CLIENT_VER: i32 = server_version::REPLACE_FA_END;

/// Length prefix size in bytes.
pub const HEADER_LEN: usize = 4;

/// Largest payload accepted in either direction: 16 MB - 1 byte.
pub const MAX_MSG_LEN: usize = 0xFFFFFF;

/// Handshake preamble.
pub const API_SIGN: &[u8; 4] = b"API\0";

/// Sub-version carried by the START_API request.
pub const START_API_VERSION: i32 = 2;

/// Integer "unset" sentinel on the wire.
pub const UNSET_INTEGER: i32 = i32::MAX;

/// Float "unset" sentinel on the wire.
pub const UNSET_DOUBLE: f64 = f64::MAX;

/// 64-bit integer "unset" sentinel on the wire.
pub const UNSET_LONG: i64 = i64::MAX;

/// Request id used for connection-scope errors.
pub const NO_VALID_ID: i32 = -1;

/// True when `server_version` is at or above the feature threshold `min`.
///
/// Every version gate in the encoder and decoder goes through here.
#[inline]
pub fn supports(server_version: i32, min: i32) -> bool {
    server_version >= min
}

// ============================================================================
// Incoming Message IDs (server -> client)
// ============================================================================

pub mod incoming {
    pub const TICK_PRICE: i32 = 1;
    pub const TICK_SIZE: i32 = 2;
    pub const ORDER_STATUS: i32 = 3;
    pub const ERR_MSG: i32 = 4;
    pub const OPEN_ORDER: i32 = 5;
    pub const ACCT_VALUE: i32 = 6;
    pub const PORTFOLIO_VALUE: i32 = 7;
    pub const ACCT_UPDATE_TIME: i32 = 8;
    pub const NEXT_VALID_ID: i32 = 9;
    pub const CONTRACT_DATA: i32 = 10;
    pub const EXECUTION_DATA: i32 = 11;
    pub const MARKET_DEPTH: i32 = 12;
    pub const MARKET_DEPTH_L2: i32 = 13;
    pub const NEWS_BULLETINS: i32 = 14;
    pub const MANAGED_ACCTS: i32 = 15;
    pub const RECEIVE_FA: i32 = 16;
    pub const HISTORICAL_DATA: i32 = 17;
    pub const BOND_CONTRACT_DATA: i32 = 18;
    pub const SCANNER_PARAMETERS: i32 = 19;
    pub const SCANNER_DATA: i32 = 20;
    pub const TICK_OPTION_COMPUTATION: i32 = 21;
    pub const TICK_GENERIC: i32 = 45;
    pub const TICK_STRING: i32 = 46;
    pub const TICK_EFP: i32 = 47;
    pub const CURRENT_TIME: i32 = 49;
    pub const REAL_TIME_BARS: i32 = 50;
    pub const FUNDAMENTAL_DATA: i32 = 51;
    pub const CONTRACT_DATA_END: i32 = 52;
    pub const OPEN_ORDER_END: i32 = 53;
    pub const ACCT_DOWNLOAD_END: i32 = 54;
    pub const EXECUTION_DATA_END: i32 = 55;
    pub const DELTA_NEUTRAL_VALIDATION: i32 = 56;
    pub const TICK_SNAPSHOT_END: i32 = 57;
    pub const MARKET_DATA_TYPE: i32 = 58;
    pub const COMMISSION_REPORT: i32 = 59;
    pub const POSITION_DATA: i32 = 61;
    pub const POSITION_END: i32 = 62;
    pub const ACCOUNT_SUMMARY: i32 = 63;
    pub const ACCOUNT_SUMMARY_END: i32 = 64;
    pub const VERIFY_MESSAGE_API: i32 = 65;
    pub const VERIFY_COMPLETED: i32 = 66;
    pub const DISPLAY_GROUP_LIST: i32 = 67;
    pub const DISPLAY_GROUP_UPDATED: i32 = 68;
    pub const VERIFY_AND_AUTH_MESSAGE_API: i32 = 69;
    pub const VERIFY_AND_AUTH_COMPLETED: i32 = 70;
    pub const POSITION_MULTI: i32 = 71;
    pub const POSITION_MULTI_END: i32 = 72;
    pub const ACCOUNT_UPDATE_MULTI: i32 = 73;
    pub const ACCOUNT_UPDATE_MULTI_END: i32 = 74;
    pub const SECURITY_DEFINITION_OPTION_PARAMETER: i32 = 75;
    pub const SECURITY_DEFINITION_OPTION_PARAMETER_END: i32 = 76;
    pub const SOFT_DOLLAR_TIERS: i32 = 77;
    pub const FAMILY_CODES: i32 = 78;
    pub const SYMBOL_SAMPLES: i32 = 79;
    pub const MKT_DEPTH_EXCHANGES: i32 = 80;
    pub const TICK_REQ_PARAMS: i32 = 81;
    pub const SMART_COMPONENTS: i32 = 82;
    pub const NEWS_ARTICLE: i32 = 83;
    pub const TICK_NEWS: i32 = 84;
    pub const NEWS_PROVIDERS: i32 = 85;
    pub const HISTORICAL_NEWS: i32 = 86;
    pub const HISTORICAL_NEWS_END: i32 = 87;
    pub const HEAD_TIMESTAMP: i32 = 88;
    pub const HISTOGRAM_DATA: i32 = 89;
    pub const HISTORICAL_DATA_UPDATE: i32 = 90;
    pub const REROUTE_MKT_DATA_REQ: i32 = 91;
    pub const REROUTE_MKT_DEPTH_REQ: i32 = 92;
    pub const MARKET_RULE: i32 = 93;
    pub const PNL: i32 = 94;
    pub const PNL_SINGLE: i32 = 95;
    pub const HISTORICAL_TICKS: i32 = 96;
    pub const HISTORICAL_TICKS_BID_ASK: i32 = 97;
    pub const HISTORICAL_TICKS_LAST: i32 = 98;
    pub const TICK_BY_TICK: i32 = 99;
    pub const ORDER_BOUND: i32 = 100;
    pub const COMPLETED_ORDER: i32 = 101;
    pub const COMPLETED_ORDERS_END: i32 = 102;
    pub const REPLACE_FA_END: i32 = 103;
}

// ============================================================================
// Outgoing Message IDs (client -> server)
// ============================================================================

pub mod outgoing {
    pub const REQ_MKT_DATA: i32 = 1;
    pub const CANCEL_MKT_DATA: i32 = 2;
    pub const PLACE_ORDER: i32 = 3;
    pub const CANCEL_ORDER: i32 = 4;
    pub const REQ_OPEN_ORDERS: i32 = 5;
    pub const REQ_ACCT_DATA: i32 = 6;
    pub const REQ_EXECUTIONS: i32 = 7;
    pub const REQ_IDS: i32 = 8;
    pub const REQ_CONTRACT_DATA: i32 = 9;
    pub const REQ_MKT_DEPTH: i32 = 10;
    pub const CANCEL_MKT_DEPTH: i32 = 11;
    pub const REQ_NEWS_BULLETINS: i32 = 12;
    pub const CANCEL_NEWS_BULLETINS: i32 = 13;
    pub const SET_SERVER_LOGLEVEL: i32 = 14;
    pub const REQ_AUTO_OPEN_ORDERS: i32 = 15;
    pub const REQ_ALL_OPEN_ORDERS: i32 = 16;
    pub const REQ_MANAGED_ACCTS: i32 = 17;
    pub const REQ_FA: i32 = 18;
    pub const REPLACE_FA: i32 = 19;
    pub const REQ_HISTORICAL_DATA: i32 = 20;
    pub const EXERCISE_OPTIONS: i32 = 21;
    pub const REQ_SCANNER_SUBSCRIPTION: i32 = 22;
    pub const CANCEL_SCANNER_SUBSCRIPTION: i32 = 23;
    pub const REQ_SCANNER_PARAMETERS: i32 = 24;
    pub const CANCEL_HISTORICAL_DATA: i32 = 25;
    pub const REQ_CURRENT_TIME: i32 = 49;
    pub const REQ_REAL_TIME_BARS: i32 = 50;
    pub const CANCEL_REAL_TIME_BARS: i32 = 51;
    pub const REQ_FUNDAMENTAL_DATA: i32 = 52;
    pub const CANCEL_FUNDAMENTAL_DATA: i32 = 53;
    pub const REQ_CALC_IMPLIED_VOLAT: i32 = 54;
    pub const REQ_CALC_OPTION_PRICE: i32 = 55;
    pub const CANCEL_CALC_IMPLIED_VOLAT: i32 = 56;
    pub const CANCEL_CALC_OPTION_PRICE: i32 = 57;
    pub const REQ_GLOBAL_CANCEL: i32 = 58;
    pub const REQ_MARKET_DATA_TYPE: i32 = 59;
    pub const REQ_POSITIONS: i32 = 61;
    pub const REQ_ACCOUNT_SUMMARY: i32 = 62;
    pub const CANCEL_ACCOUNT_SUMMARY: i32 = 63;
    pub const CANCEL_POSITIONS: i32 = 64;
    pub const VERIFY_REQUEST: i32 = 65;
    pub const VERIFY_MESSAGE: i32 = 66;
    pub const QUERY_DISPLAY_GROUPS: i32 = 67;
    pub const SUBSCRIBE_TO_GROUP_EVENTS: i32 = 68;
    pub const UPDATE_DISPLAY_GROUP: i32 = 69;
    pub const UNSUBSCRIBE_FROM_GROUP_EVENTS: i32 = 70;
    pub const START_API: i32 = 71;
    pub const VERIFY_AND_AUTH_REQUEST: i32 = 72;
    pub const VERIFY_AND_AUTH_MESSAGE: i32 = 73;
    pub const REQ_POSITIONS_MULTI: i32 = 74;
    pub const CANCEL_POSITIONS_MULTI: i32 = 75;
    pub const REQ_ACCOUNT_UPDATES_MULTI: i32 = 76;
    pub const CANCEL_ACCOUNT_UPDATES_MULTI: i32 = 77;
    pub const REQ_SEC_DEF_OPT_PARAMS: i32 = 78;
    pub const REQ_SOFT_DOLLAR_TIERS: i32 = 79;
    pub const REQ_FAMILY_CODES: i32 = 80;
    pub const REQ_MATCHING_SYMBOLS: i32 = 81;
    pub const REQ_MKT_DEPTH_EXCHANGES: i32 = 82;
    pub const REQ_SMART_COMPONENTS: i32 = 83;
    pub const REQ_NEWS_ARTICLE: i32 = 84;
    pub const REQ_NEWS_PROVIDERS: i32 = 85;
    pub const REQ_HISTORICAL_NEWS: i32 = 86;
    pub const REQ_HEAD_TIMESTAMP: i32 = 87;
    pub const REQ_HISTOGRAM_DATA: i32 = 88;
    pub const CANCEL_HISTOGRAM_DATA: i32 = 89;
    pub const CANCEL_HEAD_TIMESTAMP: i32 = 90;
    pub const REQ_MARKET_RULE: i32 = 91;
    pub const REQ_PNL: i32 = 92;
    pub const CANCEL_PNL: i32 = 93;
    pub const REQ_PNL_SINGLE: i32 = 94;
    pub const CANCEL_PNL_SINGLE: i32 = 95;
    pub const REQ_HISTORICAL_TICKS: i32 = 96;
    pub const REQ_TICK_BY_TICK_DATA: i32 = 97;
    pub const CANCEL_TICK_BY_TICK_DATA: i32 = 98;
    pub const REQ_COMPLETED_ORDERS: i32 = 99;
}

// ============================================================================
// Minimum server versions per feature
// ============================================================================

pub mod server_version {
    pub const SCALE_ORDERS: i32 = 35;
    pub const SSHORT_COMBO_LEGS: i32 = 35;
    pub const WHAT_IF_ORDERS: i32 = 36;
    pub const CONTRACT_CONID: i32 = 37;
    pub const PTA_ORDERS: i32 = 39;
    pub const FUNDAMENTAL_DATA: i32 = 40;
    pub const DELTA_NEUTRAL: i32 = 40;
    pub const CONTRACT_DATA_CHAIN: i32 = 40;
    pub const SCALE_ORDERS2: i32 = 40;
    pub const ALGO_ORDERS: i32 = 41;
    pub const EXECUTION_DATA_CHAIN: i32 = 42;
    pub const NOT_HELD: i32 = 44;
    pub const SEC_ID_TYPE: i32 = 45;
    pub const PLACE_ORDER_CONID: i32 = 46;
    pub const REQ_MKT_DATA_CONID: i32 = 47;
    pub const REQ_CALC_IMPLIED_VOLAT: i32 = 49;
    pub const REQ_CALC_OPTION_PRICE: i32 = 50;
    pub const CANCEL_CALC_IMPLIED_VOLAT: i32 = 50;
    pub const CANCEL_CALC_OPTION_PRICE: i32 = 50;
    pub const SSHORTX_OLD: i32 = 51;
    pub const SSHORTX: i32 = 52;
    pub const REQ_GLOBAL_CANCEL: i32 = 53;
    pub const HEDGE_ORDERS: i32 = 54;
    pub const REQ_MARKET_DATA_TYPE: i32 = 55;
    pub const OPT_OUT_SMART_ROUTING: i32 = 56;
    pub const SMART_COMBO_ROUTING_PARAMS: i32 = 57;
    pub const DELTA_NEUTRAL_CONID: i32 = 58;
    pub const SCALE_ORDERS3: i32 = 60;
    pub const ORDER_COMBO_LEGS_PRICE: i32 = 61;
    pub const TRAILING_PERCENT: i32 = 62;
    pub const DELTA_NEUTRAL_OPEN_CLOSE: i32 = 66;
    pub const POSITIONS: i32 = 67;
    pub const ACCOUNT_SUMMARY: i32 = 67;
    pub const TRADING_CLASS: i32 = 68;
    pub const SCALE_TABLE: i32 = 69;
    pub const LINKING: i32 = 70;
    pub const ALGO_ID: i32 = 71;
    pub const OPTIONAL_CAPABILITIES: i32 = 72;
    pub const ORDER_SOLICITED: i32 = 73;
    pub const LINKING_AUTH: i32 = 74;
    pub const PRIMARYEXCH: i32 = 75;
    pub const RANDOMIZE_SIZE_AND_PRICE: i32 = 76;
    pub const FRACTIONAL_POSITIONS: i32 = 101;
    pub const PEGGED_TO_BENCHMARK: i32 = 102;
    pub const MODELS_SUPPORT: i32 = 103;
    pub const SEC_DEF_OPT_PARAMS_REQ: i32 = 104;
    pub const EXT_OPERATOR: i32 = 105;
    pub const SOFT_DOLLAR_TIER: i32 = 106;
    pub const REQ_FAMILY_CODES: i32 = 107;
    pub const REQ_MATCHING_SYMBOLS: i32 = 108;
    pub const PAST_LIMIT: i32 = 109;
    pub const MD_SIZE_MULTIPLIER: i32 = 110;
    pub const CASH_QTY: i32 = 111;
    pub const REQ_MKT_DEPTH_EXCHANGES: i32 = 112;
    pub const TICK_NEWS: i32 = 113;
    pub const REQ_SMART_COMPONENTS: i32 = 114;
    pub const REQ_NEWS_PROVIDERS: i32 = 115;
    pub const REQ_NEWS_ARTICLE: i32 = 116;
    pub const REQ_HISTORICAL_NEWS: i32 = 117;
    pub const REQ_HEAD_TIMESTAMP: i32 = 118;
    pub const REQ_HISTOGRAM: i32 = 119;
    pub const SERVICE_DATA_TYPE: i32 = 120;
    pub const AGG_GROUP: i32 = 121;
    pub const UNDERLYING_INFO: i32 = 122;
    pub const CANCEL_HEADTIMESTAMP: i32 = 123;
    pub const SYNT_REALTIME_BARS: i32 = 124;
    pub const CFD_REROUTE: i32 = 125;
    pub const MARKET_RULES: i32 = 126;
    pub const PNL: i32 = 127;
    pub const NEWS_QUERY_ORIGINS: i32 = 128;
    pub const UNREALIZED_PNL: i32 = 129;
    pub const HISTORICAL_TICKS: i32 = 130;
    pub const MARKET_CAP_PRICE: i32 = 131;
    pub const PRE_OPEN_BID_ASK: i32 = 132;
    pub const REAL_EXPIRATION_DATE: i32 = 134;
    pub const REALIZED_PNL: i32 = 135;
    pub const LAST_LIQUIDITY: i32 = 136;
    pub const TICK_BY_TICK: i32 = 137;
    pub const DECISION_MAKER: i32 = 138;
    pub const MIFID_EXECUTION: i32 = 139;
    pub const TICK_BY_TICK_IGNORE_SIZE: i32 = 140;
    pub const AUTO_PRICE_FOR_HEDGE: i32 = 141;
    pub const WHAT_IF_EXT_FIELDS: i32 = 142;
    pub const SCANNER_GENERIC_OPTS: i32 = 143;
    pub const API_BIND_ORDER: i32 = 144;
    pub const ORDER_CONTAINER: i32 = 145;
    pub const SMART_DEPTH: i32 = 146;
    pub const REMOVE_NULL_ALL_CASTING: i32 = 147;
    pub const D_PEG_ORDERS: i32 = 148;
    pub const MKT_DEPTH_PRIM_EXCHANGE: i32 = 149;
    pub const COMPLETED_ORDERS: i32 = 150;
    pub const PRICE_MGMT_ALGO: i32 = 151;
    pub const STOCK_TYPE: i32 = 152;
    pub const ENCODE_MSG_ASCII7: i32 = 153;
    pub const SEND_ALL_FAMILY_CODES: i32 = 154;
    pub const NO_DEFAULT_OPEN_CLOSE: i32 = 155;
    pub const PRICE_BASED_VOLATILITY: i32 = 156;
    pub const REPLACE_FA_END: i32 = 157;
}

// ============================================================================
// Tick types
// ============================================================================

macro_rules! tick_types {
    ($($name:ident = $code:literal),+ $(,)?) => {
        /// Market data tick type, as carried in tick messages.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(i32)]
        pub enum TickType {
            $($name = $code),+
        }

        impl TryFrom<i32> for TickType {
            type Error = i32;

            fn try_from(code: i32) -> Result<Self, i32> {
                match code {
                    $($code => Ok(TickType::$name),)+
                    other => Err(other),
                }
            }
        }
    };
}

tick_types! {
    BidSize = 0, Bid = 1, Ask = 2, AskSize = 3, Last = 4, LastSize = 5,
    High = 6, Low = 7, Volume = 8, Close = 9,
    BidOptionComputation = 10, AskOptionComputation = 11, LastOptionComputation = 12,
    ModelOption = 13, Open = 14,
    Low13Week = 15, High13Week = 16, Low26Week = 17, High26Week = 18,
    Low52Week = 19, High52Week = 20, AvgVolume = 21, OpenInterest = 22,
    OptionHistoricalVol = 23, OptionImpliedVol = 24, OptionBidExch = 25, OptionAskExch = 26,
    OptionCallOpenInterest = 27, OptionPutOpenInterest = 28,
    OptionCallVolume = 29, OptionPutVolume = 30, IndexFuturePremium = 31,
    BidExch = 32, AskExch = 33, AuctionVolume = 34, AuctionPrice = 35, AuctionImbalance = 36,
    MarkPrice = 37, BidEfpComputation = 38, AskEfpComputation = 39, LastEfpComputation = 40,
    OpenEfpComputation = 41, HighEfpComputation = 42, LowEfpComputation = 43,
    CloseEfpComputation = 44, LastTimestamp = 45, Shortable = 46, FundamentalRatios = 47,
    RtVolume = 48, Halted = 49, BidYield = 50, AskYield = 51, LastYield = 52,
    CustOptionComputation = 53, TradeCount = 54, TradeRate = 55, VolumeRate = 56,
    LastRthTrade = 57, RtHistoricalVol = 58, IbDividends = 59, BondFactorMultiplier = 60,
    RegulatoryImbalance = 61, NewsTick = 62,
    ShortTermVolume3Min = 63, ShortTermVolume5Min = 64, ShortTermVolume10Min = 65,
    DelayedBid = 66, DelayedAsk = 67, DelayedLast = 68,
    DelayedBidSize = 69, DelayedAskSize = 70, DelayedLastSize = 71,
    DelayedHigh = 72, DelayedLow = 73, DelayedVolume = 74, DelayedClose = 75, DelayedOpen = 76,
    RtTrdVolume = 77, CreditmanMarkPrice = 78, CreditmanSlowMarkPrice = 79,
    DelayedBidOptionComputation = 80, DelayedAskOptionComputation = 81,
    DelayedLastOptionComputation = 82, DelayedModelOptionComputation = 83,
    LastExch = 84, LastRegTime = 85, FuturesOpenInterest = 86, AvgOptVolume = 87,
    DelayedLastTimestamp = 88, ShortableShares = 89, DelayedHalted = 90,
    Reuters2MutualFunds = 91, EtfNavClose = 92, EtfNavPriorClose = 93,
    EtfNavBid = 94, EtfNavAsk = 95, EtfNavLast = 96, EtfFrozenNavLast = 97,
    EtfNavHigh = 98, EtfNavLow = 99, SocialMarketAnalytics = 100,
    EstimatedIpoMidpoint = 101, FinalIpoLast = 102,
    DelayedYieldBid = 103, DelayedYieldAsk = 104, NotSet = 105,
}

impl From<TickType> for i32 {
    fn from(tt: TickType) -> i32 {
        tt as i32
    }
}

impl TickType {
    /// The size tick paired with a price tick inside a TICK_PRICE record.
    pub fn size_tick(self) -> Option<TickType> {
        match self {
            TickType::Bid => Some(TickType::BidSize),
            TickType::Ask => Some(TickType::AskSize),
            TickType::Last => Some(TickType::LastSize),
            TickType::DelayedBid => Some(TickType::DelayedBidSize),
            TickType::DelayedAsk => Some(TickType::DelayedAskSize),
            TickType::DelayedLast => Some(TickType::DelayedLastSize),
            _ => None,
        }
    }
}

// ============================================================================
// Client Error Catalog
// ============================================================================

pub mod client_errors {
    /// A reserved client-side error: numeric code plus canonical message.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClientError {
        pub code: i32,
        pub message: &'static str,
    }

    pub const ALREADY_CONNECTED: ClientError = ClientError {
        code: 501,
        message: "Already connected.",
    };
    pub const CONNECT_FAIL: ClientError = ClientError {
        code: 502,
        message: "Couldn't connect to TWS. Confirm that \"Enable ActiveX and Socket Clients\" \
                  is enabled and connection port is the same as \"Socket Port\" on the TWS \
                  \"Edit->Global Configuration...->API->Settings\" menu.",
    };
    pub const UPDATE_TWS: ClientError = ClientError {
        code: 503,
        message: "The TWS is out of date and must be upgraded.",
    };
    pub const NOT_CONNECTED: ClientError = ClientError {
        code: 504,
        message: "Not connected",
    };
    pub const UNKNOWN_ID: ClientError = ClientError {
        code: 505,
        message: "Fatal Error: Unknown message id.",
    };
    pub const UNSUPPORTED_VERSION: ClientError = ClientError {
        code: 506,
        message: "Unsupported version",
    };
    pub const BAD_LENGTH: ClientError = ClientError {
        code: 507,
        message: "Bad message length",
    };
    pub const BAD_MESSAGE: ClientError = ClientError {
        code: 508,
        message: "Bad message",
    };
    pub const SOCKET_EXCEPTION: ClientError = ClientError {
        code: 509,
        message: "Exception caught while reading socket - ",
    };
    pub const FAIL_CREATE_SOCK: ClientError = ClientError {
        code: 520,
        message: "Failed to create socket",
    };
    pub const SSL_FAIL: ClientError = ClientError {
        code: 530,
        message: "SSL specific error: ",
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_type_try_from() {
        assert_eq!(TickType::try_from(0), Ok(TickType::BidSize));
        assert_eq!(TickType::try_from(4), Ok(TickType::Last));
        assert_eq!(TickType::try_from(105), Ok(TickType::NotSet));
        assert_eq!(TickType::try_from(999), Err(999));
        assert_eq!(i32::from(TickType::DelayedLastSize), 71);
    }

    #[test]
    fn size_tick_pairs() {
        assert_eq!(TickType::Bid.size_tick(), Some(TickType::BidSize));
        assert_eq!(TickType::Ask.size_tick(), Some(TickType::AskSize));
        assert_eq!(TickType::Last.size_tick(), Some(TickType::LastSize));
        assert_eq!(TickType::DelayedAsk.size_tick(), Some(TickType::DelayedAskSize));
        assert_eq!(TickType::High.size_tick(), None);
    }

    #[test]
    fn client_version_range() {
        assert_eq!(MIN_CLIENT_VER, 100);
        assert_eq!(MAX_CLIENT_VER, 157);
        assert!(supports(MAX_CLIENT_VER, server_version::REPLACE_FA_END));
        assert!(!supports(120, server_version::TICK_BY_TICK));
    }

    #[test]
    fn market_rule_codes_differ_by_direction() {
        assert_eq!(outgoing::REQ_MARKET_RULE, 91);
        assert_eq!(incoming::MARKET_RULE, 93);
        assert_eq!(incoming::REROUTE_MKT_DATA_REQ, 91);
    }

    #[test]
    fn error_catalog_codes() {
        use client_errors::*;
        let codes: Vec<i32> = [
            ALREADY_CONNECTED, CONNECT_FAIL, UPDATE_TWS, NOT_CONNECTED, UNKNOWN_ID,
            UNSUPPORTED_VERSION, BAD_LENGTH, BAD_MESSAGE, SOCKET_EXCEPTION,
            FAIL_CREATE_SOCK, SSL_FAIL,
        ]
        .iter()
        .map(|e| e.code)
        .collect();
        assert_eq!(codes, vec![501, 502, 503, 504, 505, 506, 507, 508, 509, 520, 530]);
    }
}
