//! Typed records exchanged with the server.
//!
//! Unset numeric values are `Option`; the wire sentinels never appear here.

pub mod bar;
pub mod common;
pub mod contract;
pub mod enums;
pub mod execution;
pub mod market_data;
pub mod order;
pub mod scanner;
