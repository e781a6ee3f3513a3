//! Typed forms of the protocol's string and integer enumerations.
//!
//! String enums keep an `Other` variant so values the server introduces later
//! still round-trip unchanged. Integer enums are `#[repr(i32)]` and convert
//! with `TryFrom<i32>`.

use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::encoder::WireField;

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal $(| $alias:literal)*),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Other(s) => s.as_str(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(match s {
                    $($wire $(| $alias)* => Self::$variant,)+
                    other => Self::Other(other.to_string()),
                })
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                match s.parse() {
                    Ok(v) => v,
                    Err(never) => match never {},
                }
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> String {
                v.as_str().to_string()
            }
        }

        impl WireField for $name {
            fn write_text(&self, buf: &mut BytesMut) {
                buf.extend_from_slice(self.as_str().as_bytes());
            }
        }
    };
}

macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident = $code:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(i32)]
        pub enum $name {
            $($variant = $code,)+
        }

        impl TryFrom<i32> for $name {
            type Error = i32;

            fn try_from(v: i32) -> Result<Self, i32> {
                match v {
                    $($code => Ok(Self::$variant),)+
                    other => Err(other),
                }
            }
        }

        impl WireField for $name {
            fn write_text(&self, buf: &mut BytesMut) {
                (*self as i32).write_text(buf);
            }
        }
    };
}

text_enum! {
    /// Security type of a contract.
    SecType {
        Stock => "STK",
        Option => "OPT",
        Future => "FUT",
        ContinuousFuture => "CONTFUT",
        Forex => "CASH",
        Index => "IND",
        FutureOption => "FOP",
        Bond => "BOND",
        Fund => "FUND",
        Warrant => "WAR",
        Commodity => "CMDTY",
        Cfd => "CFD",
        Combo => "BAG",
        News => "NEWS",
        Crypto => "CRYPTO",
    }
}

text_enum! {
    /// Option right.
    Right {
        Call => "C" | "CALL",
        Put => "P" | "PUT",
    }
}

text_enum! {
    /// Order or combo leg side.
    Action {
        Buy => "BUY",
        Sell => "SELL",
        SellShort => "SSHORT",
        SellLong => "SLONG",
    }
}

text_enum! {
    OrderType {
        Market => "MKT",
        Limit => "LMT",
        Stop => "STP",
        StopLimit => "STP LMT",
        TrailingStop => "TRAIL",
        TrailingStopLimit => "TRAIL LIMIT",
        Relative => "REL",
        MarketOnClose => "MOC",
        LimitOnClose => "LOC",
        MarketOnOpen => "MOO",
        LimitOnOpen => "LOO",
        PeggedToMarket => "PEG MKT",
        PeggedToMidpoint => "PEG MID",
        PeggedToBenchmark => "PEG BENCH",
        PeggedToStock => "PEG STK",
        Volatility => "VOL",
        MarketIfTouched => "MIT",
        LimitIfTouched => "LIT",
        MarketWithProtection => "MKT PRT",
        MarketToLimit => "MTL",
        MidPrice => "MIDPRICE",
        BoxTop => "BOX TOP",
        SnapToMarket => "SNAP MKT",
        SnapToMidpoint => "SNAP MID",
        SnapToPrimary => "SNAP PRIM",
        PeggedToPrimary => "PEG PRIM",
    }
}

text_enum! {
    /// Order time in force.
    TimeInForce {
        Day => "DAY",
        GoodTillCancel => "GTC",
        ImmediateOrCancel => "IOC",
        GoodTillDate => "GTD",
        AtTheOpening => "OPG",
        FillOrKill => "FOK",
        DayTillCancel => "DTC",
        Auction => "AUC",
    }
}

code_enum! {
    /// Order origin.
    Origin { Customer = 0, Firm = 1, Unknown = 2 }
}

impl Default for Origin {
    fn default() -> Self {
        Origin::Customer
    }
}

code_enum! {
    /// Open/close flag of a combo leg.
    LegOpenClose { Same = 0, Open = 1, Close = 2, Unknown = 3 }
}

impl Default for LegOpenClose {
    fn default() -> Self {
        LegOpenClose::Same
    }
}

code_enum! {
    /// Trigger method for stop orders and price conditions.
    TriggerMethod {
        Default = 0,
        DoubleBidAsk = 1,
        Last = 2,
        DoubleLast = 3,
        BidAsk = 4,
        LastOrBidAsk = 7,
        MidPoint = 8,
    }
}

impl Default for TriggerMethod {
    fn default() -> Self {
        TriggerMethod::Default
    }
}

code_enum! {
    /// Discriminant of an order condition on the wire.
    OrderConditionType {
        Price = 1,
        Time = 3,
        Margin = 4,
        Execution = 5,
        Volume = 6,
        PercentChange = 7,
    }
}

code_enum! {
    MarketDataType { RealTime = 1, Frozen = 2, Delayed = 3, DelayedFrozen = 4 }
}

code_enum! {
    /// Financial-advisor configuration document kind.
    FaDataType { Groups = 1, Profiles = 2, Aliases = 3 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_enums_round_trip_through_wire_strings() {
        assert_eq!("BAG".parse::<SecType>().unwrap(), SecType::Combo);
        assert_eq!(SecType::Combo.to_string(), "BAG");
        assert_eq!("STP LMT".parse::<OrderType>().unwrap(), OrderType::StopLimit);
        assert_eq!("CALL".parse::<Right>().unwrap(), Right::Call);
        assert_eq!(Right::Call.as_str(), "C");
    }

    #[test]
    fn unknown_strings_are_preserved() {
        let st: SecType = "IOPT".parse().unwrap();
        assert_eq!(st, SecType::Other("IOPT".into()));
        assert_eq!(st.to_string(), "IOPT");
    }

    #[test]
    fn serde_uses_wire_strings() {
        let json = serde_json::to_string(&TimeInForce::GoodTillCancel).unwrap();
        assert_eq!(json, "\"GTC\"");
        let back: Action = serde_json::from_str("\"SSHORT\"").unwrap();
        assert_eq!(back, Action::SellShort);
    }

    #[test]
    fn code_enums() {
        assert_eq!(OrderConditionType::try_from(5), Ok(OrderConditionType::Execution));
        assert_eq!(OrderConditionType::try_from(2), Err(2));
        assert_eq!(TriggerMethod::try_from(8), Ok(TriggerMethod::MidPoint));
        assert_eq!(Origin::default(), Origin::Customer);
    }
}
