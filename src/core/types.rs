use serde::{Deserialize, Serialize};
use std::fmt;

/// Policy tag attached to every request, deciding whether the query string is
/// signed and whether the API key header is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityLevel {
    None,
    Trade,
    UserData,
    UserStream,
    MarketData,
}

/// What a [`SecurityLevel`] requires of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityPolicy {
    pub signed: bool,
    pub api_key_header: bool,
}

impl SecurityLevel {
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::Trade,
        Self::UserData,
        Self::UserStream,
        Self::MarketData,
    ];

    /// Signed levels do not carry the API key header unless the client opts in.
    pub const fn policy(self) -> SecurityPolicy {
        match self {
            Self::None => SecurityPolicy {
                signed: false,
                api_key_header: false,
            },
            Self::Trade | Self::UserData => SecurityPolicy {
                signed: true,
                api_key_header: false,
            },
            Self::UserStream | Self::MarketData => SecurityPolicy {
                signed: false,
                api_key_header: true,
            },
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Trade => "TRADE",
            Self::UserData => "USER_DATA",
            Self::UserStream => "USER_STREAM",
            Self::MarketData => "MARKET_DATA",
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopMarket,
    TakeProfit,
    TakeProfitMarket,
    TrailingStopMarket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    GTC, // Good Till Canceled
    IOC, // Immediate or Cancel
    FOK, // Fill or Kill
    GTX, // Post only
}

impl OrderSide {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl OrderType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Market => "MARKET",
            Self::Limit => "LIMIT",
            Self::Stop => "STOP",
            Self::StopMarket => "STOP_MARKET",
            Self::TakeProfit => "TAKE_PROFIT",
            Self::TakeProfitMarket => "TAKE_PROFIT_MARKET",
            Self::TrailingStopMarket => "TRAILING_STOP_MARKET",
        }
    }
}

impl TimeInForce {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GTC => "GTC",
            Self::IOC => "IOC",
            Self::FOK => "FOK",
            Self::GTX => "GTX",
        }
    }
}

macro_rules! impl_wire_string {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl From<$ty> for String {
                fn from(value: $ty) -> Self {
                    value.as_str().to_string()
                }
            }
        )*
    };
}

impl_wire_string!(OrderSide, OrderType, TimeInForce, KlineInterval);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KlineInterval {
    // Minutes
    Minutes1,
    Minutes3,
    Minutes5,
    Minutes15,
    Minutes30,

    // Hours
    Hours1,
    Hours2,
    Hours4,
    Hours6,
    Hours8,
    Hours12,

    // Days
    Days1,
    Days3,

    Weeks1,
    Months1,
}

impl KlineInterval {
    /// Wire format (e.g., "1m", "1h", "1d")
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minutes1 => "1m",
            Self::Minutes3 => "3m",
            Self::Minutes5 => "5m",
            Self::Minutes15 => "15m",
            Self::Minutes30 => "30m",
            Self::Hours1 => "1h",
            Self::Hours2 => "2h",
            Self::Hours4 => "4h",
            Self::Hours6 => "6h",
            Self::Hours8 => "8h",
            Self::Hours12 => "12h",
            Self::Days1 => "1d",
            Self::Days3 => "3d",
            Self::Weeks1 => "1w",
            Self::Months1 => "1M",
        }
    }
}
