use crate::core::types::{KlineInterval, OrderSide, OrderType, TimeInForce};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Query parameters for `POST /fapi/v1/order`.
///
/// Every field is sent as a string. Optional fields are left out of the query
/// string when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewOrderOptions {
    pub symbol: String,
    pub side: String,
    #[serde(rename = "type")]
    pub order_type: String,
    #[serde(rename = "timeInForce", skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<String>,
    pub quantity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(rename = "reduceOnly", skip_serializing_if = "Option::is_none")]
    pub reduce_only: Option<String>,
}

impl NewOrderOptions {
    pub fn limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: impl Into<String>,
        price: impl Into<String>,
        time_in_force: TimeInForce,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side: side.into(),
            order_type: OrderType::Limit.into(),
            time_in_force: Some(time_in_force.into()),
            quantity: quantity.into(),
            price: Some(price.into()),
            reduce_only: None,
        }
    }

    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            side: side.into(),
            order_type: OrderType::Market.into(),
            time_in_force: None,
            quantity: quantity.into(),
            price: None,
            reduce_only: None,
        }
    }

    #[must_use]
    pub fn reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = Some(reduce_only.to_string());
        self
    }
}

/// Query parameters for `GET /fapi/v1/klines`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CandlestickDataOptions {
    pub symbol: String,
    pub interval: String,
    /// Start time in milliseconds.
    #[serde(rename = "startTime", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    /// End time in milliseconds.
    #[serde(rename = "endTime", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    /// Number of klines (default 500, max 1500).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl CandlestickDataOptions {
    pub fn new(symbol: impl Into<String>, interval: KlineInterval) -> Self {
        Self {
            symbol: symbol.into(),
            interval: interval.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn start_time(mut self, start_time: i64) -> Self {
        self.start_time = Some(start_time);
        self
    }

    #[must_use]
    pub const fn end_time(mut self, end_time: i64) -> Self {
        self.end_time = Some(end_time);
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDataStream {
    pub listen_key: String,
}

/// User data stream event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "ORDER_TRADE_UPDATE")]
    OrderTradeUpdate,
}

impl EventType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrderTradeUpdate => "ORDER_TRADE_UPDATE",
        }
    }
}

/// One kline from `GET /fapi/v1/klines`.
///
/// The exchange sends each kline as a positional array:
/// `[openTime, open, high, low, close, volume, closeTime, quoteVolume, trades,
/// takerBuyBaseVolume, takerBuyQuoteVolume, ignore]`. The first seven entries are
/// required; the trailing ones are decoded when present. Prices and volumes arrive
/// as strings but plain JSON numbers are accepted too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candlestick {
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub close_time: i64,
    pub quote_asset_volume: Option<Decimal>,
    pub number_of_trades: Option<u64>,
    pub taker_buy_base_asset_volume: Option<Decimal>,
    pub taker_buy_quote_asset_volume: Option<Decimal>,
}

impl Candlestick {
    pub fn open_datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.open_time).single()
    }

    pub fn close_datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.close_time).single()
    }
}

const KLINE_REQUIRED_FIELDS: usize = 7;

impl<'de> Deserialize<'de> for Candlestick {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<Value>::deserialize(deserializer)?;
        if raw.len() < KLINE_REQUIRED_FIELDS {
            return Err(de::Error::invalid_length(
                raw.len(),
                &"a kline array with at least 7 entries",
            ));
        }

        let integer =
            |index: usize| parse_integer(&raw[index], index).map_err(D::Error::custom);
        let decimal =
            |index: usize| parse_decimal(&raw[index], index).map_err(D::Error::custom);
        let optional_decimal = |index: usize| {
            raw.get(index)
                .map(|value| parse_decimal(value, index))
                .transpose()
                .map_err(D::Error::custom)
        };

        let number_of_trades = raw
            .get(8)
            .map(|value| {
                parse_integer(value, 8).and_then(|n| {
                    u64::try_from(n)
                        .map_err(|_| format!("kline field 8: negative trade count {}", n))
                })
            })
            .transpose()
            .map_err(D::Error::custom)?;

        Ok(Self {
            open_time: integer(0)?,
            open: decimal(1)?,
            high: decimal(2)?,
            low: decimal(3)?,
            close: decimal(4)?,
            volume: decimal(5)?,
            close_time: integer(6)?,
            quote_asset_volume: optional_decimal(7)?,
            number_of_trades,
            taker_buy_base_asset_volume: optional_decimal(9)?,
            taker_buy_quote_asset_volume: optional_decimal(10)?,
        })
    }
}

fn parse_integer(value: &Value, index: usize) -> Result<i64, String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| format!("kline field {}: {} is not an integer", index, n)),
        Value::String(s) => s
            .parse()
            .map_err(|e| format!("kline field {}: '{}' {}", index, s, e)),
        other => Err(format!("kline field {}: unexpected {}", index, other)),
    }
}

fn parse_decimal(value: &Value, index: usize) -> Result<Decimal, String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => return Err(format!("kline field {}: unexpected {}", index, other)),
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| format!("kline field {}: '{}' {}", index, text, e))
}
