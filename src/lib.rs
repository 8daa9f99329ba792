//! Signed REST client for the Binance USD-M futures API.
//!
//! ```rust,no_run
//! use fapi_binding::core::config::ExchangeConfig;
//! use fapi_binding::core::types::KlineInterval;
//! use fapi_binding::exchanges::binance_perp::{build_connector, CandlestickDataOptions};
//!
//! # async fn example() -> Result<(), fapi_binding::ExchangeError> {
//! let config = ExchangeConfig::new("api_key".to_string(), "secret_key".to_string());
//! let client = build_connector(&config)?;
//!
//! let options = CandlestickDataOptions::new("BTCUSDT", KlineInterval::Hours1).limit(24);
//! let klines = client.candlestick_data(&options).await?;
//! println!("{} klines, status {}", klines.value.len(), klines.response.status);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod exchanges;

pub use crate::core::{errors::ExchangeError, types::*};
pub use exchanges::binance_perp::BinancePerpRestClient;
