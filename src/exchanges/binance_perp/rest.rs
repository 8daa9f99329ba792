use crate::core::errors::ExchangeError;
use crate::core::kernel::{ApiResponse, Method, ResponseMeta, RestClient};
use crate::core::types::SecurityLevel;
use crate::exchanges::binance_perp::types::{
    Candlestick, CandlestickDataOptions, NewOrderOptions, UserDataStream,
};
use tracing::instrument;

pub const ORDER_PATH: &str = "/fapi/v1/order";
pub const LISTEN_KEY_PATH: &str = "/fapi/v1/listenKey";
pub const KLINES_PATH: &str = "/fapi/v1/klines";

const NO_OPTIONS: Option<&()> = None;

/// REST API operations for Binance Perpetual
///
/// Each operation builds one request at a fixed security level and sends it once.
/// HTTP error statuses are not turned into errors; check `response.status`.
#[derive(Debug, Clone)]
pub struct BinancePerpRestClient {
    rest: RestClient,
}

impl BinancePerpRestClient {
    /// Create a new REST client wrapper
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    /// Place a new order (TRADE, signed).
    ///
    /// The order confirmation is not decoded; its raw body is in the returned response.
    #[instrument(skip(self, options), fields(exchange = "binance_perp", symbol = %options.symbol, side = %options.side))]
    pub async fn new_order(&self, options: &NewOrderOptions) -> Result<ResponseMeta, ExchangeError> {
        let request =
            self.rest
                .build_request(Method::POST, ORDER_PATH, Some(options), SecurityLevel::Trade)?;
        self.rest.execute(&request).await
    }

    /// Open a user data stream and obtain its listen key (`USER_STREAM`).
    #[instrument(skip(self), fields(exchange = "binance_perp"))]
    pub async fn start_user_data_stream(
        &self,
    ) -> Result<ApiResponse<UserDataStream>, ExchangeError> {
        let request = self.rest.build_request(
            Method::POST,
            LISTEN_KEY_PATH,
            NO_OPTIONS,
            SecurityLevel::UserStream,
        )?;
        self.rest.execute_json(&request).await
    }

    /// Extend the current listen key's validity (`USER_STREAM`).
    #[instrument(skip(self), fields(exchange = "binance_perp"))]
    pub async fn keep_alive_user_data_stream(&self) -> Result<ResponseMeta, ExchangeError> {
        let request = self.rest.build_request(
            Method::PUT,
            LISTEN_KEY_PATH,
            NO_OPTIONS,
            SecurityLevel::UserStream,
        )?;
        self.rest.execute(&request).await
    }

    /// Close the user data stream (`USER_STREAM`).
    #[instrument(skip(self), fields(exchange = "binance_perp"))]
    pub async fn close_user_data_stream(&self) -> Result<ResponseMeta, ExchangeError> {
        let request = self.rest.build_request(
            Method::DELETE,
            LISTEN_KEY_PATH,
            NO_OPTIONS,
            SecurityLevel::UserStream,
        )?;
        self.rest.execute(&request).await
    }

    /// Get klines for a symbol (`MARKET_DATA`).
    #[instrument(skip(self, options), fields(exchange = "binance_perp", symbol = %options.symbol, interval = %options.interval))]
    pub async fn candlestick_data(
        &self,
        options: &CandlestickDataOptions,
    ) -> Result<ApiResponse<Vec<Candlestick>>, ExchangeError> {
        let request = self.rest.build_request(
            Method::GET,
            KLINES_PATH,
            Some(options),
            SecurityLevel::MarketData,
        )?;
        self.rest.execute_json(&request).await
    }
}
