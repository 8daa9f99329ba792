//! Shared fixtures for the REST integration tests

#![allow(dead_code)]

use fapi_binding::core::config::ExchangeConfig;
use fapi_binding::exchanges::binance_perp::{build_connector, BinancePerpRestClient};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const API_KEY: &str = "test_api_key";
pub const SECRET_KEY: &str = "test_secret_key";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn test_config(server: &MockServer) -> ExchangeConfig {
    ExchangeConfig::new(API_KEY.to_string(), SECRET_KEY.to_string()).base_url(server.uri())
}

pub fn test_client(server: &MockServer) -> BinancePerpRestClient {
    build_connector(&test_config(server)).expect("client should build")
}

/// Kline in the exchange's positional array form, one hour long.
pub fn kline_json(open_time: i64, close: &str) -> Value {
    json!([
        open_time,
        "50000.10",
        "50500.00",
        "49800.50",
        close,
        "1234.567",
        open_time + 3_599_999,
        "61728350.00",
        4200,
        "600.1",
        "30000000.00",
        "0"
    ])
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
