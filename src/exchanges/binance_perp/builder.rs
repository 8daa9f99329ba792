use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::RestClientBuilder;
use crate::exchanges::binance_perp::{rest::BinancePerpRestClient, signer::BinancePerpSigner};
use reqwest::header::HeaderName;
use std::sync::Arc;

pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Kernel builder preloaded with the base URL, API key header and signer from `config`.
///
/// Use this to inject a transport, clock or response observer before building.
pub fn rest_builder(config: &ExchangeConfig) -> RestClientBuilder {
    RestClientBuilder::new(config.resolved_base_url())
        .with_api_key(
            HeaderName::from_static("x-mbx-apikey"),
            config.api_key.clone(),
        )
        .with_signer(Arc::new(BinancePerpSigner::new(config.secret_key.clone())))
        .with_api_key_on_signed(config.api_key_on_signed)
}

/// Create a Binance Perpetual REST client with the default transport
pub fn build_connector(config: &ExchangeConfig) -> Result<BinancePerpRestClient, ExchangeError> {
    let rest = rest_builder(config).build()?;
    Ok(BinancePerpRestClient::new(rest))
}
