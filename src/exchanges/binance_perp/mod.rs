pub mod builder; // config → RestClient with signer and API key header
pub mod rest; // typed endpoint operations
pub mod signer; // HMAC-SHA256 query signing
pub mod types; // query option structs and response shapes

pub use builder::{build_connector, rest_builder, API_KEY_HEADER};
pub use rest::{BinancePerpRestClient, KLINES_PATH, LISTEN_KEY_PATH, ORDER_PATH};
pub use signer::BinancePerpSigner;
pub use types::*;
