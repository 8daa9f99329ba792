//! Exchange-agnostic request pipeline
//!
//! A call flows through four pieces, leaf first:
//!
//! - [`QueryParams`]: multi-valued parameters encoded canonically (ordered by key)
//! - [`Signer`] + [`Clock`]: turn parameters into a signed query string at send time
//! - [`RestClient::build_request`]: resolve the path, encode or sign the options and
//!   attach the API key header according to the [`SecurityLevel`] policy
//! - [`RestClient::execute`] / [`RestClient::execute_json`]: send through an injectable
//!   [`HttpTransport`], hand the raw body to an optional [`ResponseObserver`], decode
//!
//! ```rust,no_run
//! use fapi_binding::core::kernel::*;
//! use fapi_binding::core::types::SecurityLevel;
//!
//! # async fn example() -> Result<(), fapi_binding::ExchangeError> {
//! let rest = RestClientBuilder::new("https://fapi.binance.com").build()?;
//! let request = rest.build_request::<()>(Method::GET, "/fapi/v1/time", None, SecurityLevel::None)?;
//! let response = rest.execute(&request).await?;
//! println!("{}", response.body_text());
//! # Ok(())
//! # }
//! ```
//!
//! [`SecurityLevel`]: crate::core::types::SecurityLevel

pub mod observer;
pub mod query;
pub mod rest;
pub mod signer;
pub mod transport;

pub use observer::{ResponseObserver, StderrObserver, TracingObserver, WriterObserver};
pub use query::QueryParams;
pub use rest::{ApiResponse, RequestDescriptor, RestClient, RestClientBuilder};
pub use signer::{Clock, FixedClock, Signer, SystemClock};
pub use transport::{HttpTransport, ReqwestTransport, ResponseMeta};
pub use reqwest::Method;
