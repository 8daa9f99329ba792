use crate::core::config::ConfigError;
use crate::core::errors::ExchangeError;
use crate::core::kernel::rest::RequestDescriptor;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use std::borrow::Cow;
use tracing::{instrument, trace};

/// Everything received for a request: status, headers and the fully read body.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ResponseMeta {
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// HTTP transport seam.
///
/// Implementations must read the response body to the end (or to the failure point)
/// and release the underlying connection before returning, on every path.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &RequestDescriptor) -> Result<ResponseMeta, ExchangeError>;
}

/// `HttpTransport` backed by a reqwest client with default settings.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .user_agent(concat!("fapi-binding/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ConfigError::InvalidConfiguration(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }

    /// Use a preconfigured client, e.g. one with a timeout or proxy.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.url.path()))]
    async fn send(&self, request: &RequestDescriptor) -> Result<ResponseMeta, ExchangeError> {
        let mut response = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .send()
            .await
            .map_err(|e| ExchangeError::Transport {
                message: format!("Request failed: {}", e),
                response: None,
            })?;

        let status = response.status();
        let headers = response.headers().clone();
        let mut body = Vec::new();

        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => body.extend_from_slice(&chunk),
                Ok(None) => break,
                Err(e) => {
                    return Err(ExchangeError::Transport {
                        message: format!("Failed to read response body: {}", e),
                        response: Some(ResponseMeta {
                            status,
                            headers,
                            body,
                        }),
                    });
                }
            }
        }

        trace!(status = %status, bytes = body.len(), "response read");

        Ok(ResponseMeta {
            status,
            headers,
            body,
        })
    }
}
