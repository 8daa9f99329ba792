use crate::core::errors::ExchangeError;
use crate::core::kernel::observer::ResponseObserver;
use crate::core::kernel::query::QueryParams;
use crate::core::kernel::signer::{Clock, Signer, SystemClock};
use crate::core::kernel::transport::{HttpTransport, ReqwestTransport, ResponseMeta};
use crate::core::types::SecurityLevel;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};
use url::Url;

/// A fully built request: nothing about it changes between construction and sending.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Final URL including the (possibly signed) query string.
    pub url: Url,
    pub headers: HeaderMap,
    pub security: SecurityLevel,
}

/// A decoded response body together with the raw response it came from.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub value: T,
    pub response: ResponseMeta,
}

/// Builder for creating [`RestClient`] instances
pub struct RestClientBuilder {
    base_url: String,
    api_key: Option<(HeaderName, Secret<String>)>,
    signer: Option<Arc<dyn Signer>>,
    clock: Arc<dyn Clock>,
    transport: Option<Arc<dyn HttpTransport>>,
    observer: Option<Arc<dyn ResponseObserver>>,
    api_key_on_signed: bool,
}

impl RestClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            signer: None,
            clock: Arc::new(SystemClock),
            transport: None,
            observer: None,
            api_key_on_signed: false,
        }
    }

    /// Header name and API key sent on levels whose policy asks for it.
    pub fn with_api_key(mut self, header: HeaderName, api_key: Secret<String>) -> Self {
        self.api_key = Some((header, api_key));
        self
    }

    /// Set the signer for signed security levels
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the default reqwest transport.
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ResponseObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Also attach the API key header to signed requests.
    pub fn with_api_key_on_signed(mut self, enabled: bool) -> Self {
        self.api_key_on_signed = enabled;
        self
    }

    pub fn build(self) -> Result<RestClient, ExchangeError> {
        let base_url = Url::parse(&self.base_url)?;

        let api_key = self
            .api_key
            .map(|(name, key)| {
                let mut value = HeaderValue::from_str(key.expose_secret()).map_err(|_| {
                    ExchangeError::AuthError("API key is not a valid header value".to_string())
                })?;
                value.set_sensitive(true);
                Ok::<_, ExchangeError>((name, value))
            })
            .transpose()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        Ok(RestClient {
            base_url,
            api_key,
            signer: self.signer,
            clock: self.clock,
            transport,
            observer: self.observer,
            api_key_on_signed: self.api_key_on_signed,
        })
    }
}

/// Request builder and dispatcher.
///
/// Immutable once built; every request reuses the same base URL, credentials and
/// transport, so a client can be shared across tasks.
#[derive(Clone)]
pub struct RestClient {
    base_url: Url,
    api_key: Option<(HeaderName, HeaderValue)>,
    signer: Option<Arc<dyn Signer>>,
    clock: Arc<dyn Clock>,
    transport: Arc<dyn HttpTransport>,
    observer: Option<Arc<dyn ResponseObserver>>,
    api_key_on_signed: bool,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url.as_str())
            .field("has_api_key", &self.api_key.is_some())
            .field("has_signer", &self.signer.is_some())
            .field("has_observer", &self.observer.is_some())
            .field("api_key_on_signed", &self.api_key_on_signed)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a request without sending it.
    ///
    /// `options` is encoded into the query string. Signed levels route the
    /// parameters through the signer, stamping the timestamp now; the other levels
    /// send them as encoded. The API key header follows [`SecurityLevel::policy`].
    #[instrument(skip(self, options), fields(method = %method, path = %path, security = %security))]
    pub fn build_request<P>(
        &self,
        method: Method,
        path: &str,
        options: Option<&P>,
        security: SecurityLevel,
    ) -> Result<RequestDescriptor, ExchangeError>
    where
        P: Serialize + ?Sized,
    {
        let mut url = self.base_url.join(path)?;
        let mut params = QueryParams::from_options(options)?;
        let policy = security.policy();

        let query = if policy.signed {
            let signer = self.signer.as_ref().ok_or_else(|| {
                ExchangeError::AuthError(
                    "Authentication required but no signer provided".to_string(),
                )
            })?;
            signer.sign(&mut params, self.clock.now_millis())?
        } else {
            params.encode()
        };

        if query.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&query));
        }

        let mut headers = HeaderMap::new();
        if policy.api_key_header || (policy.signed && self.api_key_on_signed) {
            let (name, value) = self.api_key.as_ref().ok_or_else(|| {
                ExchangeError::AuthError(format!("API key required for {} requests", security))
            })?;
            headers.insert(name.clone(), value.clone());
        }

        Ok(RequestDescriptor {
            method,
            url,
            headers,
            security,
        })
    }

    /// Send a request and drain the body without decoding it.
    ///
    /// The HTTP status is not interpreted; it is returned for the caller to inspect.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.url.path(), security = %request.security))]
    pub async fn execute(&self, request: &RequestDescriptor) -> Result<ResponseMeta, ExchangeError> {
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                if let (Some(observer), Some(partial)) = (&self.observer, err.response()) {
                    observer.on_response(request, partial);
                }
                return Err(err);
            }
        };

        debug!(status = %response.status, bytes = response.body.len(), "Response received");

        if let Some(observer) = &self.observer {
            observer.on_response(request, &response);
        }

        Ok(response)
    }

    /// Send a request and decode the JSON body into `T`.
    ///
    /// On a decode failure the raw response is carried in [`ExchangeError::Decode`].
    pub async fn execute_json<T>(
        &self,
        request: &RequestDescriptor,
    ) -> Result<ApiResponse<T>, ExchangeError>
    where
        T: DeserializeOwned,
    {
        let response = self.execute(request).await?;

        match serde_json::from_slice(&response.body) {
            Ok(value) => Ok(ApiResponse { value, response }),
            Err(e) => Err(ExchangeError::Decode {
                message: format!("Failed to parse JSON response: {}", e),
                response,
            }),
        }
    }
}
