use crate::core::kernel::ResponseMeta;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    /// Option struct could not be encoded into query parameters. Nothing was sent.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Connect/write/read failure at the HTTP layer. `response` carries whatever
    /// arrived before the failure.
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        response: Option<ResponseMeta>,
    },

    /// Response body was not valid JSON for the requested shape.
    #[error("Decode error: {message}")]
    Decode {
        message: String,
        response: ResponseMeta,
    },

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),
}

impl ExchangeError {
    /// The response received before the error, if any.
    pub fn response(&self) -> Option<&ResponseMeta> {
        match self {
            Self::Transport { response, .. } => response.as_ref(),
            Self::Decode { response, .. } => Some(response),
            _ => None,
        }
    }
}

impl From<serde_urlencoded::ser::Error> for ExchangeError {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for ExchangeError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}
