use crate::core::errors::ExchangeError;
use crate::core::kernel::{QueryParams, Signer};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 query signer.
///
/// Produces `<params ordered by key, timestamp included>&signature=<hex digest>`.
pub struct BinancePerpSigner {
    secret_key: Secret<String>,
}

impl BinancePerpSigner {
    pub fn new(secret_key: Secret<String>) -> Self {
        Self { secret_key }
    }

    fn generate_signature(&self, query_string: &str) -> Result<String, ExchangeError> {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.expose_secret().as_bytes())
            .map_err(|e| ExchangeError::AuthError(format!("Failed to create HMAC: {}", e)))?;
        mac.update(query_string.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl Signer for BinancePerpSigner {
    fn sign(&self, params: &mut QueryParams, timestamp: u64) -> Result<String, ExchangeError> {
        params.set("timestamp", timestamp.to_string());
        let query_string = params.encode();
        let signature = self.generate_signature(&query_string)?;

        Ok(format!("{}&signature={}", query_string, signature))
    }
}
