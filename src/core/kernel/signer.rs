use crate::core::errors::ExchangeError;
use crate::core::kernel::query::QueryParams;

/// Signer trait for request authentication
///
/// Implementations own the signing material and know the exchange's signed query
/// format. The timestamp is supplied by the caller at sign time so that the
/// signature is reproducible for a fixed clock.
pub trait Signer: Send + Sync {
    /// Stamp `params` with `timestamp`, encode them and return the final query string
    /// with the signature appended as the last parameter.
    ///
    /// The returned string must be sent verbatim; the signature covers it byte for byte.
    fn sign(&self, params: &mut QueryParams, timestamp: u64) -> Result<String, ExchangeError>;
}

/// Source of signing timestamps in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}
