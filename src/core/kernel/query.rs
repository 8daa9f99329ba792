use crate::core::errors::ExchangeError;
use serde::Serialize;
use std::collections::BTreeMap;
use url::form_urlencoded;

/// Multi-valued query parameters.
///
/// Keys are kept sorted so [`QueryParams::encode`] is canonical: pairs are emitted
/// ordered by key, and values of a repeated key keep their insertion order. This is
/// the byte string the signature is computed over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    inner: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize an option struct into parameters.
    ///
    /// Query names come from the struct's serde field names; fields skipped by
    /// `skip_serializing_if` are omitted entirely. Nested maps or sequences cannot be
    /// expressed as a query string and fail with [`ExchangeError::Serialization`].
    pub fn from_options<P>(options: Option<&P>) -> Result<Self, ExchangeError>
    where
        P: Serialize + ?Sized,
    {
        let Some(options) = options else {
            return Ok(Self::new());
        };

        let encoded = serde_urlencoded::to_string(options)?;
        let mut params = Self::new();
        for (key, value) in form_urlencoded::parse(encoded.as_bytes()) {
            params.add(key, value);
        }
        Ok(params)
    }

    /// Append a value, keeping any existing values for the key.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.entry(key.into()).or_default().push(value.into());
    }

    /// Replace all values for the key with a single value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), vec![value.into()]);
    }

    /// First value for the key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.inner.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |v| (key.as_str(), v.as_str())))
    }

    /// Form-urlencode the parameters, ordered by key.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}
