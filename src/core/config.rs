use secrecy::Secret;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;

pub const DEFAULT_BASE_URL: &str = "https://fapi.binance.com";
pub const TESTNET_BASE_URL: &str = "https://testnet.binancefuture.com";

#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    pub api_key: Secret<String>,
    pub secret_key: Secret<String>,
    pub testnet: bool,
    pub base_url: Option<String>,
    /// Also send `X-MBX-APIKEY` on signed (TRADE / `USER_DATA`) requests.
    pub api_key_on_signed: bool,
}

// credentials are written as [REDACTED]
impl Serialize for ExchangeConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ExchangeConfig", 5)?;
        state.serialize_field("api_key", "[REDACTED]")?;
        state.serialize_field("secret_key", "[REDACTED]")?;
        state.serialize_field("testnet", &self.testnet)?;
        state.serialize_field("base_url", &self.base_url)?;
        state.serialize_field("api_key_on_signed", &self.api_key_on_signed)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for ExchangeConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ExchangeConfigHelper {
            api_key: String,
            secret_key: String,
            #[serde(default)]
            testnet: bool,
            #[serde(default)]
            base_url: Option<String>,
            #[serde(default)]
            api_key_on_signed: bool,
        }

        let helper = ExchangeConfigHelper::deserialize(deserializer)?;
        Ok(Self {
            api_key: Secret::new(helper.api_key),
            secret_key: Secret::new(helper.secret_key),
            testnet: helper.testnet,
            base_url: helper.base_url,
            api_key_on_signed: helper.api_key_on_signed,
        })
    }
}

impl ExchangeConfig {
    #[must_use]
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key: Secret::new(api_key),
            secret_key: Secret::new(secret_key),
            testnet: false,
            base_url: None,
            api_key_on_signed: false,
        }
    }

    /// Read credentials and endpoint selection from `{PREFIX}_*` variables.
    ///
    /// `{PREFIX}_API_KEY` and `{PREFIX}_SECRET_KEY` are required. `{PREFIX}_TESTNET`
    /// must be `true` or `false` when present. `{PREFIX}_BASE_URL` overrides both
    /// mainnet and testnet. The prefix is upper-cased first.
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        let prefix = prefix.to_uppercase();
        let var = |name: &str| format!("{}_{}", prefix, name);

        let required = |name: String| {
            env::var(&name).map_err(|_| ConfigError::MissingEnvironmentVariable(name))
        };
        let api_key = required(var("API_KEY"))?;
        let secret_key = required(var("SECRET_KEY"))?;

        let testnet_var = var("TESTNET");
        let testnet = match env::var(&testnet_var) {
            Ok(raw) => raw.parse::<bool>().map_err(|_| {
                ConfigError::InvalidConfiguration(format!(
                    "{} must be true or false, got '{}'",
                    testnet_var, raw
                ))
            })?,
            Err(_) => false,
        };

        Ok(Self {
            api_key: Secret::new(api_key),
            secret_key: Secret::new(secret_key),
            testnet,
            base_url: env::var(var("BASE_URL")).ok(),
            api_key_on_signed: false,
        })
    }

    /// [`ExchangeConfig::from_env`] after loading `./.env`.
    #[cfg(feature = "env-file")]
    pub fn from_env_file(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_env_file_with_path(prefix, ".env")
    }

    /// [`ExchangeConfig::from_env`] after loading `env_file_path`.
    ///
    /// Variables already set in the process win over the file. A missing file is not
    /// an error; a malformed one is.
    #[cfg(feature = "env-file")]
    pub fn from_env_file_with_path(prefix: &str, env_file_path: &str) -> Result<Self, ConfigError> {
        match dotenv::from_path(env_file_path) {
            Ok(()) => {}
            Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "Failed to load .env file '{}': {}",
                    env_file_path, e
                )));
            }
        }

        Self::from_env(prefix)
    }

    /// Use `TESTNET_BASE_URL` unless a base URL override is set.
    #[must_use]
    pub const fn testnet(mut self, testnet: bool) -> Self {
        self.testnet = testnet;
        self
    }

    #[must_use]
    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    #[must_use]
    pub const fn api_key_on_signed(mut self, enabled: bool) -> Self {
        self.api_key_on_signed = enabled;
        self
    }

    /// Base URL requests are resolved against: explicit override, then testnet, then mainnet.
    pub fn resolved_base_url(&self) -> &str {
        match (&self.base_url, self.testnet) {
            (Some(url), _) => url,
            (None, true) => TESTNET_BASE_URL,
            (None, false) => DEFAULT_BASE_URL,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
