use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Deployment target, each with its own default API endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Default API base URL for this environment.
    #[must_use]
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Development => "http://localhost:8080/api/",
            Self::Production => "https://jmwnt32jgw.us-east-1.awsapprunner.com/api/",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Development),
            "prod" | "production" => Ok(Self::Production),
            other => Err(Error::Config(format!("unknown environment: {other}"))),
        }
    }
}

/// Durable storage key names.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct StorageKeys {
    pub access_token: String,
    pub refresh_token: String,
    pub current_user: String,
    pub device_id: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            access_token: "bank_auth_token".into(),
            refresh_token: "bank_refresh_token".into(),
            current_user: "currentUser".into(),
            device_id: "deviceId".into(),
        }
    }
}

/// Client configuration.
///
/// The base URL is the only required field. Everything else has a default
/// and can be overridden with `with_*` methods.
///
/// ```rust,ignore
/// use mbank_client::ClientConfig;
///
/// let config = ClientConfig::new("https://api.example.com/api".parse()?)
///     .with_timeout(std::time::Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ClientConfig {
    pub(crate) base_url: Url,
    pub(crate) timeout: Duration,
    pub(crate) storage_keys: StorageKeys,
}

impl ClientConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a configuration rooted at `base_url`.
    ///
    /// A trailing `/` is added when missing so relative endpoint paths are
    /// joined under the base path instead of replacing its last segment.
    #[must_use]
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            base_url,
            timeout: Self::DEFAULT_TIMEOUT,
            storage_keys: StorageKeys::default(),
        }
    }

    /// Configuration with the default endpoint of `env`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the built-in URL fails to parse.
    pub fn for_environment(env: Environment) -> Result<Self, Error> {
        let url: Url = env
            .default_base_url()
            .parse()
            .map_err(|e| Error::Config(format!("default base URL: {e}")))?;
        Ok(Self::new(url))
    }

    /// Create config from environment variables.
    ///
    /// # Optional env vars
    /// - `MBANK_ENV`: `development` (default) or `production`; picks the default base URL
    /// - `MBANK_API_URL`: Override the API base URL
    /// - `MBANK_TIMEOUT_SECS`: Overall request deadline in seconds
    /// - `MBANK_TOKEN_KEY`: Storage key for the access token
    /// - `MBANK_REFRESH_TOKEN_KEY`: Storage key for the refresh token
    /// - `MBANK_USER_KEY`: Storage key for the signed-in user
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is set but invalid.
    pub fn from_env() -> Result<Self, Error> {
        let env = match std::env::var("MBANK_ENV") {
            Ok(v) => v.parse()?,
            Err(_) => Environment::default(),
        };

        let mut config = match std::env::var("MBANK_API_URL") {
            Ok(url_str) => {
                let url: Url = url_str
                    .parse()
                    .map_err(|e| Error::Config(format!("MBANK_API_URL: {e}")))?;
                Self::new(url)
            }
            Err(_) => Self::for_environment(env)?,
        };

        if let Ok(secs) = std::env::var("MBANK_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("MBANK_TIMEOUT_SECS: {e}")))?;
            if secs == 0 {
                return Err(Error::Config("MBANK_TIMEOUT_SECS must be positive".into()));
            }
            config = config.with_timeout(Duration::from_secs(secs));
        }

        let mut keys = StorageKeys::default();
        if let Some(key) = non_empty_var("MBANK_TOKEN_KEY") {
            keys.access_token = key;
        }
        if let Some(key) = non_empty_var("MBANK_REFRESH_TOKEN_KEY") {
            keys.refresh_token = key;
        }
        if let Some(key) = non_empty_var("MBANK_USER_KEY") {
            keys.current_user = key;
        }

        Ok(config.with_storage_keys(keys))
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_storage_keys(mut self, keys: StorageKeys) -> Self {
        self.storage_keys = keys;
        self
    }

    /// API base URL, always ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Overall per-request deadline.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn storage_keys(&self) -> &StorageKeys {
        &self.storage_keys
    }

    /// Resolves an endpoint path (no leading `/`) against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::Config(format!("endpoint {path}: {e}")))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
