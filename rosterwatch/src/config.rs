//! Watch configuration loaded from a JSON file.
//!
//! The file carries the service credential, the recipients to notify, and the
//! snapshot location:
//!
//! ```json
//! {
//!   "token": "0123456789abcdef",
//!   "notify": ["ops@example.com", "@oncall"],
//!   "statefile": "/var/lib/rosterwatch/state.json"
//! }
//! ```
//!
//! `api_url` and `request_timeout_secs` are optional. Unknown keys are
//! ignored.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::ports::RecipientId;
use crate::file_path::open_parent;

/// Configuration file read when no path is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Base URL of the hosted chat service API.
pub const DEFAULT_API_URL: &str = "https://api.hipchat.com/v2/";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors raised while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("couldn't read {path}: {source}")]
    Read {
        /// Configuration file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The file is not valid configuration JSON.
    #[error("couldn't understand configuration: {message}")]
    Parse {
        /// Decoder message.
        message: String,
    },
    /// A required string field is empty.
    #[error("configuration field '{field}' must not be blank")]
    BlankField {
        /// Offending field name.
        field: &'static str,
    },
    /// `api_url` is not an absolute HTTP(S) URL.
    #[error("invalid api_url '{value}': {message}")]
    InvalidApiUrl {
        /// Configured value.
        value: String,
        /// Why it was rejected.
        message: String,
    },
    /// `request_timeout_secs` is zero.
    #[error("request_timeout_secs must be greater than zero")]
    ZeroTimeout,
}

/// Chat service access token.
///
/// The value is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wrap a raw token.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw token for use in an authorization header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

/// Validated configuration passed by reference into each component.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    token: ApiToken,
    recipients: Vec<RecipientId>,
    statefile: PathBuf,
    api_url: Url,
    request_timeout: Duration,
}

impl WatchConfig {
    /// Parse configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the JSON is malformed, a required field
    /// is missing or blank, or an optional field holds an invalid value.
    ///
    /// # Examples
    ///
    /// ```
    /// use rosterwatch::config::WatchConfig;
    ///
    /// let config = WatchConfig::from_json(
    ///     r#"{"token": "t0k3n", "notify": ["ops"], "statefile": "state.json"}"#,
    /// )
    /// .expect("valid config");
    ///
    /// assert_eq!(config.recipients().len(), 1);
    /// assert_eq!(config.api_url().as_str(), "https://api.hipchat.com/v2/");
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawWatchConfig = serde_json::from_str(json).map_err(|err| ConfigError::Parse {
            message: err.to_string(),
        })?;
        Self::from_raw(raw)
    }

    /// Read and parse the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, otherwise
    /// the same errors as [`WatchConfig::from_json`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = read_config_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    fn from_raw(raw: RawWatchConfig) -> Result<Self, ConfigError> {
        if raw.token.trim().is_empty() {
            return Err(ConfigError::BlankField { field: "token" });
        }
        if raw.statefile.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(ConfigError::BlankField { field: "statefile" });
        }

        let api_url = parse_api_url(raw.api_url.as_deref().unwrap_or(DEFAULT_API_URL))?;
        let timeout_secs = raw
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self {
            token: ApiToken::new(raw.token),
            recipients: raw.notify.into_iter().map(RecipientId::new).collect(),
            statefile: raw.statefile,
            api_url,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Service access token.
    #[must_use]
    pub const fn token(&self) -> &ApiToken {
        &self.token
    }

    /// Recipients notified of every change, in configured order.
    #[must_use]
    pub fn recipients(&self) -> &[RecipientId] {
        &self.recipients
    }

    /// Location of the roster snapshot.
    #[must_use]
    pub fn statefile(&self) -> &Path {
        &self.statefile
    }

    /// API base URL, always ending in `/`.
    #[must_use]
    pub const fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Per-request timeout for remote calls.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

#[derive(Debug, Deserialize)]
struct RawWatchConfig {
    token: String,
    #[serde(default)]
    notify: Vec<String>,
    statefile: PathBuf,
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
}

fn parse_api_url(value: &str) -> Result<Url, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidApiUrl {
        value: value.to_owned(),
        message,
    };

    let mut url = Url::parse(value).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    // Endpoints are appended as path segments.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn read_config_file(path: &Path) -> io::Result<String> {
    let (dir, file_name) = open_parent(path)?;
    dir.read_to_string(file_name)
}
