//! Service configuration.
//!
//! Provides [`BucketViewConfig`], loaded from environment variables via
//! [`BucketViewConfig::from_env`].

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default listen address.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No bucket was configured.
    #[error("no bucket configured: set BUCKETVIEW_BUCKET or pass the bucket name as an argument")]
    MissingBucket,

    /// The listen address is empty.
    #[error("listen address is empty")]
    EmptyListen,
}

/// BucketView configuration.
///
/// # Examples
///
/// ```
/// use bucketview_core::config::BucketViewConfig;
///
/// let config = BucketViewConfig::builder().bucket("assets".into()).build();
/// assert_eq!(config.listen, "0.0.0.0:8080");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct BucketViewConfig {
    /// Bucket to serve.
    #[builder(default)]
    pub bucket: String,

    /// `[address:]port` to listen on.
    #[builder(default = String::from(DEFAULT_LISTEN))]
    pub listen: String,

    /// AWS region; `None` or `"default"` uses the SDK provider chain.
    #[builder(default)]
    pub region: Option<String>,

    /// Endpoint override for S3-compatible stores.
    #[builder(default)]
    pub endpoint_url: Option<String>,

    /// Use path-style bucket addressing.
    #[builder(default = false)]
    pub force_path_style: bool,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Log output format, `"json"` or `"pretty"`.
    #[builder(default = String::from("json"))]
    pub log_format: String,
}

impl Default for BucketViewConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            listen: String::from(DEFAULT_LISTEN),
            region: None,
            endpoint_url: None,
            force_path_style: false,
            log_level: String::from("info"),
            log_format: String::from("json"),
        }
    }
}

impl BucketViewConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `BUCKETVIEW_BUCKET` | *(empty)* |
    /// | `BUCKETVIEW_LISTEN` | `0.0.0.0:8080` |
    /// | `BUCKETVIEW_REGION`, then `AWS_DEFAULT_REGION` | *(unset)* |
    /// | `BUCKETVIEW_ENDPOINT_URL` | *(unset)* |
    /// | `BUCKETVIEW_FORCE_PATH_STYLE` | `false` |
    /// | `LOG_LEVEL` | `info` |
    /// | `LOG_FORMAT` | `json` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("BUCKETVIEW_BUCKET") {
            config.bucket = v;
        }
        if let Some(v) = lookup("BUCKETVIEW_LISTEN") {
            config.listen = v;
        }
        config.region = lookup("BUCKETVIEW_REGION")
            .or_else(|| lookup("AWS_DEFAULT_REGION"))
            .filter(|v| !v.is_empty());
        config.endpoint_url = lookup("BUCKETVIEW_ENDPOINT_URL").filter(|v| !v.is_empty());
        if let Some(v) = lookup("BUCKETVIEW_FORCE_PATH_STYLE") {
            config.force_path_style = parse_bool(&v);
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("LOG_FORMAT") {
            config.log_format = v;
        }

        config
    }

    /// Check that the configuration can be served.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::MissingBucket);
        }
        if self.listen.trim().is_empty() {
            return Err(ConfigError::EmptyListen);
        }
        Ok(())
    }

    /// The socket address to bind; a bare port binds all interfaces.
    ///
    /// ```
    /// use bucketview_core::config::BucketViewConfig;
    ///
    /// let config = BucketViewConfig::builder().listen("9000".into()).build();
    /// assert_eq!(config.listen_addr(), "0.0.0.0:9000");
    /// ```
    #[must_use]
    pub fn listen_addr(&self) -> String {
        let listen = self.listen.trim();
        if let Some(port) = listen.strip_prefix(':') {
            format!("0.0.0.0:{port}")
        } else if listen.contains(':') {
            listen.to_owned()
        } else {
            format!("0.0.0.0:{listen}")
        }
    }

    /// The region to pin, if any. `"default"` defers to the SDK.
    #[must_use]
    pub fn effective_region(&self) -> Option<&str> {
        self.region.as_deref().filter(|r| *r != "default")
    }

    /// Whether pretty (human-readable) log output was requested.
    #[must_use]
    pub fn pretty_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("pretty")
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
