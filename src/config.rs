//! Signing secrets, token lifetimes, and server settings.
//!
//! Configuration is read once at startup into immutable values that are
//! handed to each component at construction. Environment variables are read
//! through `figment`; every key has a development default except the
//! optional break-glass master secret.

use crate::telemetry::LogFormat;
use figment::{Figment, providers::Env};
use secrecy::{ExposeSecret, SecretString};
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Development default for `JWT_AT_SECRET`.
pub const DEFAULT_ACCESS_SECRET: &str = "at_secret_dev";
/// Development default for `JWT_RT_SECRET`.
pub const DEFAULT_REFRESH_SECRET: &str = "rt_secret_dev";
/// Default for `JWT_AT_EXPIRES_IN`.
pub const DEFAULT_ACCESS_TTL: &str = "10m";
/// Default for `JWT_RT_EXPIRES_IN`.
pub const DEFAULT_REFRESH_TTL: &str = "7d";
/// Shortest accepted `MASTER_PASSWORD`.
pub const MIN_MASTER_PASSWORD_LENGTH: usize = 32;
/// Default listen host.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default listen port.
pub const DEFAULT_PORT: u16 = 5555;
/// Default browser origin allowed to call the API with credentials.
pub const DEFAULT_FRONTEND_BASE_URL: &str = "http://localhost:3000";

const AUTH_KEYS: [&str; 7] = [
    "JWT_AT_SECRET",
    "JWT_RT_SECRET",
    "JWT_AT_EXPIRES_IN",
    "JWT_RT_EXPIRES_IN",
    "MASTER_PASSWORD",
    "COOKIE_SECRET",
    "AUTH_COOKIE_SECURE",
];

const SERVER_KEYS: [&str; 5] = [
    "HOST",
    "PORT",
    "DATABASE_URL",
    "LOG_FORMAT",
    "FRONTEND_BASE_URL",
];

/// Errors raised while loading configuration. All are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A TTL value does not follow the `<amount><unit>` grammar.
    #[error("invalid TTL '{value}' for {key}: {source}")]
    InvalidTtl {
        /// Configuration key holding the value.
        key: &'static str,
        /// Rejected raw value.
        value: String,
        /// Parse failure.
        source: TtlParseError,
    },

    /// The configured master secret is too short to be accepted.
    #[error("MASTER_PASSWORD must be at least {min} characters long")]
    MasterPasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },

    /// Access and refresh tokens would be signed with the same secret.
    #[error("JWT_AT_SECRET and JWT_RT_SECRET must differ")]
    SharedSigningSecret,

    /// The configuration source could not be read or deserialized.
    #[error("failed to read configuration: {0}")]
    Source(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Source(Box::new(err))
    }
}

/// Reasons a TTL string is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TtlParseError {
    /// No numeric amount precedes the unit.
    #[error("missing amount")]
    MissingAmount,
    /// No unit suffix follows the amount.
    #[error("missing unit, expected one of s, m, h, d, w")]
    MissingUnit,
    /// The suffix is not a recognized unit.
    #[error("unknown unit, expected one of s, m, h, d, w")]
    UnknownUnit,
    /// The amount is zero.
    #[error("amount must be positive")]
    Zero,
    /// The amount does not fit in the supported range.
    #[error("amount is out of range")]
    OutOfRange,
}

/// Parses a TTL such as `10m` or `7d` into a duration.
///
/// Units are `s`, `m`, `h`, `d`, and `w`. The amount must be a positive
/// integer.
///
/// # Errors
///
/// Returns [`TtlParseError`] when the value does not follow the grammar.
pub fn parse_ttl(value: &str) -> Result<Duration, TtlParseError> {
    let trimmed = value.trim();
    let unit_start = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .ok_or(TtlParseError::MissingUnit)?;
    let (digits, unit) = trimmed.split_at(unit_start);
    if digits.is_empty() {
        return Err(TtlParseError::MissingAmount);
    }
    let amount: u64 = digits.parse().map_err(|_| TtlParseError::OutOfRange)?;
    if amount == 0 {
        return Err(TtlParseError::Zero);
    }
    let unit_seconds: u64 = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        "w" => 7 * 24 * 60 * 60,
        _ => return Err(TtlParseError::UnknownUnit),
    };
    let seconds = amount
        .checked_mul(unit_seconds)
        .filter(|secs| i64::try_from(*secs).is_ok())
        .ok_or(TtlParseError::OutOfRange)?;
    Ok(Duration::from_secs(seconds))
}

/// Signing secret and lifetime for one token kind.
#[derive(Debug)]
pub struct TokenPolicy {
    secret: SecretString,
    ttl: Duration,
}

impl TokenPolicy {
    /// Creates a token policy.
    #[must_use]
    pub const fn new(secret: SecretString, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    /// Returns the signing secret.
    #[must_use]
    pub const fn secret(&self) -> &SecretString {
        &self.secret
    }

    /// Returns the token lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Immutable authentication configuration.
#[derive(Debug)]
pub struct AuthConfig {
    access: TokenPolicy,
    refresh: TokenPolicy,
    master_password: Option<SecretString>,
    cookie_secret: Option<SecretString>,
    secure_cookie: bool,
}

impl AuthConfig {
    /// Creates a configuration from explicit token policies.
    ///
    /// The master secret and cookie secret start disabled.
    #[must_use]
    pub const fn new(access: TokenPolicy, refresh: TokenPolicy) -> Self {
        Self {
            access,
            refresh,
            master_password: None,
            cookie_secret: None,
            secure_cookie: false,
        }
    }

    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_figment(&Figment::new().merge(Env::raw().only(&AUTH_KEYS)))
    }

    /// Loads configuration from an arbitrary figment.
    ///
    /// Keys are the lowercase forms of the environment variable names, for
    /// example `jwt_at_expires_in`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is malformed or both token
    /// kinds share a signing secret.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let raw: RawAuthSettings = figment.extract()?;
        if raw.jwt_at_secret == raw.jwt_rt_secret {
            return Err(ConfigError::SharedSigningSecret);
        }
        let access_ttl = ttl_for("JWT_AT_EXPIRES_IN", &raw.jwt_at_expires_in)?;
        let refresh_ttl = ttl_for("JWT_RT_EXPIRES_IN", &raw.jwt_rt_expires_in)?;

        let mut config = Self::new(
            TokenPolicy::new(SecretString::from(raw.jwt_at_secret), access_ttl),
            TokenPolicy::new(SecretString::from(raw.jwt_rt_secret), refresh_ttl),
        )
        .with_secure_cookie(raw.auth_cookie_secure);
        if let Some(master) = raw.master_password {
            config = config.with_master_password(SecretString::from(master))?;
        }
        if let Some(cookie_secret) = raw.cookie_secret {
            config = config.with_cookie_secret(SecretString::from(cookie_secret));
        }
        Ok(config)
    }

    /// Enables the break-glass master secret.
    ///
    /// While enabled, a login presenting this secret succeeds for any
    /// existing username regardless of its stored hash. Leave it unset in
    /// normal operation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MasterPasswordTooShort`] when the secret is
    /// shorter than [`MIN_MASTER_PASSWORD_LENGTH`] characters.
    pub fn with_master_password(mut self, secret: SecretString) -> Result<Self, ConfigError> {
        if secret.expose_secret().chars().count() < MIN_MASTER_PASSWORD_LENGTH {
            return Err(ConfigError::MasterPasswordTooShort {
                min: MIN_MASTER_PASSWORD_LENGTH,
            });
        }
        self.master_password = Some(secret);
        Ok(self)
    }

    /// Sets the secret used to verify signed refresh cookies.
    #[must_use]
    pub fn with_cookie_secret(mut self, secret: SecretString) -> Self {
        self.cookie_secret = Some(secret);
        self
    }

    /// Marks the refresh cookie `Secure`.
    #[must_use]
    pub const fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.secure_cookie = secure;
        self
    }

    /// Returns the access-token policy.
    #[must_use]
    pub const fn access(&self) -> &TokenPolicy {
        &self.access
    }

    /// Returns the refresh-token policy.
    #[must_use]
    pub const fn refresh(&self) -> &TokenPolicy {
        &self.refresh
    }

    /// Returns the break-glass master secret, if enabled.
    #[must_use]
    pub const fn master_password(&self) -> Option<&SecretString> {
        self.master_password.as_ref()
    }

    /// Returns the signed-cookie secret, if configured.
    #[must_use]
    pub const fn cookie_secret(&self) -> Option<&SecretString> {
        self.cookie_secret.as_ref()
    }

    /// Returns whether the refresh cookie carries the `Secure` attribute.
    #[must_use]
    pub const fn secure_cookie(&self) -> bool {
        self.secure_cookie
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new(
            TokenPolicy::new(
                SecretString::from(DEFAULT_ACCESS_SECRET),
                Duration::from_secs(10 * 60),
            ),
            TokenPolicy::new(
                SecretString::from(DEFAULT_REFRESH_SECRET),
                Duration::from_secs(7 * 24 * 60 * 60),
            ),
        )
    }
}

/// Listener, persistence, and logging settings for the server binary.
#[derive(Debug)]
pub struct ServerConfig {
    host: String,
    port: u16,
    database_url: Option<SecretString>,
    log_format: LogFormat,
    frontend_base_url: String,
}

impl ServerConfig {
    /// Loads server settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Source`] when a value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_figment(&Figment::new().merge(Env::raw().only(&SERVER_KEYS)))
    }

    /// Loads server settings from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Source`] when a value is malformed.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let raw: RawServerSettings = figment.extract()?;
        Ok(Self {
            host: raw.host,
            port: raw.port,
            database_url: raw.database_url.map(SecretString::from),
            log_format: raw.log_format,
            frontend_base_url: raw.frontend_base_url,
        })
    }

    /// Returns the `host:port` listen address.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the `PostgreSQL` connection URL, if configured.
    #[must_use]
    pub const fn database_url(&self) -> Option<&SecretString> {
        self.database_url.as_ref()
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the browser origin allowed to make credentialed requests.
    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }
}

fn ttl_for(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    parse_ttl(value).map_err(|source| ConfigError::InvalidTtl {
        key,
        value: value.to_owned(),
        source,
    })
}

#[derive(Debug, Deserialize)]
struct RawAuthSettings {
    #[serde(default = "default_access_secret", deserialize_with = "scalar_string")]
    jwt_at_secret: String,
    #[serde(default = "default_refresh_secret", deserialize_with = "scalar_string")]
    jwt_rt_secret: String,
    #[serde(default = "default_access_ttl", deserialize_with = "scalar_string")]
    jwt_at_expires_in: String,
    #[serde(default = "default_refresh_ttl", deserialize_with = "scalar_string")]
    jwt_rt_expires_in: String,
    #[serde(default, deserialize_with = "optional_scalar_string")]
    master_password: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar_string")]
    cookie_secret: Option<String>,
    #[serde(default)]
    auth_cookie_secure: bool,
}

#[derive(Debug, Deserialize)]
struct RawServerSettings {
    #[serde(default = "default_host", deserialize_with = "scalar_string")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default, deserialize_with = "optional_scalar_string")]
    database_url: Option<String>,
    #[serde(default)]
    log_format: LogFormat,
    #[serde(default = "default_frontend_base_url", deserialize_with = "scalar_string")]
    frontend_base_url: String,
}

fn default_access_secret() -> String {
    DEFAULT_ACCESS_SECRET.to_owned()
}

fn default_refresh_secret() -> String {
    DEFAULT_REFRESH_SECRET.to_owned()
}

fn default_access_ttl() -> String {
    DEFAULT_ACCESS_TTL.to_owned()
}

fn default_refresh_ttl() -> String {
    DEFAULT_REFRESH_TTL.to_owned()
}

fn default_host() -> String {
    DEFAULT_HOST.to_owned()
}

fn default_frontend_base_url() -> String {
    DEFAULT_FRONTEND_BASE_URL.to_owned()
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Accepts a string, or a scalar that the environment provider parsed
/// eagerly (an all-digit secret arrives as a number).
struct ScalarString;

impl Visitor<'_> for ScalarString {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(value.to_owned())
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(value)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }
}

fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    deserializer.deserialize_any(ScalarString)
}

fn optional_scalar_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    deserializer.deserialize_any(ScalarString).map(Some)
}
