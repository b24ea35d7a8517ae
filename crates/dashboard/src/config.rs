//! Process configuration.
//!
//! Loaded once at startup and shared read-only afterwards. Per-account
//! credentials are not part of this struct; they are discovered on every
//! aggregation pass (see [`crate::discovery`]).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::aggregate::DEFAULT_CONCURRENCY;
use crate::auth::{Authenticator, SessionCipher, SessionMode, KEY_LEN};

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";

/// Default per-account deadline in seconds.
pub const DEFAULT_ACCOUNT_TIMEOUT_SECS: u64 = 30;

/// Default static asset directory.
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Dashboard configuration.
#[derive(Clone)]
pub struct Config {
    /// 32-byte session encryption key.
    pub encryption_key: Vec<u8>,
    /// Login passcode.
    pub passcode: String,
    /// Listen port.
    pub port: u16,
    /// Bind address.
    pub bind_addr: String,
    /// Deadline for one account's call sequence.
    pub account_timeout: Duration,
    /// Accounts fetched in parallel.
    pub fetch_concurrency: usize,
    /// Session gate behaviour.
    pub session_mode: SessionMode,
    /// Directory served under `/static/`.
    pub static_dir: PathBuf,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("encryption_key", &"<redacted>")
            .field("passcode", &"<redacted>")
            .field("port", &self.port)
            .field("bind_addr", &self.bind_addr)
            .field("account_timeout", &self.account_timeout)
            .field("fetch_concurrency", &self.fetch_concurrency)
            .field("session_mode", &self.session_mode)
            .field("static_dir", &self.static_dir)
            .finish()
    }
}

impl Config {
    /// Create configuration from environment variables.
    ///
    /// # Required Environment Variables
    /// - `ENCRYPTION_KEY`: exactly 32 bytes
    /// - `PASSCODE`: login passcode
    ///
    /// # Optional Environment Variables
    /// - `PORT` (default: 8080)
    /// - `BIND_ADDR` (default: 0.0.0.0)
    /// - `ACCOUNT_TIMEOUT_SECS` (default: 30)
    /// - `FETCH_CONCURRENCY` (default: 4)
    /// - `SESSION_VERIFY`: `true` to re-check the sealed cookie (default: false)
    /// - `STATIC_DIR` (default: static)
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or malformed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// # Errors
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let encryption_key = lookup("ENCRYPTION_KEY")
            .context("ENCRYPTION_KEY environment variable not set")?
            .into_bytes();
        if encryption_key.len() != KEY_LEN {
            bail!(
                "ENCRYPTION_KEY must be {KEY_LEN} bytes long, got {}",
                encryption_key.len()
            );
        }

        let passcode = lookup("PASSCODE").context("PASSCODE environment variable not set")?;
        if passcode.is_empty() {
            bail!("PASSCODE must not be empty");
        }

        let port = match lookup("PORT").filter(|v| !v.is_empty()) {
            Some(v) => v.parse().with_context(|| format!("Invalid PORT: {v}"))?,
            None => DEFAULT_PORT,
        };

        let bind_addr = lookup("BIND_ADDR")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let account_timeout = match lookup("ACCOUNT_TIMEOUT_SECS").filter(|v| !v.is_empty()) {
            Some(v) => v
                .parse()
                .with_context(|| format!("Invalid ACCOUNT_TIMEOUT_SECS: {v}"))?,
            None => DEFAULT_ACCOUNT_TIMEOUT_SECS,
        };
        if account_timeout == 0 {
            bail!("ACCOUNT_TIMEOUT_SECS must be at least 1");
        }

        let fetch_concurrency: usize = match lookup("FETCH_CONCURRENCY").filter(|v| !v.is_empty())
        {
            Some(v) => v
                .parse()
                .with_context(|| format!("Invalid FETCH_CONCURRENCY: {v}"))?,
            None => DEFAULT_CONCURRENCY,
        };
        let fetch_concurrency = fetch_concurrency.max(1);

        let session_mode = match lookup("SESSION_VERIFY").as_deref() {
            Some("1" | "true" | "TRUE" | "yes") => SessionMode::Verify,
            _ => SessionMode::PresenceOnly,
        };

        let static_dir = lookup("STATIC_DIR")
            .filter(|v| !v.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR), PathBuf::from);

        Ok(Self {
            encryption_key,
            passcode,
            port,
            bind_addr,
            account_timeout: Duration::from_secs(account_timeout),
            fetch_concurrency,
            session_mode,
            static_dir,
        })
    }

    /// Socket address string to bind.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Build the authenticator from the key and passcode.
    ///
    /// # Errors
    /// Returns an error if the key is rejected by the cipher.
    pub fn authenticator(&self) -> Result<Authenticator> {
        let cipher =
            SessionCipher::new(&self.encryption_key).context("Invalid ENCRYPTION_KEY")?;
        Ok(Authenticator::new(
            self.passcode.clone(),
            cipher,
            self.session_mode,
        ))
    }
}
