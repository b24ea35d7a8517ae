//! Credential discovery.
//!
//! Accounts are configured as indexed pairs:
//!
//! ```text
//! LINODE_TOKEN_1=...           # API token
//! LINODE_ACCOUNT_1_NAME=Prod   # optional display name
//! ```
//!
//! A [`CredentialSource`] yields the raw pairs; [`discover`] applies the
//! skip/default/order policy and produces [`CredentialEntry`] values.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{debug, warn};

/// Default prefix for token keys.
pub const DEFAULT_TOKEN_PREFIX: &str = "LINODE_TOKEN_";

/// Default prefix for display-name keys (`<prefix><suffix>_NAME`).
pub const DEFAULT_NAME_PREFIX: &str = "LINODE_ACCOUNT_";

/// Raw credential pair yielded by a source.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
    /// Correlation suffix shared by the token and name keys.
    pub suffix: String,
    /// API token, possibly empty.
    pub token: String,
    /// Display name, if configured.
    pub name: Option<String>,
}

impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("suffix", &self.suffix)
            .field("token", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

/// One account to aggregate.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialEntry {
    /// Display label.
    pub label: String,
    /// API token.
    pub token: String,
}

impl std::fmt::Debug for CredentialEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialEntry")
            .field("label", &self.label)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Source of credential pairs.
pub trait CredentialSource: Send + Sync {
    /// List every configured credential pair.
    fn list_credential_pairs(&self) -> Vec<CredentialPair>;
}

/// Credential source over a snapshot of key/value variables.
#[derive(Debug, Clone)]
pub struct VarsSource {
    vars: HashMap<String, String>,
    token_prefix: String,
    name_prefix: String,
}

impl VarsSource {
    /// Snapshot the current process environment.
    ///
    /// Variables whose key or value is not valid UTF-8 are skipped and logged.
    #[must_use]
    pub fn from_env() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => Some((key, value)),
                (Ok(key), Err(_)) => {
                    if key.starts_with(DEFAULT_TOKEN_PREFIX) {
                        warn!(key = %key, "Skipping variable with non UTF-8 value");
                    }
                    None
                }
                (Err(key), _) => {
                    debug!(key = ?key, "Skipping variable with non UTF-8 key");
                    None
                }
            })
            .collect();

        Self::new(vars)
    }

    /// Build a source from in-memory pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    fn new(vars: HashMap<String, String>) -> Self {
        Self {
            vars,
            token_prefix: DEFAULT_TOKEN_PREFIX.to_string(),
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
        }
    }

    /// Override the key prefixes.
    #[must_use]
    pub fn with_prefixes(
        mut self,
        token_prefix: impl Into<String>,
        name_prefix: impl Into<String>,
    ) -> Self {
        self.token_prefix = token_prefix.into();
        self.name_prefix = name_prefix.into();
        self
    }

    fn name_key(&self, suffix: &str) -> String {
        format!("{}{suffix}_NAME", self.name_prefix)
    }
}

impl CredentialSource for VarsSource {
    fn list_credential_pairs(&self) -> Vec<CredentialPair> {
        self.vars
            .iter()
            .filter_map(|(key, token)| {
                let suffix = key.strip_prefix(&self.token_prefix)?;
                if suffix.is_empty() {
                    warn!(key = %key, "Skipping token variable without account suffix");
                    return None;
                }

                Some(CredentialPair {
                    suffix: suffix.to_string(),
                    token: token.clone(),
                    name: self.vars.get(&self.name_key(suffix)).cloned(),
                })
            })
            .collect()
    }
}

/// Reads the process environment afresh on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn list_credential_pairs(&self) -> Vec<CredentialPair> {
        VarsSource::from_env().list_credential_pairs()
    }
}

/// Order suffixes numerically when both parse, numbers before text otherwise.
fn compare_suffix(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Discover the accounts to aggregate.
///
/// Empty tokens are skipped. A missing or blank display name defaults to
/// `"Account <suffix>"`. Labels are not de-duplicated.
pub fn discover(source: &dyn CredentialSource) -> Vec<CredentialEntry> {
    let mut pairs = source.list_credential_pairs();
    pairs.sort_by(|a, b| compare_suffix(&a.suffix, &b.suffix));

    pairs
        .into_iter()
        .filter_map(|pair| {
            if pair.token.trim().is_empty() {
                warn!(suffix = %pair.suffix, "Empty token for account, skipping");
                return None;
            }

            let label = pair
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| format!("Account {}", pair.suffix));

            Some(CredentialEntry {
                label,
                token: pair.token,
            })
        })
        .collect()
}
