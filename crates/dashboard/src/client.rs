//! Account client factory.

use std::sync::Arc;

use crate::providers::linode::Linode;
use crate::providers::{AccountApi, ProviderError};

/// Builds an authenticated [`AccountApi`] bound to one token.
pub trait ClientFactory: Send + Sync {
    /// Build a client for `token`.
    ///
    /// # Errors
    /// Returns [`ProviderError::Config`] for an empty token.
    fn build(&self, token: &str) -> Result<Arc<dyn AccountApi>, ProviderError>;
}

/// Factory producing [`Linode`] clients.
#[derive(Debug, Clone, Default)]
pub struct LinodeClientFactory {
    base_url: Option<String>,
}

impl LinodeClientFactory {
    /// Factory targeting the public Linode API.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory targeting a custom API root.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
        }
    }
}

impl ClientFactory for LinodeClientFactory {
    fn build(&self, token: &str) -> Result<Arc<dyn AccountApi>, ProviderError> {
        let client = match &self.base_url {
            Some(url) => Linode::with_base_url(token, url.as_str())?,
            None => Linode::new(token)?,
        };
        Ok(Arc::new(client))
    }
}
