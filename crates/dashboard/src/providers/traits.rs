//! Account API trait and common types for cloud billing providers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Operation did not finish before the account deadline.
    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Account-level billing summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    /// Amount accrued since the last finalized invoice.
    pub balance_uninvoiced: f64,
}

/// A provisioned compute instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceSummary {
    /// Instance ID.
    pub id: u64,
    /// Instance label.
    pub label: String,
    /// Status as reported by the API (e.g. "running").
    pub status: String,
    /// Region slug.
    pub region: String,
    /// Plan/type slug.
    pub instance_type: String,
    /// IPv4 addresses listed on the instance itself.
    pub ipv4: Vec<String>,
}

/// A single IPv4 address assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpAddress {
    pub address: String,
}

/// A routed IPv6 range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv6Range {
    pub range: String,
    pub prefix: u8,
}

/// IP detail for one instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceIps {
    /// Public IPv4 addresses.
    pub public_v4: Vec<IpAddress>,
    /// Private IPv4 addresses.
    pub private_v4: Vec<IpAddress>,
    /// Global IPv6 ranges.
    pub global_v6: Vec<Ipv6Range>,
}

impl InstanceIps {
    /// Flatten into one list: public IPv4, then private IPv4, then IPv6 ranges.
    #[must_use]
    pub fn flatten(&self) -> Vec<String> {
        self.public_v4
            .iter()
            .chain(&self.private_v4)
            .map(|ip| ip.address.clone())
            .chain(self.global_v6.iter().map(|r| r.range.clone()))
            .collect()
    }
}

/// A finalized invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    /// Invoice ID.
    pub id: u64,
    /// Invoice date as reported by the API.
    pub date: String,
    /// Invoice label.
    pub label: String,
    /// Invoice total.
    pub total: f64,
}

/// Read-only view of one provider account.
///
/// Implementations are bound to a single API token.
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// Fetch the account summary (balances).
    async fn get_account(&self) -> Result<AccountSummary, ProviderError>;

    /// List all instances in the account.
    async fn list_instances(&self) -> Result<Vec<InstanceSummary>, ProviderError>;

    /// Fetch IP detail for one instance.
    async fn get_instance_ips(&self, id: u64) -> Result<InstanceIps, ProviderError>;

    /// List invoices, most recent first.
    async fn list_invoices(&self) -> Result<Vec<InvoiceSummary>, ProviderError>;
}
