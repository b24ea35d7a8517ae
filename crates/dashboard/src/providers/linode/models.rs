//! Linode API v4 request and response models.

use serde::Deserialize;

// ============================================================================
// Pagination
// ============================================================================

/// Paginated list envelope used by every Linode list endpoint.
#[derive(Debug, Deserialize)]
pub struct Paginated<T> {
    /// Items on this page.
    pub data: Vec<T>,
    /// Current page (1-based).
    pub page: u32,
    /// Total number of pages.
    pub pages: u32,
}

/// Error body returned by the API on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorEntry>,
}

/// A single error reason.
#[derive(Debug, Deserialize)]
pub struct ErrorEntry {
    pub reason: String,
    #[serde(default)]
    pub field: Option<String>,
}

impl ErrorResponse {
    /// Join all reasons into one message.
    #[must_use]
    pub fn message(&self) -> String {
        self.errors
            .iter()
            .map(|e| match &e.field {
                Some(field) => format!("{field}: {}", e.reason),
                None => e.reason.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ============================================================================
// Account
// ============================================================================

/// `GET /account` response (fields used by the dashboard).
#[derive(Debug, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub balance_uninvoiced: f64,
}

// ============================================================================
// Instances
// ============================================================================

/// Linode instance from `GET /linode/instances`.
#[derive(Debug, Clone, Deserialize)]
pub struct Instance {
    pub id: u64,
    pub label: String,
    /// "running", "offline", "booting", "provisioning", etc.
    pub status: String,
    pub region: String,
    /// Plan slug, e.g. "g6-standard-2". Null while a plan migration runs.
    #[serde(rename = "type", default)]
    pub instance_type: Option<String>,
    #[serde(default)]
    pub ipv4: Vec<String>,
}

/// `GET /linode/instances/{id}/ips` response.
#[derive(Debug, Deserialize)]
pub struct InstanceIpAddresses {
    #[serde(default)]
    pub ipv4: Option<Ipv4Groups>,
    #[serde(default)]
    pub ipv6: Option<Ipv6Groups>,
}

/// IPv4 groups on an instance.
#[derive(Debug, Default, Deserialize)]
pub struct Ipv4Groups {
    #[serde(default)]
    pub public: Vec<IpAddressEntry>,
    #[serde(default)]
    pub private: Vec<IpAddressEntry>,
}

/// One IPv4 address record.
#[derive(Debug, Deserialize)]
pub struct IpAddressEntry {
    pub address: String,
}

/// IPv6 groups on an instance.
#[derive(Debug, Default, Deserialize)]
pub struct Ipv6Groups {
    #[serde(default)]
    pub global: Vec<Ipv6RangeEntry>,
}

/// Routed IPv6 range.
#[derive(Debug, Deserialize)]
pub struct Ipv6RangeEntry {
    pub range: String,
    #[serde(default)]
    pub prefix: u8,
}

// ============================================================================
// Invoices
// ============================================================================

/// Invoice from `GET /account/invoices`.
#[derive(Debug, Clone, Deserialize)]
pub struct Invoice {
    pub id: u64,
    pub date: String,
    #[serde(default)]
    pub label: String,
    pub total: f64,
}
