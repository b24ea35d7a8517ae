//! Per-account fetch.
//!
//! [`fetch_account`] runs the fixed call sequence for one account and always
//! returns an [`AccountResult`]. Failures are recovered at the smallest scope:
//!
//! | Step | On failure |
//! |---|---|
//! | account summary | `fetch_error`, stop |
//! | instance list | `fetch_error`, stop |
//! | instance IPs | skip that instance's IP entry, continue |
//! | invoice list | `invoice_error`, no `latest_invoice`, result otherwise complete |
//!
//! Every call shares one deadline, so the whole sequence is bounded.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::providers::{AccountApi, InstanceSummary, InvoiceSummary, ProviderError};

/// Default per-account deadline.
pub const DEFAULT_ACCOUNT_TIMEOUT: Duration = Duration::from_secs(30);

/// Why part of an account fetch failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No client could be built for the token.
    #[error("Error creating API client: {0}")]
    ClientSetup(String),

    /// Account summary call failed.
    #[error("Error fetching account info: {0}")]
    AccountInfo(String),

    /// Instance list call failed.
    #[error("Error fetching Linodes: {0}")]
    ResourceList(String),

    /// Invoice list call failed.
    #[error("Error fetching invoices: {0}")]
    InvoiceList(String),
}

impl FetchError {
    /// Machine-readable failure kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ClientSetup(_) => "client_setup",
            Self::AccountInfo(_) => "account_info",
            Self::ResourceList(_) => "resource_list",
            Self::InvoiceList(_) => "invoice_list",
        }
    }

    /// Underlying cause.
    #[must_use]
    pub fn cause(&self) -> &str {
        match self {
            Self::ClientSetup(cause)
            | Self::AccountInfo(cause)
            | Self::ResourceList(cause)
            | Self::InvoiceList(cause) => cause,
        }
    }
}

impl Serialize for FetchError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FetchError", 3)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("cause", self.cause())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Everything the dashboard shows for one account.
#[derive(Debug, Clone, Serialize)]
pub struct AccountResult {
    /// Display label.
    pub label: String,
    /// Amount accrued since the last invoice.
    pub unbilled_amount: f64,
    /// Instances, in API order.
    pub resources: Vec<InstanceSummary>,
    /// Flattened IP list per instance ID. Missing when that lookup failed.
    pub resource_ips: BTreeMap<u64, Vec<String>>,
    /// Most recent invoice.
    pub latest_invoice: Option<InvoiceSummary>,
    /// Account-level failure. When set, `resources` and `resource_ips` are empty.
    pub fetch_error: Option<FetchError>,
    /// Billing history failure. Never blanks the rest of the result.
    pub invoice_error: Option<FetchError>,
}

impl AccountResult {
    /// An empty result for `label`.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            unbilled_amount: 0.0,
            resources: Vec::new(),
            resource_ips: BTreeMap::new(),
            latest_invoice: None,
            fetch_error: None,
            invoice_error: None,
        }
    }

    /// A result carrying only an account-level failure.
    #[must_use]
    pub fn failed(label: impl Into<String>, error: FetchError) -> Self {
        Self {
            fetch_error: Some(error),
            ..Self::new(label)
        }
    }

    /// Total of the latest invoice, or zero.
    #[must_use]
    pub fn invoiced_amount(&self) -> f64 {
        self.latest_invoice.as_ref().map_or(0.0, |inv| inv.total)
    }
}

/// Run `fut` against the shared deadline.
async fn bounded<T, F>(deadline: Instant, budget: Duration, fut: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    timeout_at(deadline, fut)
        .await
        .unwrap_or_else(|_| Err(ProviderError::Timeout(budget.as_secs())))
}

/// Fetch all dashboard data for one account.
pub async fn fetch_account(api: &dyn AccountApi, label: &str, budget: Duration) -> AccountResult {
    let deadline = Instant::now() + budget;
    let mut result = AccountResult::new(label);

    let account = match bounded(deadline, budget, api.get_account()).await {
        Ok(account) => account,
        Err(e) => {
            let error = FetchError::AccountInfo(e.to_string());
            warn!(account = %label, error = %error, "Account fetch failed");
            result.fetch_error = Some(error);
            return result;
        }
    };
    result.unbilled_amount = account.balance_uninvoiced;

    let instances = match bounded(deadline, budget, api.list_instances()).await {
        Ok(instances) => instances,
        Err(e) => {
            let error = FetchError::ResourceList(e.to_string());
            warn!(account = %label, error = %error, "Account fetch failed");
            result.fetch_error = Some(error);
            return result;
        }
    };

    for instance in &instances {
        match bounded(deadline, budget, api.get_instance_ips(instance.id)).await {
            Ok(ips) => {
                result.resource_ips.insert(instance.id, ips.flatten());
            }
            Err(e) => {
                warn!(
                    account = %label,
                    instance_id = instance.id,
                    error = %e,
                    "Error fetching IPs for instance, skipping"
                );
            }
        }
    }
    result.resources = instances;

    match bounded(deadline, budget, api.list_invoices()).await {
        Ok(invoices) => {
            debug!(account = %label, count = invoices.len(), "Fetched invoices");
            result.latest_invoice = invoices.into_iter().next();
        }
        Err(e) => {
            let error = FetchError::InvoiceList(e.to_string());
            warn!(account = %label, error = %error, "Invoice fetch failed");
            result.invoice_error = Some(error);
        }
    }

    info!(
        account = %label,
        resources = result.resources.len(),
        "Account fetched"
    );
    result
}
