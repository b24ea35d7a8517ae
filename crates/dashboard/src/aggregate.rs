//! Multi-account aggregation.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};

use crate::client::ClientFactory;
use crate::discovery::CredentialEntry;
use crate::fetcher::{fetch_account, AccountResult, FetchError, DEFAULT_ACCOUNT_TIMEOUT};

/// Default number of accounts fetched in parallel.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Data handed to the dashboard template.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardAggregate {
    /// One result per discovered credential, in discovery order.
    pub accounts: Vec<AccountResult>,
    /// Number of instances across all accounts.
    pub total_resources: usize,
    /// Sum of each account's latest invoice total.
    pub total_invoiced: f64,
    /// Sum of each account's uninvoiced balance.
    pub total_unbilled: f64,
}

impl DashboardAggregate {
    /// Compute totals from finished account results.
    #[must_use]
    pub fn from_accounts(accounts: Vec<AccountResult>) -> Self {
        let total_resources = accounts.iter().map(|a| a.resources.len()).sum();
        let total_invoiced = accounts.iter().map(AccountResult::invoiced_amount).sum();
        let total_unbilled = accounts.iter().map(|a| a.unbilled_amount).sum();

        Self {
            accounts,
            total_resources,
            total_invoiced,
            total_unbilled,
        }
    }

    /// Number of accounts carrying an account-level error.
    #[must_use]
    pub fn failed_accounts(&self) -> usize {
        self.accounts
            .iter()
            .filter(|a| a.fetch_error.is_some())
            .count()
    }
}

/// Drives one fetch per credential and reduces the results.
#[derive(Clone)]
pub struct Aggregator {
    factory: Arc<dyn ClientFactory>,
    concurrency: usize,
    account_timeout: Duration,
}

impl Aggregator {
    /// Create an aggregator with default concurrency and timeout.
    #[must_use]
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            factory,
            concurrency: DEFAULT_CONCURRENCY,
            account_timeout: DEFAULT_ACCOUNT_TIMEOUT,
        }
    }

    /// Set how many accounts are fetched at once (minimum 1).
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the deadline applied to each account's call sequence.
    #[must_use]
    pub fn with_account_timeout(mut self, timeout: Duration) -> Self {
        self.account_timeout = timeout;
        self
    }

    async fn fetch_one(&self, entry: &CredentialEntry) -> AccountResult {
        let api = match self.factory.build(&entry.token) {
            Ok(api) => api,
            Err(e) => {
                warn!(account = %entry.label, error = %e, "Could not build API client");
                return AccountResult::failed(
                    entry.label.clone(),
                    FetchError::ClientSetup(e.to_string()),
                );
            }
        };

        fetch_account(api.as_ref(), &entry.label, self.account_timeout).await
    }

    /// Fetch every account and compute totals once all fetches finish.
    pub async fn aggregate(&self, entries: &[CredentialEntry]) -> DashboardAggregate {
        let accounts: Vec<AccountResult> = stream::iter(entries.iter().cloned())
            .map(|entry: CredentialEntry| {
                let span = info_span!("account", account = %entry.label);
                async move { self.fetch_one(&entry).await }.instrument(span)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let aggregate = DashboardAggregate::from_accounts(accounts);
        info!(
            accounts = aggregate.accounts.len(),
            failed = aggregate.failed_accounts(),
            total_resources = aggregate.total_resources,
            "Aggregation complete"
        );
        aggregate
    }
}
