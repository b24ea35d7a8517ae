//! Fake account backend for unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::providers::{
    AccountApi, AccountSummary, InstanceIps, InstanceSummary, InvoiceSummary, IpAddress,
    Ipv6Range, ProviderError,
};

/// Per-endpoint call counters.
#[derive(Debug, Default)]
pub struct CallCounts {
    account: AtomicUsize,
    instances: AtomicUsize,
    ips: AtomicUsize,
    invoices: AtomicUsize,
}

impl CallCounts {
    pub fn account(&self) -> usize {
        self.account.load(Ordering::SeqCst)
    }

    pub fn instances(&self) -> usize {
        self.instances.load(Ordering::SeqCst)
    }

    pub fn ips(&self) -> usize {
        self.ips.load(Ordering::SeqCst)
    }

    pub fn invoices(&self) -> usize {
        self.invoices.load(Ordering::SeqCst)
    }
}

/// Scripted [`AccountApi`].
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Default)]
pub struct FakeAccount {
    pub calls: Arc<CallCounts>,
    unbilled: f64,
    instances: Vec<InstanceSummary>,
    invoices: Vec<InvoiceSummary>,
    fail_account: bool,
    hang_account: bool,
    fail_instances: bool,
    fail_invoices: bool,
    fail_ips: HashSet<u64>,
    hang_ips: HashSet<u64>,
}

impl FakeAccount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unbilled(mut self, amount: f64) -> Self {
        self.unbilled = amount;
        self
    }

    pub fn with_instances(mut self, instances: Vec<InstanceSummary>) -> Self {
        self.instances = instances;
        self
    }

    pub fn with_invoices(mut self, invoices: Vec<InvoiceSummary>) -> Self {
        self.invoices = invoices;
        self
    }

    pub fn fail_account(mut self) -> Self {
        self.fail_account = true;
        self
    }

    pub fn hang_account(mut self) -> Self {
        self.hang_account = true;
        self
    }

    pub fn fail_instances(mut self) -> Self {
        self.fail_instances = true;
        self
    }

    pub fn fail_invoices(mut self) -> Self {
        self.fail_invoices = true;
        self
    }

    pub fn fail_ips_for(mut self, id: u64) -> Self {
        self.fail_ips.insert(id);
        self
    }

    pub fn hang_ips_for(mut self, id: u64) -> Self {
        self.hang_ips.insert(id);
        self
    }
}

fn api_error(message: &str) -> ProviderError {
    ProviderError::Api {
        status: 500,
        message: message.to_string(),
    }
}

#[async_trait]
impl AccountApi for FakeAccount {
    async fn get_account(&self) -> Result<AccountSummary, ProviderError> {
        self.calls.account.fetch_add(1, Ordering::SeqCst);
        if self.hang_account {
            std::future::pending::<()>().await;
        }
        if self.fail_account {
            return Err(api_error("account unavailable"));
        }
        Ok(AccountSummary {
            balance_uninvoiced: self.unbilled,
        })
    }

    async fn list_instances(&self) -> Result<Vec<InstanceSummary>, ProviderError> {
        self.calls.instances.fetch_add(1, Ordering::SeqCst);
        if self.fail_instances {
            return Err(api_error("instances unavailable"));
        }
        Ok(self.instances.clone())
    }

    async fn get_instance_ips(&self, id: u64) -> Result<InstanceIps, ProviderError> {
        self.calls.ips.fetch_add(1, Ordering::SeqCst);
        if self.hang_ips.contains(&id) {
            std::future::pending::<()>().await;
        }
        if self.fail_ips.contains(&id) {
            return Err(ProviderError::NotFound(format!("instance {id}")));
        }
        Ok(InstanceIps {
            public_v4: vec![IpAddress {
                address: format!("203.0.113.{id}"),
            }],
            private_v4: vec![IpAddress {
                address: format!("192.168.0.{id}"),
            }],
            global_v6: vec![Ipv6Range {
                range: format!("2600:3c00::{id}"),
                prefix: 64,
            }],
        })
    }

    async fn list_invoices(&self) -> Result<Vec<InvoiceSummary>, ProviderError> {
        self.calls.invoices.fetch_add(1, Ordering::SeqCst);
        if self.fail_invoices {
            return Err(api_error("invoices unavailable"));
        }
        Ok(self.invoices.clone())
    }
}

pub fn instance(id: u64, label: &str) -> InstanceSummary {
    InstanceSummary {
        id,
        label: label.to_string(),
        status: "running".to_string(),
        region: "us-east".to_string(),
        instance_type: "g6-standard-1".to_string(),
        ipv4: vec![format!("203.0.113.{id}")],
    }
}

pub fn invoice(id: u64, total: f64) -> InvoiceSummary {
    InvoiceSummary {
        id,
        date: "2026-09-01T00:00:00".to_string(),
        label: format!("Invoice #{id}"),
        total,
    }
}

/// Factory handing out pre-built fakes by token.
#[derive(Default)]
pub struct FakeFactory {
    accounts: std::collections::HashMap<String, Arc<FakeAccount>>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, token: &str, account: FakeAccount) -> Self {
        self.accounts.insert(token.to_string(), Arc::new(account));
        self
    }

    pub fn account(&self, token: &str) -> Arc<FakeAccount> {
        Arc::clone(&self.accounts[token])
    }
}

impl crate::client::ClientFactory for FakeFactory {
    fn build(&self, token: &str) -> Result<Arc<dyn AccountApi>, ProviderError> {
        match self.accounts.get(token) {
            Some(account) => Ok(Arc::clone(account) as Arc<dyn AccountApi>),
            None => Err(ProviderError::Config(format!("no fake for token {token}"))),
        }
    }
}
