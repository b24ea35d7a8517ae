//! Linode API client implementation.
//!
//! API Documentation: <https://techdocs.akamai.com/linode-api/reference/api>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::models::{
    Account, ErrorResponse, Instance, InstanceIpAddresses, Invoice, Paginated,
};
use crate::providers::traits::{
    AccountApi, AccountSummary, InstanceIps, InstanceSummary, InvoiceSummary, IpAddress,
    Ipv6Range, ProviderError,
};

/// Base URL for Linode API.
const API_BASE_URL: &str = "https://api.linode.com/v4";

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Largest page size the API accepts.
const PAGE_SIZE: u32 = 500;

/// Linode account client bound to one API token.
#[derive(Clone)]
pub struct Linode {
    /// HTTP client.
    client: Client,
    /// Personal access token.
    token: String,
    /// API root, overridable for tests.
    base_url: String,
}

impl std::fmt::Debug for Linode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Linode")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Linode {
    /// Create a new Linode client.
    ///
    /// # Arguments
    /// * `token` - Linode personal access token
    ///
    /// # Errors
    /// Returns [`ProviderError::Config`] if the token is empty, or an HTTP
    /// error if the client cannot be created.
    pub fn new(token: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_base_url(token, API_BASE_URL)
    }

    /// Create a client against a custom API root.
    ///
    /// # Errors
    /// Same as [`Linode::new`].
    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ProviderError::Config(
                "Linode API token cannot be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Make an authenticated GET request.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "GET request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Fetch every page of a list endpoint.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, ProviderError> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let response: Paginated<T> = self
                .get(&format!("{path}?page={page}&page_size={PAGE_SIZE}"))
                .await?;
            items.extend(response.data);

            if response.page >= response.pages {
                break;
            }
            page = response.page + 1;
        }

        Ok(items)
    }

    /// Handle API response, parsing JSON or error.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&text).map_err(|e| {
                warn!(error = %e, "Failed to parse response");
                ProviderError::Serialization(e)
            });
        }

        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|body| body.message())
            .unwrap_or(text);

        match status {
            StatusCode::NOT_FOUND => Err(ProviderError::NotFound(message)),
            StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::RateLimited(message)),
            _ => Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            }),
        }
    }

    /// Convert a Linode instance to our summary type.
    fn to_instance(instance: Instance) -> InstanceSummary {
        InstanceSummary {
            id: instance.id,
            label: instance.label,
            status: instance.status,
            region: instance.region,
            instance_type: instance.instance_type.unwrap_or_default(),
            ipv4: instance.ipv4,
        }
    }

    fn to_invoice(invoice: Invoice) -> InvoiceSummary {
        InvoiceSummary {
            id: invoice.id,
            date: invoice.date,
            label: invoice.label,
            total: invoice.total,
        }
    }

    fn to_ips(ips: InstanceIpAddresses) -> InstanceIps {
        let v4 = ips.ipv4.unwrap_or_default();
        let v6 = ips.ipv6.unwrap_or_default();

        InstanceIps {
            public_v4: v4
                .public
                .into_iter()
                .map(|ip| IpAddress { address: ip.address })
                .collect(),
            private_v4: v4
                .private
                .into_iter()
                .map(|ip| IpAddress { address: ip.address })
                .collect(),
            global_v6: v6
                .global
                .into_iter()
                .map(|r| Ipv6Range {
                    range: r.range,
                    prefix: r.prefix,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl AccountApi for Linode {
    async fn get_account(&self) -> Result<AccountSummary, ProviderError> {
        let account: Account = self.get("/account").await?;
        Ok(AccountSummary {
            balance_uninvoiced: account.balance_uninvoiced,
        })
    }

    async fn list_instances(&self) -> Result<Vec<InstanceSummary>, ProviderError> {
        let instances: Vec<Instance> = self.get_all_pages("/linode/instances").await?;
        Ok(instances.into_iter().map(Self::to_instance).collect())
    }

    async fn get_instance_ips(&self, id: u64) -> Result<InstanceIps, ProviderError> {
        let ips: InstanceIpAddresses = self.get(&format!("/linode/instances/{id}/ips")).await?;
        Ok(Self::to_ips(ips))
    }

    async fn list_invoices(&self) -> Result<Vec<InvoiceSummary>, ProviderError> {
        let invoices: Vec<Invoice> = self.get_all_pages("/account/invoices").await?;
        Ok(invoices.into_iter().map(Self::to_invoice).collect())
    }
}
