//! Provider abstractions for cloud billing accounts.

pub mod linode;
mod traits;

pub use traits::{
    AccountApi, AccountSummary, InstanceIps, InstanceSummary, InvoiceSummary, IpAddress,
    Ipv6Range, ProviderError,
};
