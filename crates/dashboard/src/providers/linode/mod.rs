//! Linode account provider.
//!
//! Implements the [`AccountApi`](crate::providers::AccountApi) trait for the
//! Linode API v4. Only read endpoints are used: account, instances, instance
//! IPs and invoices.

mod client;
mod models;

pub use client::Linode;
pub use models::*;
