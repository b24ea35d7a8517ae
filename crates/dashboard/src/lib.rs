//! Consolidated billing and instance dashboard for multiple Linode accounts.
//!
//! Each dashboard view runs one aggregation pass:
//!
//! 1. [`discovery::discover`] reads the configured `LINODE_TOKEN_<N>` /
//!    `LINODE_ACCOUNT_<N>_NAME` pairs.
//! 2. [`aggregate::Aggregator`] builds a client per token through a
//!    [`client::ClientFactory`] and runs [`fetcher::fetch_account`] for each,
//!    a bounded number at a time.
//! 3. Totals are computed from the finished results and rendered.
//!
//! Access is gated by a passcode login ([`auth`]). The session marker is an
//! AES-256-GCM sealed cookie; no session state is kept server-side.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use linode_dashboard::aggregate::Aggregator;
//! use linode_dashboard::client::LinodeClientFactory;
//! use linode_dashboard::discovery::{discover, EnvCredentials};
//!
//! #[tokio::main]
//! async fn main() {
//!     let aggregator = Aggregator::new(Arc::new(LinodeClientFactory::new()));
//!     let data = aggregator.aggregate(&discover(&EnvCredentials)).await;
//!     println!("{} instances, ${:.2} unbilled", data.total_resources, data.total_unbilled);
//! }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregate;
pub mod auth;
pub mod client;
pub mod config;
pub mod discovery;
pub mod fetcher;
pub mod providers;
pub mod render;
pub mod server;

#[cfg(test)]
mod testing;

pub use aggregate::{Aggregator, DashboardAggregate};
pub use config::Config;
pub use discovery::{CredentialEntry, CredentialSource};
pub use fetcher::{AccountResult, FetchError};
pub use providers::{AccountApi, ProviderError};
