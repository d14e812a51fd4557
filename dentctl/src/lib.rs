//! # dentctl: Dental Clinic Administration Client
//!
//! `dentctl` is the client side of a dental clinic administration portal. It talks to the portal's
//! REST backend to manage material categories and lab technicians, uploads case files, and holds
//! the state of the patient-facing configurator preview (patient info, material, tooth chart).
//!
//! ## Architecture
//!
//! The crate is built in three layers, each usable on its own:
//!
//! ### Request layer ([`api`])
//!
//! Plain async functions (`get_categories`, `update_lab_technician`, `upload_single`, ...) that map
//! one typed request to exactly one HTTP call through [`ApiClient`]. URLs are deterministic: query
//! parameters are appended in a fixed order and only when they carry a value. Every response is
//! decoded and then validated, so a body that parses but breaks the contract (an empty id, an
//! inconsistent pagination descriptor) surfaces as [`errors::Error::InvalidResponse`] instead of
//! flowing on. Entities with a create/read/list/update/delete surface implement
//! [`api::resources::Resource`].
//!
//! ### Query layer ([`query`])
//!
//! [`query::ResourceQueries`] wraps a resource with a shared cache ([`query::QueryClient`], backed by
//! `moka`). Reads are keyed by entity plus the exact query parameters; equal keys reuse the cached
//! result until it goes stale or is invalidated, and concurrent reads of one key share a request.
//! Writes run through [`query::Mutation`], which reports `Idle -> Pending -> Success | Error` and
//! never edits cached reads. Invalidation is always explicit.
//!
//! ### View layer ([`view`])
//!
//! [`view::ListViewState`] holds what a list screen tracks (page, page size, sort, committed search,
//! filters, row selection) and [`view::ListController`] turns changes into fetches. Search input is
//! debounced; a committed search or a filter change returns to page 1. Results arrive on a channel
//! and anything older than the latest request is dropped.
//!
//! The [`configurator`] module models the preview panel as plain state.
//!
//! ## Binary
//!
//! The `dentctl` binary exposes the same operations on the command line and prints results as
//! JSON. See [`config`] for configuration and [`telemetry`] for logging and trace export.
//!
//! ## Example
//!
//! ```no_run
//! use dentctl::{Config, Portal};
//! use dentctl::api::models::categories::CategoryListQuery;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let portal = Portal::new(Config::default())?;
//! let page = portal.categories().list(&CategoryListQuery::default()).await?;
//! for category in &page.data {
//!     println!("{} {}", category.id, category.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod configurator;
pub mod errors;
pub mod query;
pub mod telemetry;
pub mod types;
pub mod view;

#[cfg(test)]
mod test_utils;

pub use api::ApiClient;
pub use config::Config;

use api::resources::uploads::Uploads;
use api::resources::{Categories, LabTechnicians};
use query::{QueryClient, ResourceQueries};
use tracing::{debug, instrument};
use view::ListController;

/// Everything a front end needs, wired from one [`Config`].
///
/// Cloning is cheap and clones share the HTTP connection pool and the query cache.
#[derive(Clone)]
pub struct Portal {
    config: Config,
    client: ApiClient,
    queries: QueryClient,
}

impl Portal {
    #[instrument(skip_all, fields(base_url = %config.api.base_url))]
    pub fn new(config: Config) -> errors::Result<Self> {
        let client = ApiClient::new(&config.api)?;
        let queries = QueryClient::new(&config.cache);
        debug!("Portal client ready");
        Ok(Self { config, client, queries })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn queries(&self) -> &QueryClient {
        &self.queries
    }

    pub fn categories(&self) -> ResourceQueries<Categories> {
        ResourceQueries::new(Categories::new(self.client.clone()), self.queries.clone())
    }

    pub fn lab_technicians(&self) -> ResourceQueries<LabTechnicians> {
        ResourceQueries::new(LabTechnicians::new(self.client.clone()), self.queries.clone())
    }

    pub fn uploads(&self) -> Uploads {
        Uploads::new(self.client.clone())
    }

    pub fn category_list(&self) -> ListController<Categories> {
        ListController::new(self.categories(), &self.config.list)
    }

    pub fn lab_technician_list(&self) -> ListController<LabTechnicians> {
        ListController::new(self.lab_technicians(), &self.config.list)
    }
}
