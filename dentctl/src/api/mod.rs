//! Request layer: typed calls against the administration REST API.
//!
//! - [`client`]: the shared HTTP client (URL construction, auth, error mapping, validation)
//! - [`models`]: request/response types for each resource
//! - [`resources`]: one async function per endpoint, grouped per resource
//! - [`query`]: ordered query-string pairs that skip absent values

pub mod client;
pub mod models;
pub mod query;
pub mod resources;

pub use client::ApiClient;
