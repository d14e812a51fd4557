//! Request functions, one module per backend resource.
//!
//! Each module exposes plain async functions that map one typed request to one HTTP call
//! (`get_categories`, `update_lab_technician`, `upload_single`, ...). Entities with the usual
//! create/read/list/update/delete surface additionally implement [`Resource`], which is what the
//! query layer is generic over.

pub mod categories;
pub mod lab_technicians;
pub mod uploads;

pub use categories::Categories;
pub use lab_technicians::LabTechnicians;

use crate::api::models::pagination::PaginatedResponse;
use crate::api::query::QueryPairs;
use crate::errors::Result;

/// Filter types for list operations.
///
/// `query_pairs` must cover every parameter that affects the result: the pairs are both sent on
/// the wire and used as the cache key, so two filters with equal pairs are the same query.
pub trait ListFilter: Clone + PartialEq + Send + Sync + 'static {
    fn query_pairs(&self) -> QueryPairs;
}

/// Base trait for a remote CRUD resource.
///
/// This trait has separate associated types for create requests, update requests, list filters
/// and responses. Ids are opaque strings issued by the server.
#[async_trait::async_trait]
pub trait Resource: Clone + Send + Sync + 'static {
    /// Name used as the first component of query keys
    const ENTITY: &'static str;

    /// The request type for creating entities
    type CreateRequest: Send + Sync;

    /// The request type for updating entities
    type UpdateRequest: Send + Sync;

    /// The response type returned by operations
    type Response: Clone + Send + Sync + 'static;

    /// The filter type for list operations
    type Filter: ListFilter;

    /// Create a new entity
    async fn create(&self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by ID
    async fn get_by_id(&self, id: &str) -> Result<Self::Response>;

    /// List one page of entities
    async fn list(&self, filter: &Self::Filter) -> Result<PaginatedResponse<Self::Response>>;

    /// Update an entity by ID
    async fn update(&self, id: &str, request: &Self::UpdateRequest) -> Result<Self::Response>;

    /// Delete an entity by ID, returning the deleted record
    async fn delete(&self, id: &str) -> Result<Self::Response>;
}
