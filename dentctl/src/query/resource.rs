//! Cache-aware accessors for one [`Resource`].

use crate::api::models::pagination::PaginatedResponse;
use crate::api::resources::{ListFilter, Resource};
use crate::errors::Error;
use crate::query::cache::QueryClient;
use crate::query::key::QueryKey;
use crate::query::mutation::Mutation;
use crate::query::state::QueryState;
use crate::types::abbrev_id;
use std::sync::Arc;
use tracing::instrument;

pub type QueryResult<T> = Result<Arc<T>, Arc<Error>>;

/// Reads go through the shared cache; writes go through a [`Mutation`] and leave the cache alone.
///
/// After a successful write, call one of the `invalidate_*` methods for whatever the write made
/// stale (usually [`invalidate_lists`](Self::invalidate_lists) plus the detail of the touched id).
#[derive(Debug, Clone)]
pub struct ResourceQueries<R: Resource> {
    resource: R,
    queries: QueryClient,
}

impl<R: Resource> ResourceQueries<R> {
    pub fn new(resource: R, queries: QueryClient) -> Self {
        Self { resource, queries }
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }

    pub fn list_key(filter: &R::Filter) -> QueryKey {
        QueryKey::list(R::ENTITY, filter.query_pairs())
    }

    pub fn detail_key(id: &str) -> QueryKey {
        QueryKey::detail(R::ENTITY, id)
    }

    #[instrument(skip_all, fields(entity = R::ENTITY))]
    pub async fn list(&self, filter: &R::Filter) -> QueryResult<PaginatedResponse<R::Response>> {
        let resource = self.resource.clone();
        let filter = filter.clone();
        self.queries
            .fetch(&Self::list_key(&filter), || async move { resource.list(&filter).await })
            .await
    }

    /// Fetch one record. An empty id disables the query: no request, state stays `Idle`.
    #[instrument(skip_all, fields(entity = R::ENTITY, id = %abbrev_id(id)))]
    pub async fn detail(&self, id: &str) -> QueryState<R::Response> {
        if id.trim().is_empty() {
            return QueryState::Idle;
        }
        let resource = self.resource.clone();
        let owned_id = id.to_string();
        self.queries
            .fetch(&Self::detail_key(id), || async move { resource.get_by_id(&owned_id).await })
            .await
            .into()
    }

    pub async fn create(&self, mutation: &Mutation<R::Response>, request: &R::CreateRequest) -> QueryResult<R::Response> {
        mutation.mutate(self.resource.create(request)).await
    }

    pub async fn update(
        &self,
        mutation: &Mutation<R::Response>,
        id: &str,
        request: &R::UpdateRequest,
    ) -> QueryResult<R::Response> {
        mutation.mutate(self.resource.update(id, request)).await
    }

    pub async fn delete(&self, mutation: &Mutation<R::Response>, id: &str) -> QueryResult<R::Response> {
        mutation.mutate(self.resource.delete(id)).await
    }

    /// Drop every cached list page of this entity.
    pub async fn invalidate_lists(&self) -> usize {
        self.queries
            .invalidate_matching(|key| key.entity() == R::ENTITY && key.is_list())
            .await
    }

    pub async fn invalidate_detail(&self, id: &str) {
        self.queries.invalidate_key(&Self::detail_key(id)).await;
    }

    /// Drop lists and details of this entity.
    pub async fn invalidate_all(&self) -> usize {
        self.queries.invalidate_entity(R::ENTITY).await
    }
}
