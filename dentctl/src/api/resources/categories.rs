//! Category request functions (`/categories`).

use super::{ListFilter, Resource};
use crate::api::client::ApiClient;
use crate::api::models::categories::{Category, CategoryCreate, CategoryListQuery, CategoryUpdate};
use crate::api::models::pagination::PaginatedResponse;
use crate::api::query::QueryPairs;
use crate::errors::Result;
use crate::types::abbrev_id;
use tracing::instrument;

const PATH: &str = "categories";

#[instrument(skip(client))]
pub async fn create_category(client: &ApiClient, request: &CategoryCreate) -> Result<Category> {
    client.post_json(&[PATH], request).await
}

#[instrument(skip(client))]
pub async fn get_categories(client: &ApiClient, query: &CategoryListQuery) -> Result<PaginatedResponse<Category>> {
    client.get(&[PATH], &query.query_pairs()).await
}

#[instrument(skip(client), fields(category_id = %abbrev_id(id)))]
pub async fn get_category(client: &ApiClient, id: &str) -> Result<Category> {
    client.get(&[PATH, id], &QueryPairs::new()).await
}

#[instrument(skip(client), fields(category_id = %abbrev_id(id)))]
pub async fn update_category(client: &ApiClient, id: &str, request: &CategoryUpdate) -> Result<Category> {
    client.patch_json(&[PATH, id], request).await
}

#[instrument(skip(client), fields(category_id = %abbrev_id(id)))]
pub async fn delete_category(client: &ApiClient, id: &str) -> Result<Category> {
    client.delete(&[PATH, id]).await
}

impl ListFilter for CategoryListQuery {
    fn query_pairs(&self) -> QueryPairs {
        CategoryListQuery::query_pairs(self)
    }
}

/// The categories resource bound to a client.
#[derive(Debug, Clone)]
pub struct Categories {
    client: ApiClient,
}

impl Categories {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Resource for Categories {
    const ENTITY: &'static str = "categories";
    type CreateRequest = CategoryCreate;
    type UpdateRequest = CategoryUpdate;
    type Response = Category;
    type Filter = CategoryListQuery;

    async fn create(&self, request: &Self::CreateRequest) -> Result<Self::Response> {
        create_category(&self.client, request).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Self::Response> {
        get_category(&self.client, id).await
    }

    async fn list(&self, filter: &Self::Filter) -> Result<PaginatedResponse<Self::Response>> {
        get_categories(&self.client, filter).await
    }

    async fn update(&self, id: &str, request: &Self::UpdateRequest) -> Result<Self::Response> {
        update_category(&self.client, id, request).await
    }

    async fn delete(&self, id: &str) -> Result<Self::Response> {
        delete_category(&self.client, id).await
    }
}
