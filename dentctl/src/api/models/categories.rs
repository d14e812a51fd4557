//! API request/response models for categories.

use super::pagination::ListParams;
use super::{Validate, require_non_empty};
use crate::api::query::QueryPairs;
use crate::types::CategoryId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Validate for Category {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("id", &self.id)?;
        require_non_empty("name", &self.name)
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub description: Option<String>,
}

/// Partial update; only the fields that are set are sent.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CategoryUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// Query parameters for listing categories
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CategoryListQuery {
    pub params: ListParams,
}

impl CategoryListQuery {
    pub fn new(params: ListParams) -> Self {
        Self { params }
    }

    pub fn query_pairs(&self) -> QueryPairs {
        self.params.query_pairs()
    }
}
