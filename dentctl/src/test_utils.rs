//! Shared fixtures for unit tests.

use crate::api::ApiClient;
use crate::config::{ApiConfig, CacheConfig};
use crate::query::QueryClient;
use serde_json::{Value, json};
use std::time::Duration;
use url::Url;
use wiremock::MockServer;

const TIMESTAMP: &str = "2024-05-01T08:00:00Z";

pub fn api_config(base: &str) -> ApiConfig {
    ApiConfig {
        base_url: Url::parse(base).unwrap(),
        request_timeout: Duration::from_secs(5),
        auth_token: Some("test-token".to_string()),
    }
}

pub fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&api_config(&server.uri())).unwrap()
}

/// A fresh cache, so tests never share entries.
pub fn query_client() -> QueryClient {
    QueryClient::new(&CacheConfig::default())
}

pub fn category_json(id: &str, name: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "description": format!("{name} category"),
        "createdAt": TIMESTAMP,
        "updatedAt": TIMESTAMP
    })
}

pub fn technician_json(id: &str, username: &str) -> Value {
    json!({
        "_id": id,
        "firstName": "Ana",
        "lastName": "Petrova",
        "username": username,
        "email": format!("{username}@lab.example.com"),
        "role": "lab_technician",
        "clinic": {"_id": "clinic-1", "name": "Smile Clinic", "city": "Cluj"},
        "createdAt": TIMESTAMP,
        "updatedAt": TIMESTAMP
    })
}

/// A list envelope whose pagination flags agree with `current_page` and `total_pages`.
pub fn page_json(items: Vec<Value>, current_page: u32, total_pages: u32, limit: u32) -> Value {
    let total_items = if total_pages <= 1 {
        items.len() as u64
    } else {
        u64::from(total_pages) * u64::from(limit)
    };
    json!({
        "data": items,
        "pagination": {
            "currentPage": current_page,
            "totalPages": total_pages,
            "totalItems": total_items,
            "itemsPerPage": limit,
            "hasNextPage": current_page < total_pages,
            "hasPreviousPage": current_page > 1
        }
    })
}

pub fn file_meta_json(key: &str, original_name: &str) -> Value {
    json!({
        "url": format!("https://files.example.com/{key}"),
        "key": key,
        "bucket": "dental-uploads",
        "originalName": original_name,
        "mimeType": "application/octet-stream",
        "size": 1024
    })
}
