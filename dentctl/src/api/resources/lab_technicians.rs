//! Lab technician request functions (`/users`, restricted to the `lab_technician` role).

use super::{ListFilter, Resource};
use crate::api::client::ApiClient;
use crate::api::models::lab_technicians::{
    LabTechnician, LabTechnicianCreate, LabTechnicianCreateBody, LabTechnicianListQuery, LabTechnicianUpdate, PasswordChange,
    PasswordChangeResponse,
};
use crate::api::models::pagination::PaginatedResponse;
use crate::api::query::QueryPairs;
use crate::errors::Result;
use crate::types::abbrev_id;
use tracing::instrument;

const PATH: &str = "users";

#[instrument(skip(client))]
pub async fn create_lab_technician(client: &ApiClient, request: &LabTechnicianCreate) -> Result<LabTechnician> {
    client.post_json(&[PATH], &LabTechnicianCreateBody::from(request)).await
}

#[instrument(skip(client))]
pub async fn get_lab_technicians(client: &ApiClient, query: &LabTechnicianListQuery) -> Result<PaginatedResponse<LabTechnician>> {
    client.get(&[PATH], &query.query_pairs()).await
}

#[instrument(skip(client), fields(user_id = %abbrev_id(id)))]
pub async fn get_lab_technician(client: &ApiClient, id: &str) -> Result<LabTechnician> {
    client.get(&[PATH, id], &QueryPairs::new()).await
}

#[instrument(skip(client), fields(user_id = %abbrev_id(id)))]
pub async fn update_lab_technician(client: &ApiClient, id: &str, request: &LabTechnicianUpdate) -> Result<LabTechnician> {
    client.patch_json(&[PATH, id], request).await
}

#[instrument(skip(client), fields(user_id = %abbrev_id(id)))]
pub async fn delete_lab_technician(client: &ApiClient, id: &str) -> Result<LabTechnician> {
    client.delete(&[PATH, id]).await
}

#[instrument(skip(client, password), fields(user_id = %abbrev_id(id)))]
pub async fn change_lab_technician_password(client: &ApiClient, id: &str, password: &str) -> Result<PasswordChangeResponse> {
    let body = PasswordChange {
        password: password.to_string(),
    };
    client.patch_json(&[PATH, id, "password"], &body).await
}

impl ListFilter for LabTechnicianListQuery {
    fn query_pairs(&self) -> QueryPairs {
        LabTechnicianListQuery::query_pairs(self)
    }
}

/// The lab technicians resource bound to a client.
#[derive(Debug, Clone)]
pub struct LabTechnicians {
    client: ApiClient,
}

impl LabTechnicians {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn change_password(&self, id: &str, password: &str) -> Result<PasswordChangeResponse> {
        change_lab_technician_password(&self.client, id, password).await
    }
}

#[async_trait::async_trait]
impl Resource for LabTechnicians {
    const ENTITY: &'static str = "lab_technicians";
    type CreateRequest = LabTechnicianCreate;
    type UpdateRequest = LabTechnicianUpdate;
    type Response = LabTechnician;
    type Filter = LabTechnicianListQuery;

    async fn create(&self, request: &Self::CreateRequest) -> Result<Self::Response> {
        create_lab_technician(&self.client, request).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Self::Response> {
        get_lab_technician(&self.client, id).await
    }

    async fn list(&self, filter: &Self::Filter) -> Result<PaginatedResponse<Self::Response>> {
        get_lab_technicians(&self.client, filter).await
    }

    async fn update(&self, id: &str, request: &Self::UpdateRequest) -> Result<Self::Response> {
        update_lab_technician(&self.client, id, request).await
    }

    async fn delete(&self, id: &str) -> Result<Self::Response> {
        delete_lab_technician(&self.client, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::lab_technicians::Role;
    use crate::api::models::pagination::ListParams;
    use crate::test_utils::{client_for, page_json, technician_json};
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_always_sends_role() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![technician_json("u1", "apetrova")], 1, 1, 10)))
            .expect(1)
            .mount(&server)
            .await;

        let page = get_lab_technicians(&client_for(&server), &LabTechnicianListQuery::default())
            .await
            .unwrap();
        assert_eq!(page.data[0].role, Role::LabTechnician);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), Some("role=lab_technician"));
    }

    #[tokio::test]
    async fn test_list_with_filters_and_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![], 1, 0, 5)))
            .mount(&server)
            .await;

        let query = LabTechnicianListQuery {
            params: ListParams::builder().page(1).limit(5).build(),
            clinic: Some("clinic-7".to_string()),
            search: Some("ana p".to_string()),
        };
        get_lab_technicians(&client_for(&server), &query).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(
            requests[0].url.query(),
            Some("role=lab_technician&page=1&limit=5&clinic=clinic-7&search=ana+p")
        );
    }

    #[tokio::test]
    async fn test_create_posts_role() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .and(body_partial_json(json!({"username": "apetrova", "role": "lab_technician", "password": "pw-123456"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(technician_json("u1", "apetrova")))
            .expect(1)
            .mount(&server)
            .await;

        let request = LabTechnicianCreate {
            first_name: "Ana".to_string(),
            last_name: "Petrova".to_string(),
            username: "apetrova".to_string(),
            password: "pw-123456".to_string(),
            email: None,
            phone: None,
            clinic: Some("clinic-1".to_string()),
            notes: None,
        };
        let technician = LabTechnicians::new(client_for(&server)).create(&request).await.unwrap();
        assert_eq!(technician.username, "apetrova");
    }

    #[tokio::test]
    async fn test_change_password() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/users/u1/password"))
            .and(body_json(json!({"password": "n3w-password"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let response = LabTechnicians::new(client_for(&server))
            .change_password("u1", "n3w-password")
            .await
            .unwrap();
        assert!(response.success);
    }

    #[tokio::test]
    async fn test_delete_unknown_technician_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/users/ghost"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "User not found"})))
            .mount(&server)
            .await;

        let err = delete_lab_technician(&client_for(&server), "ghost").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.user_message(), "User not found");
    }
}
