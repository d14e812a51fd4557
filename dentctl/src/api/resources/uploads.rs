//! Upload request functions (`/uploads`).
//!
//! Single and multiple uploads differ only in endpoint and payload shape: one `file` part versus a
//! repeated `files` part. Size and type limits are documented by the server and enforced there.

use crate::api::client::ApiClient;
use crate::api::models::uploads::{FileMeta, UploadFile};
use crate::api::query::QueryPairs;
use crate::errors::{Error, Result};
use reqwest::Body;
use reqwest::multipart::{Form, Part};
use tracing::instrument;

const PATH: &str = "uploads";

fn folder_query(folder: Option<&str>) -> QueryPairs {
    let mut query = QueryPairs::new();
    query.push_str("folder", folder);
    query
}

fn file_part(file: UploadFile) -> Result<Part> {
    let UploadFile {
        file_name,
        mime_type,
        contents,
    } = file;
    let length = contents.len() as u64;
    Part::stream_with_length(Body::from(contents), length)
        .file_name(file_name.clone())
        .mime_str(&mime_type)
        .map_err(|e| Error::InvalidRequest {
            message: format!("{file_name} has an invalid MIME type '{mime_type}': {e}"),
        })
}

#[instrument(skip(client, file), fields(file_name = %file.file_name, size = file.len()))]
pub async fn upload_single(client: &ApiClient, file: UploadFile, folder: Option<&str>) -> Result<FileMeta> {
    let form = Form::new().part("file", file_part(file)?);
    client.post_multipart(&[PATH, "single"], &folder_query(folder), form).await
}

#[instrument(skip(client, files), fields(count = files.len()))]
pub async fn upload_multiple(client: &ApiClient, files: Vec<UploadFile>, folder: Option<&str>) -> Result<Vec<FileMeta>> {
    let mut form = Form::new();
    for file in files {
        form = form.part("files", file_part(file)?);
    }
    client.post_multipart(&[PATH, "multiple"], &folder_query(folder), form).await
}

#[instrument(skip(client))]
pub async fn delete_upload(client: &ApiClient, key: &str) -> Result<()> {
    client.delete_empty(&[PATH, key]).await
}

/// The uploads endpoints bound to a client.
#[derive(Debug, Clone)]
pub struct Uploads {
    client: ApiClient,
}

impl Uploads {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn single(&self, file: UploadFile, folder: Option<&str>) -> Result<FileMeta> {
        upload_single(&self.client, file, folder).await
    }

    pub async fn multiple(&self, files: Vec<UploadFile>, folder: Option<&str>) -> Result<Vec<FileMeta>> {
        upload_multiple(&self.client, files, folder).await
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        delete_upload(&self.client, key).await
    }
}
