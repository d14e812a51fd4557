//! HTTP plumbing shared by every request function.
//!
//! [`ApiClient`] owns the `reqwest` client, the base URL and the optional bearer token. Each call
//! builds a deterministic URL from path segments and ordered query pairs, performs exactly one HTTP
//! request, and turns the outcome into either a decoded, validated value or an [`Error`]:
//!
//! ```text
//! endpoint(segments, query) -> send -> 2xx? -- no --> Error::Status { status, server message }
//!                                │       └─ network failure --> Error::Transport
//!                                └─ yes -> serde_json --> Error::Decode
//!                                           └─ Validate --> Error::InvalidResponse
//! ```
//!
//! There are no retries at this layer.

use crate::api::models::Validate;
use crate::api::query::QueryPairs;
use crate::config::ApiConfig;
use crate::errors::{Error, Result, server_message};
use metrics::counter;
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// The HTTP stack could not be initialised; nothing was sent.
fn setup_error(source: reqwest::Error) -> Error {
    Error::Config {
        message: format!("Could not initialise HTTP client: {source}"),
    }
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(setup_error)?;

        if config.base_url.cannot_be_a_base() {
            return Err(Error::Url {
                message: format!("{} cannot be used as a base URL", config.base_url),
            });
        }

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            auth_token: config.auth_token.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the URL for `segments` below the base URL.
    ///
    /// Each segment is percent-encoded on its own, so a storage key like `cases/a.png` becomes the
    /// single segment `cases%2Fa.png`. Query pairs are appended in order; with no pairs the URL has
    /// no query string at all.
    pub fn endpoint(&self, segments: &[&str], query: &QueryPairs) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| Error::Url {
                message: format!("{} cannot be used as a base URL", self.base_url),
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }

        if query.is_empty() {
            url.set_query(None);
        } else {
            let mut serializer = url.query_pairs_mut();
            serializer.clear();
            for (name, value) in query.iter() {
                serializer.append_pair(name, value);
            }
        }

        Ok(url)
    }

    #[instrument(skip(self), fields(path = %segments.join("/")), err)]
    pub async fn get<T>(&self, segments: &[&str], query: &QueryPairs) -> Result<T>
    where
        T: DeserializeOwned + Validate,
    {
        let url = self.endpoint(segments, query)?;
        let body = self.execute(Method::GET, url.clone(), |req| req).await?;
        decode(&url, &body)
    }

    #[instrument(skip(self, payload), fields(path = %segments.join("/")), err)]
    pub async fn post_json<B, T>(&self, segments: &[&str], payload: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Validate,
    {
        let url = self.endpoint(segments, &QueryPairs::new())?;
        let body = self.execute(Method::POST, url.clone(), |req| req.json(payload)).await?;
        decode(&url, &body)
    }

    #[instrument(skip(self, payload), fields(path = %segments.join("/")), err)]
    pub async fn patch_json<B, T>(&self, segments: &[&str], payload: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Validate,
    {
        let url = self.endpoint(segments, &QueryPairs::new())?;
        let body = self.execute(Method::PATCH, url.clone(), |req| req.json(payload)).await?;
        decode(&url, &body)
    }

    #[instrument(skip(self), fields(path = %segments.join("/")), err)]
    pub async fn delete<T>(&self, segments: &[&str]) -> Result<T>
    where
        T: DeserializeOwned + Validate,
    {
        let url = self.endpoint(segments, &QueryPairs::new())?;
        let body = self.execute(Method::DELETE, url.clone(), |req| req).await?;
        decode(&url, &body)
    }

    /// DELETE whose response body is ignored.
    #[instrument(skip(self), fields(path = %segments.join("/")), err)]
    pub async fn delete_empty(&self, segments: &[&str]) -> Result<()> {
        let url = self.endpoint(segments, &QueryPairs::new())?;
        self.execute(Method::DELETE, url, |req| req).await?;
        Ok(())
    }

    #[instrument(skip(self, form), fields(path = %segments.join("/")), err)]
    pub async fn post_multipart<T>(&self, segments: &[&str], query: &QueryPairs, form: Form) -> Result<T>
    where
        T: DeserializeOwned + Validate,
    {
        let url = self.endpoint(segments, query)?;
        let body = self.execute(Method::POST, url.clone(), |req| req.multipart(form)).await?;
        decode(&url, &body)
    }

    /// Send one request and return the body of a 2xx response.
    async fn execute(&self, method: Method, url: Url, build: impl FnOnce(RequestBuilder) -> RequestBuilder) -> Result<String> {
        debug!(%method, %url, "Sending request");

        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = match build(request).send().await {
            Ok(response) => response,
            Err(source) => {
                warn!(%method, %url, error = %source, "Request failed before a response arrived");
                counter!("dentctl_http_requests_total", "method" => method.to_string(), "outcome" => "transport_error").increment(1);
                return Err(Error::Transport {
                    url: url.to_string(),
                    source,
                });
            }
        };

        let status = response.status();
        let body = response.text().await.map_err(|source| Error::Transport {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            let message = server_message(status, &body);
            warn!(%method, %url, %status, %message, "Server rejected request");
            counter!("dentctl_http_requests_total", "method" => method.to_string(), "outcome" => "status_error").increment(1);
            return Err(Error::Status {
                method: method.to_string(),
                path: url.path().to_string(),
                status,
                message,
            });
        }

        debug!(%method, %url, %status, body_len = body.len(), "Request completed");
        counter!("dentctl_http_requests_total", "method" => method.to_string(), "outcome" => "success").increment(1);
        Ok(body)
    }
}

fn decode<T>(url: &Url, body: &str) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_str(body).map_err(|source| {
        tracing::error!(%url, error = %source, "Failed to parse response body");
        tracing::debug!("Response body was: {}", body);
        Error::Decode {
            path: url.path().to_string(),
            source,
        }
    })?;

    value.validate().map_err(|reason| Error::InvalidResponse {
        path: url.path().to_string(),
        reason,
    })?;

    Ok(value)
}
