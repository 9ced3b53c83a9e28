//! Reqwest-backed contact service adapter
//!
//! Owns transport details only: URL construction, request timeout, status
//! mapping, and JSON decoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{ContactService, RESOURCE_PATH};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Contact, ContactDraft, ContactId};

const USER_AGENT: &str = concat!("agenda/", env!("CARGO_PKG_VERSION"));

/// Contact service reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpContactService {
    client: Client,
    /// `{base}/usuario`, without trailing slash
    collection: String,
}

impl HttpContactService {
    /// Build an adapter for the service at `base_url` with a per-request timeout
    ///
    /// Any path on `base_url` is kept, so `https://host/api` serves contacts
    /// from `https://host/api/usuario`.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            collection: format!("{}/{}", base_url.as_str().trim_end_matches('/'), RESOURCE_PATH),
        })
    }

    /// URL of the contact collection
    pub fn collection_url(&self) -> &str {
        &self.collection
    }

    fn item_url(&self, id: ContactId) -> String {
        format!("{}/{}", self.collection, id)
    }

    /// Send a request and return the body of a 2xx response
    ///
    /// `id` is set for routes keyed by a contact id, where 404 means the
    /// contact does not exist.
    async fn send(&self, request: RequestBuilder, id: Option<ContactId>) -> ServiceResult<Vec<u8>> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;

        if status.is_success() {
            return Ok(body.to_vec());
        }

        match (status, id) {
            (StatusCode::NOT_FOUND, Some(id)) => Err(ServiceError::NotFound { id }),
            _ => Err(ServiceError::rejected(status.as_u16(), body_preview(&body))),
        }
    }
}

#[async_trait]
impl ContactService for HttpContactService {
    async fn list(&self) -> ServiceResult<Vec<Contact>> {
        debug!("GET {}", self.collection);
        let body = self.send(self.client.get(&self.collection), None).await?;
        decode(&body)
    }

    async fn get(&self, id: ContactId) -> ServiceResult<Contact> {
        let url = self.item_url(id);
        debug!("GET {}", url);
        let body = self.send(self.client.get(&url), Some(id)).await?;

        // Some deployments answer 200 with an empty or `null` body for unknown ids
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ServiceError::NotFound { id });
        }
        decode::<Option<Contact>>(&body)?.ok_or(ServiceError::NotFound { id })
    }

    async fn create(&self, draft: &ContactDraft) -> ServiceResult<Contact> {
        debug!("POST {}", self.collection);
        let body = self
            .send(self.client.post(&self.collection).json(draft), None)
            .await?;
        decode(&body)
    }

    async fn update(&self, contact: &Contact) -> ServiceResult<()> {
        let url = self.item_url(contact.id);
        debug!("PUT {}", url);
        self.send(self.client.put(&url).json(contact), Some(contact.id))
            .await?;
        Ok(())
    }

    async fn delete(&self, id: ContactId) -> ServiceResult<()> {
        let url = self.item_url(id);
        debug!("DELETE {}", url);
        self.send(self.client.delete(&url), Some(id)).await?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> ServiceResult<T> {
    serde_json::from_slice(body).map_err(|error| {
        ServiceError::invalid_response(format!(
            "invalid contact JSON ({error}): {}",
            body_preview(body)
        ))
    })
}

fn map_transport_error(error: reqwest::Error) -> ServiceError {
    if error.is_timeout() {
        ServiceError::timeout(error.to_string())
    } else {
        ServiceError::network(error.to_string())
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
