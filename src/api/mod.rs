//! HTTP client for the workers REST API

use async_trait::async_trait;
use log::{error, info};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::DEFAULT_API_BASE;

/// Worker as seen by clients of the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    pub hard_chores_counter: i64,
    pub outer_partner_counter: i64,
}

/// Body sent on create and update; `title` is serialized as `null` when absent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerPayload {
    pub name: String,
    pub title: Option<String>,
}

impl WorkerPayload {
    /// Trims both fields and turns an empty title into `None`.
    pub fn from_form(name: &str, title: &str) -> Self {
        let title = title.trim();
        Self {
            name: name.trim().to_string(),
            title: (!title.is_empty()).then(|| title.to_string()),
        }
    }
}

/// Client errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to fetch workers: {}", .0.as_u16())]
    List(StatusCode),

    #[error("Create failed")]
    Create(StatusCode),

    #[error("Update failed")]
    Update(StatusCode),

    #[error("Delete failed")]
    Delete(StatusCode),

    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Status returned by the server, if the request got that far
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::List(s) | ApiError::Create(s) | ApiError::Update(s) | ApiError::Delete(s) => {
                Some(*s)
            }
            ApiError::Transport(e) => e.status(),
            ApiError::Malformed(_) => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Malformed(e.to_string())
        } else {
            ApiError::Transport(e)
        }
    }
}

/// The four calls the workers view depends on
#[async_trait]
pub trait WorkersApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Worker>, ApiError>;
    async fn create(&self, payload: &WorkerPayload) -> Result<(), ApiError>;
    async fn update(&self, id: i64, payload: &WorkerPayload) -> Result<(), ApiError>;
    async fn delete(&self, id: i64) -> Result<(), ApiError>;
}

/// reqwest-backed implementation of [`WorkersApi`]
#[derive(Debug, Clone)]
pub struct HttpWorkersApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpWorkersApi {
    pub fn new(base_url: Option<String>) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/api/workers", self.base_url)
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/api/workers/{}", self.base_url, id)
    }
}

#[async_trait]
impl WorkersApi for HttpWorkersApi {
    async fn list(&self) -> Result<Vec<Worker>, ApiError> {
        info!("GET {}", self.collection_url());
        let res = self.client.get(self.collection_url()).send().await?;
        if !res.status().is_success() {
            error!("Listing workers returned {}", res.status());
            return Err(ApiError::List(res.status()));
        }
        Ok(res.json::<Vec<Worker>>().await?)
    }

    async fn create(&self, payload: &WorkerPayload) -> Result<(), ApiError> {
        info!("POST {}", self.collection_url());
        let res = self
            .client
            .post(self.collection_url())
            .json(payload)
            .send()
            .await?;
        if !res.status().is_success() {
            error!("Creating worker returned {}", res.status());
            return Err(ApiError::Create(res.status()));
        }
        Ok(())
    }

    async fn update(&self, id: i64, payload: &WorkerPayload) -> Result<(), ApiError> {
        info!("PUT {}", self.item_url(id));
        let res = self.client.put(self.item_url(id)).json(payload).send().await?;
        if !res.status().is_success() {
            error!("Updating worker {} returned {}", id, res.status());
            return Err(ApiError::Update(res.status()));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        info!("DELETE {}", self.item_url(id));
        let res = self.client.delete(self.item_url(id)).send().await?;
        // Only 204 counts as deleted
        if res.status() != StatusCode::NO_CONTENT {
            error!("Deleting worker {} returned {}", id, res.status());
            return Err(ApiError::Delete(res.status()));
        }
        Ok(())
    }
}
