//! HTTP client for `tasktimer-server`.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tasktimer_proto::api::{
    CreateRequest, DeleteResponse, ErrorBody, ListResponse, TASKS_PATH, TaskResponse,
    UpdateRequest,
};
use tasktimer_proto::{Category, Task, TaskId, TaskPatch};

use super::{ApiError, TaskApi};

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// [`TaskApi`] over HTTP with JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: reqwest::Client,
    tasks_url: String,
}

impl HttpTaskApi {
    /// Creates a client for the server at `base_url`
    /// (e.g. `http://127.0.0.1:3000`). Every request is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            tasks_url: format!("{}{TASKS_PATH}", base_url.trim_end_matches('/')),
        })
    }

    /// Full URL of the task collection endpoint.
    #[must_use]
    pub fn tasks_url(&self) -> &str {
        &self.tasks_url
    }
}

/// Decodes a success body, or turns an error body into [`ApiError::Status`].
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

impl TaskApi for HttpTaskApi {
    async fn list(&self) -> Result<Vec<Task>, ApiError> {
        let response = self.client.get(&self.tasks_url).send().await?;
        let body: ListResponse = decode(response).await?;
        Ok(body.tasks)
    }

    async fn create(&self, name: &str, category: Category) -> Result<Task, ApiError> {
        let request = CreateRequest {
            name: Some(name.to_string()),
            category: Some(category),
        };
        let response = self
            .client
            .post(&self.tasks_url)
            .json(&request)
            .send()
            .await?;
        let body: TaskResponse = decode(response).await?;
        Ok(body.task)
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, ApiError> {
        let request = UpdateRequest {
            id: Some(id.clone()),
            updates: patch.clone(),
        };
        let response = self
            .client
            .put(&self.tasks_url)
            .json(&request)
            .send()
            .await?;
        let body: TaskResponse = decode(response).await?;
        Ok(body.task)
    }

    async fn delete(&self, id: &TaskId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(&self.tasks_url)
            .query(&[("id", id.as_str())])
            .send()
            .await?;
        let _: DeleteResponse = decode(response).await?;
        Ok(())
    }
}
