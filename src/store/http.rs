use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use super::{Collection, RecordId, RemoteStore};
use crate::error::{StoreError, StoreResult};

/// `RemoteStore` over the collection-oriented HTTP service
/// (`GET|POST /{collection}`, `PUT|DELETE /{collection}/{id}`).
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: &str, timeout: Duration) -> StoreResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: Collection) -> String {
        format!("{}/{}", self.base_url, collection.path())
    }

    fn record_url(&self, collection: Collection, id: &RecordId) -> String {
        format!("{}/{}/{}", self.base_url, collection.path(), id)
    }

    /// Maps a non-2xx status to an error and hands back the response.
    async fn check_status(
        response: reqwest::Response,
        collection: Collection,
        id: Option<&RecordId>,
    ) -> StoreResult<reqwest::Response> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(StoreError::NotFound {
                    collection,
                    id: id.clone(),
                });
            }
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(%status, %collection, body = %text, "remote store rejected request");
            return Err(StoreError::Transport(format!("{collection}: HTTP {status}")));
        }
        Ok(response)
    }

    async fn handle_response(
        response: reqwest::Response,
        collection: Collection,
        id: Option<&RecordId>,
    ) -> StoreResult<Option<Value>> {
        let response = Self::check_status(response, collection, id).await?;
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Decode { collection, source })
    }

    fn expect_body(body: Option<Value>, collection: Collection) -> StoreResult<Value> {
        body.ok_or_else(|| StoreError::Transport(format!("{collection}: empty response body")))
    }
}

#[async_trait]
impl RemoteStore for HttpStore {
    async fn list_all(&self, collection: Collection) -> StoreResult<Vec<Value>> {
        let response = self.client.get(self.collection_url(collection)).send().await?;
        let body = Self::expect_body(Self::handle_response(response, collection, None).await?, collection)?;
        match body {
            Value::Array(items) => {
                debug!(%collection, count = items.len(), "listed collection");
                Ok(items)
            }
            other => Err(StoreError::Transport(format!(
                "{collection}: expected a JSON array, got {}",
                json_kind(&other)
            ))),
        }
    }

    async fn create(&self, collection: Collection, fields: Value) -> StoreResult<Value> {
        let response = self
            .client
            .post(self.collection_url(collection))
            .json(&fields)
            .send()
            .await?;
        Self::expect_body(Self::handle_response(response, collection, None).await?, collection)
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: &RecordId,
        record: Value,
    ) -> StoreResult<Value> {
        let response = self
            .client
            .put(self.record_url(collection, id))
            .json(&record)
            .send()
            .await?;
        Self::expect_body(Self::handle_response(response, collection, Some(id)).await?, collection)
    }

    async fn delete_by_id(&self, collection: Collection, id: &RecordId) -> StoreResult<()> {
        let response = self.client.delete(self.record_url(collection, id)).send().await?;
        // Services answer a delete with `{}`, the removed row, or plain text.
        Self::check_status(response, collection, Some(id)).await?;
        debug!(%collection, %id, "deleted record");
        Ok(())
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
