use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde_json::Value;

use super::{memory::MemoryStore, Collection, RecordId, RemoteStore};
use crate::error::StoreResult;

/// Wraps a [`MemoryStore`] so responses resolve late. Listings read the
/// data first and then wait, so a slow listing returns rows as they were
/// when it was issued. Writes wait first and then touch the data.
#[derive(Debug, Clone)]
pub(crate) struct DelayedStore {
    pub inner: Arc<MemoryStore>,
    pub list: Duration,
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl DelayedStore {
    pub fn over(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            list: Duration::ZERO,
            create: Duration::ZERO,
            update: Duration::ZERO,
            delete: Duration::ZERO,
        }
    }
}

#[async_trait]
impl RemoteStore for DelayedStore {
    async fn list_all(&self, collection: Collection) -> StoreResult<Vec<Value>> {
        let rows = self.inner.list_all(collection).await;
        tokio::time::sleep(self.list).await;
        rows
    }

    async fn create(&self, collection: Collection, fields: Value) -> StoreResult<Value> {
        tokio::time::sleep(self.create).await;
        self.inner.create(collection, fields).await
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: &RecordId,
        record: Value,
    ) -> StoreResult<Value> {
        tokio::time::sleep(self.update).await;
        self.inner.update_by_id(collection, id, record).await
    }

    async fn delete_by_id(&self, collection: Collection, id: &RecordId) -> StoreResult<()> {
        tokio::time::sleep(self.delete).await;
        self.inner.delete_by_id(collection, id).await
    }
}
