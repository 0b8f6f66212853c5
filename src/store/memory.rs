use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use super::{Collection, RecordId, RemoteStore};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Default)]
struct Inner {
    rows: HashMap<Collection, Vec<Value>>,
    next_id: i64,
    offline: bool,
    failing_deletes: HashSet<(Collection, RecordId)>,
    calls: Vec<String>,
}

/// In-process `RemoteStore` with the same semantics as the HTTP service.
/// Used for offline runs and for exercising failure paths.
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                ..Inner::default()
            }),
        }
    }

    /// Seeds a collection. Ids already present are kept; the id counter
    /// moves past the largest numeric one.
    pub async fn seed(&self, collection: Collection, rows: Vec<Value>) {
        let mut inner = self.inner.lock().await;
        let max = rows
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_i64))
            .max()
            .unwrap_or(0);
        inner.next_id = inner.next_id.max(max + 1);
        inner.rows.entry(collection).or_default().extend(rows);
    }

    pub async fn rows(&self, collection: Collection) -> Vec<Value> {
        self.inner
            .lock()
            .await
            .rows
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    /// While offline every call fails with a transport error.
    pub async fn set_offline(&self, offline: bool) {
        self.inner.lock().await.offline = offline;
    }

    pub async fn fail_delete_of(&self, collection: Collection, id: RecordId) {
        self.inner.lock().await.failing_deletes.insert((collection, id));
    }

    pub async fn heal_deletes(&self) {
        self.inner.lock().await.failing_deletes.clear();
    }

    /// Log of calls as `"METHOD collection[/id]"`.
    pub async fn calls(&self) -> Vec<String> {
        self.inner.lock().await.calls.clone()
    }
}

impl Inner {
    fn enter(&mut self, call: String) -> StoreResult<()> {
        self.calls.push(call);
        if self.offline {
            return Err(StoreError::Transport("memory store is offline".into()));
        }
        Ok(())
    }

    fn position(&self, collection: Collection, id: &RecordId) -> Option<usize> {
        self.rows.get(&collection)?.iter().position(|row| {
            row.get("id")
                .and_then(|v| serde_json::from_value::<RecordId>(v.clone()).ok())
                .is_some_and(|row_id| &row_id == id)
        })
    }
}

fn not_found(collection: Collection, id: &RecordId) -> StoreError {
    StoreError::NotFound {
        collection,
        id: id.clone(),
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn list_all(&self, collection: Collection) -> StoreResult<Vec<Value>> {
        let mut inner = self.inner.lock().await;
        inner.enter(format!("GET {collection}"))?;
        Ok(inner.rows.get(&collection).cloned().unwrap_or_default())
    }

    async fn create(&self, collection: Collection, fields: Value) -> StoreResult<Value> {
        let mut inner = self.inner.lock().await;
        inner.enter(format!("POST {collection}"))?;
        let Value::Object(mut map) = fields else {
            return Err(StoreError::Transport(format!("{collection}: body must be an object")));
        };
        let id = inner.next_id;
        inner.next_id += 1;
        map.insert("id".into(), json!(id));
        let row = Value::Object(map);
        inner.rows.entry(collection).or_default().push(row.clone());
        Ok(row)
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: &RecordId,
        record: Value,
    ) -> StoreResult<Value> {
        let mut inner = self.inner.lock().await;
        inner.enter(format!("PUT {collection}/{id}"))?;
        let pos = inner
            .position(collection, id)
            .ok_or_else(|| not_found(collection, id))?;
        let mut record = record;
        if let Value::Object(map) = &mut record {
            map.insert("id".into(), serde_json::to_value(id).unwrap_or(Value::Null));
        }
        if let Some(rows) = inner.rows.get_mut(&collection) {
            rows[pos] = record.clone();
        }
        Ok(record)
    }

    async fn delete_by_id(&self, collection: Collection, id: &RecordId) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner.enter(format!("DELETE {collection}/{id}"))?;
        if inner.failing_deletes.contains(&(collection, id.clone())) {
            return Err(StoreError::Transport(format!("{collection}/{id}: injected failure")));
        }
        let pos = inner
            .position(collection, id)
            .ok_or_else(|| not_found(collection, id))?;
        if let Some(rows) = inner.rows.get_mut(&collection) {
            rows.remove(pos);
        }
        Ok(())
    }
}
