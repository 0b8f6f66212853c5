//! Uniform access to the five collections of the remote data service.
//!
//! The [`RemoteStore`] trait speaks raw JSON so it stays object safe; the
//! typed helpers in this module decode into the entity types.

use std::{borrow::Cow, fmt, hash::Hash};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

#[cfg(test)]
pub(crate) mod delayed;
pub mod http;
pub mod memory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Accounts,
    Attendance,
    Leaves,
    Payroll,
    Departments,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Accounts,
        Collection::Attendance,
        Collection::Leaves,
        Collection::Payroll,
        Collection::Departments,
    ];

    /// Path segment under the service base URL.
    pub fn path(self) -> &'static str {
        match self {
            Collection::Accounts => "accounts",
            Collection::Attendance => "attendance",
            Collection::Leaves => "leaves",
            Collection::Payroll => "payroll",
            Collection::Departments => "departments",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Server-assigned identifier. The service may hand out numbers or strings;
/// `5` and `"5"` name the same record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    fn key(&self) -> Cow<'_, str> {
        match self {
            RecordId::Int(n) => Cow::Owned(n.to_string()),
            RecordId::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }
}

impl PartialEq for RecordId {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for RecordId {}

impl Hash for RecordId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Int(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        match s.parse::<i64>() {
            Ok(n) => RecordId::Int(n),
            Err(_) => RecordId::Text(s.to_string()),
        }
    }
}

impl std::str::FromStr for RecordId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RecordId::from(s))
    }
}

/// An entity stored in one collection of the remote service.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> &RecordId;
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list_all(&self, collection: Collection) -> StoreResult<Vec<Value>>;

    /// The service assigns the id. Not idempotent: a retry may create twice.
    async fn create(&self, collection: Collection, fields: Value) -> StoreResult<Value>;

    /// Full-record replace.
    async fn update_by_id(
        &self,
        collection: Collection,
        id: &RecordId,
        record: Value,
    ) -> StoreResult<Value>;

    async fn delete_by_id(&self, collection: Collection, id: &RecordId) -> StoreResult<()>;
}

fn decode<T: Record>(value: Value) -> StoreResult<T> {
    serde_json::from_value(value).map_err(|source| StoreError::Decode {
        collection: T::COLLECTION,
        source,
    })
}

fn encode<B: Serialize>(collection: Collection, body: &B) -> StoreResult<Value> {
    serde_json::to_value(body).map_err(|source| StoreError::Decode { collection, source })
}

pub async fn list<T: Record>(store: &dyn RemoteStore) -> StoreResult<Vec<T>> {
    store
        .list_all(T::COLLECTION)
        .await?
        .into_iter()
        .map(decode::<T>)
        .collect()
}

pub async fn create<T: Record, B: Serialize + Sync>(
    store: &dyn RemoteStore,
    fields: &B,
) -> StoreResult<T> {
    let body = encode(T::COLLECTION, fields)?;
    decode(store.create(T::COLLECTION, body).await?)
}

pub async fn update<T: Record>(store: &dyn RemoteStore, record: &T) -> StoreResult<T> {
    let body = encode(T::COLLECTION, record)?;
    decode(store.update_by_id(T::COLLECTION, record.id(), body).await?)
}

pub async fn delete<T: Record>(store: &dyn RemoteStore, id: &RecordId) -> StoreResult<()> {
    store.delete_by_id(T::COLLECTION, id).await
}
