use std::{sync::Arc, time::Duration};

use time::macros::datetime;
use tokio::sync::Mutex;

use crate::accounts::CascadeLog;
use crate::clock::{Clock, FixedClock, SystemClock};
use crate::config::AppConfig;
use crate::session::{FileSessionStorage, MemorySessionStorage, SessionStorage};
use crate::snapshot::SnapshotCell;
use crate::store::{http::HttpStore, memory::MemoryStore, RemoteStore};

/// Everything the core operations need, passed explicitly to each of them.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn RemoteStore>,
    pub sessions: Arc<dyn SessionStorage>,
    pub clock: Arc<dyn Clock>,
    pub snapshot: Arc<SnapshotCell>,
    /// Dependent deletes that failed during a cascade, awaiting retry.
    pub(crate) cascades: Arc<Mutex<Vec<CascadeLog>>>,
    pub(crate) auto_mark: Arc<Mutex<()>>,
}

impl AppState {
    pub fn init(config: AppConfig) -> anyhow::Result<Self> {
        let store = HttpStore::new(
            &config.api_url,
            Duration::from_secs(config.http_timeout_secs),
        )?;
        let sessions = FileSessionStorage::new(config.session_file.clone());
        Ok(Self::from_parts(
            Arc::new(config),
            Arc::new(store),
            Arc::new(sessions),
            Arc::new(SystemClock),
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn RemoteStore>,
        sessions: Arc<dyn SessionStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store,
            sessions,
            clock,
            snapshot: Arc::new(SnapshotCell::new()),
            cascades: Arc::new(Mutex::new(Vec::new())),
            auto_mark: Arc::new(Mutex::new(())),
        }
    }

    /// In-process state over `store`, with in-memory session storage and
    /// the clock pinned to 2025-08-30 09:15 UTC.
    pub fn fake(store: Arc<MemoryStore>) -> Self {
        Self::fake_over(store)
    }

    /// Same as [`AppState::fake`] over any store.
    pub fn fake_over(store: Arc<dyn RemoteStore>) -> Self {
        Self::from_parts(
            Arc::new(AppConfig::default()),
            store,
            Arc::new(MemorySessionStorage::default()),
            Arc::new(FixedClock(datetime!(2025-08-30 09:15 UTC))),
        )
    }
}
