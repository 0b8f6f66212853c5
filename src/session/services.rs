use tracing::{info, instrument, warn};

use super::Session;
use crate::{
    error::{HrError, HrResult},
    snapshot,
    state::AppState,
};

/// Result of process start-up.
#[derive(Debug)]
pub struct Bootstrap {
    /// Restored from durable storage; not re-validated against the store.
    pub session: Option<Session>,
    /// Set when the initial full reload failed. The session is unaffected.
    pub reload_error: Option<HrError>,
}

/// Restores a persisted session if there is one, then reloads all
/// collections regardless of the outcome.
#[instrument(skip(state))]
pub async fn bootstrap_session(state: &AppState) -> Bootstrap {
    let session = match state.sessions.load() {
        Ok(Some(account)) => {
            info!(account_id = %account.id, username = %account.username, "session restored");
            Some(Session::restore(account, state.clock.now()))
        }
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "persisted session unreadable; starting logged out");
            None
        }
    };

    let reload_error = snapshot::reload(state).await.err();
    Bootstrap {
        session,
        reload_error,
    }
}

/// Ends the session and clears durable storage.
#[instrument(skip(state, session), fields(account_id = %session.account_id()))]
pub fn logout(state: &AppState, session: Session) -> HrResult<()> {
    drop(session);
    state.sessions.clear()?;
    info!("logged out");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::{
        accounts::Account,
        store::{memory::MemoryStore, Collection},
    };

    fn persisted() -> Account {
        serde_json::from_value(json!({"id": 1, "username": "admin", "role": "admin", "name": "Admin"}))
            .unwrap()
    }

    #[tokio::test]
    async fn bootstrap_restores_without_round_trip_and_reloads() {
        let store = Arc::new(MemoryStore::new());
        store
            .seed(Collection::Departments, vec![json!({"id": 1, "name": "HR", "employeeCount": 3})])
            .await;
        let state = AppState::fake(store.clone());
        state.sessions.save(&persisted()).unwrap();

        let boot = bootstrap_session(&state).await;
        let session = boot.session.expect("restored");
        assert!(session.is_restored());
        assert_eq!(session.account().username, "admin");
        assert!(boot.reload_error.is_none());
        assert_eq!(state.snapshot.read().await.departments.len(), 1);

        let calls = store.calls().await;
        assert_eq!(calls.len(), 5);
        assert!(calls.iter().all(|c| c.starts_with("GET ")));
    }

    #[tokio::test]
    async fn bootstrap_reports_reload_failure_but_keeps_session() {
        let store = Arc::new(MemoryStore::new());
        store.set_offline(true).await;
        let state = AppState::fake(store);
        state.sessions.save(&persisted()).unwrap();

        let boot = bootstrap_session(&state).await;
        assert!(boot.session.is_some());
        assert!(matches!(boot.reload_error, Some(HrError::Transport(_))));
    }

    #[tokio::test]
    async fn logout_clears_durable_storage() {
        let state = AppState::fake(Arc::new(MemoryStore::new()));
        state.sessions.save(&persisted()).unwrap();
        let session = bootstrap_session(&state).await.session.unwrap();

        logout(&state, session).unwrap();
        assert!(state.sessions.load().unwrap().is_none());
        assert!(bootstrap_session(&state).await.session.is_none());
    }
}
