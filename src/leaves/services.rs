use tracing::{info, instrument, warn};

use super::{
    dto::LeaveApplication,
    repo_types::{LeaveDecision, LeaveRequest, LeaveStatus, NewLeave},
};
use crate::{
    error::{HrError, HrResult},
    session::Session,
    snapshot::reload_after_mutation,
    state::AppState,
    store::{self, Collection, RecordId},
};

/// Files a pending leave request for the session's account, dated today.
#[instrument(skip(state, session, form), fields(account_id = %session.account_id(), kind = %form.kind))]
pub async fn submit_leave(
    state: &AppState,
    session: &Session,
    form: LeaveApplication,
) -> HrResult<LeaveRequest> {
    if form.kind.trim().is_empty() {
        return Err(HrError::Validation("leave type is required".into()));
    }
    if form.to_date < form.from_date {
        return Err(HrError::Validation(
            "leave cannot end before it starts".into(),
        ));
    }

    let body = NewLeave {
        account_id: session.account_id(),
        kind: form.kind.trim(),
        from_date: form.from_date,
        to_date: form.to_date,
        reason: &form.reason,
        status: LeaveStatus::Pending,
        applied_date: state.clock.today(),
    };
    let leave: LeaveRequest = store::create(state.store.as_ref(), &body).await?;
    state.snapshot.upsert(leave.clone()).await;
    info!(leave_id = %leave.id, days = leave.days(), "leave submitted");

    reload_after_mutation(state).await;
    Ok(leave)
}

/// Approves or rejects a leave request. Only `status` changes; the rest of
/// the record is sent back as it is in the snapshot.
#[instrument(skip(state, id), fields(leave_id = %id))]
pub async fn set_leave_status(
    state: &AppState,
    id: &RecordId,
    decision: LeaveDecision,
) -> HrResult<LeaveRequest> {
    let mut leave = state
        .snapshot
        .with(|s| s.leave(id).cloned())
        .await
        .ok_or_else(|| HrError::NotFound {
            collection: Collection::Leaves,
            id: id.clone(),
        })?;

    if leave.status != LeaveStatus::Pending {
        warn!(current = ?leave.status, "overwriting a decided leave request");
    }
    leave.status = decision.into();

    let saved = store::update(state.store.as_ref(), &leave).await?;
    state.snapshot.upsert(saved.clone()).await;
    info!(status = ?saved.status, "leave status set");

    reload_after_mutation(state).await;
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use serde_json::json;
    use time::macros::date;

    use super::*;
    use crate::{
        accounts::login,
        config::AppConfig,
        snapshot::reload,
        store::{delayed::DelayedStore, memory::MemoryStore},
    };

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .seed(
                Collection::Accounts,
                vec![json!({"id": 2, "username": "john", "password": "john123",
                            "role": "employee", "name": "John Doe"})],
            )
            .await;
        store
            .seed(
                Collection::Leaves,
                vec![json!({"id": 11, "accountId": 2, "type": "Annual Leave",
                            "fromDate": "2025-09-10", "toDate": "2025-09-12",
                            "reason": "trip", "status": "pending", "appliedDate": "2025-08-20"})],
            )
            .await;
        store
    }

    async fn seeded() -> (AppState, Arc<MemoryStore>) {
        let store = seeded_store().await;
        let state = AppState::fake(store.clone());
        reload(&state).await.unwrap();
        (state, store)
    }

    fn sick_day() -> LeaveApplication {
        LeaveApplication {
            kind: "Sick Leave".into(),
            from_date: date!(2025 - 09 - 01),
            to_date: date!(2025 - 09 - 01),
            reason: "flu".into(),
        }
    }

    #[tokio::test]
    async fn submitted_leave_is_pending_and_dated_today() {
        let (state, store) = seeded().await;
        let session = login(&state, "john", "john123").await.unwrap();
        let leave = submit_leave(&state, &session, sick_day()).await.unwrap();

        assert_eq!(leave.status, LeaveStatus::Pending);
        assert_eq!(leave.applied_date, date!(2025 - 08 - 30));
        assert_eq!(leave.account_id, RecordId::Int(2));
        assert_eq!(leave.days(), 1);
        assert_eq!(store.rows(Collection::Leaves).await.len(), 2);
        assert_eq!(state.snapshot.read().await.leaves.len(), 2);
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        let (state, store) = seeded().await;
        let session = login(&state, "john", "john123").await.unwrap();
        let err = submit_leave(
            &state,
            &session,
            LeaveApplication {
                kind: "Annual Leave".into(),
                from_date: date!(2025 - 09 - 05),
                to_date: date!(2025 - 09 - 01),
                reason: String::new(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, HrError::Validation(_)));
        assert_eq!(store.rows(Collection::Leaves).await.len(), 1);
    }

    #[tokio::test]
    async fn decision_changes_only_the_status() {
        let (state, store) = seeded().await;
        let before = state.snapshot.read().await.leave(&RecordId::Int(11)).cloned().unwrap();

        let after = set_leave_status(&state, &RecordId::Int(11), LeaveDecision::Approved)
            .await
            .unwrap();
        assert_eq!(after.status, LeaveStatus::Approved);
        assert_eq!(
            LeaveRequest {
                status: before.status,
                ..after.clone()
            },
            before
        );
        assert_eq!(store.rows(Collection::Leaves).await[0]["status"], "approved");
        assert_eq!(
            state.snapshot.read().await.leave(&RecordId::Int(11)).unwrap().status,
            LeaveStatus::Approved
        );

        // decided requests can still be overturned
        let again = set_leave_status(&state, &RecordId::Int(11), LeaveDecision::Rejected)
            .await
            .unwrap();
        assert_eq!(again.status, LeaveStatus::Rejected);
    }

    #[tokio::test]
    async fn unknown_leave_is_not_found() {
        let (state, _) = seeded().await;
        let err = set_leave_status(&state, &RecordId::Int(404), LeaveDecision::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(err, HrError::NotFound { .. }));
    }

    #[tokio::test]
    async fn configured_reload_follows_a_decision() {
        let (state, store) = seeded().await;
        let mut config = AppConfig::default();
        config.reload_after_mutation = true;
        let state = AppState {
            config: Arc::new(config),
            ..state
        };
        let before = store.calls().await.len();
        set_leave_status(&state, &RecordId::Int(11), LeaveDecision::Approved)
            .await
            .unwrap();
        let calls = store.calls().await;
        assert_eq!(calls.len() - before, 6);
        assert_eq!(calls[before], "PUT leaves/11");
    }

    #[tokio::test]
    async fn slow_submission_survives_a_newer_decision() {
        let store = seeded_store().await;
        let slow = DelayedStore {
            create: ms(100),
            ..DelayedStore::over(store.clone())
        };
        let state = AppState::fake_over(Arc::new(slow));
        reload(&state).await.unwrap();
        let session = login(&state, "john", "john123").await.unwrap();

        let (submitted, decided) = tokio::join!(submit_leave(&state, &session, sick_day()), async {
            tokio::time::sleep(ms(20)).await;
            set_leave_status(&state, &RecordId::Int(11), LeaveDecision::Rejected).await
        });
        let submitted = submitted.unwrap();
        decided.unwrap();

        let snap = state.snapshot.read().await;
        assert_eq!(snap.leaves.len(), 2);
        assert_eq!(snap.leave(&submitted.id).unwrap().status, LeaveStatus::Pending);
        assert_eq!(snap.leave(&RecordId::Int(11)).unwrap().status, LeaveStatus::Rejected);
    }

    #[tokio::test]
    async fn reload_issued_before_a_decision_does_not_revert_it() {
        let store = seeded_store().await;
        let slow = DelayedStore {
            list: ms(100),
            ..DelayedStore::over(store.clone())
        };
        let state = AppState::fake_over(Arc::new(slow));
        reload(&state).await.unwrap();

        let (reloaded, decided) = tokio::join!(reload(&state), async {
            tokio::time::sleep(ms(20)).await;
            set_leave_status(&state, &RecordId::Int(11), LeaveDecision::Approved).await
        });
        reloaded.unwrap();
        decided.unwrap();

        assert_eq!(
            state.snapshot.read().await.leave(&RecordId::Int(11)).unwrap().status,
            LeaveStatus::Approved
        );
        assert_eq!(store.rows(Collection::Leaves).await[0]["status"], "approved");
    }
}
