use tracing::{info, instrument, warn};

use super::repo_types::Account;
use crate::{
    attendance::AttendanceRecord,
    error::{HrError, HrResult, StoreError},
    leaves::LeaveRequest,
    payroll::PayrollRecord,
    snapshot::{reload_after_mutation, Snapshot},
    state::AppState,
    store::{Collection, RecordId},
};

/// Dependent records of a deleted account that are still on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeLog {
    pub account_id: RecordId,
    pub pending: Vec<(Collection, RecordId)>,
}

fn dependents(snapshot: &Snapshot, account_id: &RecordId) -> Vec<(Collection, RecordId)> {
    let attendance = snapshot
        .attendance
        .iter()
        .filter(|r| &r.account_id == account_id)
        .map(|r| (Collection::Attendance, r.id.clone()));
    let leaves = snapshot
        .leaves
        .iter()
        .filter(|r| &r.account_id == account_id)
        .map(|r| (Collection::Leaves, r.id.clone()));
    let payroll = snapshot
        .payroll
        .iter()
        .filter(|r| &r.account_id == account_id)
        .map(|r| (Collection::Payroll, r.id.clone()));
    attendance.chain(leaves).chain(payroll).collect()
}

/// Issues every delete in `targets` and returns the ones that failed.
/// `NotFound` counts as deleted. Successes are dropped from the snapshot.
async fn delete_all(
    state: &AppState,
    targets: Vec<(Collection, RecordId)>,
) -> Vec<(Collection, RecordId)> {
    let mut removed: Vec<(Collection, RecordId)> = Vec::new();
    let mut failed = Vec::new();
    for (collection, id) in targets {
        match state.store.delete_by_id(collection, &id).await {
            Ok(()) | Err(StoreError::NotFound { .. }) => removed.push((collection, id)),
            Err(e) => {
                warn!(%collection, %id, error = %e, "dependent delete failed");
                failed.push((collection, id));
            }
        }
    }

    let ids_in = |c: Collection| -> Vec<RecordId> {
        removed
            .iter()
            .filter(|(rc, _)| *rc == c)
            .map(|(_, id)| id.clone())
            .collect()
    };
    state
        .snapshot
        .remove::<AttendanceRecord>(&ids_in(Collection::Attendance))
        .await;
    state
        .snapshot
        .remove::<LeaveRequest>(&ids_in(Collection::Leaves))
        .await;
    state
        .snapshot
        .remove::<PayrollRecord>(&ids_in(Collection::Payroll))
        .await;
    failed
}

/// Deletes an account and every attendance, leave and payroll record that
/// references it.
///
/// The account goes first; if that fails nothing else is touched. After
/// that every dependent delete is attempted. Any that fail are kept for
/// [`retry_pending_cascades`] and reported as
/// [`HrError::PartialCascadeFailure`].
#[instrument(skip(state, account_id), fields(account_id = %account_id))]
pub async fn delete_account_cascade(state: &AppState, account_id: &RecordId) -> HrResult<()> {
    let targets = state.snapshot.with(|s| dependents(s, account_id)).await;

    state
        .store
        .delete_by_id(Collection::Accounts, account_id)
        .await?;
    state
        .snapshot
        .remove::<Account>(std::slice::from_ref(account_id))
        .await;

    let total = targets.len();
    let failed = delete_all(state, targets).await;
    reload_after_mutation(state).await;

    if failed.is_empty() {
        info!(dependents = total, "account deleted");
        return Ok(());
    }

    let count = failed.len();
    warn!(failed = count, dependents = total, "account deleted with dependents left behind");
    state.cascades.lock().await.push(CascadeLog {
        account_id: account_id.clone(),
        pending: failed,
    });
    Err(HrError::PartialCascadeFailure {
        account_id: account_id.clone(),
        failed: count,
    })
}

/// Re-issues logged dependent deletes. Returns how many are still pending.
#[instrument(skip(state))]
pub async fn retry_pending_cascades(state: &AppState) -> HrResult<usize> {
    let logs = std::mem::take(&mut *state.cascades.lock().await);
    if logs.is_empty() {
        return Ok(0);
    }

    let mut still_pending = Vec::new();
    for log in logs {
        let failed = delete_all(state, log.pending).await;
        if failed.is_empty() {
            info!(account_id = %log.account_id, "cascade completed on retry");
        } else {
            still_pending.push(CascadeLog {
                account_id: log.account_id,
                pending: failed,
            });
        }
    }

    let remaining = still_pending.iter().map(|l| l.pending.len()).sum();
    state.cascades.lock().await.extend(still_pending);
    Ok(remaining)
}

pub async fn pending_cascades(state: &AppState) -> Vec<CascadeLog> {
    state.cascades.lock().await.clone()
}

/// Logs snapshot records whose account no longer exists, so that a fresh
/// process can finish cascades an earlier one left behind. Returns how many
/// records were added to the log.
#[instrument(skip(state))]
pub async fn adopt_orphans(state: &AppState) -> usize {
    let orphans = state
        .snapshot
        .with(|s| {
            let owners = s
                .attendance
                .iter()
                .map(|r| &r.account_id)
                .chain(s.leaves.iter().map(|r| &r.account_id))
                .chain(s.payroll.iter().map(|r| &r.account_id));
            let mut gone: Vec<RecordId> = Vec::new();
            for owner in owners {
                if s.account(owner).is_none() && !gone.contains(owner) {
                    gone.push(owner.clone());
                }
            }
            gone.into_iter()
                .map(|account_id| CascadeLog {
                    pending: dependents(s, &account_id),
                    account_id,
                })
                .collect::<Vec<_>>()
        })
        .await;

    let mut logs = state.cascades.lock().await;
    let mut added = 0;
    for orphan in orphans {
        if logs.iter().any(|l| l.account_id == orphan.account_id) {
            continue;
        }
        added += orphan.pending.len();
        logs.push(orphan);
    }
    if added > 0 {
        info!(records = added, "orphaned records queued for deletion");
    }
    added
}
