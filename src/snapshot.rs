//! The client's replicated copy of the five collections.
//!
//! Whole-collection listings are admitted by ticket: a ticket is taken when
//! the listing is issued, and a collection never accepts one older than the
//! newest it has already applied. Record-level patches from create, update
//! and delete responses always apply and are laid back over any listing
//! issued before they landed. Responses that resolve out of issue order
//! therefore cannot roll the snapshot back or lose a patch.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::{
    accounts::Account,
    attendance::AttendanceRecord,
    departments::Department,
    error::{HrError, HrResult},
    leaves::LeaveRequest,
    payroll::PayrollRecord,
    state::AppState,
    store::{self, Collection, Record, RecordId},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub accounts: Vec<Account>,
    pub attendance: Vec<AttendanceRecord>,
    pub leaves: Vec<LeaveRequest>,
    pub payroll: Vec<PayrollRecord>,
    pub departments: Vec<Department>,
}

impl Snapshot {
    pub fn account(&self, id: &RecordId) -> Option<&Account> {
        self.accounts.iter().find(|a| &a.id == id)
    }

    pub fn leave(&self, id: &RecordId) -> Option<&LeaveRequest> {
        self.leaves.iter().find(|l| &l.id == id)
    }
}

/// Entity types that have a home in [`Snapshot`].
pub trait Tracked: Record {
    fn rows(snapshot: &Snapshot) -> &Vec<Self>;
    fn rows_mut(snapshot: &mut Snapshot) -> &mut Vec<Self>;
}

macro_rules! tracked {
    ($ty:ty, $field:ident) => {
        impl Tracked for $ty {
            fn rows(snapshot: &Snapshot) -> &Vec<Self> {
                &snapshot.$field
            }
            fn rows_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
                &mut snapshot.$field
            }
        }
    };
}

tracked!(Account, accounts);
tracked!(AttendanceRecord, attendance);
tracked!(LeaveRequest, leaves);
tracked!(PayrollRecord, payroll);
tracked!(Department, departments);

/// Issue-order stamp for a whole-collection write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

type ApplyFn = Box<dyn Fn(&mut Snapshot) + Send + Sync>;

/// A record-level write kept around so it can be laid back over a
/// whole-collection write that was issued before it landed.
struct Patch {
    stamp: u64,
    collection: Collection,
    apply: ApplyFn,
}

impl fmt::Debug for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Patch")
            .field("stamp", &self.stamp)
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct Guarded {
    snapshot: Snapshot,
    /// Newest whole-collection ticket applied, per collection.
    replaced: [u64; 5],
    patches: Vec<Patch>,
}

impl Guarded {
    fn admit(&mut self, collection: Collection, ticket: Ticket) -> bool {
        let newest = &mut self.replaced[collection.index()];
        if ticket.0 < *newest {
            debug!(%collection, ticket = ticket.0, newest = *newest, "dropping stale collection write");
            return false;
        }
        *newest = ticket.0;
        // Any later replacement carries a ticket >= this one, so patches
        // stamped at or before it will never be replayed again.
        self.patches
            .retain(|p| p.collection != collection || p.stamp > ticket.0);
        true
    }

    /// Re-applies patches that landed after `ticket` was issued; the rows
    /// just written may predate them.
    fn replay(&mut self, collection: Collection, ticket: Ticket) {
        let Guarded {
            snapshot, patches, ..
        } = self;
        for patch in patches
            .iter()
            .filter(|p| p.collection == collection && p.stamp > ticket.0)
        {
            (patch.apply)(&mut *snapshot);
        }
    }

    fn record(&mut self, stamp: u64, collection: Collection, apply: ApplyFn) {
        apply(&mut self.snapshot);
        self.patches.push(Patch {
            stamp,
            collection,
            apply,
        });
    }

    fn replace_rows<T: Tracked>(&mut self, ticket: Ticket, rows: Vec<T>) -> bool {
        if !self.admit(T::COLLECTION, ticket) {
            return false;
        }
        *T::rows_mut(&mut self.snapshot) = rows;
        self.replay(T::COLLECTION, ticket);
        true
    }
}

fn upsert_row<T: Tracked>(rows: &mut Vec<T>, row: T) {
    match rows.iter_mut().find(|r| r.id() == row.id()) {
        Some(slot) => *slot = row,
        None => rows.push(row),
    }
}

/// The snapshot behind a lock, plus the issuer of [`Ticket`]s.
///
/// Whole-collection writes (`replace`, reload) are ordered by ticket: an
/// older one never overwrites a newer one. Record-level writes (`upsert`,
/// `remove`) always apply, since they carry a server response for one id,
/// and are replayed over any whole-collection write issued before they
/// landed.
#[derive(Debug, Default)]
pub struct SnapshotCell {
    inner: RwLock<Guarded>,
    issued: AtomicU64,
}

impl SnapshotCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a ticket. Call it before the request whose response will be
    /// passed to [`SnapshotCell::replace`].
    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub async fn read(&self) -> Snapshot {
        self.inner.read().await.snapshot.clone()
    }

    /// Runs `f` against the snapshot without cloning it.
    pub async fn with<R>(&self, f: impl FnOnce(&Snapshot) -> R) -> R {
        f(&self.inner.read().await.snapshot)
    }

    /// Swaps in a freshly listed collection. Returns false when a newer
    /// listing has already been applied.
    pub async fn replace<T: Tracked>(&self, ticket: Ticket, rows: Vec<T>) -> bool {
        self.inner.write().await.replace_rows(ticket, rows)
    }

    /// Replaces the row with the same id, or appends it.
    pub async fn upsert<T: Tracked>(&self, row: T) {
        let mut guard = self.inner.write().await;
        let stamp = self.issue().0;
        guard.record(
            stamp,
            T::COLLECTION,
            Box::new(move |s: &mut Snapshot| upsert_row(T::rows_mut(s), row.clone())),
        );
    }

    pub async fn remove<T: Tracked>(&self, ids: &[RecordId]) {
        if ids.is_empty() {
            return;
        }
        let ids = ids.to_vec();
        let mut guard = self.inner.write().await;
        let stamp = self.issue().0;
        guard.record(
            stamp,
            T::COLLECTION,
            Box::new(move |s: &mut Snapshot| T::rows_mut(s).retain(|r| !ids.contains(r.id()))),
        );
    }

    async fn apply_all(&self, ticket: Ticket, fresh: Snapshot) {
        let mut guard = self.inner.write().await;
        let Snapshot {
            accounts,
            attendance,
            leaves,
            payroll,
            departments,
        } = fresh;
        guard.replace_rows(ticket, accounts);
        guard.replace_rows(ticket, attendance);
        guard.replace_rows(ticket, leaves);
        guard.replace_rows(ticket, payroll);
        guard.replace_rows(ticket, departments);
    }
}

/// Fetches all five collections and swaps them in. A failure on any
/// collection leaves the whole snapshot untouched.
#[instrument(skip(state))]
pub async fn reload(state: &AppState) -> HrResult<()> {
    let ticket = state.snapshot.issue();
    let s = state.store.as_ref();
    let fetched = tokio::try_join!(
        store::list::<Account>(s),
        store::list::<AttendanceRecord>(s),
        store::list::<LeaveRequest>(s),
        store::list::<PayrollRecord>(s),
        store::list::<Department>(s),
    );
    let (accounts, attendance, leaves, payroll, departments) = fetched.map_err(|e| {
        warn!(error = %e, "reload failed; keeping previous snapshot");
        HrError::from(e)
    })?;

    info!(
        accounts = accounts.len(),
        attendance = attendance.len(),
        leaves = leaves.len(),
        payroll = payroll.len(),
        departments = departments.len(),
        "snapshot reloaded"
    );
    state
        .snapshot
        .apply_all(
            ticket,
            Snapshot {
                accounts,
                attendance,
                leaves,
                payroll,
                departments,
            },
        )
        .await;
    Ok(())
}

/// Reload issued after a mutation when configured to do so. The mutation
/// already succeeded, so a failed reload is only logged.
pub(crate) async fn reload_after_mutation(state: &AppState) {
    if !state.config.reload_after_mutation {
        return;
    }
    if let Err(e) = reload(state).await {
        warn!(error = %e, "post-mutation reload failed");
    }
}
