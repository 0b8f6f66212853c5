use time::Duration;
use tracing::{debug, info, instrument};

use super::repo_types::{AttendanceRecord, AttendanceStatus, ClockMark, NewAttendance};
use crate::{
    error::HrResult,
    state::AppState,
    store::{self, RecordId},
};

/// Creates today's attendance record for `account_id` unless the snapshot
/// already holds one. Returns the created record, or `None` when nothing
/// had to be done.
#[instrument(skip(state, account_id), fields(account_id = %account_id))]
pub async fn auto_mark_attendance(
    state: &AppState,
    account_id: &RecordId,
) -> HrResult<Option<AttendanceRecord>> {
    // Check-then-create must not interleave with another auto-mark.
    let _guard = state.auto_mark.lock().await;

    let today = state.clock.today();
    let exists = state
        .snapshot
        .with(|s| {
            s.attendance
                .iter()
                .any(|a| &a.account_id == account_id && a.date == today)
        })
        .await;
    if exists {
        debug!("attendance already recorded today");
        return Ok(None);
    }

    let body = NewAttendance {
        account_id,
        date: today,
        status: AttendanceStatus::Present,
        check_in: ClockMark::At(state.clock.time_of_day()),
        check_out: ClockMark::Unset,
    };
    let record: AttendanceRecord = store::create(state.store.as_ref(), &body).await?;
    state.snapshot.upsert(record.clone()).await;

    info!(record_id = %record.id, check_in = %record.check_in, "attendance auto-marked");
    Ok(Some(record))
}

/// Today's status for an account; no record means absent.
pub async fn today_status(state: &AppState, account_id: &RecordId) -> AttendanceStatus {
    let today = state.clock.today();
    state
        .snapshot
        .with(|s| {
            s.attendance
                .iter()
                .find(|a| &a.account_id == account_id && a.date == today)
                .map(|a| a.status)
                .unwrap_or(AttendanceStatus::Absent)
        })
        .await
}

/// Time between check-in and check-out. `None` until both are set, or if
/// check-out precedes check-in.
pub fn working_hours(record: &AttendanceRecord) -> Option<Duration> {
    let (start, end) = (record.check_in.time()?, record.check_out.time()?);
    let span = end - start;
    (!span.is_negative()).then_some(span)
}

/// Renders a duration as `"{h}h {m}m"`, or `-` for `None`.
pub fn format_hours(span: Option<Duration>) -> String {
    match span {
        Some(d) => format!("{}h {}m", d.whole_hours(), d.whole_minutes() % 60),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use time::macros::{date, time};

    use super::*;
    use crate::store::{memory::MemoryStore, Collection};

    fn record(check_in: ClockMark, check_out: ClockMark) -> AttendanceRecord {
        AttendanceRecord {
            id: RecordId::Int(1),
            account_id: RecordId::Int(2),
            date: date!(2025 - 08 - 30),
            status: AttendanceStatus::Present,
            check_in,
            check_out,
        }
    }

    #[tokio::test]
    async fn second_auto_mark_same_day_is_a_no_op() {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::fake(store.clone());
        let account = RecordId::Int(2);

        let first = auto_mark_attendance(&state, &account).await.unwrap();
        let created = first.expect("first call creates");
        assert_eq!(created.date, date!(2025 - 08 - 30));
        assert_eq!(created.status, AttendanceStatus::Present);
        assert_eq!(created.check_out, ClockMark::Unset);
        assert_eq!(created.check_in, ClockMark::At(time!(09:15)));

        assert!(auto_mark_attendance(&state, &account).await.unwrap().is_none());
        assert_eq!(store.rows(Collection::Attendance).await.len(), 1);
        assert_eq!(state.snapshot.read().await.attendance.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_auto_marks_create_one_record() {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::fake(store.clone());
        let account = RecordId::Int(7);

        let (a, b) = tokio::join!(
            auto_mark_attendance(&state, &account),
            auto_mark_attendance(&state, &account)
        );
        assert_eq!(
            [a.unwrap().is_some(), b.unwrap().is_some()].iter().filter(|x| **x).count(),
            1
        );
        assert_eq!(store.rows(Collection::Attendance).await.len(), 1);
    }

    #[tokio::test]
    async fn yesterdays_record_does_not_count() {
        let store = Arc::new(MemoryStore::new());
        store
            .seed(
                Collection::Attendance,
                vec![json!({"id": 3, "accountId": 2, "date": "2025-08-29", "status": "present",
                            "checkIn": "09:00", "checkOut": "17:00"})],
            )
            .await;
        let state = AppState::fake(store.clone());
        crate::snapshot::reload(&state).await.unwrap();

        assert_eq!(today_status(&state, &RecordId::Int(2)).await, AttendanceStatus::Absent);
        assert!(auto_mark_attendance(&state, &RecordId::Int(2)).await.unwrap().is_some());
        assert_eq!(today_status(&state, &RecordId::Int(2)).await, AttendanceStatus::Present);
    }

    #[tokio::test]
    async fn failed_create_leaves_snapshot_alone() {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::fake(store.clone());
        store.set_offline(true).await;
        assert!(auto_mark_attendance(&state, &RecordId::Int(2)).await.is_err());
        assert!(state.snapshot.read().await.attendance.is_empty());
    }

    #[test]
    fn working_hours_needs_both_marks() {
        let open = record(ClockMark::At(time!(9:00)), ClockMark::Unset);
        assert_eq!(working_hours(&open), None);
        assert_eq!(format_hours(working_hours(&open)), "-");

        let closed = record(ClockMark::At(time!(9:40)), ClockMark::At(time!(17:10)));
        assert_eq!(format_hours(working_hours(&closed)), "7h 30m");

        let inverted = record(ClockMark::At(time!(17:00)), ClockMark::At(time!(9:00)));
        assert_eq!(working_hours(&inverted), None);
    }
}
