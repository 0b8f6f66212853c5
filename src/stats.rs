//! Aggregates recomputed from the snapshot on every call.

use serde::Serialize;
use time::Date;

use crate::{
    accounts::{AccountStatus, Role},
    attendance::{AttendanceRecord, AttendanceStatus},
    leaves::{LeaveRequest, LeaveStatus},
    payroll::PayrollRecord,
    snapshot::Snapshot,
    state::AppState,
    store::RecordId,
};

/// Dashboard headline figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_employees: usize,
    pub active_employees: usize,
    pub present_today: usize,
    pub pending_leaves: usize,
    /// Sum of `net_pay` over every payroll record held, across all months.
    pub total_payroll: f64,
}

impl Statistics {
    pub fn from_snapshot(snapshot: &Snapshot, today: Date) -> Self {
        let employees = snapshot.accounts.iter().filter(|a| a.role == Role::Employee);
        Self {
            total_employees: employees.clone().count(),
            active_employees: employees
                .filter(|a| a.status == AccountStatus::Active)
                .count(),
            present_today: snapshot
                .attendance
                .iter()
                .filter(|r| r.date == today && r.status == AttendanceStatus::Present)
                .count(),
            pending_leaves: snapshot
                .leaves
                .iter()
                .filter(|l| l.status == LeaveStatus::Pending)
                .count(),
            total_payroll: snapshot.payroll.iter().map(|p| p.net_pay).sum(),
        }
    }
}

pub async fn compute_statistics(state: &AppState) -> Statistics {
    let today = state.clock.today();
    state
        .snapshot
        .with(|s| Statistics::from_snapshot(s, today))
        .await
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceBreakdown {
    pub present: usize,
    pub absent: usize,
    pub late: usize,
}

impl AttendanceBreakdown {
    pub fn total(&self) -> usize {
        self.present + self.absent + self.late
    }
}

/// Present / absent / late counts across every attendance record held.
pub async fn attendance_breakdown(state: &AppState) -> AttendanceBreakdown {
    state
        .snapshot
        .with(|s| {
            s.attendance
                .iter()
                .fold(AttendanceBreakdown::default(), |mut acc, r| {
                    match r.status {
                        AttendanceStatus::Present => acc.present += 1,
                        AttendanceStatus::Absent => acc.absent += 1,
                        AttendanceStatus::Late => acc.late += 1,
                    }
                    acc
                })
        })
        .await
}

/// One account's slice of the snapshot, as shown on the employee pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccountRecords {
    pub attendance: Vec<AttendanceRecord>,
    pub leaves: Vec<LeaveRequest>,
    pub payroll: Vec<PayrollRecord>,
}

pub async fn account_records(state: &AppState, account_id: &RecordId) -> AccountRecords {
    state
        .snapshot
        .with(|s| AccountRecords {
            attendance: s
                .attendance
                .iter()
                .filter(|r| &r.account_id == account_id)
                .cloned()
                .collect(),
            leaves: s
                .leaves
                .iter()
                .filter(|r| &r.account_id == account_id)
                .cloned()
                .collect(),
            payroll: s
                .payroll
                .iter()
                .filter(|r| &r.account_id == account_id)
                .cloned()
                .collect(),
        })
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::{
        snapshot::reload,
        store::{memory::MemoryStore, Collection},
    };

    async fn dashboard() -> AppState {
        let store = Arc::new(MemoryStore::new());
        store
            .seed(
                Collection::Accounts,
                vec![
                    json!({"id": 1, "username": "admin", "role": "admin", "name": "Admin"}),
                    json!({"id": 2, "username": "john", "role": "employee", "name": "John"}),
                    json!({"id": 3, "username": "jane", "role": "employee", "name": "Jane",
                           "status": "inactive"}),
                ],
            )
            .await;
        store
            .seed(
                Collection::Attendance,
                vec![
                    json!({"id": 10, "accountId": 2, "date": "2025-08-30", "status": "present",
                           "checkIn": "09:00", "checkOut": "-"}),
                    json!({"id": 11, "accountId": 3, "date": "2025-08-30", "status": "late",
                           "checkIn": "10:20", "checkOut": "-"}),
                    json!({"id": 12, "accountId": 2, "date": "2025-08-29", "status": "present",
                           "checkIn": "09:00", "checkOut": "17:00"}),
                    json!({"id": 13, "accountId": 3, "date": "2025-08-29", "status": "absent"}),
                ],
            )
            .await;
        store
            .seed(
                Collection::Leaves,
                vec![
                    json!({"id": 20, "accountId": 2, "type": "Sick Leave", "fromDate": "2025-09-01",
                           "toDate": "2025-09-01", "status": "pending", "appliedDate": "2025-08-29"}),
                    json!({"id": 21, "accountId": 3, "type": "Annual Leave", "fromDate": "2025-07-01",
                           "toDate": "2025-07-04", "status": "approved", "appliedDate": "2025-06-01"}),
                ],
            )
            .await;
        store
            .seed(
                Collection::Payroll,
                vec![
                    json!({"id": 30, "accountId": 2, "month": "2025-07", "netPay": 4200.5, "status": "paid"}),
                    json!({"id": 31, "accountId": 2, "month": "2025-08", "netPay": 4300.0, "status": "pending"}),
                    json!({"id": 32, "accountId": 3, "month": "2025-08", "netPay": 3900.0, "status": "pending"}),
                ],
            )
            .await;
        let state = AppState::fake(store);
        reload(&state).await.unwrap();
        state
    }

    #[tokio::test]
    async fn headline_figures() {
        let state = dashboard().await;
        let stats = compute_statistics(&state).await;
        assert_eq!(
            stats,
            Statistics {
                total_employees: 2,
                active_employees: 1,
                present_today: 1,
                pending_leaves: 1,
                total_payroll: 12_400.5,
            }
        );
    }

    #[tokio::test]
    async fn statistics_are_stable_without_mutation() {
        let state = dashboard().await;
        assert_eq!(compute_statistics(&state).await, compute_statistics(&state).await);
    }

    #[tokio::test]
    async fn empty_snapshot_is_all_zero() {
        let state = AppState::fake(Arc::new(MemoryStore::new()));
        let stats = compute_statistics(&state).await;
        assert_eq!(stats.total_employees, 0);
        assert_eq!(stats.total_payroll, 0.0);
        assert_eq!(attendance_breakdown(&state).await.total(), 0);
    }

    #[tokio::test]
    async fn breakdown_counts_every_record() {
        let state = dashboard().await;
        assert_eq!(
            attendance_breakdown(&state).await,
            AttendanceBreakdown {
                present: 2,
                absent: 1,
                late: 1,
            }
        );
    }

    #[tokio::test]
    async fn per_account_slice() {
        let state = dashboard().await;
        let john = account_records(&state, &RecordId::Int(2)).await;
        assert_eq!(john.attendance.len(), 2);
        assert_eq!(john.leaves.len(), 1);
        assert_eq!(john.payroll.len(), 2);

        let nobody = account_records(&state, &RecordId::from("99")).await;
        assert_eq!(nobody, AccountRecords::default());
    }
}
