use serde::{Deserialize, Serialize};
use time::Date;

use crate::store::{Collection, Record, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// The only statuses an admin may set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveDecision {
    Approved,
    Rejected,
}

impl From<LeaveDecision> for LeaveStatus {
    fn from(d: LeaveDecision) -> Self {
        match d {
            LeaveDecision::Approved => LeaveStatus::Approved,
            LeaveDecision::Rejected => LeaveStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: RecordId,
    #[serde(alias = "userId")]
    pub account_id: RecordId,
    /// Free-form category ("Sick Leave", "Annual Leave", ...).
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(alias = "from", with = "crate::dates")]
    pub from_date: Date,
    #[serde(alias = "to", with = "crate::dates")]
    pub to_date: Date,
    #[serde(default)]
    pub reason: String,
    pub status: LeaveStatus,
    #[serde(with = "crate::dates")]
    pub applied_date: Date,
}

impl LeaveRequest {
    /// Inclusive length in calendar days.
    pub fn days(&self) -> i64 {
        (self.to_date - self.from_date).whole_days() + 1
    }
}

impl Record for LeaveRequest {
    const COLLECTION: Collection = Collection::Leaves;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewLeave<'a> {
    pub account_id: &'a RecordId,
    #[serde(rename = "type")]
    pub kind: &'a str,
    #[serde(with = "crate::dates")]
    pub from_date: Date,
    #[serde(with = "crate::dates")]
    pub to_date: Date,
    pub reason: &'a str,
    pub status: LeaveStatus,
    #[serde(with = "crate::dates")]
    pub applied_date: Date,
}
