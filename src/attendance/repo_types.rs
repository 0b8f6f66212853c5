use std::fmt;

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use time::{macros::format_description, Date, Time};

use crate::store::{Collection, Record, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

/// A check-in/check-out time, or `-` when none was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockMark {
    At(Time),
    #[default]
    Unset,
}

impl ClockMark {
    pub fn time(self) -> Option<Time> {
        match self {
            ClockMark::At(t) => Some(t),
            ClockMark::Unset => None,
        }
    }
}

impl fmt::Display for ClockMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockMark::At(t) => write!(f, "{:02}:{:02}", t.hour(), t.minute()),
            ClockMark::Unset => f.write_str("-"),
        }
    }
}

impl Serialize for ClockMark {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockMark {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        let raw = raw.trim();
        if raw.is_empty() || raw == "-" {
            return Ok(ClockMark::Unset);
        }
        Time::parse(raw, format_description!("[hour]:[minute]"))
            .or_else(|_| Time::parse(raw, format_description!("[hour]:[minute]:[second]")))
            .map(ClockMark::At)
            .map_err(|e| D::Error::custom(format!("invalid time of day {raw:?}: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: RecordId,
    #[serde(alias = "userId")]
    pub account_id: RecordId,
    #[serde(with = "crate::dates")]
    pub date: Date,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub check_in: ClockMark,
    #[serde(default)]
    pub check_out: ClockMark,
}

impl Record for AttendanceRecord {
    const COLLECTION: Collection = Collection::Attendance;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewAttendance<'a> {
    pub account_id: &'a RecordId,
    #[serde(with = "crate::dates")]
    pub date: Date,
    pub status: AttendanceStatus,
    pub check_in: ClockMark,
    pub check_out: ClockMark,
}
