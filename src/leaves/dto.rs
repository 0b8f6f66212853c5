use serde::Deserialize;
use time::Date;

/// Leave request form filled in by the logged-in employee.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveApplication {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(with = "crate::dates")]
    pub from_date: Date,
    #[serde(with = "crate::dates")]
    pub to_date: Date,
    #[serde(default)]
    pub reason: String,
}
