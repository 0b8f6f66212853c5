use serde::{Deserialize, Serialize};
use time::Date;

use super::repo_types::{AccountStatus, Role};

/// Self-service registration form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
}

/// Admin "add employee" form.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccountRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
    pub salary: Option<f64>,
}

/// Admin edit form. Absent or blank values keep the current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
    pub status: Option<AccountStatus>,
}

/// Body POSTed to the accounts collection; the store assigns the id.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewAccount {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub position: String,
    #[serde(with = "crate::dates")]
    pub join_date: Date,
    pub salary: f64,
    pub status: AccountStatus,
    pub leave_allowance: u32,
    pub used_leaves: u32,
    pub avatar_url: String,
}
