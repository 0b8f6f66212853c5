use std::fmt;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::store::{Collection, Record, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
}

fn default_leave_allowance() -> u32 {
    12
}

/// Account record in the `accounts` collection.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: RecordId,
    pub username: String,
    /// argon2 PHC string, or a legacy plaintext value. Empty in persisted sessions.
    #[serde(default)]
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
    #[serde(default, with = "crate::dates::option")]
    pub join_date: Option<Date>,
    #[serde(default)]
    pub salary: f64,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default = "default_leave_allowance", alias = "leaves")]
    pub leave_allowance: u32,
    #[serde(default)]
    pub used_leaves: u32,
    #[serde(default, alias = "photoUrl", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Account {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_active_employee(&self) -> bool {
        self.role == Role::Employee && self.status == AccountStatus::Active
    }

    pub fn remaining_leaves(&self) -> u32 {
        self.leave_allowance.saturating_sub(self.used_leaves)
    }

    /// Copy without the credential, for anything that leaves the process
    /// other than the store itself.
    pub fn redacted(&self) -> Account {
        Account {
            password: String::new(),
            ..self.clone()
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("role", &self.role)
            .field("name", &self.name)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl Record for Account {
    const COLLECTION: Collection = Collection::Accounts;

    fn id(&self) -> &RecordId {
        &self.id
    }
}
