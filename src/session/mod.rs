//! Authenticated session lifecycle.
//!
//! A [`Session`] is created by `login` or by `bootstrap_session` and ends
//! when it is handed to `logout`. Nothing global holds it; callers pass it
//! to the operations that act on behalf of the logged-in account.

mod services;
mod storage;

use time::OffsetDateTime;

use crate::{accounts::Account, store::RecordId};

pub use services::{bootstrap_session, logout, Bootstrap};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};

#[derive(Debug, Clone)]
pub struct Session {
    account: Account,
    started_at: OffsetDateTime,
    restored: bool,
}

impl Session {
    pub(crate) fn start(account: Account, now: OffsetDateTime) -> Self {
        Self {
            account,
            started_at: now,
            restored: false,
        }
    }

    pub(crate) fn restore(account: Account, now: OffsetDateTime) -> Self {
        Self {
            restored: true,
            ..Self::start(account, now)
        }
    }

    /// The matched account record as it was at login, credential included.
    /// Storage only ever receives it redacted, so a restored session has an
    /// empty password. It is not refreshed by later edits.
    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn account_id(&self) -> &RecordId {
        &self.account.id
    }

    pub fn is_admin(&self) -> bool {
        self.account.is_admin()
    }

    pub fn started_at(&self) -> OffsetDateTime {
        self.started_at
    }

    /// True when the session came from durable storage rather than a login.
    pub fn is_restored(&self) -> bool {
        self.restored
    }
}
