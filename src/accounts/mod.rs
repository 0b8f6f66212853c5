mod cascade;
mod dto;
pub mod password;
mod repo_types;
mod services;

pub use cascade::{
    adopt_orphans, delete_account_cascade, pending_cascades, retry_pending_cascades, CascadeLog,
};
pub use dto::{AccountUpdate, NewAccountRequest, RegisterRequest};
pub use repo_types::{Account, AccountStatus, Role};
pub use services::{add_account, login, register, update_account};
