use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::{
    dto::{AccountUpdate, NewAccount, NewAccountRequest, RegisterRequest},
    password::{credential_matches, hash_password},
    repo_types::{Account, AccountStatus, Role},
};
use crate::{
    attendance::auto_mark_attendance,
    config::AccountDefaults,
    error::{HrError, HrResult},
    session::Session,
    snapshot::reload_after_mutation,
    state::AppState,
    store::{self, Collection, RecordId},
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn require(field: &str, value: &str) -> HrResult<()> {
    if value.trim().is_empty() {
        return Err(HrError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn check_email(email: &str) -> HrResult<()> {
    if !email.is_empty() && !is_valid_email(email) {
        return Err(HrError::Validation(format!("{email:?} is not a valid email address")));
    }
    Ok(())
}

fn avatar_url(defaults: &AccountDefaults, name: &str) -> String {
    format!(
        "{}?name={}&background=random&color=fff",
        defaults.avatar_base_url,
        name.trim().replace(' ', "+")
    )
}

/// Authenticates against the full account list.
#[instrument(skip(state, password))]
pub async fn login(state: &AppState, username: &str, password: &str) -> HrResult<Session> {
    let ticket = state.snapshot.issue();
    let accounts: Vec<Account> = store::list(state.store.as_ref()).await.map_err(|e| {
        warn!(error = %e, "account list unavailable during login");
        HrError::AuthServiceUnavailable(e.to_string())
    })?;

    let allow_plaintext = state.config.allow_plaintext_passwords;
    let matched = accounts
        .iter()
        .find(|a| a.username == username && credential_matches(&a.password, password, allow_plaintext))
        .cloned();
    state.snapshot.replace(ticket, accounts).await;

    let Some(account) = matched else {
        warn!("login rejected");
        return Err(HrError::InvalidCredentials);
    };

    let session = Session::start(account, state.clock.now());
    if let Err(e) = state.sessions.save(session.account()) {
        warn!(error = %e, "could not persist session; it will not survive a restart");
    }
    info!(account_id = %session.account_id(), role = ?session.account().role, "user logged in");

    if session.account().role == Role::Employee {
        if let Err(e) = auto_mark_attendance(state, session.account_id()).await {
            warn!(error = %e, account_id = %session.account_id(), "failed to mark attendance");
        }
    }
    Ok(session)
}

/// Self-service sign-up; always creates an active employee.
#[instrument(skip(state, req), fields(username = %req.username))]
pub async fn register(state: &AppState, req: RegisterRequest) -> HrResult<Account> {
    require("username", &req.username)?;
    require("password", &req.password)?;
    require("name", &req.name)?;
    check_email(&req.email)?;

    let defaults = &state.config.accounts;
    let body = NewAccount {
        avatar_url: avatar_url(defaults, &req.name),
        password: hash_password(&req.password)?,
        username: req.username,
        role: Role::Employee,
        name: req.name,
        email: req.email,
        phone: req.phone,
        department: req.department,
        position: req.position,
        join_date: state.clock.today(),
        salary: defaults.salary,
        status: AccountStatus::Active,
        leave_allowance: defaults.leave_allowance,
        used_leaves: 0,
    };
    create_account(state, body).await
}

/// Admin-side creation with an explicit role and optional salary.
#[instrument(skip(state, req), fields(username = %req.username, role = ?req.role))]
pub async fn add_account(state: &AppState, req: NewAccountRequest) -> HrResult<Account> {
    require("username", &req.username)?;
    require("password", &req.password)?;
    require("name", &req.name)?;
    check_email(&req.email)?;
    if req.salary.is_some_and(|s| !s.is_finite() || s < 0.0) {
        return Err(HrError::Validation("salary must be a non-negative amount".into()));
    }

    let defaults = &state.config.accounts;
    let body = NewAccount {
        avatar_url: avatar_url(defaults, &req.name),
        password: hash_password(&req.password)?,
        username: req.username,
        role: req.role,
        name: req.name,
        email: req.email,
        phone: req.phone,
        department: req.department,
        position: req.position,
        join_date: state.clock.today(),
        salary: req.salary.filter(|s| *s > 0.0).unwrap_or(defaults.salary),
        status: AccountStatus::Active,
        leave_allowance: defaults.leave_allowance,
        used_leaves: 0,
    };
    let account = create_account(state, body).await?;
    reload_after_mutation(state).await;
    Ok(account)
}

async fn create_account(state: &AppState, body: NewAccount) -> HrResult<Account> {
    let account: Account = store::create(state.store.as_ref(), &body).await?;
    state.snapshot.upsert(account.clone()).await;
    info!(account_id = %account.id, "account created");
    Ok(account)
}

fn merge_text(current: &mut String, update: Option<String>) {
    if let Some(v) = update {
        if !v.trim().is_empty() {
            *current = v;
        }
    }
}

/// Merges `update` over the snapshot copy and replaces the whole record.
#[instrument(skip(state, update), fields(account_id = %id))]
pub async fn update_account(
    state: &AppState,
    id: &RecordId,
    update: AccountUpdate,
) -> HrResult<Account> {
    let mut account = state
        .snapshot
        .with(|s| s.account(id).cloned())
        .await
        .ok_or_else(|| HrError::NotFound {
            collection: Collection::Accounts,
            id: id.clone(),
        })?;

    merge_text(&mut account.name, update.name);
    merge_text(&mut account.email, update.email);
    merge_text(&mut account.phone, update.phone);
    merge_text(&mut account.department, update.department);
    merge_text(&mut account.position, update.position);
    if let Some(salary) = update.salary.filter(|s| s.is_finite() && *s > 0.0) {
        account.salary = salary;
    }
    if let Some(status) = update.status {
        account.status = status;
    }
    check_email(&account.email)?;

    let saved = store::update(state.store.as_ref(), &account).await?;
    state.snapshot.upsert(saved.clone()).await;
    info!("account updated");

    reload_after_mutation(state).await;
    Ok(saved)
}
