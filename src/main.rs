use anyhow::Context;
use clap::{Parser, Subcommand};
use hrdesk::{
    accounts::{self, Account},
    leaves::{self, LeaveDecision},
    session::{bootstrap_session, logout},
    snapshot,
    stats::{attendance_breakdown, compute_statistics},
    store::RecordId,
    AppConfig, AppState, HrError,
};

#[derive(Parser, Debug)]
#[command(name = "hrdesk", version, about = "HR dashboard client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the restored session and how much data the store holds.
    Status,
    /// Log in and persist the session.
    Login {
        username: String,
        /// Read from HR_PASSWORD when omitted.
        #[arg(long, env = "HR_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the persisted session.
    Logout,
    /// Print dashboard statistics as JSON.
    Stats,
    /// Delete an account and its attendance, leave and payroll records.
    DeleteAccount { id: RecordId },
    ApproveLeave { id: RecordId },
    RejectLeave { id: RecordId },
    /// Finish deleting records whose account is already gone.
    RetryCascades,
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "hrdesk=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn describe(account: &Account) -> String {
    format!(
        "{} ({}, {:?}, id {})",
        account.name, account.username, account.role, account.id
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("reading configuration")?;
    let state = AppState::init(config)?;

    let boot = bootstrap_session(&state).await;
    if let Some(e) = &boot.reload_error {
        tracing::warn!(error = %e, "initial load failed; data shown may be empty");
    }
    let require_admin = |session: Option<&hrdesk::Session>| -> Result<(), HrError> {
        match session {
            Some(s) if s.is_admin() => Ok(()),
            Some(_) => Err(HrError::Validation("this command needs an admin session".into())),
            None => Err(HrError::NotAuthenticated),
        }
    };

    match cli.command {
        Command::Status => {
            match &boot.session {
                Some(s) => println!("logged in as {}", describe(s.account())),
                None => println!("not logged in"),
            }
            let snap = state.snapshot.read().await;
            println!(
                "{} accounts, {} attendance, {} leaves, {} payroll, {} departments",
                snap.accounts.len(),
                snap.attendance.len(),
                snap.leaves.len(),
                snap.payroll.len(),
                snap.departments.len()
            );
        }
        Command::Login { username, password } => {
            // A failed attempt leaves the stored session alone; a successful
            // one overwrites it.
            let session = accounts::login(&state, &username, &password).await?;
            println!("logged in as {}", describe(session.account()));
            if !session.is_admin() {
                println!("remaining leave: {} day(s)", session.account().remaining_leaves());
            }
        }
        Command::Logout => match boot.session {
            Some(session) => {
                logout(&state, session)?;
                println!("logged out");
            }
            None => println!("not logged in"),
        },
        Command::Stats => {
            let out = serde_json::json!({
                "statistics": compute_statistics(&state).await,
                "attendance": attendance_breakdown(&state).await,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::DeleteAccount { id } => {
            require_admin(boot.session.as_ref())?;
            match accounts::delete_account_cascade(&state, &id).await {
                Ok(()) => println!("account {id} deleted"),
                Err(e @ HrError::PartialCascadeFailure { .. }) => {
                    eprintln!("{e}; run `hrdesk retry-cascades` to finish");
                    std::process::exit(2);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::ApproveLeave { id } => {
            require_admin(boot.session.as_ref())?;
            let leave = leaves::set_leave_status(&state, &id, LeaveDecision::Approved).await?;
            println!("leave {} is now {:?}", leave.id, leave.status);
        }
        Command::RejectLeave { id } => {
            require_admin(boot.session.as_ref())?;
            let leave = leaves::set_leave_status(&state, &id, LeaveDecision::Rejected).await?;
            println!("leave {} is now {:?}", leave.id, leave.status);
        }
        Command::RetryCascades => {
            require_admin(boot.session.as_ref())?;
            if boot.reload_error.is_some() {
                snapshot::reload(&state).await?;
            }
            let queued = accounts::adopt_orphans(&state).await;
            let remaining = accounts::retry_pending_cascades(&state).await?;
            println!("{queued} orphaned record(s) found, {remaining} still pending");
        }
    }

    Ok(())
}
