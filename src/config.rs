use std::path::PathBuf;

use serde::Deserialize;

/// Defaults applied to accounts created through `register` and `add_account`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountDefaults {
    pub salary: f64,
    pub leave_allowance: u32,
    pub avatar_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api_url: String,
    pub session_file: PathBuf,
    pub http_timeout_secs: u64,
    pub accounts: AccountDefaults,
    pub reload_after_mutation: bool,
    pub allow_plaintext_passwords: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let accounts = AccountDefaults {
            salary: env_parse("HR_DEFAULT_SALARY", 50_000.0),
            leave_allowance: env_parse("HR_DEFAULT_LEAVE_ALLOWANCE", 12),
            avatar_base_url: std::env::var("HR_AVATAR_BASE_URL")
                .unwrap_or_else(|_| "https://ui-avatars.com/api/".into()),
        };
        let api_url = std::env::var("HR_API_URL").unwrap_or_else(|_| "http://localhost:3001".into());
        anyhow::ensure!(!api_url.trim().is_empty(), "HR_API_URL must not be empty");

        Ok(Self {
            api_url,
            session_file: std::env::var("HR_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".hrdesk/session.json")),
            http_timeout_secs: env_parse("HR_HTTP_TIMEOUT_SECS", 30),
            accounts,
            reload_after_mutation: env_parse("HR_RELOAD_AFTER_MUTATION", false),
            allow_plaintext_passwords: env_parse("HR_ALLOW_PLAINTEXT_PASSWORDS", true),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3001".into(),
            session_file: PathBuf::from(".hrdesk/session.json"),
            http_timeout_secs: 30,
            accounts: AccountDefaults {
                salary: 50_000.0,
                leave_allowance: 12,
                avatar_base_url: "https://ui-avatars.com/api/".into(),
            },
            reload_after_mutation: false,
            allow_plaintext_passwords: true,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
