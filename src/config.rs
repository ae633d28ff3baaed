use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::cmd::genticket::GenticketArgs;
use crate::error::{AppError, AppResult};

pub const RUN_LOG_FILE_NAME: &str = "servicenow-results.log";
pub const DEDUP_STORE_FILE_NAME: &str = "genticketData.json";

/// Credential that never shows up in `Debug` output.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub accept_invalid_certs: bool,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct BigFixSettings {
    pub base_url: String,
    pub username: String,
    pub password: Secret,
}

#[derive(Debug, Clone)]
pub struct ServiceNowSettings {
    pub base_url: String,
    pub username: String,
    pub password: Secret,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bigfix: BigFixSettings,
    pub servicenow: ServiceNowSettings,
    pub http: HttpSettings,
    pub days: u32,
    pub data_dir: PathBuf,
    pub record_failed_submissions: bool,
}

impl AppConfig {
    pub fn from_args(args: &GenticketArgs) -> AppResult<Self> {
        if args.days == 0 {
            return Err(AppError::Configuration(
                "days must be at least 1".to_string(),
            ));
        }
        if args.timeout_secs == 0 {
            return Err(AppError::Configuration(
                "timeout must be at least 1 second".to_string(),
            ));
        }

        let bf_server = required("--bfserver", &args.bfserver)?;
        if bf_server.contains("://") || bf_server.contains('/') {
            return Err(AppError::Configuration(format!(
                "--bfserver expects host:port without scheme or path, got '{bf_server}'"
            )));
        }

        let sn_url = required("--snurl", &args.snurl)?;
        let parsed = Url::parse(sn_url)
            .map_err(|err| AppError::Configuration(format!("invalid --snurl '{sn_url}': {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::Configuration(format!(
                "--snurl must be an http(s) URL, got '{sn_url}'"
            )));
        }

        Ok(Self {
            bigfix: BigFixSettings {
                base_url: format!("https://{bf_server}"),
                username: required("--bfuser", &args.bfuser)?.to_string(),
                password: required_secret("--bfpass", &args.bfpass)?,
            },
            servicenow: ServiceNowSettings {
                base_url: sn_url.trim_end_matches('/').to_string(),
                username: required("--snuser", &args.snuser)?.to_string(),
                password: required_secret("--snpass", &args.snpass)?,
            },
            http: HttpSettings {
                accept_invalid_certs: args.insecure,
                timeout: Duration::from_secs(args.timeout_secs),
            },
            days: args.days,
            data_dir: args.data_dir.clone(),
            record_failed_submissions: args.record_failed_submissions,
        })
    }

    pub fn run_log_path(&self) -> PathBuf {
        self.data_dir.join(RUN_LOG_FILE_NAME)
    }

    pub fn dedup_store_path(&self) -> PathBuf {
        self.data_dir.join(DEDUP_STORE_FILE_NAME)
    }
}

fn required<'a>(flag: &str, value: &'a str) -> AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Configuration(format!("{flag} must not be empty")));
    }
    Ok(trimmed)
}

/// Like [`required`], but keeps surrounding whitespace, which may be part of a password.
fn required_secret(flag: &str, value: &str) -> AppResult<Secret> {
    required(flag, value)?;
    Ok(Secret::new(value))
}
