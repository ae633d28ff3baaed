pub mod bigfix;
pub mod servicenow;

use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::Client;
use tracing::warn;

use crate::config::HttpSettings;
use crate::error::{AppError, AppResult};

/// Builds the client shared by both endpoints for one run.
pub fn http_client(settings: &HttpSettings) -> AppResult<Client> {
    if settings.accept_invalid_certs {
        warn!("TLS certificate verification is disabled for this run");
    }

    Client::builder()
        .cookie_store(true)
        .danger_accept_invalid_certs(settings.accept_invalid_certs)
        .timeout(settings.timeout)
        .build()
        .map_err(|err| AppError::Configuration(format!("failed to build HTTP client: {err}")))
}

pub(crate) fn basic_auth_header(username: &str, password: &str) -> String {
    let credentials = format!("{username}:{password}");
    let encoded = BASE64_STANDARD.encode(credentials);
    format!("Basic {encoded}")
}
